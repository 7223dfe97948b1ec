//! Markdown export implementation.
//!
//! Exports a dependency forest in Markdown format for documentation and reporting.

use super::{ExportData, Exporter};
use crate::tree::Artifact;
use std::io::{self, Write};

/// Markdown exporter implementation.
pub struct MarkdownExporter;

impl MarkdownExporter {
    fn write_tree<W: Write>(writer: &mut W, artifact: &Artifact, depth: usize) -> io::Result<()> {
        let indent = "  ".repeat(depth);
        let label = if depth == 0 {
            format!("**{}**", artifact.name)
        } else {
            format!("`{}`", artifact.name)
        };

        write!(writer, "{}- {}", indent, label)?;
        if !artifact.version.is_empty() {
            write!(writer, " {}", artifact.version)?;
        }
        if artifact.truncated {
            write!(writer, " _(cycle)_")?;
        }
        writeln!(writer)?;

        for dep in &artifact.dependencies {
            Self::write_tree(writer, dep, depth + 1)?;
        }
        Ok(())
    }
}

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        // Title
        writeln!(writer, "# Dependency Tree Report")?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Count |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Modules | {} |", data.module_count)?;
        writeln!(writer, "| Edges | {} |", data.edge_count)?;
        writeln!(writer, "| Root Trees | {} |", data.root_count())?;
        writeln!(writer, "| Circular Dependencies | {} |", data.cycles.len())?;
        writeln!(writer)?;

        // Circular dependencies
        if !data.cycles.is_empty() {
            writeln!(writer, "## Circular Dependencies")?;
            writeln!(writer)?;
            writeln!(
                writer,
                "The following circular dependencies were detected and truncated in the trees:"
            )?;
            writeln!(writer)?;
            for (i, cycle) in data.cycles.iter().enumerate() {
                write!(writer, "{}. `{}`", i + 1, cycle.cycle_path())?;
                if cycle.has_more_members() {
                    write!(
                        writer,
                        " (one of several loops among {} modules: {})",
                        cycle.members.len(),
                        cycle.members.join(", ")
                    )?;
                }
                writeln!(writer)?;
            }
            writeln!(writer)?;
        }

        // Trees
        writeln!(writer, "## Dependency Trees")?;
        writeln!(writer)?;
        for root in &data.forest {
            Self::write_tree(writer, root, 0)?;
        }
        writeln!(writer)?;

        // Footer
        writeln!(writer, "---")?;
        writeln!(writer, "*Generated by dtree*")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::data_for;

    fn export_markdown(input: &str) -> String {
        let data = data_for(input);
        let mut output = Vec::new();
        MarkdownExporter.export(&data, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_markdown_export_summary() {
        let md = export_markdown("A B\nA C\nB D\n");

        assert!(md.contains("# Dependency Tree Report"));
        assert!(md.contains("| Modules | 4 |"));
        assert!(md.contains("| Edges | 3 |"));
        assert!(md.contains("| Root Trees | 1 |"));
        assert!(md.contains("| Circular Dependencies | 0 |"));
    }

    #[test]
    fn test_markdown_export_nested_list() {
        let md = export_markdown("app a@v1\na@v1 b@v2\napp c\n");

        assert!(md.contains("- **app**\n  - `a` v1\n    - `b` v2\n  - `c`\n"));
    }

    #[test]
    fn test_markdown_export_with_cycles() {
        let md = export_markdown("root a\na b\nb a\n");

        assert!(md.contains("## Circular Dependencies"));
        assert!(md.contains("1. `a -> b -> a`"));
        assert!(md.contains("- `a` _(cycle)_"));
    }

    #[test]
    fn test_markdown_cycle_follows_edge_order() {
        let md = export_markdown("root a\na c\nc b\nb a\n");

        assert!(md.contains("1. `a -> c -> b -> a`\n"));
        assert!(!md.contains("a -> b"));
    }

    #[test]
    fn test_markdown_lists_members_of_larger_component() {
        let md = export_markdown("root a\na b\nb a\nb c\nc d\nd b\n");

        assert!(md.contains("1. `a -> b -> a` (one of several loops among 4 modules: a, b, c, d)\n"));
    }

    #[test]
    fn test_markdown_export_no_cycle_section_when_empty() {
        let md = export_markdown("a b\n");
        assert!(!md.contains("## Circular Dependencies"));
    }

    #[test]
    fn test_markdown_export_footer() {
        let md = export_markdown("a b\n");
        assert!(md.trim_end().ends_with("*Generated by dtree*"));
    }
}
