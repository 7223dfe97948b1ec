//! CSV export implementation.
//!
//! Writes one row per position in each tree, depth-first, for spreadsheet use.

use super::{ExportData, Exporter};
use crate::tree::Artifact;
use std::io::{self, Write};

/// CSV exporter implementation.
pub struct CsvExporter;

impl CsvExporter {
    /// Escape a field value for CSV format.
    ///
    /// Wraps the value in quotes if it contains commas, quotes, or line breaks.
    fn escape_field(value: &str) -> String {
        if value.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }

    fn write_rows<W: Write>(
        writer: &mut W,
        root: &str,
        parent: &str,
        artifact: &Artifact,
        depth: usize,
    ) -> io::Result<()> {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            Self::escape_field(root),
            depth,
            Self::escape_field(parent),
            Self::escape_field(&artifact.name),
            Self::escape_field(&artifact.version),
            artifact.truncated
        )?;

        let id = artifact.id();
        for dep in &artifact.dependencies {
            Self::write_rows(writer, root, &id, dep, depth + 1)?;
        }
        Ok(())
    }
}

impl Exporter for CsvExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "root,depth,parent,name,version,truncated")?;

        for root in &data.forest {
            Self::write_rows(writer, &root.id(), "", root, 0)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::data_for;

    fn export_lines(input: &str) -> Vec<String> {
        let data = data_for(input);
        let mut output = Vec::new();
        CsvExporter.export(&data, &mut output).unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_csv_export_basic() {
        let lines = export_lines("app a@v1\napp b@v2\na@v1 c@v3\n");

        assert_eq!(
            lines,
            [
                "root,depth,parent,name,version,truncated",
                "app,0,,app,,false",
                "app,1,app,a,v1,false",
                "app,2,a@v1,c,v3,false",
                "app,1,app,b,v2,false",
            ]
        );
    }

    #[test]
    fn test_csv_export_cycle_stub() {
        let lines = export_lines("root a\na b\nb a\n");
        assert_eq!(lines.last().unwrap(), "root,3,b,a,,true");
    }

    #[test]
    fn test_csv_export_multiple_roots() {
        let lines = export_lines("x shared\ny shared\n");

        // Header + two rows per root
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("x,0,"));
        assert!(lines[3].starts_with("y,0,"));
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(CsvExporter::escape_field("simple"), "simple");
        assert_eq!(CsvExporter::escape_field("with,comma"), "\"with,comma\"");
        assert_eq!(
            CsvExporter::escape_field("with\"quote"),
            "\"with\"\"quote\""
        );
        assert_eq!(CsvExporter::escape_field("with\nnewline"), "\"with\nnewline\"");
        assert_eq!(CsvExporter::escape_field("with\rreturn"), "\"with\rreturn\"");
    }
}
