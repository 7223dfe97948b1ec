//! JSON export implementation.
//!
//! Writes the forest as a top-level array of nested artifact documents,
//! the format persisted as `output.json`.

use super::{ExportData, Exporter};
use crate::tree::Forest;
use serde::Deserialize;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&data.forest)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}

/// Reads a forest written by [`JsonExporter`].
///
/// Every tree level nests an object inside an array, so long module chains
/// go past serde_json's default nesting limit; the limit is lifted here and
/// depth is bounded by the stack instead.
pub fn read_forest(json: &str) -> serde_json::Result<Forest> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    deserializer.disable_recursion_limit();
    let forest = Forest::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(forest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::data_for;
    use crate::tree::Artifact;
    use std::rc::Rc;

    fn export_value(input: &str) -> serde_json::Value {
        let data = data_for(input);
        let mut output = Vec::new();
        JsonExporter.export(&data, &mut output).unwrap();

        let json_str = String::from_utf8(output).unwrap();
        serde_json::from_str(&json_str).unwrap()
    }

    #[test]
    fn test_json_export_basic() {
        let parsed = export_value("A B\nA C\nB D\n");

        assert_eq!(
            parsed,
            serde_json::json!([{
                "name": "A",
                "version": "",
                "dependencies": [
                    {"name": "B", "version": "", "dependencies": [{"name": "D", "version": ""}]},
                    {"name": "C", "version": ""}
                ]
            }])
        );
    }

    #[test]
    fn test_json_export_versions() {
        let parsed = export_value("example.com/app golang.org/x/mod@v0.17.0\n");

        let dep = &parsed[0]["dependencies"][0];
        assert_eq!(parsed[0]["name"], "example.com/app");
        assert_eq!(dep["name"], "golang.org/x/mod");
        assert_eq!(dep["version"], "v0.17.0");
        assert!(dep.get("dependencies").is_none());
    }

    #[test]
    fn test_json_export_marks_cycle_stub() {
        let parsed = export_value("root a\na b\nb a\n");

        let stub = &parsed[0]["dependencies"][0]["dependencies"][0]["dependencies"][0];
        assert_eq!(stub["name"], "a");
        assert_eq!(stub["truncated"], true);
        assert!(stub.get("dependencies").is_none());
    }

    #[test]
    fn test_json_round_trips_into_artifacts() {
        let data = data_for("A B\nB C\n");
        let mut output = Vec::new();
        JsonExporter.export(&data, &mut output).unwrap();

        let forest: Vec<Rc<Artifact>> = serde_json::from_slice(&output).unwrap();
        assert_eq!(forest, data.forest);
    }

    #[test]
    fn test_read_forest_deep_chain() {
        let edges: String = (0..120).map(|i| format!("m{} m{}\n", i, i + 1)).collect();
        let data = data_for(&edges);
        let mut output = Vec::new();
        JsonExporter.export(&data, &mut output).unwrap();

        let json = String::from_utf8(output).unwrap();
        assert!(serde_json::from_str::<Vec<Rc<Artifact>>>(&json).is_err());

        let forest = read_forest(&json).unwrap();
        assert_eq!(forest, data.forest);

        let mut depth = 0;
        let mut node = &forest[0];
        while let Some(next) = node.dependencies.first() {
            node = next;
            depth += 1;
        }
        assert_eq!(depth, 120);
        assert_eq!(node.name, "m120");
    }

    #[test]
    fn test_read_forest_rejects_trailing_data() {
        assert!(read_forest("[] []").is_err());
        assert!(read_forest(r#"[{"name": "a", "version": ""}]"#).is_ok());
    }
}
