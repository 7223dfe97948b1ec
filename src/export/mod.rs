//! Export functionality for dependency forests.
//!
//! This module provides exporters for writing a built forest in various
//! formats: JSON (the canonical `output.json`), CSV, and Markdown.

pub mod csv;
pub mod json;
pub mod markdown;

use crate::graph::{CycleInfo, ModuleGraph};
use crate::tree::Forest;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// JSON format - nested artifact documents
    #[default]
    Json,
    /// CSV format - one row per tree position
    Csv,
    /// Markdown format - summary plus nested lists
    Markdown,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: json, csv, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Data container for export operations.
#[derive(Debug, Clone)]
pub struct ExportData {
    /// Root artifacts
    pub forest: Forest,
    /// Distinct modules in the edge list
    pub module_count: usize,
    /// Edges in the edge list, duplicates included
    pub edge_count: usize,
    /// Detected dependency cycles
    pub cycles: Vec<CycleInfo>,
}

impl ExportData {
    /// Create export data from a forest and the graph it was built from.
    pub fn new(forest: Forest, graph: &ModuleGraph) -> Self {
        Self {
            forest,
            module_count: graph.node_count(),
            edge_count: graph.edge_count(),
            cycles: graph.cycle_details(),
        }
    }

    /// Number of root trees
    pub fn root_count(&self) -> usize {
        self.forest.len()
    }

    /// Number of truncated cycle stubs across all trees
    pub fn truncated_count(&self) -> usize {
        fn count(artifact: &crate::tree::Artifact) -> usize {
            usize::from(artifact.truncated)
                + artifact.dependencies.iter().map(|d| count(d)).sum::<usize>()
        }
        self.forest.iter().map(|root| count(root)).sum()
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the data to the given writer.
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()>;
}

/// Export data in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    data: &ExportData,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Json => json::JsonExporter.export(data, writer),
        ExportFormat::Csv => csv::CsvExporter.export(data, writer),
        ExportFormat::Markdown => markdown::MarkdownExporter.export(data, writer),
    }
}

/// Export data to a string.
pub fn export_to_string(format: ExportFormat, data: &ExportData) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, data, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Export data to a file, replacing any existing content.
pub fn export_to_file(format: ExportFormat, data: &ExportData, path: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    export(format, data, &mut writer)?;
    writer.flush()
}
