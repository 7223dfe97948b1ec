//! Shared types for module graph parsing.
//!
//! This module defines the adjacency mapping produced from a `go mod graph`
//! style edge list, plus the helper that splits a node identifier into its
//! module name and version.

use std::collections::HashMap;

/// Separator between a module path and its version in a node identifier.
pub const VERSION_SEPARATOR: char = '@';

/// Adjacency mapping from a parent identifier to its ordered children.
///
/// Children keep the order in which their edges appeared in the input, and
/// duplicate edges are preserved. Only nodes that appear as a parent have an
/// entry; looking up a child-only node yields an empty slice.
///
/// # Example
///
/// ```
/// use dtree::parser::ModGraph;
///
/// let mut graph = ModGraph::new();
/// graph.add_edge("app", "lib@v1.0.0");
/// graph.add_edge("app", "util@v0.2.0");
///
/// assert_eq!(graph.children("app"), ["lib@v1.0.0", "util@v0.2.0"]);
/// assert!(graph.children("lib@v1.0.0").is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModGraph {
    edges: HashMap<String, Vec<String>>,
}

impl ModGraph {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `child` to the children of `parent`, creating the entry if needed.
    pub fn add_edge(&mut self, parent: impl Into<String>, child: impl Into<String>) {
        self.edges
            .entry(parent.into())
            .or_default()
            .push(child.into());
    }

    /// Returns the ordered children of `id`, or an empty slice if it has no entry.
    pub fn children(&self, id: &str) -> &[String] {
        self.edges.get(id).map_or(&[], Vec::as_slice)
    }

    /// Returns true if `id` appears as a parent.
    pub fn contains_parent(&self, id: &str) -> bool {
        self.edges.contains_key(id)
    }

    /// Iterates over `(parent, children)` entries in map order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.edges
            .iter()
            .map(|(parent, children)| (parent.as_str(), children.as_slice()))
    }

    /// Number of parent entries.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if no edge was recorded.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Total number of edges, duplicates included.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Borrows the underlying map.
    pub fn as_map(&self) -> &HashMap<String, Vec<String>> {
        &self.edges
    }
}

impl From<HashMap<String, Vec<String>>> for ModGraph {
    fn from(edges: HashMap<String, Vec<String>>) -> Self {
        Self { edges }
    }
}

/// Splits a node identifier into `(name, version)` at the last `@`.
///
/// Identifiers without a separator yield an empty version.
///
/// # Example
///
/// ```
/// use dtree::parser::split_module_version;
///
/// assert_eq!(split_module_version("golang.org/x/mod@v0.17.0"), ("golang.org/x/mod", "v0.17.0"));
/// assert_eq!(split_module_version("example.com/app"), ("example.com/app", ""));
/// ```
pub fn split_module_version(id: &str) -> (&str, &str) {
    match id.rfind(VERSION_SEPARATOR) {
        Some(i) => (&id[..i], &id[i + VERSION_SEPARATOR.len_utf8()..]),
        None => (id, ""),
    }
}
