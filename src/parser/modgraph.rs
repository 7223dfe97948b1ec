//! Parser for `go mod graph` edge lists.
//!
//! Each line of the input is `parent child`. Lines that do not split into
//! exactly two whitespace-separated tokens are dropped, since the producing
//! tool's output may carry noise.

use tracing::debug;

use super::types::ModGraph;

/// Parses an edge list into an adjacency mapping.
///
/// This function never fails: blank lines and malformed lines are skipped.
///
/// # Example
///
/// ```
/// use dtree::parser::parse_mod_graph;
///
/// let graph = parse_mod_graph("A B\nA C\nB D\n");
/// assert_eq!(graph.children("A"), ["B", "C"]);
/// assert_eq!(graph.children("B"), ["D"]);
/// assert_eq!(graph.len(), 2);
/// ```
pub fn parse_mod_graph(input: &str) -> ModGraph {
    let mut graph = ModGraph::new();
    let mut skipped = 0usize;

    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(parent), Some(child), None) => graph.add_edge(parent, child),
            _ => skipped += 1,
        }
    }

    debug!(
        parents = graph.len(),
        edges = graph.edge_count(),
        skipped,
        "parsed module graph"
    );

    graph
}
