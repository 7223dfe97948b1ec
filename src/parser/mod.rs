//! Parser module for dtree.
//!
//! Turns the raw edge list printed by `go mod graph` into an adjacency
//! mapping ([`ModGraph`]), and splits node identifiers into module name and
//! version.
//!
//! # Example
//!
//! ```
//! use dtree::parser::{parse_mod_graph, split_module_version};
//!
//! let graph = parse_mod_graph("example.com/app golang.org/x/mod@v0.17.0\n");
//! let child = &graph.children("example.com/app")[0];
//!
//! assert_eq!(split_module_version(child), ("golang.org/x/mod", "v0.17.0"));
//! ```

pub mod modgraph;
pub mod types;

pub use modgraph::parse_mod_graph;
pub use types::{split_module_version, ModGraph, VERSION_SEPARATOR};
