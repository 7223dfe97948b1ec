//! Graph module for module relationship analysis.
//!
//! This module provides the [`ModuleGraph`] struct, a petgraph view over a
//! parsed edge list used for summary statistics and cycle reporting.
//!
//! # Example
//!
//! ```rust
//! use dtree::graph::ModuleGraph;
//! use dtree::parser::parse_mod_graph;
//!
//! let graph = ModuleGraph::from_mod_graph(&parse_mod_graph(
//!     "example.com/app golang.org/x/mod@v0.17.0\n\
//!      golang.org/x/mod@v0.17.0 golang.org/x/tools@v0.13.0\n",
//! ));
//!
//! assert_eq!(graph.node_count(), 3);
//! assert_eq!(graph.edge_count(), 2);
//! assert!(!graph.has_cycles());
//! ```

mod module_graph;

pub use module_graph::{CycleInfo, ModuleGraph};
