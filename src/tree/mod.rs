//! Dependency forest construction.
//!
//! This module provides [`build_forest`], which turns a parsed [`ModGraph`]
//! into one [`Artifact`] tree per root module.
//!
//! [`ModGraph`]: crate::parser::ModGraph
//!
//! # Example
//!
//! ```rust
//! use dtree::parser::parse_mod_graph;
//! use dtree::tree::build_forest;
//!
//! let graph = parse_mod_graph("A B\nB A\n");
//! let forest = build_forest(&graph).unwrap();
//!
//! // Every node has an incoming edge, so there is no root.
//! assert!(forest.is_empty());
//! ```

mod artifact;
mod builder;

pub use artifact::Artifact;
pub use builder::{build_forest, BuildError, BuildResult, Forest, ForestBuilder, Materializer};
