//! dtree - Dependency forest builder for Go module graphs
//!
//! This crate turns the `parent child` edge list printed by `go mod graph`
//! into nested dependency trees, one per root module, with cycles truncated
//! into marked stubs. It also fetches repositories, exports the forest and
//! provides a terminal explorer for the result.

pub mod config;
pub mod export;
pub mod git;
pub mod graph;
pub mod parser;
pub mod source;
pub mod tree;
pub mod ui;
