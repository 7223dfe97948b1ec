//! Forest construction from a module adjacency mapping.
//!
//! Roots are the modules nobody depends on. Each root is expanded depth-first;
//! a visited cache shared across the whole forest lets a module reached twice
//! reuse the subtree built the first time, and a current-path set catches
//! edges back into an ancestor so the expansion terminates.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::{debug, trace};

use super::artifact::Artifact;
use crate::parser::ModGraph;

/// Errors that can occur while building a dependency forest.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    /// The edge list contained no usable edge.
    #[error("empty module graph")]
    EmptyGraph,
}

/// Result type alias for forest construction.
pub type BuildResult<T> = Result<T, BuildError>;

/// The root artifacts of a module graph.
pub type Forest = Vec<Rc<Artifact>>;

/// Builds one artifact tree per root of `graph`.
///
/// Roots are returned sorted by identifier; children keep input edge order.
///
/// # Errors
///
/// Returns [`BuildError::EmptyGraph`] when `graph` has no entries.
///
/// # Example
///
/// ```
/// use dtree::parser::parse_mod_graph;
/// use dtree::tree::build_forest;
///
/// let forest = build_forest(&parse_mod_graph("A B\nA C\nB D\n")).unwrap();
/// assert_eq!(forest.len(), 1);
/// assert_eq!(forest[0].name, "A");
/// assert_eq!(forest[0].dependencies[0].dependencies[0].name, "D");
/// ```
pub fn build_forest(graph: &ModGraph) -> BuildResult<Forest> {
    ForestBuilder::new(graph).build()
}

/// Computes roots of a [`ModGraph`] and drives per-root materialization.
#[derive(Debug, Clone, Copy)]
pub struct ForestBuilder<'g> {
    graph: &'g ModGraph,
}

impl<'g> ForestBuilder<'g> {
    /// Creates a builder over `graph`.
    pub fn new(graph: &'g ModGraph) -> Self {
        Self { graph }
    }

    /// Counts incoming edges per node.
    ///
    /// Every parent starts at zero so that parents nobody references still
    /// show up; child-only nodes get an entry on their first appearance.
    pub fn in_degrees(&self) -> HashMap<&'g str, usize> {
        let graph = self.graph;
        let mut incoming: HashMap<&'g str, usize> = HashMap::with_capacity(graph.len());

        for (parent, children) in graph.iter() {
            incoming.entry(parent).or_insert(0);
            for child in children {
                *incoming.entry(child.as_str()).or_insert(0) += 1;
            }
        }

        incoming
    }

    /// Returns the identifiers with no incoming edge, sorted.
    pub fn roots(&self) -> Vec<&'g str> {
        let mut roots: Vec<&'g str> = self
            .in_degrees()
            .into_iter()
            .filter(|&(_, count)| count == 0)
            .map(|(id, _)| id)
            .collect();
        roots.sort_unstable();
        roots
    }

    /// Materializes every root against one shared visited cache.
    pub fn build(&self) -> BuildResult<Forest> {
        if self.graph.is_empty() {
            return Err(BuildError::EmptyGraph);
        }

        let roots = self.roots();
        debug!(roots = roots.len(), "building dependency forest");

        let mut materializer = Materializer::new(self.graph);
        let forest: Forest = roots
            .into_iter()
            .map(|root| materializer.materialize_root(root))
            .collect();

        debug!(
            trees = forest.len(),
            modules = materializer.visited_count(),
            "dependency forest built"
        );
        Ok(forest)
    }
}

/// Depth-first expansion of modules into [`Artifact`] trees.
///
/// The visited cache and current-path set belong to one materializer and are
/// only touched through `&mut self`; separate forest builds must use separate
/// materializers.
#[derive(Debug)]
pub struct Materializer<'g> {
    graph: &'g ModGraph,
    visited: HashMap<&'g str, Rc<Artifact>>,
    path: HashSet<&'g str>,
}

impl<'g> Materializer<'g> {
    /// Creates a materializer with an empty cache.
    pub fn new(graph: &'g ModGraph) -> Self {
        Self {
            graph,
            visited: HashMap::new(),
            path: HashSet::new(),
        }
    }

    /// Expands a root with a fresh current path, keeping the shared cache.
    pub fn materialize_root(&mut self, root: &'g str) -> Rc<Artifact> {
        self.path.clear();
        self.materialize(root)
    }

    /// Expands `id` into an artifact.
    ///
    /// - on the current path: a new truncated stub, the cache is left alone;
    /// - already built: the cached artifact;
    /// - otherwise: a fresh artifact whose children are expanded in edge
    ///   order, skipping self-loops.
    pub fn materialize(&mut self, id: &'g str) -> Rc<Artifact> {
        if self.path.contains(id) {
            trace!(module = id, "cycle back-edge truncated");
            return Rc::new(Artifact::truncated(id));
        }
        if let Some(artifact) = self.visited.get(id) {
            return Rc::clone(artifact);
        }

        let graph = self.graph;
        let children = graph.children(id);

        self.path.insert(id);
        let mut dependencies = Vec::with_capacity(children.len());
        for child in children {
            if child == id {
                continue;
            }
            dependencies.push(self.materialize(child.as_str()));
        }
        self.path.remove(id);

        let artifact = Rc::new(Artifact::from_id(id).with_dependencies(dependencies));
        self.visited.insert(id, Rc::clone(&artifact));
        artifact
    }

    /// Number of distinct modules built so far.
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_mod_graph;

    fn names(artifacts: &[Rc<Artifact>]) -> Vec<&str> {
        artifacts.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_empty_graph_fails() {
        let graph = parse_mod_graph("");
        assert_eq!(build_forest(&graph), Err(BuildError::EmptyGraph));

        let graph = parse_mod_graph("only-one-token\n\n  \n");
        assert_eq!(build_forest(&graph), Err(BuildError::EmptyGraph));
    }

    #[test]
    fn test_in_degrees() {
        let graph = parse_mod_graph("A B\nA C\nB D\n");
        let degrees = ForestBuilder::new(&graph).in_degrees();

        assert_eq!(degrees.len(), 4);
        assert_eq!(degrees["A"], 0);
        assert_eq!(degrees["B"], 1);
        assert_eq!(degrees["C"], 1);
        assert_eq!(degrees["D"], 1);
    }

    #[test]
    fn test_single_root_tree() {
        let graph = parse_mod_graph("A B\nA C\nB D\n");
        let forest = build_forest(&graph).unwrap();

        assert_eq!(forest.len(), 1);
        let a = &forest[0];
        assert_eq!(a.name, "A");
        assert_eq!(names(&a.dependencies), ["B", "C"]);
        assert_eq!(names(&a.dependencies[0].dependencies), ["D"]);
        assert!(a.dependencies[1].is_leaf());
        assert!(a.dependencies[0].dependencies[0].is_leaf());
    }

    #[test]
    fn test_self_loop_skipped() {
        let graph = parse_mod_graph("A A\n");
        let mut materializer = Materializer::new(&graph);
        let a = materializer.materialize_root("A");

        assert_eq!(a.name, "A");
        assert!(a.dependencies.is_empty());
        assert!(!a.truncated);
    }

    #[test]
    fn test_self_loop_only_graph_has_no_roots() {
        let graph = parse_mod_graph("A A\n");
        let forest = build_forest(&graph).unwrap();
        assert!(forest.is_empty());
    }

    #[test]
    fn test_cycle_is_truncated() {
        let graph = parse_mod_graph("A B\nB A\n");
        let mut materializer = Materializer::new(&graph);
        let a = materializer.materialize_root("A");

        assert_eq!(names(&a.dependencies), ["B"]);
        let b = &a.dependencies[0];
        assert_eq!(names(&b.dependencies), ["A"]);

        let stub = &b.dependencies[0];
        assert!(stub.truncated);
        assert!(stub.is_leaf());
        assert_eq!(stub.version, a.version);
        // The stub is not cached; only A and B are
        assert_eq!(materializer.visited_count(), 2);
    }

    #[test]
    fn test_cycle_below_root() {
        let graph = parse_mod_graph("root a@v1\na@v1 b@v1\nb@v1 c@v1\nc@v1 a@v1\n");
        let forest = build_forest(&graph).unwrap();

        assert_eq!(names(&forest), ["root"]);
        let a = &forest[0].dependencies[0];
        let c = &a.dependencies[0].dependencies[0];
        assert_eq!(c.name, "c");
        assert_eq!(c.dependencies.len(), 1);
        assert!(c.dependencies[0].truncated);
        assert_eq!(c.dependencies[0].name, "a");
        assert_eq!(c.dependencies[0].version, "v1");
    }

    #[test]
    fn test_cross_edge_shares_subtree() {
        let graph = parse_mod_graph("A X\nB X\nX Y\n");
        let forest = build_forest(&graph).unwrap();

        assert_eq!(names(&forest), ["A", "B"]);
        let via_a = &forest[0].dependencies[0];
        let via_b = &forest[1].dependencies[0];
        assert!(Rc::ptr_eq(via_a, via_b));
        assert_eq!(via_a, via_b);
        assert_eq!(names(&via_a.dependencies), ["Y"]);
    }

    #[test]
    fn test_diamond_within_one_root() {
        let graph = parse_mod_graph("A B\nA C\nB D\nC D\nD E\n");
        let forest = build_forest(&graph).unwrap();

        let a = &forest[0];
        let d_via_b = &a.dependencies[0].dependencies[0];
        let d_via_c = &a.dependencies[1].dependencies[0];
        assert!(Rc::ptr_eq(d_via_b, d_via_c));
        assert_eq!(names(&d_via_c.dependencies), ["E"]);
    }

    #[test]
    fn test_isolated_parents_are_roots() {
        let graph = parse_mod_graph("B D\nA C\n");
        let forest = build_forest(&graph).unwrap();
        assert_eq!(names(&forest), ["A", "B"]);
    }

    #[test]
    fn test_duplicate_edges_expand_twice() {
        let graph = parse_mod_graph("A B\nA B\n");
        let forest = build_forest(&graph).unwrap();
        assert_eq!(names(&forest[0].dependencies), ["B", "B"]);
    }

    #[test]
    fn test_versions_are_distinct_nodes() {
        let graph = parse_mod_graph("app lib@v1\napp lib@v2\n");
        let forest = build_forest(&graph).unwrap();

        let deps = &forest[0].dependencies;
        assert_eq!(names(deps), ["lib", "lib"]);
        assert_eq!(deps[0].version, "v1");
        assert_eq!(deps[1].version, "v2");
    }

    #[test]
    fn test_child_order_follows_input() {
        let graph = parse_mod_graph("A z\nA m\nA b\n");
        let forest = build_forest(&graph).unwrap();
        assert_eq!(names(&forest[0].dependencies), ["z", "m", "b"]);
    }

    #[test]
    fn test_stub_from_second_root_reuses_cached_tree() {
        // R1 -> A -> B -> A (stub). R2 -> B reuses B, stub included.
        let graph = parse_mod_graph("R1 A\nA B\nB A\nR2 B\n");
        let forest = build_forest(&graph).unwrap();

        assert_eq!(names(&forest), ["R1", "R2"]);
        let b_via_r1 = &forest[0].dependencies[0].dependencies[0];
        let b_via_r2 = &forest[1].dependencies[0];
        assert!(Rc::ptr_eq(b_via_r1, b_via_r2));
        assert!(b_via_r2.dependencies[0].truncated);
    }
}
