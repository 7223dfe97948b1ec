//! Module graph implementation using petgraph.
//!
//! Provides a directed graph view over a parsed [`ModGraph`] for summary
//! statistics and cycle reporting.

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::parser::ModGraph;

/// A directed graph of module requirements.
///
/// Edges point from the requiring module to the required one. Unlike the
/// adjacency mapping, every module has a node here, including modules that
/// only ever appear as a child.
///
/// # Example
///
/// ```rust
/// use dtree::graph::ModuleGraph;
/// use dtree::parser::parse_mod_graph;
///
/// let graph = ModuleGraph::from_mod_graph(&parse_mod_graph("app a@v1\napp b@v1\na@v1 b@v1\n"));
///
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 3);
/// assert!(!graph.has_cycles());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    /// The underlying directed graph, weighted by module identifier
    graph: DiGraph<String, ()>,
    /// Maps identifiers to their node indices for O(1) lookup
    node_indices: HashMap<String, NodeIndex>,
}

impl ModuleGraph {
    /// Builds the graph view of an adjacency mapping.
    ///
    /// Duplicate edges in the mapping become parallel edges.
    pub fn from_mod_graph(mod_graph: &ModGraph) -> Self {
        let mut graph = Self {
            graph: DiGraph::with_capacity(mod_graph.len(), mod_graph.edge_count()),
            node_indices: HashMap::with_capacity(mod_graph.len()),
        };

        for (parent, children) in mod_graph.iter() {
            let from = graph.add_module(parent);
            for child in children {
                let to = graph.add_module(child);
                graph.graph.add_edge(from, to, ());
            }
        }

        graph
    }

    fn add_module(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(id) {
            return idx;
        }

        let idx = self.graph.add_node(id.to_string());
        self.node_indices.insert(id.to_string(), idx);
        idx
    }

    /// Checks if the graph contains cycles, self-loops included.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Returns one entry per circular group of modules.
    ///
    /// Each strongly connected component with more than one module is
    /// reported; a single module only if it requires itself. The reported
    /// path is a shortest cycle through the component's smallest member,
    /// following real edges, so large components list more members than
    /// the path visits.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dtree::graph::ModuleGraph;
    /// use dtree::parser::parse_mod_graph;
    ///
    /// let graph = ModuleGraph::from_mod_graph(&parse_mod_graph("a c\nc b\nb a\n"));
    ///
    /// let cycles = graph.cycle_details();
    /// assert_eq!(cycles.len(), 1);
    /// assert_eq!(cycles[0].cycle_path(), "a -> c -> b -> a");
    /// ```
    pub fn cycle_details(&self) -> Vec<CycleInfo> {
        let mut cycles = Vec::new();

        for scc in tarjan_scc(&self.graph) {
            if scc.len() == 1 && !self.graph.contains_edge(scc[0], scc[0]) {
                continue;
            }
            let Some(&start) = scc.iter().min_by_key(|&&idx| &self.graph[idx]) else {
                continue;
            };

            let members: HashSet<NodeIndex> = scc.iter().copied().collect();
            let mut ids: Vec<String> = scc.iter().map(|&idx| self.graph[idx].clone()).collect();
            ids.sort_unstable();

            cycles.push(CycleInfo {
                nodes: self.shortest_cycle(start, &members),
                members: ids,
            });
        }

        cycles.sort_by(|a, b| a.nodes.cmp(&b.nodes));
        cycles
    }

    /// Breadth-first search from `start` back to itself, staying inside `members`.
    fn shortest_cycle(&self, start: NodeIndex, members: &HashSet<NodeIndex>) -> Vec<String> {
        let mut previous: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            for next in self.sorted_successors(current) {
                if next == start {
                    let mut path = vec![current];
                    let mut at = current;
                    while at != start {
                        match previous.get(&at) {
                            Some(&prev) => at = prev,
                            None => break,
                        }
                        path.push(at);
                    }
                    path.reverse();
                    return path.into_iter().map(|idx| self.graph[idx].clone()).collect();
                }
                if members.contains(&next) && !previous.contains_key(&next) {
                    previous.insert(next, current);
                    queue.push_back(next);
                }
            }
        }

        Vec::new()
    }

    fn sorted_successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut next: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        next.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        next.dedup();
        next
    }

    /// Returns the number of modules.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges, duplicates included.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Information about a detected dependency cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleInfo {
    /// A closed walk along real edges, starting at the smallest member
    pub nodes: Vec<String>,
    /// Every module of the strongly connected component, sorted
    pub members: Vec<String>,
}

impl CycleInfo {
    /// Returns a formatted representation, e.g. `"a -> b -> a"`.
    pub fn cycle_path(&self) -> String {
        let Some(first) = self.nodes.first() else {
            return String::new();
        };
        format!("{} -> {}", self.nodes.join(" -> "), first)
    }

    /// Returns true if the component has modules the path does not visit.
    pub fn has_more_members(&self) -> bool {
        self.members.len() > self.nodes.len()
    }
}
