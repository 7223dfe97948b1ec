//! Tree data structures for dependency visualization
//!
//! Provides `TreeNode` for hierarchical data and `FlattenedNode`
//! for rendering the tree as a scrollable list in the TUI.
//!
//! Nodes wrap the shared artifacts of a forest and only build their child
//! nodes when first expanded, so a heavily shared module graph does not get
//! copied out in full up front.

use std::rc::Rc;

use crate::tree::Artifact;

/// A node in the dependency tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// The artifact shown at this position
    pub artifact: Rc<Artifact>,
    /// Child nodes, built on first expansion
    children: Option<Vec<TreeNode>>,
    /// Whether this node is expanded in the UI
    pub expanded: bool,
    /// Depth in the tree (0 = root)
    pub depth: usize,
}

impl TreeNode {
    /// Create a new root node
    pub fn new(artifact: Rc<Artifact>) -> Self {
        Self::with_depth(artifact, 0)
    }

    /// Create a new node at the given depth
    pub fn with_depth(artifact: Rc<Artifact>, depth: usize) -> Self {
        Self {
            artifact,
            children: None,
            expanded: false,
            depth,
        }
    }

    /// Create one root node per tree of a forest
    pub fn from_forest(forest: &[Rc<Artifact>]) -> Vec<TreeNode> {
        forest.iter().cloned().map(TreeNode::new).collect()
    }

    /// Child nodes, building them if needed
    pub fn children(&mut self) -> &mut Vec<TreeNode> {
        let artifact = &self.artifact;
        let depth = self.depth;
        self.children.get_or_insert_with(|| {
            artifact
                .dependencies
                .iter()
                .map(|dep| TreeNode::with_depth(Rc::clone(dep), depth + 1))
                .collect()
        })
    }

    /// Toggle the expanded state
    pub fn toggle_expanded(&mut self) {
        if self.has_children() {
            self.expanded = !self.expanded;
        }
    }

    /// Expand this node and everything below it, up to `max_depth`
    pub fn expand_to_depth(&mut self, max_depth: usize) {
        if self.depth >= max_depth || !self.has_children() {
            return;
        }
        self.expanded = true;
        for child in self.children() {
            child.expand_to_depth(max_depth);
        }
    }

    /// Check if this node has children
    pub fn has_children(&self) -> bool {
        !self.artifact.is_leaf()
    }

    /// Flatten the tree into a list for rendering
    ///
    /// Only includes nodes that are visible (i.e., all ancestors are expanded)
    pub fn flatten(&self) -> Vec<FlattenedNode> {
        let mut result = Vec::new();
        self.flatten_recursive(&mut result, true);
        result
    }

    fn flatten_recursive(&self, result: &mut Vec<FlattenedNode>, is_last: bool) {
        result.push(FlattenedNode {
            name: self.artifact.name.clone(),
            version: self.artifact.version.clone(),
            depth: self.depth,
            is_expanded: self.expanded,
            has_children: self.has_children(),
            is_last_child: is_last,
            truncated: self.artifact.truncated,
        });

        if self.expanded {
            if let Some(children) = &self.children {
                let child_count = children.len();
                for (i, child) in children.iter().enumerate() {
                    child.flatten_recursive(result, i == child_count - 1);
                }
            }
        }
    }

    /// Find a node at a given flattened index and toggle its expansion
    ///
    /// Returns true if the toggle was successful
    pub fn toggle_at_index(&mut self, target_index: usize) -> bool {
        let mut current_index = 0;
        self.toggle_at_index_recursive(target_index, &mut current_index)
    }

    fn toggle_at_index_recursive(
        &mut self,
        target_index: usize,
        current_index: &mut usize,
    ) -> bool {
        if *current_index == target_index {
            if self.has_children() {
                self.children();
            }
            self.toggle_expanded();
            return true;
        }
        *current_index += 1;

        if self.expanded {
            for child in self.children() {
                if child.toggle_at_index_recursive(target_index, current_index) {
                    return true;
                }
            }
        }
        false
    }
}

/// Flatten every root of a forest, in order
pub fn flatten_forest(roots: &[TreeNode]) -> Vec<FlattenedNode> {
    let mut result = Vec::new();
    let root_count = roots.len();
    for (i, root) in roots.iter().enumerate() {
        root.flatten_recursive(&mut result, i == root_count - 1);
    }
    result
}

/// Toggle the node at a flattened index across all roots of a forest
pub fn toggle_forest_at_index(roots: &mut [TreeNode], target_index: usize) -> bool {
    let mut current_index = 0;
    roots
        .iter_mut()
        .any(|root| root.toggle_at_index_recursive(target_index, &mut current_index))
}

/// A flattened representation of a tree node for rendering
#[derive(Debug, Clone)]
pub struct FlattenedNode {
    /// Module name
    pub name: String,
    /// Module version
    pub version: String,
    /// Depth in the tree
    pub depth: usize,
    /// Whether this node is currently expanded
    pub is_expanded: bool,
    /// Whether this node has children
    pub has_children: bool,
    /// Whether this is the last child of its parent
    pub is_last_child: bool,
    /// Whether this node is a cycle stub
    pub truncated: bool,
}

impl FlattenedNode {
    /// Get the expansion indicator character
    pub fn expansion_indicator(&self) -> &'static str {
        if !self.has_children {
            "  "
        } else if self.is_expanded {
            "▼ "
        } else {
            "▶ "
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_mod_graph;
    use crate::tree::build_forest;

    fn create_test_tree() -> TreeNode {
        let forest =
            build_forest(&parse_mod_graph("project dep-a@v2\nproject dep-b@v3\ndep-a@v2 sub-1@v0.1\ndep-a@v2 sub-2@v0.2\n"))
                .unwrap();
        TreeNode::new(Rc::clone(&forest[0]))
    }

    #[test]
    fn test_tree_node_creation() {
        let node = TreeNode::new(Rc::new(Artifact::new("test", "v1.0.0")));
        assert_eq!(node.artifact.name, "test");
        assert_eq!(node.artifact.version, "v1.0.0");
        assert!(!node.expanded);
        assert_eq!(node.depth, 0);
        assert!(!node.has_children());
    }

    #[test]
    fn test_children_are_built_with_depth() {
        let mut root = create_test_tree();
        let children = root.children();

        assert_eq!(children.len(), 2);
        assert_eq!(children[0].depth, 1);
        assert_eq!(children[0].artifact.name, "dep-a");
    }

    #[test]
    fn test_flatten_collapsed() {
        let root = create_test_tree();
        let flattened = root.flatten();

        // Only root should be visible when collapsed
        assert_eq!(flattened.len(), 1);
        assert_eq!(flattened[0].name, "project");
    }

    #[test]
    fn test_flatten_expanded() {
        let mut root = create_test_tree();
        assert!(root.toggle_at_index(0));
        let flattened = root.flatten();

        // Root + 2 children should be visible
        assert_eq!(flattened.len(), 3);
        assert_eq!(flattened[1].name, "dep-a");
        assert_eq!(flattened[2].name, "dep-b");
        assert!(flattened[2].is_last_child);
    }

    #[test]
    fn test_flatten_fully_expanded() {
        let mut root = create_test_tree();
        root.expand_to_depth(usize::MAX);
        let flattened = root.flatten();

        // All nodes should be visible
        assert_eq!(flattened.len(), 5);
        assert_eq!(flattened[2].name, "sub-1");
        assert_eq!(flattened[2].depth, 2);
    }

    #[test]
    fn test_toggle_at_index() {
        let mut root = create_test_tree();
        root.toggle_at_index(0);

        // Toggle dep-a (index 1)
        assert!(root.toggle_at_index(1));
        assert!(root.children()[0].expanded);

        // Toggle again
        assert!(root.toggle_at_index(1));
        assert!(!root.children()[0].expanded);

        // Out of range
        assert!(!root.toggle_at_index(42));
    }

    #[test]
    fn test_forest_helpers() {
        let forest = build_forest(&parse_mod_graph("a x\nb y\n")).unwrap();
        let mut roots = TreeNode::from_forest(&forest);

        let flattened = flatten_forest(&roots);
        assert_eq!(flattened.len(), 2);
        assert!(!flattened[0].is_last_child);
        assert!(flattened[1].is_last_child);

        assert!(toggle_forest_at_index(&mut roots, 1));
        let flattened = flatten_forest(&roots);
        assert_eq!(flattened.len(), 3);
        assert_eq!(flattened[2].name, "y");
    }

    #[test]
    fn test_truncated_flag_is_flattened() {
        let forest = build_forest(&parse_mod_graph("root a\na b\nb a\n")).unwrap();
        let mut root = TreeNode::new(Rc::clone(&forest[0]));
        root.expand_to_depth(usize::MAX);

        let flattened = root.flatten();
        let stub = flattened.last().unwrap();
        assert_eq!(stub.name, "a");
        assert!(stub.truncated);
        assert!(!stub.has_children);
    }

    #[test]
    fn test_expansion_indicator() {
        let node_with_children = FlattenedNode {
            name: "test".to_string(),
            version: "v1.0.0".to_string(),
            depth: 0,
            is_expanded: false,
            has_children: true,
            is_last_child: false,
            truncated: false,
        };
        assert_eq!(node_with_children.expansion_indicator(), "▶ ");

        let expanded_node = FlattenedNode {
            is_expanded: true,
            ..node_with_children.clone()
        };
        assert_eq!(expanded_node.expansion_indicator(), "▼ ");

        let leaf_node = FlattenedNode {
            has_children: false,
            ..node_with_children
        };
        assert_eq!(leaf_node.expansion_indicator(), "  ");
    }
}
