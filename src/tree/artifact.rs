//! The artifact tree produced for each root module.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::parser::split_module_version;

/// A module in the dependency forest together with its expanded subtree.
///
/// Children are reference counted: a module reached from several parents is
/// built once and shared by all of them. Artifacts are never mutated after
/// construction.
///
/// Serializes to `{"name", "version", "dependencies"}`, with `dependencies`
/// omitted for leaves and `"truncated": true` added on cycle stubs.
///
/// # Example
///
/// ```
/// use dtree::tree::Artifact;
///
/// let artifact = Artifact::from_id("golang.org/x/text@v0.14.0");
/// assert_eq!(artifact.name, "golang.org/x/text");
/// assert_eq!(artifact.version, "v0.14.0");
/// assert!(artifact.is_leaf());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Module path without the version suffix
    pub name: String,
    /// Version suffix, empty for the main module
    pub version: String,
    /// Expanded dependencies in input edge order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Rc<Artifact>>,
    /// Set on the stub emitted for an edge back into an ancestor
    #[serde(default, skip_serializing_if = "is_false")]
    pub truncated: bool,
}

impl Artifact {
    /// Creates a leaf artifact.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            dependencies: Vec::new(),
            truncated: false,
        }
    }

    /// Creates a leaf artifact from a node identifier such as `mod@v1.2.3`.
    pub fn from_id(id: &str) -> Self {
        let (name, version) = split_module_version(id);
        Self::new(name, version)
    }

    /// Creates the stub that stands in for a cycle back-edge.
    pub fn truncated(id: &str) -> Self {
        Self {
            truncated: true,
            ..Self::from_id(id)
        }
    }

    /// Attaches dependencies, replacing any existing ones.
    pub fn with_dependencies(mut self, dependencies: Vec<Rc<Artifact>>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Returns true if the artifact has no dependencies.
    pub fn is_leaf(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Reassembles the node identifier (`name@version`, or `name` when unversioned).
    pub fn id(&self) -> String {
        if self.version.is_empty() {
            self.name.clone()
        } else {
            format!("{}@{}", self.name, self.version)
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}
