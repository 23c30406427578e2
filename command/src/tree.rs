//! Frozen command trees.
//!
//! [`CommandTree::new`] flattens a nested [`Command`] into an arena where
//! every node knows its parent by index and its children by name and alias.
//! Construction validates the structure the same way for every level:
//! child names must be non-empty and unique among their siblings.
//!
//! # Examples
//!
//! ```
//! use cmdtree::{Command, CommandTree, TreeError};
//!
//! let tree = CommandTree::new(
//!     Command::new("app").subcommand(Command::new("math").subcommand(Command::new("sum"))),
//! )
//! .unwrap();
//! let sum = tree.find(&["math", "sum"]).unwrap();
//! assert_eq!(tree.path(sum), vec!["app", "math", "sum"]);
//!
//! let err = CommandTree::new(
//!     Command::new("app")
//!         .subcommand(Command::new("list"))
//!         .subcommand(Command::new("show").alias("list")),
//! )
//! .unwrap_err();
//! assert!(matches!(err, TreeError::DuplicateSubcommand { .. }));
//! ```

use std::collections::{BTreeSet, HashMap};

use tracing::trace;

use crate::command::Command;
use crate::error::TreeError;

/// Index of a node in a [`CommandTree`].
pub type NodeId = usize;

/// The root node always has this id.
pub const ROOT: NodeId = 0;

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) command: Command,
    pub(crate) parent: Option<NodeId>,
    /// Name and every alias map to the same child.
    pub(crate) children: HashMap<String, NodeId>,
    /// Children in registration order.
    pub(crate) order: Vec<NodeId>,
}

/// An immutable command hierarchy ready for dispatch.
#[derive(Debug)]
pub struct CommandTree {
    pub(crate) nodes: Vec<Node>,
}

impl CommandTree {
    /// Freezes `root` and all of its descendants.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyName`] for a blank child name or alias, and
    /// [`TreeError::DuplicateSubcommand`] when two siblings share a name or
    /// alias.
    pub fn new(root: Command) -> Result<Self, TreeError> {
        let mut tree = Self { nodes: Vec::new() };
        tree.insert(root, None)?;
        Ok(tree)
    }

    fn insert(
        &mut self,
        mut command: Command,
        parent: Option<NodeId>,
    ) -> Result<NodeId, TreeError> {
        let children = std::mem::take(&mut command.children);
        let id = self.nodes.len();
        self.nodes.push(Node {
            command,
            parent,
            children: HashMap::new(),
            order: Vec::new(),
        });

        for child in children {
            let names: BTreeSet<String> = std::iter::once(child.name().to_string())
                .chain(child.aliases().iter().cloned())
                .collect();

            for name in &names {
                if name.trim().is_empty() {
                    return Err(TreeError::EmptyName {
                        parent: self.display_path(id),
                    });
                }
                if self.nodes[id].children.contains_key(name) {
                    return Err(TreeError::DuplicateSubcommand {
                        parent: self.display_path(id),
                        name: name.clone(),
                    });
                }
            }

            let child_id = self.insert(child, Some(id))?;
            trace!(parent = id, child = child_id, names = ?names, "Registered subcommand");
            let node = &mut self.nodes[id];
            for name in names {
                node.children.insert(name, child_id);
            }
            node.order.push(child_id);
        }

        Ok(id)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// The command stored at `id`. Its children live in the tree, not in
    /// the returned command.
    pub fn command(&self, id: NodeId) -> &Command {
        &self.nodes[id].command
    }

    pub fn root(&self) -> &Command {
        self.command(ROOT)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    /// Child of `id` routed to by `name` (a name or an alias).
    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[id].children.get(name).copied()
    }

    /// Children of `id` in registration order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].order
    }

    /// Follows routing names from the root.
    pub fn find(&self, path: &[&str]) -> Option<NodeId> {
        path.iter().try_fold(ROOT, |id, name| self.child(id, name))
    }

    /// Routing names from the root to `id`.
    pub fn path(&self, id: NodeId) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            path.push(self.nodes[node].command.name().to_string());
            current = self.nodes[node].parent;
        }
        path.reverse();
        path
    }

    pub(crate) fn display_path(&self, id: NodeId) -> String {
        self.path(id).join(" ")
    }

    /// Version of `id`: the nearest non-empty version walking toward the
    /// root.
    pub fn version(&self, id: NodeId) -> Option<&str> {
        let mut current = Some(id);
        while let Some(node) = current {
            let version = self.nodes[node].command.version.as_str();
            if !version.is_empty() {
                return Some(version);
            }
            current = self.nodes[node].parent;
        }
        None
    }

    /// Ancestors of `id` from the root down, including `id` itself.
    pub fn lineage(&self, id: NodeId) -> Vec<NodeId> {
        let mut lineage = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            lineage.push(node);
            current = self.nodes[node].parent;
        }
        lineage.reverse();
        lineage
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CommandTree {
        CommandTree::new(
            Command::new("root").version("1.0.0").subcommand(
                Command::new("math")
                    .alias("m")
                    .subcommand(Command::new("sum").version("2.0.0"))
                    .subcommand(Command::new("mult").alias("x")),
            ),
        )
        .unwrap()
    }

    #[test]
    fn test_aliases_route_to_same_child() {
        let tree = sample();
        assert_eq!(tree.find(&["math", "mult"]), tree.find(&["m", "x"]));
        assert!(tree.find(&["math", "div"]).is_none());
    }

    #[test]
    fn test_parent_links() {
        let tree = sample();
        let mult = tree.find(&["math", "mult"]).unwrap();
        let math = tree.parent(mult).unwrap();
        assert_eq!(tree.command(math).name(), "math");
        assert_eq!(tree.parent(math), Some(ROOT));
        assert_eq!(tree.parent(ROOT), None);
        assert_eq!(tree.root().name(), "root");
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.lineage(mult), vec![ROOT, math, mult]);
    }

    #[test]
    fn test_nearest_version_wins() {
        let tree = sample();
        assert_eq!(tree.version(tree.find(&["math", "sum"]).unwrap()), Some("2.0.0"));
        assert_eq!(tree.version(tree.find(&["math", "mult"]).unwrap()), Some("1.0.0"));

        let bare = CommandTree::new(Command::new("bare")).unwrap();
        assert_eq!(bare.version(ROOT), None);
    }

    #[test]
    fn test_children_keep_registration_order() {
        let tree = sample();
        let math = tree.find(&["math"]).unwrap();
        let names: Vec<_> = tree
            .children(math)
            .iter()
            .map(|id| tree.command(*id).name())
            .collect();
        assert_eq!(names, vec!["sum", "mult"]);
    }

    #[test]
    fn test_duplicate_name_fails() {
        let err = CommandTree::new(
            Command::new("root")
                .subcommand(Command::new("a"))
                .subcommand(Command::new("a")),
        )
        .unwrap_err();
        assert_eq!(
            err,
            TreeError::DuplicateSubcommand {
                parent: "root".to_string(),
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn test_alias_matching_own_name_is_allowed() {
        let tree = CommandTree::new(Command::new("root").subcommand(Command::new("a").alias("a")));
        assert!(tree.is_ok());
    }

    #[test]
    fn test_empty_child_name_fails() {
        let err = CommandTree::new(Command::new("root").subcommand(Command::new(""))).unwrap_err();
        assert!(matches!(err, TreeError::EmptyName { .. }));
    }
}
