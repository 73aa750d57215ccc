use snafu::Snafu;
use tracing::{debug, trace};

use super::node::{Node, NodeId};

/// Arena owning every node of the namespace.
///
/// Folders refer to their children by [`NodeId`] and every node keeps a
/// non-owning `parent` id, so upward walks never need shared references.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    pub fn new(mut root: Node) -> Result<Self, TreeError> {
        if !root.is_folder() {
            return Err(TreeError::RootNotFolder {
                name: root.name().to_string(),
            });
        }
        root.parent = None;

        Ok(Tree {
            nodes: vec![root],
            root: NodeId(0),
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes ever allocated, including detached ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// # Panics
    ///
    /// Panics if `id` was handed out by a different tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Attaches `child` under `parent` and returns its id.
    ///
    /// A child with the same name is replaced; the displaced node loses its
    /// parent reference and is no longer reachable from the root.
    pub fn add_child(&mut self, parent: NodeId, mut child: Node) -> Result<NodeId, TreeError> {
        if !is_valid_name(child.name()) {
            return Err(TreeError::InvalidName {
                name: child.name().to_string(),
            });
        }

        let parent_name = match self.nodes.get(parent.0) {
            Some(node) if node.is_folder() => node.name().to_string(),
            Some(node) => {
                return Err(TreeError::NotAFolder {
                    name: node.name().to_string(),
                });
            }
            None => return Err(TreeError::UnknownNode { id: parent }),
        };

        let id = NodeId(self.nodes.len());
        let name = child.name().to_string();
        child.parent = Some(parent);
        self.nodes.push(child);

        let displaced = self.nodes[parent.0]
            .children_mut()
            .and_then(|children| children.replace(name.clone(), id));
        if let Some(old) = displaced {
            debug!("Replacing '{}' in '{}' ({} -> {})", name, parent_name, old, id);
            self.nodes[old.0].parent = None;
        }
        trace!("Attached '{}' as {} under '{}'", name, id, parent_name);

        self.refresh_sizes_from(parent);
        Ok(id)
    }

    /// Walks parent references up to the root. The root itself is `/`.
    pub fn full_path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = id;
        while let Some(parent) = self.nodes[current.0].parent {
            segments.push(self.nodes[current.0].name());
            current = parent;
        }

        if segments.is_empty() {
            return "/".to_string();
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    /// Whether `id` can be reached from the root through ownership edges.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes.get(current.0).and_then(Node::parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn refresh_sizes_from(&mut self, start: NodeId) {
        let mut current = Some(start);
        while let Some(id) = current {
            let node = &mut self.nodes[id.0];
            node.refresh_size();
            current = node.parent;
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/') && !name.contains('\0')
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum TreeError {
    #[snafu(display("The root of a tree must be a folder, '{}' is not", name))]
    RootNotFolder { name: String },
    #[snafu(display("Cannot add a child to '{}', it is not a folder", name))]
    NotAFolder { name: String },
    #[snafu(display("'{}' is not a valid entry name", name))]
    InvalidName { name: String },
    #[snafu(display("Node {} does not belong to this tree", id))]
    UnknownNode { id: NodeId },
}
