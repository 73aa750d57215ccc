use std::collections::HashMap;

use tracing::debug;

use super::node::NodeId;
use super::path::normalize;
use super::tree::Tree;

/// Flat canonical path -> node table derived from a [`Tree`].
///
/// Built once after construction; the tree is not mutated afterwards so
/// entries never go stale.
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    entries: HashMap<String, NodeId>,
}

impl PathIndex {
    pub fn build(tree: &Tree) -> Self {
        let mut entries = HashMap::with_capacity(tree.len());
        let mut pending = vec![tree.root()];

        while let Some(id) = pending.pop() {
            entries.insert(tree.full_path(id), id);
            pending.extend(tree.node(id).children());
        }

        debug!("Indexed {} namespace entries", entries.len());
        PathIndex { entries }
    }

    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        self.entries.get(&normalize(path)).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.entries.iter().map(|(path, id)| (path.as_str(), *id))
    }
}
