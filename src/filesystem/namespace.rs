use derive_more::Display;
use snafu::{OptionExt, Snafu};
use tracing::trace;

use super::index::PathIndex;
use super::node::{Node, NodeId};
use super::path;
use super::symlink::{Resolved, SymlinkResolver};
use super::tree::Tree;
use crate::config::{NamespaceSeed, SeedError};

/// Icon a front end shows for an entry, decided on the resolved node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EntryIcon {
    #[display("folder")]
    Folder,
    #[display("markdown")]
    Markdown,
    #[display("file")]
    File,
    /// A link whose chain is broken or circular.
    #[display("broken-link")]
    BrokenLink,
}

/// A folder entry, already followed through any links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub id: NodeId,
    /// The entry's own name, even when it is a link.
    pub name: String,
    pub resolved: Resolved,
    pub icon: EntryIcon,
}

/// Read-only view over a constructed namespace. The only entry point the
/// shell, browser and desktop use.
#[derive(Debug, Clone)]
pub struct Namespace {
    tree: Tree,
    index: PathIndex,
}

impl Namespace {
    /// Takes ownership of a fully built tree and indexes it.
    pub fn new(tree: Tree) -> Self {
        let index = PathIndex::build(&tree);
        Namespace { tree, index }
    }

    /// The namespace described by the seed bundled with the crate.
    pub fn builtin() -> Result<Self, SeedError> {
        Ok(NamespaceSeed::builtin()?.into_namespace())
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn index(&self) -> &PathIndex {
        &self.index
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.tree.node(id)
    }

    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        self.index.lookup(path)
    }

    /// Like [`lookup`](Self::lookup), but also follows links met in
    /// intermediate components, so `/bin/ls` finds `/usr/bin/ls` when
    /// `/bin` links to `/usr/bin`. The last component is not followed.
    pub fn locate(&self, path: &str) -> Option<NodeId> {
        let canonical = path::normalize(path);
        if let Some(id) = self.index.lookup(&canonical) {
            return Some(id);
        }

        let segments = path::segments(&canonical);
        let mut current = self.tree.root();
        for (position, segment) in segments.iter().enumerate() {
            let child = self.tree.node(current).child(segment)?;
            if position + 1 == segments.len() {
                return Some(child);
            }

            let resolved = self.resolve(child, &self.tree.full_path(current));
            if !resolved.is_terminal() {
                trace!("Walk of {} stopped at {}", canonical, resolved.path);
                return None;
            }
            current = resolved.node;
        }

        Some(current)
    }

    pub fn full_path(&self, id: NodeId) -> String {
        self.tree.full_path(id)
    }

    pub fn resolve(&self, id: NodeId, base_path: &str) -> Resolved {
        SymlinkResolver::new(&self.tree, &self.index).resolve(id, base_path)
    }

    /// Locates `path` and follows it, relative links being taken from the
    /// folder that holds the entry.
    pub fn resolve_path(&self, path: &str) -> Result<Resolved, NamespaceError> {
        let canonical = path::normalize(path);
        let id = self
            .locate(&canonical)
            .context(NoSuchPathSnafu { path: &canonical })?;
        Ok(self.resolve(id, &self.link_base(id)))
    }

    pub fn children_of(&self, path: &str) -> Result<Vec<Child>, NamespaceError> {
        let canonical = path::normalize(path);
        let resolved = self.resolve_path(&canonical)?;
        let folder = self.node(resolved.node);
        if !resolved.is_terminal() || !folder.is_folder() {
            return Err(NamespaceError::NotAFolder { path: canonical });
        }

        let base = self.full_path(resolved.node);
        let children = folder
            .children()
            .map(|id| {
                let resolved = self.resolve(id, &base);
                Child {
                    id,
                    name: self.node(id).name().to_string(),
                    icon: self.icon_for(&resolved),
                    resolved,
                }
            })
            .collect();

        Ok(children)
    }

    /// Checks the "other" read bit of the entry at `path`.
    ///
    /// The namespace models one unauthenticated guest session, so owner and
    /// group never grant access: even the guest's own folders are checked
    /// against the world bit. Missing paths are not readable.
    pub fn has_world_read(&self, path: &str) -> bool {
        self.locate(path)
            .is_some_and(|id| self.node(id).permissions().world_readable())
    }

    /// World-read check for entering what `path` names: both the entry
    /// itself and the node it resolved to must be readable, so a readable
    /// link does not expose a private target.
    pub fn can_read(&self, path: &str, resolved: &Resolved) -> bool {
        self.has_world_read(path) && self.node(resolved.node).permissions().world_readable()
    }

    pub fn check_access(&self, path: &str) -> Result<NodeId, NamespaceError> {
        let canonical = path::normalize(path);
        let id = self
            .locate(&canonical)
            .context(NoSuchPathSnafu { path: &canonical })?;
        if !self.node(id).permissions().world_readable() {
            return Err(NamespaceError::PermissionDenied { path: canonical });
        }
        Ok(id)
    }

    pub fn icon_for(&self, resolved: &Resolved) -> EntryIcon {
        if !resolved.is_terminal() {
            return EntryIcon::BrokenLink;
        }
        let node = self.node(resolved.node);
        if node.is_folder() {
            EntryIcon::Folder
        } else if node.name().ends_with(".md") {
            EntryIcon::Markdown
        } else {
            EntryIcon::File
        }
    }

    fn link_base(&self, id: NodeId) -> String {
        path::parent_of(&self.full_path(id))
    }
}

impl From<Tree> for Namespace {
    fn from(tree: Tree) -> Self {
        Namespace::new(tree)
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum NamespaceError {
    #[snafu(display("{}: No such file or directory", path))]
    NoSuchPath { path: String },
    #[snafu(display("{}: Not a directory", path))]
    NotAFolder { path: String },
    #[snafu(display("{}: Permission denied", path))]
    PermissionDenied { path: String },
}
