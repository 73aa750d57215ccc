//! In-memory namespace engine.
//!
//! Nodes live in an arena ([`Tree`]) and refer to their parent by id. Once
//! a tree is complete it is handed to [`Namespace`], which indexes every
//! path and answers lookups, listings and link resolution without further
//! mutation.

mod index;
mod namespace;
mod node;
pub mod path;
mod symlink;
mod tree;

pub use index::PathIndex;
pub use namespace::{Child, EntryIcon, Namespace, NamespaceError};
pub use node::{
    DEFAULT_LAST_MODIFIED, FILE_SIZE, FOLDER_SIZE, Node, NodeId, NodeKind, Permissions,
    PermissionsError,
};
pub use symlink::{LinkStatus, Resolved, SymlinkResolver};
pub use tree::{Tree, TreeError};
