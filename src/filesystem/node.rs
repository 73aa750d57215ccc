use derive_more::{Display, IsVariant};
use hashlink::LinkedHashMap;
use snafu::Snafu;

/// Size reported for every folder, the cost of its directory entry table.
pub const FOLDER_SIZE: u64 = 4096;
/// Size reported for files whose seed does not say otherwise.
pub const FILE_SIZE: u64 = 1024;
pub const DEFAULT_LAST_MODIFIED: &str = "Jan 09 19:30";

const FOLDER_PERMISSIONS: &str = "dr--r--r--";
const FILE_PERMISSIONS: &str = "-r--r--r--";
const SYMLINK_PERMISSIONS: &str = "lr--r--r--";

/// Offset of the "other" read bit inside a permission string.
const WORLD_READ_OFFSET: usize = 7;

/// Handle of a node inside a [`Tree`](super::Tree) arena.
///
/// Ids are only handed out by the tree that owns the node, so an id is
/// always valid for that tree. Using it with another tree may panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("#{_0}")]
pub struct NodeId(pub(super) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The closed set of node kinds.
#[derive(Debug, Clone, PartialEq, Eq, IsVariant)]
pub enum NodeKind {
    File,
    Folder {
        children: LinkedHashMap<String, NodeId>,
    },
    Symlink {
        target: String,
    },
}

impl NodeKind {
    pub fn folder() -> Self {
        NodeKind::Folder {
            children: LinkedHashMap::new(),
        }
    }

    pub fn symlink(target: impl Into<String>) -> Self {
        NodeKind::Symlink {
            target: target.into(),
        }
    }

    /// Leading character of a mode string describing this kind.
    pub fn type_flag(&self) -> char {
        match self {
            NodeKind::File => '-',
            NodeKind::Folder { .. } => 'd',
            NodeKind::Symlink { .. } => 'l',
        }
    }

    fn default_permissions(&self) -> Permissions {
        let raw = match self {
            NodeKind::File => FILE_PERMISSIONS,
            NodeKind::Folder { .. } => FOLDER_PERMISSIONS,
            NodeKind::Symlink { .. } => SYMLINK_PERMISSIONS,
        };
        Permissions(raw.to_string())
    }

    fn default_size(&self) -> u64 {
        match self {
            NodeKind::File => FILE_SIZE,
            NodeKind::Folder { .. } => FOLDER_SIZE,
            NodeKind::Symlink { target } => target.len() as u64,
        }
    }
}

/// A 10 character POSIX style mode string such as `drwxr-xr-x`.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{_0}")]
pub struct Permissions(String);

impl Permissions {
    pub fn parse(raw: &str) -> Result<Self, PermissionsError> {
        let chars: Vec<char> = raw.chars().collect();
        if chars.len() != 10 {
            return Err(PermissionsError::Length {
                raw: raw.to_string(),
            });
        }
        if !matches!(chars[0], '-' | 'd' | 'l') {
            return Err(PermissionsError::TypeFlag {
                raw: raw.to_string(),
                flag: chars[0],
            });
        }

        for (offset, &c) in chars.iter().enumerate().skip(1) {
            let valid = match (offset - 1) % 3 {
                0 => matches!(c, 'r' | '-'),
                1 => matches!(c, 'w' | '-'),
                _ => matches!(c, 'x' | '-' | 's' | 'S' | 't' | 'T'),
            };
            if !valid {
                return Err(PermissionsError::Bit {
                    raw: raw.to_string(),
                    offset,
                });
            }
        }

        Ok(Permissions(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn type_flag(&self) -> char {
        self.0.chars().next().unwrap_or('-')
    }

    /// Whether callers outside the owning user and group may read.
    pub fn world_readable(&self) -> bool {
        self.0.as_bytes().get(WORLD_READ_OFFSET) == Some(&b'r')
    }
}

impl TryFrom<&str> for Permissions {
    type Error = PermissionsError;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum PermissionsError {
    #[snafu(display("Permission string '{}' must be exactly 10 characters", raw))]
    Length { raw: String },
    #[snafu(display("Permission string '{}' has unknown type flag '{}'", raw, flag))]
    TypeFlag { raw: String, flag: char },
    #[snafu(display("Permission string '{}' has an invalid bit at offset {}", raw, offset))]
    Bit { raw: String, offset: usize },
}

/// One entry of the namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    kind: NodeKind,
    owner: String,
    group: String,
    permissions: Permissions,
    size: u64,
    last_modified: String,
    pub(super) parent: Option<NodeId>,
}

impl Node {
    pub fn new(
        name: impl Into<String>,
        kind: NodeKind,
        owner: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        Node {
            name: name.into(),
            permissions: kind.default_permissions(),
            size: kind.default_size(),
            kind,
            owner: owner.into(),
            group: group.into(),
            last_modified: DEFAULT_LAST_MODIFIED.to_string(),
            parent: None,
        }
    }

    pub fn file(name: impl Into<String>, owner: impl Into<String>, group: impl Into<String>) -> Self {
        Self::new(name, NodeKind::File, owner, group)
    }

    pub fn folder(
        name: impl Into<String>,
        owner: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        Self::new(name, NodeKind::folder(), owner, group)
    }

    pub fn symlink(
        name: impl Into<String>,
        target: impl Into<String>,
        owner: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        Self::new(name, NodeKind::symlink(target), owner, group)
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Folders always report [`FOLDER_SIZE`], so this is ignored for them.
    pub fn with_size(mut self, size: u64) -> Self {
        if !self.kind.is_folder() {
            self.size = size;
        }
        self
    }

    pub fn with_last_modified(mut self, last_modified: impl Into<String>) -> Self {
        self.last_modified = last_modified.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn last_modified(&self) -> &str {
        &self.last_modified
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    pub fn is_symlink(&self) -> bool {
        self.kind.is_symlink()
    }

    pub fn link_target(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Symlink { target } => Some(target),
            NodeKind::File | NodeKind::Folder { .. } => None,
        }
    }

    pub fn child(&self, name: &str) -> Option<NodeId> {
        match &self.kind {
            NodeKind::Folder { children } => children.get(name).copied(),
            NodeKind::File | NodeKind::Symlink { .. } => None,
        }
    }

    /// Child ids in insertion order; empty for anything but a folder.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        let children = match &self.kind {
            NodeKind::Folder { children } => Some(children.values().copied()),
            NodeKind::File | NodeKind::Symlink { .. } => None,
        };
        children.into_iter().flatten()
    }

    pub(super) fn children_mut(&mut self) -> Option<&mut LinkedHashMap<String, NodeId>> {
        match &mut self.kind {
            NodeKind::Folder { children } => Some(children),
            NodeKind::File | NodeKind::Symlink { .. } => None,
        }
    }

    pub(super) fn refresh_size(&mut self) {
        if self.kind.is_folder() {
            self.size = FOLDER_SIZE;
        }
    }
}
