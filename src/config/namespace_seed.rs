use std::{borrow::Cow, path::Path};

use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, warn};

use crate::filesystem::{
    DEFAULT_LAST_MODIFIED, Namespace, Node, NodeId, NodeKind, Permissions, PermissionsError,
    Tree, TreeError,
};

const BUILTIN_SEED: &str = include_str!("../../seed/namespace.yaml");
const DEFAULT_OWNER: &str = "guest";

type Mapping<'a> = LinkedHashMap<Yaml<'a>, Yaml<'a>>;

fn key(name: &'static str) -> Yaml<'static> {
    Yaml::Value(Scalar::String(Cow::Borrowed(name)))
}

fn str_field<'m>(entry: &'m Mapping, name: &'static str) -> Option<&'m str> {
    entry.get(&key(name)).and_then(|value| value.as_str())
}

fn join(parent_path: &str, name: &str) -> String {
    if parent_path == "/" {
        format!("/{name}")
    } else {
        format!("{parent_path}/{name}")
    }
}

/// Values used for any entry that does not set them itself.
#[derive(Debug, Clone)]
struct Defaults {
    owner: String,
    group: String,
    modified: String,
}

impl Defaults {
    fn from_yaml(section: Option<&Mapping>) -> Self {
        let field = |name, fallback: &str| {
            section
                .and_then(|section| str_field(section, name))
                .unwrap_or(fallback)
                .to_string()
        };

        Defaults {
            owner: field("owner", DEFAULT_OWNER),
            group: field("group", DEFAULT_OWNER),
            modified: field("modified", DEFAULT_LAST_MODIFIED),
        }
    }
}

/// A namespace tree built from a YAML seed description.
#[derive(Debug, Clone)]
pub struct NamespaceSeed {
    tree: Tree,
}

impl NamespaceSeed {
    /// The seed bundled with the crate.
    pub fn builtin() -> Result<Self, SeedError> {
        BUILTIN_SEED.try_into()
    }

    pub async fn from_path(path: &Path) -> Result<Self, SeedError> {
        debug!("Reading seed file: {}", path.display());
        let bytes = compio::fs::read(path).await.context(ReadSnafu {
            file_path: path.display().to_string(),
        })?;
        debug!("Successfully read seed file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.display().to_string(),
        })?;
        contents.as_str().try_into()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    pub fn into_namespace(self) -> Namespace {
        Namespace::new(self.tree)
    }

    /// Builds the node for one entry. `Ok(None)` means the entry is invalid
    /// but not fatal and should be skipped.
    fn node_from_entry(
        name: &str,
        entry: Option<&Mapping>,
        defaults: &Defaults,
        path: &str,
    ) -> Result<Option<Node>, SeedError> {
        let Some(entry) = entry else {
            return Ok(Some(Self::with_defaults(
                Node::new(name, NodeKind::File, &defaults.owner, &defaults.group),
                defaults,
            )));
        };

        let link = str_field(entry, "link");
        let kind = match str_field(entry, "type") {
            Some("file") => NodeKind::File,
            Some("folder") => NodeKind::folder(),
            Some("symlink") => match link {
                Some(target) => NodeKind::symlink(target),
                None => {
                    warn!("Symlink '{}' has no link target. Skipping.", path);
                    return Ok(None);
                }
            },
            Some(other) => {
                warn!("Unknown entry type for '{}': {}. Skipping.", path, other);
                return Ok(None);
            }
            None => match link {
                Some(target) => NodeKind::symlink(target),
                None if entry.contains_key(&key("children")) => NodeKind::folder(),
                None => NodeKind::File,
            },
        };

        let owner = str_field(entry, "owner").unwrap_or(&defaults.owner);
        let group = str_field(entry, "group").unwrap_or(&defaults.group);
        let mut node = Self::with_defaults(Node::new(name, kind, owner, group), defaults);

        if let Some(raw) = str_field(entry, "permissions") {
            let permissions = Permissions::parse(raw).context(InvalidPermissionsSnafu { path })?;
            let expected = node.kind().type_flag();
            ensure!(
                permissions.type_flag() == expected,
                PermissionsKindMismatchSnafu {
                    path,
                    flag: permissions.type_flag(),
                    expected,
                }
            );
            node = node.with_permissions(permissions);
        }
        if let Some(modified) = str_field(entry, "modified") {
            node = node.with_last_modified(modified);
        }
        match entry.get(&key("size")) {
            Some(Yaml::Value(Scalar::Integer(size))) if *size >= 0 => {
                node = node.with_size(*size as u64);
            }
            Some(other) => warn!("Ignoring invalid size for '{}': {:?}", path, other),
            None => {}
        }

        Ok(Some(node))
    }

    fn with_defaults(node: Node, defaults: &Defaults) -> Node {
        node.with_last_modified(&defaults.modified)
    }

    fn attach_children(
        tree: &mut Tree,
        parent: NodeId,
        parent_entry: &Mapping,
        defaults: &Defaults,
        parent_path: &str,
    ) -> Result<(), SeedError> {
        let Some(children) = parent_entry.get(&key("children")) else {
            return Ok(());
        };
        if matches!(children, Yaml::Value(Scalar::Null)) {
            return Ok(());
        }
        let children = children.as_mapping().context(ChildrenNotMapSnafu {
            path: parent_path,
        })?;

        for (name, value) in children {
            let Yaml::Value(Scalar::String(name)) = name else {
                warn!("Skipping non-string entry name in '{}': {:?}", parent_path, name);
                continue;
            };
            let path = join(parent_path, name);

            let entry = match value {
                Yaml::Mapping(entry) => Some(entry),
                Yaml::Value(Scalar::Null) => None,
                _ => {
                    debug!("Skipping invalid entry '{}': {:?}", path, value);
                    continue;
                }
            };

            let Some(node) = Self::node_from_entry(name, entry, defaults, &path)? else {
                continue;
            };
            let id = match tree.add_child(parent, node) {
                Ok(id) => id,
                Err(TreeError::InvalidName { name }) => {
                    warn!("Skipping entry with invalid name '{}' in '{}'", name, parent_path);
                    continue;
                }
                Err(source) => return Err(SeedError::BuildError { path, source }),
            };

            if let Some(entry) = entry {
                if tree.node(id).is_folder() {
                    Self::attach_children(tree, id, entry, defaults, &path)?;
                }
            }
        }

        Ok(())
    }
}

impl TryFrom<&str> for NamespaceSeed {
    type Error = SeedError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let document = documents.first().context(MalformedSeedSnafu)?;
        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;

        let defaults = Defaults::from_yaml(
            top_level
                .get(&key("defaults"))
                .and_then(|section| section.as_mapping()),
        );
        let root_entry = top_level
            .get(&key("root"))
            .and_then(|root| root.as_mapping())
            .context(MissingRootSnafu)?;

        let root = Self::node_from_entry("root", Some(root_entry), &defaults, "/")?
            .context(MissingRootSnafu)?;
        let mut tree = Tree::new(root).context(BuildSnafu { path: "/" })?;
        let root_id = tree.root();
        Self::attach_children(&mut tree, root_id, root_entry, &defaults, "/")?;

        debug!("Built namespace tree with {} nodes", tree.len());
        Ok(NamespaceSeed { tree })
    }
}

#[derive(Debug, Snafu)]
pub enum SeedError {
    #[snafu(display("Failed to read the seed file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Seed file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the seed description"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted seed description"))]
    MalformedSeed,
    #[snafu(display("Top level of the seed description should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Seed description has no usable 'root' entry"))]
    MissingRoot,
    #[snafu(display("Children of '{}' should be a map", path))]
    ChildrenNotMap { path: String },
    #[snafu(display("Invalid permissions for '{}'", path))]
    InvalidPermissions {
        path: String,
        source: PermissionsError,
    },
    #[snafu(display(
        "Permissions of '{}' start with '{}' but the entry needs '{}'",
        path,
        flag,
        expected
    ))]
    PermissionsKindMismatch {
        path: String,
        flag: char,
        expected: char,
    },
    #[snafu(display("Failed to attach '{}'", path))]
    BuildError { path: String, source: TreeError },
}
