use colored::Colorize;

use crate::filesystem::{Namespace, Node, NodeId, Resolved};

/// Link count shown in long listings; the namespace has no hard links.
fn link_count(node: &Node) -> u8 {
    if node.is_folder() { 2 } else { 1 }
}

/// One row of `ls` output.
#[derive(Debug, Clone)]
pub struct ListEntry<'a> {
    pub name: String,
    pub node: &'a Node,
    pub resolved: Option<Resolved>,
}

impl<'a> ListEntry<'a> {
    pub fn new(namespace: &'a Namespace, name: impl Into<String>, id: NodeId) -> Self {
        ListEntry {
            name: name.into(),
            node: namespace.node(id),
            resolved: None,
        }
    }

    pub fn with_resolved(mut self, resolved: Resolved) -> Self {
        self.resolved = Some(resolved);
        self
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    fn is_broken(&self) -> bool {
        self.resolved.as_ref().is_some_and(|r| !r.is_terminal())
    }

    fn painted_name(&self, color: bool) -> String {
        if !color {
            return self.name.clone();
        }
        if self.node.is_folder() {
            self.name.blue().bold().to_string()
        } else if self.is_broken() {
            self.name.red().bold().to_string()
        } else if self.node.is_symlink() {
            self.name.cyan().bold().to_string()
        } else {
            self.name.clone()
        }
    }

    fn display_name(&self, color: bool) -> String {
        match self.node.link_target() {
            Some(target) => format!("{} -> {}", self.painted_name(color), target),
            None => self.painted_name(color),
        }
    }
}

pub fn short_format(entries: &[ListEntry], color: bool) -> String {
    entries
        .iter()
        .map(|entry| entry.painted_name(color))
        .collect::<Vec<_>>()
        .join("  ")
}

/// `permissions links owner group size modified name`, with the owner,
/// group and size columns aligned.
pub fn long_format(entries: &[ListEntry], color: bool) -> String {
    let owner_width = entries.iter().map(|e| e.node.owner().len()).max().unwrap_or(0);
    let group_width = entries.iter().map(|e| e.node.group().len()).max().unwrap_or(0);
    let size_width = entries
        .iter()
        .map(|e| e.node.size().to_string().len())
        .max()
        .unwrap_or(0);

    entries
        .iter()
        .map(|entry| {
            let node = entry.node;
            format!(
                "{} {} {:<ow$} {:<gw$} {:>sw$} {} {}",
                node.permissions(),
                link_count(node),
                node.owner(),
                node.group(),
                node.size(),
                node.last_modified(),
                entry.display_name(color),
                ow = owner_width,
                gw = group_width,
                sw = size_width,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::{Permissions, Tree};

    fn namespace() -> Namespace {
        let mut tree = Tree::new(Node::folder("root", "root", "root")).unwrap();
        let root = tree.root();
        tree.add_child(
            root,
            Node::folder("docs", "guest", "guest")
                .with_permissions(Permissions::parse("drwxr-xr-x").unwrap()),
        )
        .unwrap();
        tree.add_child(root, Node::file("a.md", "guest", "staff").with_size(12))
            .unwrap();
        tree.add_child(root, Node::symlink("d", "docs", "root", "root"))
            .unwrap();
        Namespace::new(tree)
    }

    fn entries(namespace: &Namespace) -> Vec<ListEntry<'_>> {
        ["docs", "a.md", "d"]
            .into_iter()
            .map(|name| {
                let id = namespace.lookup(&format!("/{name}")).unwrap();
                ListEntry::new(namespace, name, id)
            })
            .collect()
    }

    #[test]
    fn short_listing_joins_names() {
        let namespace = namespace();
        assert_eq!(short_format(&entries(&namespace), false), "docs  a.md  d");
    }

    #[test]
    fn long_listing_aligns_columns() {
        let namespace = namespace();
        let expected = [
            "drwxr-xr-x 2 guest guest 4096 Jan 09 19:30 docs",
            "-r--r--r-- 1 guest staff   12 Jan 09 19:30 a.md",
            "lr--r--r-- 1 root  root     4 Jan 09 19:30 d -> docs",
        ]
        .join("\n");
        assert_eq!(long_format(&entries(&namespace), false), expected);
    }

    #[test]
    fn hidden_entries_start_with_dot() {
        let namespace = namespace();
        let root = namespace.lookup("/").unwrap();
        assert!(ListEntry::new(&namespace, ".", root).is_hidden());
        assert!(!ListEntry::new(&namespace, "docs", root).is_hidden());
    }

    #[test]
    fn colour_marks_folders() {
        colored::control::set_override(true);
        let namespace = namespace();
        let listing = short_format(&entries(&namespace), true);
        assert_ne!(listing, "docs  a.md  d");
        assert!(listing.contains("a.md"));
    }
}
