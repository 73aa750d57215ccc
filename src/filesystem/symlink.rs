use std::collections::HashSet;

use derive_more::IsVariant;
use tracing::{debug, trace};

use super::index::PathIndex;
use super::node::{NodeId, NodeKind};
use super::path;
use super::tree::Tree;

/// How a resolution chain ended.
#[derive(Debug, Clone, PartialEq, Eq, IsVariant)]
pub enum LinkStatus {
    /// Reached a file or folder.
    Terminal,
    /// A hop pointed at a path that does not exist.
    Broken { target: String },
    /// A link was met twice in the same chain.
    Circular,
}

/// Outcome of following a node through zero or more links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The terminal node, or a symlink when the chain did not complete.
    pub node: NodeId,
    /// Canonical path of `node`, as it was reached.
    pub path: String,
    pub status: LinkStatus,
}

impl Resolved {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

pub struct SymlinkResolver<'a> {
    tree: &'a Tree,
    index: &'a PathIndex,
}

impl<'a> SymlinkResolver<'a> {
    pub fn new(tree: &'a Tree, index: &'a PathIndex) -> Self {
        Self { tree, index }
    }

    /// Follows `start` until a non-link node is reached.
    ///
    /// `base_path` is the folder `start` was reached from; relative targets
    /// are taken from there. A cycle yields `start` itself, a missing
    /// target yields the last link that was reached.
    pub fn resolve(&self, start: NodeId, base_path: &str) -> Resolved {
        let mut current = start;
        let mut current_path = self.tree.full_path(start);
        let mut base = path::normalize(base_path);
        let mut visited = HashSet::new();

        loop {
            let target = match self.tree.node(current).kind() {
                NodeKind::File | NodeKind::Folder { .. } => {
                    return Resolved {
                        node: current,
                        path: current_path,
                        status: LinkStatus::Terminal,
                    };
                }
                NodeKind::Symlink { target } => target,
            };

            if !visited.insert(current) {
                debug!("Circular link chain starting at {}", self.tree.full_path(start));
                return Resolved {
                    node: start,
                    path: self.tree.full_path(start),
                    status: LinkStatus::Circular,
                };
            }

            let target_path = path::resolve(&base, target);
            trace!("Following {} -> {}", current_path, target_path);

            match self.index.lookup(&target_path) {
                Some(next) => {
                    base = path::parent_of(&target_path);
                    current_path = target_path;
                    current = next;
                }
                None => {
                    debug!("Broken link {} -> {}", current_path, target_path);
                    return Resolved {
                        node: current,
                        path: current_path,
                        status: LinkStatus::Broken {
                            target: target_path,
                        },
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::node::Node;
    use rstest::{fixture, rstest};

    struct Fixture {
        tree: Tree,
        index: PathIndex,
    }

    impl Fixture {
        fn id(&self, path: &str) -> NodeId {
            self.index.lookup(path).unwrap()
        }

        fn resolve(&self, path: &str) -> Resolved {
            SymlinkResolver::new(&self.tree, &self.index)
                .resolve(self.id(path), &path::parent_of(path))
        }
    }

    /// /data/target/          folder
    /// /data/a -> b           relative, chain start
    /// /data/b -> /data/target
    /// /data/self -> self
    /// /data/x -> y, /data/y -> z, /data/z -> x
    /// /data/dangling -> gone
    /// /data/via -> dangling
    /// /data/into -> ../etc/hosts
    /// /data/nested/up -> ../target
    /// /data/hop -> nested/next, /data/nested/next -> ../target
    /// /etc/hosts             file
    #[fixture]
    fn fixture() -> Fixture {
        let mut tree = Tree::new(Node::folder("root", "root", "root")).unwrap();
        let root = tree.root();
        let data = tree
            .add_child(root, Node::folder("data", "guest", "guest"))
            .unwrap();
        let etc = tree
            .add_child(root, Node::folder("etc", "root", "root"))
            .unwrap();
        tree.add_child(etc, Node::file("hosts", "root", "root"))
            .unwrap();
        tree.add_child(data, Node::folder("target", "guest", "guest"))
            .unwrap();
        let nested = tree
            .add_child(data, Node::folder("nested", "guest", "guest"))
            .unwrap();

        let links = [
            ("a", "b"),
            ("b", "/data/target"),
            ("self", "self"),
            ("x", "y"),
            ("y", "z"),
            ("z", "x"),
            ("dangling", "gone"),
            ("via", "dangling"),
            ("into", "../etc/hosts"),
            ("hop", "nested/next"),
        ];
        for (name, target) in links {
            tree.add_child(data, Node::symlink(name, target, "guest", "guest"))
                .unwrap();
        }
        tree.add_child(nested, Node::symlink("up", "../target", "guest", "guest"))
            .unwrap();
        tree.add_child(nested, Node::symlink("next", "../target", "guest", "guest"))
            .unwrap();

        let index = PathIndex::build(&tree);
        Fixture { tree, index }
    }

    #[rstest]
    fn non_links_resolve_to_themselves(fixture: Fixture) {
        let resolved = fixture.resolve("/data/target");
        assert_eq!(resolved.node, fixture.id("/data/target"));
        assert_eq!(resolved.path, "/data/target");
        assert!(resolved.is_terminal());
    }

    #[rstest]
    fn multi_hop_chain_resolves_in_one_call(fixture: Fixture) {
        let resolved = fixture.resolve("/data/a");
        assert_eq!(resolved.node, fixture.id("/data/target"));
        assert_eq!(resolved.path, "/data/target");
        assert_eq!(resolved.status, LinkStatus::Terminal);
    }

    #[rstest]
    #[case("/data/into", "/etc/hosts")]
    #[case("/data/nested/up", "/data/target")]
    fn relative_targets_use_link_folder(
        fixture: Fixture,
        #[case] link: &str,
        #[case] expected: &str,
    ) {
        let resolved = fixture.resolve(link);
        assert_eq!(resolved.node, fixture.id(expected));
        assert!(resolved.is_terminal());
    }

    #[rstest]
    fn later_hops_are_relative_to_their_own_folder(fixture: Fixture) {
        let resolved = fixture.resolve("/data/hop");
        assert_eq!(resolved.node, fixture.id("/data/target"));
        assert_eq!(resolved.path, "/data/target");
        assert_eq!(resolved.status, LinkStatus::Terminal);
    }

    #[rstest]
    #[case("/data/self")]
    #[case("/data/x")]
    #[case("/data/y")]
    fn cycles_return_starting_link(fixture: Fixture, #[case] link: &str) {
        let resolved = fixture.resolve(link);
        assert_eq!(resolved.node, fixture.id(link));
        assert_eq!(resolved.path, link);
        assert_eq!(resolved.status, LinkStatus::Circular);
    }

    #[rstest]
    fn broken_target_returns_last_reached_link(fixture: Fixture) {
        let resolved = fixture.resolve("/data/via");
        assert_eq!(resolved.node, fixture.id("/data/dangling"));
        assert_eq!(resolved.path, "/data/dangling");
        assert_eq!(
            resolved.status,
            LinkStatus::Broken {
                target: "/data/gone".to_string()
            }
        );
    }

    #[rstest]
    fn broken_first_hop_returns_the_link(fixture: Fixture) {
        let resolved = fixture.resolve("/data/dangling");
        assert_eq!(resolved.node, fixture.id("/data/dangling"));
        assert!(resolved.status.is_broken());
    }
}
