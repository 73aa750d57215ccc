use derive_more::IsVariant;
use tracing::debug;

use crate::filesystem::{Child, EntryIcon, Namespace, NamespaceError, path};

/// Sidebar shortcuts, in display order.
pub const SHORTCUTS: &[(&str, &str)] = &[
    ("Home", "/home/guest"),
    ("Desktop", "/home/guest/Desktop"),
    ("Documents", "/home/guest/Documents"),
    ("Projects", "/home/guest/Projects"),
    ("Blog", "/home/guest/Blog"),
    ("Wallpapers", "/home/guest/Wallpapers"),
    ("Root", "/"),
];

/// What the browser window should do after a click.
#[derive(Debug, Clone, PartialEq, Eq, IsVariant)]
pub enum BrowserAction {
    Navigated { path: String },
    /// The folder exists but is not world readable.
    AuthenticationRequired { path: String },
    OpenMarkdown { path: String },
    Unsupported { name: String },
    BrokenLink { path: String },
    NotFound { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    pub path: String,
}

/// Navigation state of one file browser window.
pub struct Browser<'a> {
    namespace: &'a Namespace,
    cwd: String,
}

impl<'a> Browser<'a> {
    pub fn new(namespace: &'a Namespace) -> Self {
        Browser {
            namespace,
            cwd: path::GUEST_HOME.to_string(),
        }
    }

    /// Opens at `path`, falling back to the guest home when `path` cannot
    /// be shown.
    pub fn at(namespace: &'a Namespace, path: &str) -> Self {
        let mut browser = Self::new(namespace);
        browser.navigate(path);
        browser
    }

    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn entries(&self) -> Result<Vec<Child>, NamespaceError> {
        self.namespace.children_of(&self.cwd)
    }

    /// One crumb per segment of the current path; empty at the root.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        let mut current = String::new();
        path::segments(&self.cwd)
            .into_iter()
            .map(|segment| {
                current = format!("{current}/{segment}");
                Breadcrumb {
                    label: segment,
                    path: current.clone(),
                }
            })
            .collect()
    }

    pub fn go_to_breadcrumb(&mut self, index: usize) -> BrowserAction {
        match self.breadcrumbs().into_iter().nth(index) {
            Some(crumb) => self.navigate(&crumb.path),
            None => BrowserAction::NotFound {
                path: format!("{}#{index}", self.cwd),
            },
        }
    }

    /// Sidebar shortcuts whose target the guest can open.
    pub fn shortcuts(&self) -> Vec<&'static str> {
        SHORTCUTS
            .iter()
            .filter(|(_, target)| {
                self.namespace
                    .resolve_path(target)
                    .is_ok_and(|resolved| self.namespace.can_read(target, &resolved))
            })
            .map(|(label, _)| *label)
            .collect()
    }

    pub fn go_to_shortcut(&mut self, label: &str) -> BrowserAction {
        match SHORTCUTS.iter().find(|(name, _)| *name == label) {
            Some((_, target)) => self.navigate(target),
            None => BrowserAction::NotFound {
                path: label.to_string(),
            },
        }
    }

    pub fn go_up(&mut self) -> BrowserAction {
        let parent = path::parent_of(&self.cwd);
        self.navigate(&parent)
    }

    /// Activates the entry called `name` in the current folder.
    pub fn open(&mut self, name: &str) -> BrowserAction {
        let target = path::resolve(&self.cwd, name);
        let resolved = match self.namespace.resolve_path(&target) {
            Ok(resolved) => resolved,
            Err(_) => return BrowserAction::NotFound { path: target },
        };

        match self.namespace.icon_for(&resolved) {
            EntryIcon::Folder => self.navigate(&target),
            EntryIcon::Markdown if !self.namespace.can_read(&target, &resolved) => {
                BrowserAction::AuthenticationRequired { path: target }
            }
            EntryIcon::Markdown => BrowserAction::OpenMarkdown {
                path: resolved.path,
            },
            EntryIcon::File => BrowserAction::Unsupported {
                name: name.to_string(),
            },
            EntryIcon::BrokenLink => BrowserAction::BrokenLink { path: target },
        }
    }

    fn navigate(&mut self, target: &str) -> BrowserAction {
        let target = path::normalize(target);
        let resolved = match self.namespace.resolve_path(&target) {
            Ok(resolved)
                if resolved.is_terminal() && self.namespace.node(resolved.node).is_folder() =>
            {
                resolved
            }
            _ => return BrowserAction::NotFound { path: target },
        };
        if !self.namespace.can_read(&target, &resolved) {
            debug!("Authentication required for {}", target);
            return BrowserAction::AuthenticationRequired { path: target };
        }

        self.cwd = target.clone();
        BrowserAction::Navigated { path: target }
    }
}
