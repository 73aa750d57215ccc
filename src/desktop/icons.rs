use derive_more::IsVariant;

use crate::filesystem::{EntryIcon, Namespace, NamespaceError, path};

pub const DESKTOP_PATH: &str = "/home/guest/Desktop";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopIcon {
    pub name: String,
    pub icon: EntryIcon,
}

#[derive(Debug, Clone, PartialEq, Eq, IsVariant)]
pub enum DesktopAction {
    /// Open a browser window at `path`.
    OpenFolder { path: String },
    /// Open the markdown viewer on `path`.
    OpenMarkdown { path: String },
    /// The entry or what it links to is not world readable.
    AuthenticationRequired { path: String },
    Unsupported { name: String },
    Missing { name: String },
}

/// Icons shown on the desktop, one per entry of the guest's Desktop folder.
pub struct Desktop<'a> {
    namespace: &'a Namespace,
}

impl<'a> Desktop<'a> {
    pub fn new(namespace: &'a Namespace) -> Self {
        Desktop { namespace }
    }

    pub fn icons(&self) -> Result<Vec<DesktopIcon>, NamespaceError> {
        let icons = self
            .namespace
            .children_of(DESKTOP_PATH)?
            .into_iter()
            .map(|child| DesktopIcon {
                name: child.name,
                icon: child.icon,
            })
            .collect();
        Ok(icons)
    }

    pub fn activate(&self, name: &str) -> DesktopAction {
        let target = path::resolve(DESKTOP_PATH, name);
        let Ok(resolved) = self.namespace.resolve_path(&target) else {
            return DesktopAction::Missing {
                name: name.to_string(),
            };
        };

        let icon = self.namespace.icon_for(&resolved);
        if matches!(icon, EntryIcon::Folder | EntryIcon::Markdown)
            && !self.namespace.can_read(&target, &resolved)
        {
            return DesktopAction::AuthenticationRequired { path: target };
        }

        match icon {
            EntryIcon::Folder => DesktopAction::OpenFolder { path: target },
            EntryIcon::Markdown => DesktopAction::OpenMarkdown {
                path: resolved.path,
            },
            EntryIcon::File | EntryIcon::BrokenLink => DesktopAction::Unsupported {
                name: name.to_string(),
            },
        }
    }
}
