mod icons;

pub use icons::{DESKTOP_PATH, Desktop, DesktopAction, DesktopIcon};
