//! Navigation state behind the graphical file browser.

#[allow(clippy::module_inception)]
mod browser;

pub use browser::{Breadcrumb, Browser, BrowserAction, SHORTCUTS};
