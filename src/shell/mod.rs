//! Command-line emulator: `pwd`, `cd`, `ls` and friends over a namespace.

mod command;
mod listing;
#[allow(clippy::module_inception)]
mod shell;

pub use command::{Command, CommandError, LsOptions};
pub use shell::{GUEST_USER, Shell};
