//! In-memory POSIX style namespace with the navigation logic of its three
//! front ends: a shell, a file browser and a desktop icon view.
//!
//! ```
//! use treefs::filesystem::Namespace;
//! use treefs::shell::Shell;
//!
//! let namespace = Namespace::builtin().unwrap();
//! let mut shell = Shell::new(&namespace);
//! shell.execute("cd Desktop/Projects");
//! assert_eq!(shell.execute("ls"), "project1.zip");
//! ```

pub mod browser;
pub mod config;
pub mod desktop;
pub mod filesystem;
pub mod shell;
