//! Seed descriptions the namespace is built from.

mod namespace_seed;

pub use namespace_seed::{NamespaceSeed, SeedError};
