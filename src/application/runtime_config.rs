use std::path::PathBuf;

use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub seed: Option<PathBuf>,
    pub cwd: String,
    pub commands: Vec<String>,
    pub color: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            seed: cli.seed,
            cwd: cli.cwd,
            commands: cli.commands,
            color: !cli.no_color,
        }
    }
}
