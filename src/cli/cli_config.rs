use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Shell over an in-memory POSIX style namespace.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// YAML seed to build the namespace from instead of the bundled one
    #[clap(long, short)]
    pub seed: Option<PathBuf>,

    /// Run these commands in order instead of reading stdin
    #[clap(long = "command", short = 'c')]
    pub commands: Vec<String>,

    /// Folder the shell starts in
    #[clap(long, default_value = "/home/guest")]
    pub cwd: String,

    /// Never colour output
    #[clap(long)]
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults() {
        let cli = Cli::try_parse_from(["treefs"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Warn);
        assert_eq!(cli.seed, None);
        assert!(cli.commands.is_empty());
        assert_eq!(cli.cwd, "/home/guest");
        assert!(!cli.no_color);
    }

    #[test]
    fn collects_repeated_commands() {
        let cli = Cli::try_parse_from([
            "treefs", "-c", "cd /", "-c", "ls -l", "--seed", "seed.yaml", "-l", "debug",
        ])
        .unwrap();
        assert_eq!(cli.commands, vec!["cd /", "ls -l"]);
        assert_eq!(cli.seed, Some(PathBuf::from("seed.yaml")));
        assert_eq!(cli.log_level, LogLevel::Debug);
    }
}
