use std::io::{self, BufRead, IsTerminal, Write};

use snafu::Snafu;
use snafu::prelude::*;
use supports_color::Stream;
use tracing::{debug, info};

use treefs::config::{NamespaceSeed, SeedError};
use treefs::shell::Shell;

use crate::application::RuntimeConfig;

const EXIT_COMMANDS: &[&str] = &["exit", "logout"];

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();

        let seed = match &app_config.seed {
            Some(path) => NamespaceSeed::from_path(path).await,
            None => NamespaceSeed::builtin(),
        }
        .context(SeedLoadSnafu)?;
        let namespace = seed.into_namespace();
        info!("Namespace ready with {} entries", namespace.index().len());

        let color = app_config.color && supports_color::on(Stream::Stdout).is_some();
        colored::control::set_override(color);
        debug!("Colour output: {}", color);

        let mut shell = Shell::new(&namespace)
            .with_color(color)
            .with_cwd(&app_config.cwd);

        let mut stdout = io::stdout();
        if !app_config.commands.is_empty() {
            for line in &app_config.commands {
                Self::print(&mut stdout, &shell.execute(line))?;
            }
            return Ok(());
        }

        Self::interactive(&mut shell, &mut stdout)
    }

    fn interactive(shell: &mut Shell, stdout: &mut io::Stdout) -> Result<(), ApplicationError> {
        let stdin = io::stdin();
        let show_prompt = stdin.is_terminal();
        let mut input = stdin.lock();

        loop {
            if show_prompt {
                write!(stdout, "{}", shell.prompt()).context(OutputSnafu)?;
                stdout.flush().context(OutputSnafu)?;
            }

            let mut line = String::new();
            if input.read_line(&mut line).context(InputSnafu)? == 0 {
                debug!("End of input");
                break;
            }
            let line = line.trim();
            if EXIT_COMMANDS.contains(&line) {
                break;
            }

            Self::print(stdout, &shell.execute(line))?;
        }

        Ok(())
    }

    fn print(stdout: &mut io::Stdout, output: &str) -> Result<(), ApplicationError> {
        if !output.is_empty() {
            writeln!(stdout, "{output}").context(OutputSnafu)?;
        }
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading the namespace seed"))]
    SeedLoadError { source: SeedError },
    #[snafu(display("Failed to read from stdin"))]
    InputError { source: io::Error },
    #[snafu(display("Failed to write to stdout"))]
    OutputError { source: io::Error },
}
