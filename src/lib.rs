pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod service;
pub mod setup;
pub mod translation;

use std::io::{self, Write};

use anyhow::anyhow;
use tokio_util::sync::CancellationToken;

use cli::{Cli, Command};
use config::Config;
use error::{LocaliseError, Result};
use service::SyncService;
use setup::ConfigEdit;

/// Runs one command to completion. `cancel` is observed between files by
/// push and pull.
pub async fn run(cli: Cli, cancel: CancellationToken) -> Result<()> {
    let command: Command = cli.command.parse()?;
    let config_path = cli.config_path()?;
    tracing::debug!("Using configuration file {}", config_path.display());

    match command {
        Command::Config => {
            let edit = ConfigEdit {
                project: cli.project,
                token: cli.token,
                host: cli.host,
                translations: cli.translations,
            };
            tokio::task::spawn_blocking(move || {
                setup::run_config(&config_path, edit, io::stdin().lock(), io::stdout())
            })
            .await
            .map_err(|e| anyhow!("config command did not finish: {}", e))??;
        }
        Command::List => {
            let config = Config::load(&config_path)?;
            tracing::info!("Available projects:");
            list_projects(&config, &mut io::stdout().lock())?;
        }
        Command::Push | Command::Pull => {
            let config = Config::load(&config_path)?;
            let name = cli
                .project
                .as_deref()
                .ok_or_else(|| LocaliseError::ProjectRequired(command.to_string()))?;
            let project = config.validate(name)?;
            let service = SyncService::new(project, cancel)?;

            let mut out = io::stdout();
            let report = if command == Command::Push {
                service.push_translations(&mut out).await
            } else {
                service.pull_translations(&mut out).await
            };
            report.into_result()?;
        }
    }

    Ok(())
}

pub fn list_projects<W: Write>(config: &Config, out: &mut W) -> io::Result<()> {
    for name in config.project_names() {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}
