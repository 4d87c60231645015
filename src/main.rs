use clap::Parser;
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use localise::cli::Cli;
use localise::error::LocaliseError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let cancel = CancellationToken::new();
    listen_for_interrupt(cancel.clone());

    let code = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            println!("\nInterrupted!");
            0
        }
        result = localise::run(cli, cancel.clone()) => match result {
            Ok(()) => 0,
            Err(e) => {
                report(&e);
                e.exit_code()
            }
        },
    };

    std::process::exit(code);
}

/// Cancels `cancel` on SIGINT. The handler is installed before returning so
/// an interrupt that arrives while the command starts up is not lost.
#[cfg(unix)]
fn listen_for_interrupt(cancel: CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::interrupt()) {
        Ok(mut interrupt) => {
            tokio::spawn(async move {
                if interrupt.recv().await.is_some() {
                    cancel.cancel();
                }
            });
        }
        Err(e) => tracing::warn!("Failed to install interrupt handler: {}", e),
    }
}

#[cfg(not(unix))]
fn listen_for_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report(error: &LocaliseError) {
    match error {
        LocaliseError::ConfigNotFound { path } => {
            println!(
                "{}",
                "No configuration file found! Run the following command to create one:".red()
            );
            println!();
            println!("    localise config");
            println!();
            println!(
                "You can also create the file manually: {}",
                path.display()
            );
            println!();
        }
        e if e.is_handled() => println!("{}", e.to_string().red()),
        e => eprintln!("{} {:#}", "Error:".red().bold(), e),
    }
}
