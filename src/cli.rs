use clap::{ArgAction, Parser};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::Config;
use crate::error::{LocaliseError, Result};

#[derive(Parser, Debug)]
#[command(name = "localise", author, version, about = "Push and pull translation files to and from Localise.biz", long_about = None)]
pub struct Cli {
    /// Specify command: push, pull, config, list
    pub command: String,

    /// Specify project name
    pub project: Option<String>,

    /// Specify config file [default: $HOME/.localise/config.yml]
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// API token to store for the project (config command)
    #[arg(long)]
    pub token: Option<String>,

    /// API host to store for the project (config command)
    #[arg(long)]
    pub host: Option<String>,

    /// Translation mapping to store for the project, repeatable (config command)
    #[arg(long = "translation", value_name = "FILE=LOCALE", value_parser = parse_translation)]
    pub translations: Vec<(String, String)>,
}

impl Cli {
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config_file {
            Some(path) => Ok(path.clone()),
            None => Config::default_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    Push,
    Pull,
    Config,
}

impl FromStr for Command {
    type Err = LocaliseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "list" => Ok(Command::List),
            "push" => Ok(Command::Push),
            "pull" => Ok(Command::Pull),
            "config" => Ok(Command::Config),
            other => Err(LocaliseError::InvalidCommand(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::List => "list",
            Command::Push => "push",
            Command::Pull => "pull",
            Command::Config => "config",
        };
        f.write_str(name)
    }
}

fn parse_translation(value: &str) -> Result<(String, String), String> {
    let (file, locale) = value
        .split_once('=')
        .ok_or_else(|| format!("expected FILE=LOCALE, got `{value}`"))?;
    let (file, locale) = (file.trim(), locale.trim());
    if file.is_empty() || locale.is_empty() {
        return Err(format!("expected FILE=LOCALE, got `{value}`"));
    }
    Ok((file.to_string(), locale.to_string()))
}
