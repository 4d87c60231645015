use crate::error::{LocaliseError, Result};
use crate::translation::{self, Translation};
use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "https://localise.biz";
const CONFIG_DIR: &str = ".localise";
const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// Remote side of a translation mapping, either `file: fr` or
/// `file: { locale: fr, format: po }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslationTarget {
    Locale(String),
    Detailed {
        locale: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
}

impl TranslationTarget {
    pub fn locale(&self) -> &str {
        match self {
            TranslationTarget::Locale(locale) => locale,
            TranslationTarget::Detailed { locale, .. } => locale,
        }
    }

    pub fn format(&self) -> Option<&str> {
        match self {
            TranslationTarget::Locale(_) => None,
            TranslationTarget::Detailed { format, .. } => format.as_deref(),
        }
    }
}

/// A project section as written in the file. Nothing is required here;
/// [`Config::validate`] decides whether it is usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<IndexMap<String, TranslationTarget>>,
}

impl ProjectRecord {
    pub fn token(&self) -> Option<&str> {
        self.api.as_ref().and_then(|api| api.token.as_deref())
    }
}

/// A validated project, ready for push and pull.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub name: String,
    pub token: String,
    pub host: String,
    pub translations: Vec<Translation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    projects: IndexMap<String, ProjectRecord>,
}

impl Config {
    /// `$HOME/.localise/config.yml`
    pub fn default_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
            .ok_or(LocaliseError::HomeDirNotFound)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(LocaliseError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content).map_err(|e| LocaliseError::ConfigMalformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        tracing::debug!(
            "Loaded {} project(s) from {}",
            config.projects.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;
        translation::write_atomic(path, content.as_bytes())
            .with_context(|| format!("Failed to write configuration to {}", path.display()))?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    pub fn project_names(&self) -> impl Iterator<Item = &str> {
        self.projects.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&ProjectRecord> {
        self.projects.get(name)
    }

    pub fn upsert(&mut self, name: String, record: ProjectRecord) {
        self.projects.insert(name, record);
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Checks that `name` exists and carries a token and at least one
    /// translation file.
    pub fn validate(&self, name: &str) -> Result<Project> {
        let record = self
            .get(name)
            .ok_or_else(|| LocaliseError::UnknownProject(name.to_string()))?;

        let token = record
            .token()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| LocaliseError::MissingToken(name.to_string()))?;

        let translations: Vec<Translation> = record
            .translations
            .iter()
            .flatten()
            .map(|(path, target)| Translation::from_target(path, target))
            .collect();
        if translations.is_empty() {
            return Err(LocaliseError::MissingTranslations(name.to_string()));
        }

        let host = record
            .api
            .as_ref()
            .and_then(|api| api.host.as_deref())
            .map(|host| host.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        Ok(Project {
            name: name.to_string(),
            token: token.to_string(),
            host,
            translations,
        })
    }
}
