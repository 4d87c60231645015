use crate::config::TranslationTarget;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// One local file and the remote locale it is synchronized with.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub path: PathBuf,
    pub locale: String,
    pub format: Option<String>,
}

impl Translation {
    pub fn new(path: impl Into<PathBuf>, locale: impl Into<String>) -> Self {
        Translation {
            path: path.into(),
            locale: locale.into(),
            format: None,
        }
    }

    pub fn from_target(path: &str, target: &TranslationTarget) -> Self {
        Translation {
            path: PathBuf::from(path),
            locale: target.locale().to_string(),
            format: target.format().map(str::to_string),
        }
    }

    /// Remote file extension: the configured format, or the local file's
    /// extension (`locales/fr.po` -> `po`).
    pub fn format(&self) -> Option<&str> {
        self.format
            .as_deref()
            .map(|f| f.trim_start_matches('.'))
            .or_else(|| self.path.extension().and_then(|ext| ext.to_str()))
            .filter(|f| !f.is_empty())
    }

    pub fn require_format(&self) -> Result<&str> {
        self.format().ok_or_else(|| {
            anyhow!(
                "Cannot determine the file format of {}, set `format` in the config file",
                self.path.display()
            )
        })
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).with_context(|| format!("Failed to read {}", self.path.display()))
    }

    pub fn write(&self, content: &[u8]) -> Result<()> {
        write_atomic(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

/// Writes `content` to a temporary file next to `path` and renames it over
/// `path`, creating parent directories as needed.
pub fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let mut file = NamedTempFile::new_in(&parent)?;
    file.write_all(content)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
