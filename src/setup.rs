//! The `config` command: creates or edits a project section of the
//! configuration file, from flags or by prompting on stdin.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{anyhow, Context};

use indexmap::IndexMap;

use crate::config::{ApiRecord, Config, ProjectRecord, TranslationTarget};
use crate::error::{LocaliseError, Result};

#[derive(Debug, Default, Clone)]
pub struct ConfigEdit {
    pub project: Option<String>,
    pub token: Option<String>,
    pub host: Option<String>,
    pub translations: Vec<(String, String)>,
}

impl ConfigEdit {
    fn is_interactive(&self) -> bool {
        self.token.is_none() && self.host.is_none() && self.translations.is_empty()
    }
}

/// Applies `edit` to the configuration at `path` and saves it. Prompts are
/// written to `output` and answers read from `input`.
pub fn run_config<R, W>(path: &Path, edit: ConfigEdit, mut input: R, mut output: W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut config = match Config::load(path) {
        Ok(config) => config,
        Err(LocaliseError::ConfigNotFound { .. }) => {
            tracing::info!("Creating new configuration file {}", path.display());
            Config::default()
        }
        Err(e) => return Err(e),
    };

    let interactive = edit.is_interactive();
    let name = match edit.project.clone() {
        Some(name) => name,
        None => prompt(&mut input, &mut output, "Project name: ")?,
    };
    if name.is_empty() {
        return Err(anyhow!("Project name cannot be empty").into());
    }

    let mut record = config.get(&name).cloned().unwrap_or_default();
    if interactive {
        prompt_record(&mut record, &mut input, &mut output)?;
    } else {
        apply_flags(&mut record, edit);
    }

    config.upsert(name.clone(), record);
    config.save(path)?;

    writeln!(output, "Saved project \"{}\" to {}", name, path.display())?;
    Ok(())
}

fn apply_flags(record: &mut ProjectRecord, edit: ConfigEdit) {
    let api = record.api.get_or_insert_with(ApiRecord::default);
    if let Some(token) = edit.token {
        api.token = Some(token);
    }
    if let Some(host) = edit.host {
        api.host = Some(host);
    }

    let translations = record.translations.get_or_insert_with(IndexMap::new);
    for (file, locale) in edit.translations {
        translations.insert(file, TranslationTarget::Locale(locale));
    }
}

fn prompt_record<R: BufRead, W: Write>(
    record: &mut ProjectRecord,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    let label = match record.token() {
        Some(current) if !current.is_empty() => "API token [keep current]: ",
        _ => "API token: ",
    };
    let token = prompt(input, output, label)?;
    if !token.is_empty() {
        record.api.get_or_insert_with(ApiRecord::default).token = Some(token);
    }

    writeln!(output, "Add translation files, leave the file empty to finish.")?;
    loop {
        let file = prompt(input, output, "Local file: ")?;
        if file.is_empty() {
            break;
        }
        let locale = prompt(input, output, &format!("Locale for {}: ", file))?;
        if locale.is_empty() {
            writeln!(output, "Skipping {}, no locale given", file)?;
            continue;
        }
        record
            .translations
            .get_or_insert_with(IndexMap::new)
            .insert(file, TranslationTarget::Locale(locale));
    }

    Ok(())
}

/// Reads one trimmed line. End of input counts as an empty answer.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<String> {
    write!(output, "{}", label)?;
    output.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read answer from stdin")?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_config_from_flags_creates_file() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join(".localise").join("config.yml");

        let edit = ConfigEdit {
            project: Some("app".to_string()),
            token: Some("abc".to_string()),
            host: None,
            translations: vec![("locales/fr.po".to_string(), "fr".to_string())],
        };
        let mut output = Vec::new();
        run_config(&path, edit, Cursor::new(""), &mut output)?;

        let config = Config::load(&path)?;
        let project = config.validate("app")?;
        assert_eq!(project.token, "abc");
        assert_eq!(project.translations.len(), 1);
        assert_eq!(project.translations[0].locale, "fr");
        assert!(String::from_utf8(output)?.contains("Saved project \"app\""));
        Ok(())
    }

    #[test]
    fn test_config_flags_merge_existing() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.yml");
        fs::write(
            &path,
            "docs:\n  api:\n    token: docs\n  translations:\n    en.json: en\napp:\n  api:\n    token: old\n  translations:\n    fr.po: fr\n",
        )?;

        let edit = ConfigEdit {
            project: Some("app".to_string()),
            token: None,
            host: Some("http://localhost".to_string()),
            translations: vec![
                ("fr.po".to_string(), "fr-FR".to_string()),
                ("de.po".to_string(), "de".to_string()),
            ],
        };
        run_config(&path, edit, Cursor::new(""), Vec::new())?;

        let config = Config::load(&path)?;
        let names: Vec<&str> = config.project_names().collect();
        assert_eq!(names, vec!["docs", "app"]);

        let project = config.validate("app")?;
        assert_eq!(project.token, "old");
        assert_eq!(project.host, "http://localhost");
        let locales: Vec<&str> = project.translations.iter().map(|t| t.locale.as_str()).collect();
        assert_eq!(locales, vec!["fr-FR", "de"]);
        Ok(())
    }

    #[test]
    fn test_config_interactive() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.yml");

        let answers = "mobile\ntok-123\nres/values/strings.xml\nen\nres/values-fr/strings.xml\n\nres/values-de/strings.xml\nde\n\n";
        let mut output = Vec::new();
        run_config(&path, ConfigEdit::default(), Cursor::new(answers), &mut output)?;

        let config = Config::load(&path)?;
        let project = config.validate("mobile")?;
        assert_eq!(project.token, "tok-123");
        let locales: Vec<&str> = project.translations.iter().map(|t| t.locale.as_str()).collect();
        assert_eq!(locales, vec!["en", "de"]);

        let output = String::from_utf8(output)?;
        assert!(output.contains("Project name: "));
        assert!(output.contains("Skipping res/values-fr/strings.xml"));
        Ok(())
    }

    #[test]
    fn test_config_refuses_malformed_file() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.yml");
        fs::write(&path, "app: [broken\n")?;

        let edit = ConfigEdit {
            project: Some("app".to_string()),
            token: Some("abc".to_string()),
            ..ConfigEdit::default()
        };
        let err = run_config(&path, edit, Cursor::new(""), Vec::new()).unwrap_err();
        assert!(matches!(err, LocaliseError::ConfigMalformed { .. }));
        assert_eq!(fs::read_to_string(&path)?, "app: [broken\n");
        Ok(())
    }
}
