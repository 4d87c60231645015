use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::io::Write;
use tokio_util::sync::CancellationToken;

use crate::{
    api::LocoClient,
    config::Project,
    error::LocaliseError,
    translation::Translation,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Push,
    Pull,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Push => f.write_str("push"),
            Direction::Pull => f.write_str("pull"),
        }
    }
}

#[derive(Debug)]
pub struct FileOutcome {
    pub translation: Translation,
    pub result: Result<(), String>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.translation.path.display();
        let locale = &self.translation.locale;
        match &self.result {
            Ok(()) => write!(f, "{} {} ({})", "✔".green(), path, locale),
            Err(reason) => write!(f, "{} {} ({}): {}", "✘".red(), path, locale, reason),
        }
    }
}

#[derive(Debug)]
pub struct SyncReport {
    pub direction: Direction,
    pub outcomes: Vec<FileOutcome>,
    /// Files left untouched because the run was cancelled.
    pub skipped: usize,
}

impl SyncReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len() + self.skipped
    }

    pub fn into_result(self) -> Result<(), LocaliseError> {
        let failed = self.failed();
        if failed == 0 {
            return Ok(());
        }
        Err(LocaliseError::Transfer {
            command: self.direction.to_string(),
            failed,
            total: self.total(),
        })
    }
}

pub struct SyncService {
    project: Project,
    client: LocoClient,
    cancel: CancellationToken,
}

impl SyncService {
    pub fn new(project: Project, cancel: CancellationToken) -> Result<Self> {
        let client = LocoClient::new(&project)?;
        Ok(Self {
            project,
            client,
            cancel,
        })
    }

    /// Uploads every configured file. A failing file does not stop the
    /// remaining ones. Each outcome is written to `out` as soon as it is known.
    pub async fn push_translations<W: Write>(&self, out: &mut W) -> SyncReport {
        self.run(Direction::Push, out).await
    }

    /// Downloads every configured locale into its local file.
    pub async fn pull_translations<W: Write>(&self, out: &mut W) -> SyncReport {
        self.run(Direction::Pull, out).await
    }

    async fn run<W: Write>(&self, direction: Direction, out: &mut W) -> SyncReport {
        let translations = &self.project.translations;
        tracing::info!(
            "Starting {} of {} file(s) for project {}",
            direction,
            translations.len(),
            self.project.name
        );

        let progress = progress_bar(translations.len() as u64);
        let mut outcomes = Vec::with_capacity(translations.len());

        for translation in translations {
            if self.cancel.is_cancelled() {
                tracing::warn!("{} cancelled", direction);
                break;
            }

            progress.set_message(translation.path.display().to_string());
            let result = match direction {
                Direction::Push => self.push_file(translation).await,
                Direction::Pull => self.pull_file(translation).await,
            };

            match &result {
                Ok(()) => tracing::info!(
                    "{} {} ({}) success",
                    direction,
                    translation.path.display(),
                    translation.locale
                ),
                Err(e) => tracing::error!(
                    "Failed to {} {}: {:#}",
                    direction,
                    translation.path.display(),
                    e
                ),
            }

            let outcome = FileOutcome {
                translation: translation.clone(),
                result: result.map_err(|e| format!("{:#}", e)),
            };
            if let Err(e) = progress.suspend(|| writeln!(out, "{}", outcome)) {
                tracing::warn!("Failed to print outcome: {}", e);
            }
            outcomes.push(outcome);
            progress.inc(1);
        }
        progress.finish_and_clear();

        let report = SyncReport {
            direction,
            skipped: translations.len() - outcomes.len(),
            outcomes,
        };

        tracing::info!(
            "{} completed: {} succeeded, {} failed, {} total",
            direction,
            report.succeeded(),
            report.failed(),
            report.total()
        );

        report
    }

    async fn push_file(&self, translation: &Translation) -> Result<()> {
        let format = translation.require_format()?;
        let content = translation.read()?;
        self.client
            .import(format, &translation.locale, content)
            .await?;
        Ok(())
    }

    async fn pull_file(&self, translation: &Translation) -> Result<()> {
        let format = translation.require_format()?;
        let content = self.client.export(&translation.locale, format).await?;
        translation.write(&content)?;
        Ok(())
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let progress = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{pos}/{len}] {wide_msg}") {
        progress.set_style(style);
    }
    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn create_test_project(server_url: &str, dir: &Path) -> Project {
        Project {
            name: "app".to_string(),
            token: "secret".to_string(),
            host: server_url.to_string(),
            translations: vec![
                Translation::new(dir.join("en.json"), "en"),
                Translation::new(dir.join("fr.json"), "fr"),
            ],
        }
    }

    #[test]
    fn test_push_reports_each_file() -> Result<()> {
        colored::control::set_override(false);
        let mut server = Server::new();
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("en.json"), r#"{"hello":"Hello"}"#)?;
        // fr.json is missing on purpose

        let mock = server
            .mock("POST", "/api/import/json")
            .match_query(Matcher::UrlEncoded("locale".into(), "en".into()))
            .with_status(200)
            .with_body(r#"{"status":200,"message":"ok"}"#)
            .expect(1)
            .create();

        let project = create_test_project(&server.url(), temp_dir.path());
        let service = SyncService::new(project, CancellationToken::new())?;
        let mut out = Vec::new();
        let report = tokio_test::block_on(service.push_translations(&mut out));

        assert_eq!(report.outcomes.len(), 2);
        assert!(report.outcomes[0].is_success());
        assert!(!report.outcomes[1].is_success());
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);

        let printed = String::from_utf8(out)?;
        let lines: Vec<&str> = printed.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            format!("✔ {} (en)", temp_dir.path().join("en.json").display())
        );
        assert!(lines[1].starts_with(&format!(
            "✘ {} (fr): Failed to read",
            temp_dir.path().join("fr.json").display()
        )));

        let err = report.into_result().unwrap_err();
        assert!(matches!(
            err,
            LocaliseError::Transfer {
                failed: 1,
                total: 2,
                ..
            }
        ));

        mock.assert();
        Ok(())
    }

    #[test]
    fn test_pull_writes_files() -> Result<()> {
        let mut server = Server::new();
        let temp_dir = TempDir::new()?;

        let en = server
            .mock("GET", "/api/export/locale/en.json")
            .with_status(200)
            .with_body(r#"{"hello":"Hello"}"#)
            .create();
        let fr = server
            .mock("GET", "/api/export/locale/fr.json")
            .with_status(200)
            .with_body(r#"{"hello":"Bonjour"}"#)
            .create();

        let project = create_test_project(&server.url(), temp_dir.path());
        let service = SyncService::new(project, CancellationToken::new())?;
        let report = tokio_test::block_on(service.pull_translations(&mut std::io::sink()));

        assert_eq!(report.succeeded(), 2);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("fr.json"))?,
            r#"{"hello":"Bonjour"}"#
        );
        assert!(report.into_result().is_ok());

        en.assert();
        fr.assert();
        Ok(())
    }

    #[test]
    fn test_pull_keeps_binary_body() -> Result<()> {
        let mut server = Server::new();
        let temp_dir = TempDir::new()?;
        let body: Vec<u8> = vec![222, 18, 4, 149, 0, 0, 0, 0, 255, 254];

        let mock = server
            .mock("GET", "/api/export/locale/fr.mo")
            .with_status(200)
            .with_header("content-type", "text/plain; charset=iso-8859-1")
            .with_body(&body)
            .create();

        let project = Project {
            name: "app".to_string(),
            token: "secret".to_string(),
            host: server.url(),
            translations: vec![Translation::new(temp_dir.path().join("fr.mo"), "fr")],
        };
        let service = SyncService::new(project, CancellationToken::new())?;
        let report = tokio_test::block_on(service.pull_translations(&mut std::io::sink()));

        assert_eq!(report.succeeded(), 1);
        assert_eq!(fs::read(temp_dir.path().join("fr.mo"))?, body);

        mock.assert();
        Ok(())
    }

    #[test]
    fn test_cancelled_run_skips_files() -> Result<()> {
        let server = Server::new();
        let temp_dir = TempDir::new()?;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let project = create_test_project(&server.url(), temp_dir.path());
        let service = SyncService::new(project, cancel)?;
        let mut out = Vec::new();
        let report = tokio_test::block_on(service.pull_translations(&mut out));

        assert!(report.outcomes.is_empty());
        assert_eq!(report.skipped, 2);
        assert!(out.is_empty());
        assert!(!temp_dir.path().join("en.json").exists());
        Ok(())
    }
}
