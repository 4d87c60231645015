use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = LocaliseError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum LocaliseError {
    #[error("No configuration file found at {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration file {}: {message}", path.display())]
    ConfigMalformed { path: PathBuf, message: String },

    #[error("Unknown project identificator \"{0}\"")]
    UnknownProject(String),

    #[error("Missing token value for project \"{0}\" in config file")]
    MissingToken(String),

    #[error("No translation files defined for project \"{0}\" in config file")]
    MissingTranslations(String),

    #[error("The {0} command needs a project name, run `localise list` to see them")]
    ProjectRequired(String),

    #[error("Not a valid command \"{0}\"! Did you mean config, push, or pull?")]
    InvalidCommand(String),

    #[error("Could not determine the home directory, pass a config file with --config")]
    HomeDirNotFound,

    #[error("{command} finished with {failed} of {total} files failed")]
    Transfer {
        command: String,
        failed: usize,
        total: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LocaliseError {
    /// Errors the user can fix by editing the configuration. They are
    /// reported as plain messages and do not fail the process.
    pub fn is_handled(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::UnknownProject(_)
                | Self::MissingToken(_)
                | Self::MissingTranslations(_)
                | Self::ProjectRequired(_)
        )
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_handled() {
            return 0;
        }
        match self {
            Self::InvalidCommand(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let not_found = LocaliseError::ConfigNotFound {
            path: PathBuf::from("/tmp/config.yml"),
        };
        assert_eq!(not_found.exit_code(), 0);
        assert_eq!(LocaliseError::MissingToken("app".into()).exit_code(), 0);
        assert_eq!(LocaliseError::InvalidCommand("foo".into()).exit_code(), 2);

        let transfer = LocaliseError::Transfer {
            command: "push".into(),
            failed: 1,
            total: 3,
        };
        assert!(!transfer.is_handled());
        assert_eq!(transfer.exit_code(), 1);
    }

    #[test]
    fn test_invalid_command_message() {
        let message = LocaliseError::InvalidCommand("foo".into()).to_string();
        assert!(message.contains("\"foo\""));
        assert!(message.contains("config, push, or pull"));
    }
}
