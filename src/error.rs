use std::path::PathBuf;

use thiserror::Error;

use crate::context::TemplateContextBuilderError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every way a command can stop. Nothing here is retried: each variant ends
/// the current invocation with exit status 1.
#[derive(Debug, Error)]
pub enum Error {
    // Usage
    #[error("Unknown command '{0}'. Use 'help' to check all commands...")]
    UnknownCommand(String),

    #[error("Unknown option '{0}'")]
    UnknownOption(String),

    #[error("Option '{0}' expected additional arguments")]
    MissingOptionValues(String),

    #[error("Command '{0}' expected at least one argument")]
    MissingArgument(&'static str),

    #[error("Missing required argument '{0}'")]
    MissingTemplateArgument(String),

    #[error("Unknown template argument '{0}'")]
    UnknownTemplateArgument(String),

    // Resources
    #[error("Failed to {action}: {source}")]
    Io {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy '{}' to '{}': {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: fs_extra::error::Error,
    },

    #[error("Failed to create directory for storing template scripts '{}': {source}", .path.display())]
    CreateStorage {
        path: PathBuf,
        #[source]
        source: fs_extra::error::Error,
    },

    #[error("Failed to list '{}': {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Given path '{}' does not exist", .0.display())]
    SourceMissing(PathBuf),

    #[error("Given path '{}' is not a file", .0.display())]
    SourceNotFile(PathBuf),

    #[error("Template '{0}' is not installed")]
    NotInstalled(String),

    #[error("Template '{0}' is already installed, use --force to replace it")]
    AlreadyInstalled(String),

    #[error("Can't find file '{}'", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("Can't open file '{}': {source}", .path.display())]
    TemplateUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Can't run an empty command")]
    EmptyCommand,

    #[error("Failed to read answer: {0}")]
    Prompt(#[from] inquire::InquireError),

    #[error("Invalid template context: {0}")]
    Context(#[from] TemplateContextBuilderError),

    // Resolution
    #[error("Can't resolve users home directory for storing template scripts")]
    Unresolved,

    // Execution
    #[error("There were errors during the execution of the template:\n{kind}: {message}")]
    Execution { kind: &'static str, message: String },

    #[error("{0}")]
    Aborted(String),
}

impl Error {
    pub fn io(action: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            action: action.into(),
            source,
        }
    }
}
