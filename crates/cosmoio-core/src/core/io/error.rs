use super::args::IoMode;
use crate::core::models::class::CosmologyClass;
use crate::core::models::cosmology::ModelError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error(
        "No {} defined for format '{format}' and class '{class}'. Available formats: {}",
        .mode.handler_noun(),
        join_or_none(.available)
    )]
    UnknownFormat {
        format: String,
        class: CosmologyClass,
        mode: IoMode,
        available: Vec<String>,
    },

    #[error(
        "Format could not be identified based on the file name or contents, \
         please provide a 'format' argument ({mode} of class '{class}')"
    )]
    FormatNotIdentified { class: CosmologyClass, mode: IoMode },

    #[error("Format is ambiguous - options are: {}", .candidates.join(", "))]
    AmbiguousFormat {
        class: CosmologyClass,
        mode: IoMode,
        candidates: Vec<String>,
    },

    #[error("{kind} for format '{format}' and class '{class}' is already defined")]
    AlreadyRegistered {
        kind: &'static str,
        format: String,
        class: CosmologyClass,
    },

    #[error("No {kind} defined for format '{format}' and class '{class}'")]
    NotRegistered {
        kind: &'static str,
        format: String,
        class: CosmologyClass,
    },

    #[error("`Cosmology.read()` is not implemented for `Cosmology` subclasses (got '{class}')")]
    NotImplemented { class: CosmologyClass },

    #[error("Format '{format}' requires a '{argument}' argument")]
    MissingArgument {
        format: String,
        argument: &'static str,
    },

    #[error("Invalid option '{option}' for format '{format}': {reason}")]
    InvalidOption {
        format: String,
        option: String,
        reason: String,
    },

    #[error("Reader should return a '{expected}' instance, got '{found}'")]
    UnexpectedClass {
        expected: CosmologyClass,
        found: CosmologyClass,
    },

    #[error(
        "File '{}' already exists. If you mean to replace it then use the argument \
         `overwrite=true`",
        .path.display()
    )]
    FileExists { path: PathBuf },

    #[error("File I/O error for '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode '{}' as {format}: {message}", .path.display())]
    Decode {
        format: String,
        path: PathBuf,
        message: String,
    },

    #[error("Failed to encode cosmology as {format}: {message}")]
    Encode { format: String, message: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

impl IoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
