//! Errors that can be thrown when processing configuration.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseConfigurationError {
    #[error("parse error on {file_path}:{line}:{column}: {message}")]
    ParseError {
        file_path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
    #[error("unsupported configuration version in {file_path}: expected {expected}, got {found}")]
    UnsupportedVersion {
        file_path: PathBuf,
        expected: u32,
        found: u32,
    },
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum WriteParsedConfigurationError {
    #[error("{file_path} is not a directory")]
    NotADirectory { file_path: PathBuf },
    #[error("unable to serialize configuration: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum MakeRuntimeConfigurationError {
    #[error("missing environment variable when processing {attribute}: {message}")]
    MissingEnvironmentVariable {
        attribute: &'static str,
        message: String,
    },
    #[error(transparent)]
    InvalidConfig(#[from] InvalidConfigError),
}

/// A configuration item that is present but unusable.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid configuration item \"{key}\" with value \"{value}\": {message}")]
pub struct InvalidConfigError {
    pub key: &'static str,
    pub value: String,
    pub message: String,
}

impl InvalidConfigError {
    pub fn new(key: &'static str, value: impl ToString, message: impl Into<String>) -> Self {
        Self {
            key,
            value: value.to_string(),
            message: message.into(),
        }
    }
}
