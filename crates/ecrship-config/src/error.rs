use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid region '{0}' (expected something like ap-southeast-1)")]
    InvalidRegion(String),

    #[error("invalid application name '{name}': {reason}")]
    InvalidAppName { name: String, reason: String },

    #[error("invalid image tag '{tag}': {reason}")]
    InvalidTag { tag: String, reason: String },

    #[error("invalid account id '{0}' (expected the 12 digit AWS account number)")]
    InvalidAccountId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
