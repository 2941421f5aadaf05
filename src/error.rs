#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskListError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid config key '{0}'")]
    InvalidConfigKey(String),

    #[error("invalid config value for '{key}': {msg}")]
    InvalidConfigValue { key: String, msg: String },

    #[error("no task found matching pattern: {0}")]
    TaskNotFound(String),

    #[error("multiple tasks match pattern '{pattern}': {matches} matches")]
    AmbiguousTask { pattern: String, matches: usize },

    #[error("invalid store key '{key}': {msg}")]
    InvalidStoreKey { key: String, msg: String },

    #[error("invalid filter '{0}': expected all, active or completed")]
    InvalidFilter(String),

    #[error("invalid priority '{0}': expected low, normal or high")]
    InvalidPriority(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("io error at {path}: {source}")]
    IoPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}
