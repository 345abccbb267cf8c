use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid directory pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Split '{split}' not found. Available splits: {available:?}")]
    SplitNotFound {
        split: String,
        available: Vec<String>,
    },

    #[error("Config '{config}' not found. Available configs: {available:?}")]
    ConfigNotFound {
        config: String,
        available: Vec<String>,
    },

    #[error("Dataset has several configs, pick one with --subset. Available configs: {available:?}")]
    ConfigRequired { available: Vec<String> },

    #[error("Column '{column}' not found. Available columns: {available:?}")]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("Field '{field}' missing from record")]
    MissingField { field: String },

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Missing argument: {0}")]
    MissingArgument(String),

    #[error("No video data extracted from dataset")]
    EmptyManifest,
}

pub type Result<T> = std::result::Result<T, ManifestError>;
