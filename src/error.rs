use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Execution timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Process failed with exit code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("Unreadable provider output: {0}")]
    Output(String),
}

/// Fatal to a run: no items are produced
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Chapter text cannot be empty.")]
    EmptyText,

    #[error("Narrative analysis failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Failed to analyze narrative text. The response was empty or invalid.")]
    NoPayload,

    #[error("The analysis returned no scenes or entities.")]
    NoItems,
}

/// Non-fatal, per-item illustration problems
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationIssue {
    #[error("Image generation failed for \"{title}\", using placeholder.")]
    Degraded { title: String },

    #[error("Unexpected error for {title}.")]
    UnexpectedFailure { title: String, reason: String },
}

impl GenerationIssue {
    /// Message shown when this issue came out of a user-requested regeneration
    pub fn regeneration_message(&self) -> String {
        match self {
            GenerationIssue::Degraded { title } => format!(
                "Image regeneration failed for \"{}\", showing placeholder. This might be due to API limits.",
                title
            ),
            GenerationIssue::UnexpectedFailure { title, reason } => {
                format!("Unexpected error regenerating image for {}: {}", title, reason)
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to write gallery: {0}")]
    Write(std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
