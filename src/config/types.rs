use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Appended to every image prompt
    #[serde(default = "default_style_suffix")]
    pub style_suffix: String,

    /// Regeneration prompts from the description once it is longer than this
    #[serde(default = "default_regenerate_min_description_len")]
    pub regenerate_min_description_len: usize,

    /// Pause between sequential image requests during the sweep
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,

    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub provider: Provider,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub claude_cli: ClaudeCliConfig,

    #[serde(default)]
    pub codex_cli: CodexCliConfig,

    #[serde(default)]
    pub image: ImageCommandConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ClaudeCliConfig {
    #[serde(default = "default_claude_binary")]
    pub binary: PathBuf,

    #[serde(default = "default_claude_model")]
    pub model: String,
}

impl Default for ClaudeCliConfig {
    fn default() -> Self {
        Self {
            binary: default_claude_binary(),
            model: default_claude_model(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct CodexCliConfig {
    #[serde(default = "default_codex_binary")]
    pub binary: PathBuf,

    #[serde(default = "default_codex_model")]
    pub model: String,
}

impl Default for CodexCliConfig {
    fn default() -> Self {
        Self {
            binary: default_codex_binary(),
            model: default_codex_model(),
        }
    }
}

/// External command that renders one image per prompt.
///
/// `{prompt}` and `{output}` in `args` are replaced with the prompt text and a
/// scratch file path. Without `{prompt}` the prompt is written to stdin.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ImageCommandConfig {
    #[serde(default)]
    pub binary: Option<PathBuf>,

    #[serde(default = "default_image_args")]
    pub args: Vec<String>,

    #[serde(default = "default_image_mime_type")]
    pub mime_type: String,
}

impl Default for ImageCommandConfig {
    fn default() -> Self {
        Self {
            binary: None,
            args: default_image_args(),
            mime_type: default_image_mime_type(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    #[default]
    ClaudeCli,
    CodexCli,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::ClaudeCli => write!(f, "claude_cli"),
            Provider::CodexCli => write!(f, "codex_cli"),
        }
    }
}
