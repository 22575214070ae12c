use super::{command, run_command, ImageSynthesizer};
use crate::error::ProviderError;
use crate::item::ImageRef;
use async_trait::async_trait;
use base64::Engine as _;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::debug;

const PROMPT_TOKEN: &str = "{prompt}";
const OUTPUT_TOKEN: &str = "{output}";

/// Renders images by shelling out to a user-supplied command.
///
/// The command either writes the image to the `{output}` path, or prints a
/// data URL (or the placeholder sentinel) on stdout. Anything else degrades
/// to the placeholder.
pub struct CommandImageSynthesizer {
    pub binary: PathBuf,
    pub args: Vec<String>,
    pub mime_type: String,
    pub timeout: Duration,
}

impl CommandImageSynthesizer {
    fn render_args(&self, prompt: &str, output: &Path) -> Vec<String> {
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(PROMPT_TOKEN, prompt)
                    .replace(OUTPUT_TOKEN, output.as_ref())
            })
            .collect()
    }

    fn prompt_on_stdin(&self) -> bool {
        !self.args.iter().any(|a| a.contains(PROMPT_TOKEN))
    }
}

#[async_trait]
impl ImageSynthesizer for CommandImageSynthesizer {
    async fn generate(&self, prompt: &str) -> Result<ImageRef, ProviderError> {
        let scratch = TempDir::new().map_err(ProviderError::Io)?;
        let output_path = scratch.path().join("image");

        let mut cmd = command(&self.binary);
        cmd.args(self.render_args(prompt, &output_path));

        // Commands that take the prompt as an argument may never read stdin
        let input = self.prompt_on_stdin().then_some(prompt);
        let output = run_command(cmd, input, self.timeout).await?;

        if !output.status.success() {
            return Err(ProviderError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        if let Ok(bytes) = tokio::fs::read(&output_path).await {
            if !bytes.is_empty() {
                debug!("Image command wrote {} bytes", bytes.len());
                return Ok(ImageRef::Url(to_data_url(&self.mime_type, &bytes)));
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(interpret_stdout(stdout.trim()))
    }
}

/// Used when no image command is configured: every request degrades.
pub struct PlaceholderSynthesizer;

#[async_trait]
impl ImageSynthesizer for PlaceholderSynthesizer {
    async fn generate(&self, _prompt: &str) -> Result<ImageRef, ProviderError> {
        Ok(ImageRef::Placeholder)
    }
}

fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn interpret_stdout(stdout: &str) -> ImageRef {
    let last_line = stdout.lines().last().unwrap_or("").trim();
    if last_line.starts_with("data:") || last_line.starts_with("http://") || last_line.starts_with("https://") {
        ImageRef::Url(last_line.to_string())
    } else {
        ImageRef::Placeholder
    }
}
