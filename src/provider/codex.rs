use super::{command, run_command, ProviderOutput, Runner};
use crate::error::ProviderError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;

pub struct CodexRunner {
    pub binary: PathBuf,
    pub model: String,
}

#[async_trait]
impl Runner for CodexRunner {
    fn name(&self) -> &'static str {
        "codex_cli"
    }

    async fn execute(&self, prompt: &str, timeout: Duration) -> Result<ProviderOutput, ProviderError> {
        // Final assistant message lands here; JSON events on stdout are noise for us
        let out_file = NamedTempFile::new().map_err(ProviderError::Io)?;

        let mut cmd = command(&self.binary);
        cmd.arg("exec")
            .arg("--model")
            .arg(&self.model)
            .arg("--json")
            .arg("--output-last-message")
            .arg(out_file.path())
            // Read prompt from stdin
            .arg("-");

        let start = std::time::Instant::now();
        let output = run_command(cmd, Some(prompt), timeout).await?;

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);
        if !output.status.success() {
            return Err(ProviderError::NonZeroExit {
                code: exit_code,
                stderr,
            });
        }

        let last_message = tokio::fs::read_to_string(out_file.path())
            .await
            .map_err(|e| ProviderError::Output(format!("cannot read last message: {}", e)))?;
        if last_message.trim().is_empty() {
            return Err(ProviderError::Output(
                "codex exited without a final message".to_string(),
            ));
        }

        Ok(ProviderOutput {
            stdout: last_message,
            stderr,
            duration: start.elapsed(),
            exit_code,
        })
    }
}
