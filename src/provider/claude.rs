use super::{command, run_command, ProviderOutput, Runner};
use crate::error::ProviderError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

pub struct ClaudeRunner {
    pub binary: PathBuf,
    pub model: String,
}

#[async_trait]
impl Runner for ClaudeRunner {
    fn name(&self) -> &'static str {
        "claude_cli"
    }

    async fn execute(&self, prompt: &str, timeout: Duration) -> Result<ProviderOutput, ProviderError> {
        let mut cmd = command(&self.binary);

        // Ensure subscription auth is used (not API key)
        cmd.env_remove("ANTHROPIC_API_KEY");

        // Prompt goes on stdin: a whole chapter can exceed the argv limit
        cmd.arg("-p")
            .arg("--model")
            .arg(&self.model)
            .arg("--output-format")
            .arg("json");

        let start = std::time::Instant::now();
        let output = run_command(cmd, Some(prompt), timeout).await?;

        let result = ProviderOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration: start.elapsed(),
            exit_code: output.status.code().unwrap_or(-1),
        };

        if !output.status.success() {
            return Err(ProviderError::NonZeroExit {
                code: result.exit_code,
                stderr: result.stderr.clone(),
            });
        }

        Ok(result)
    }
}
