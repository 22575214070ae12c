mod claude;
mod codex;
mod image;

pub use claude::ClaudeRunner;
pub use codex::CodexRunner;
pub use image::{CommandImageSynthesizer, PlaceholderSynthesizer};

use crate::analysis::{build_analysis_prompt, parse_analysis, AnalysisResponse};
use crate::config::{Config, Provider};
use crate::error::ProviderError;
use crate::item::ImageRef;
use async_trait::async_trait;
use std::path::Path;
use std::process::{Output, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout as tokio_timeout;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct ProviderOutput {
    pub stdout: String,
    #[allow(dead_code)]
    pub stderr: String,
    pub duration: Duration,
    #[allow(dead_code)]
    pub exit_code: i32,
}

/// A model CLI that answers one prompt
#[async_trait]
pub trait Runner: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, prompt: &str, timeout: Duration) -> Result<ProviderOutput, ProviderError>;
}

/// Extracts scenes and entities from narrative text.
///
/// `Ok(None)` means the call went through but produced nothing usable.
#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<Option<AnalysisResponse>, ProviderError>;
}

/// Produces one illustration per prompt, or `ImageRef::Placeholder` when it
/// degrades gracefully.
#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<ImageRef, ProviderError>;
}

/// Build a command, letting a bare name go through PATH lookup
fn command(binary: &Path) -> Command {
    let binary_str = binary.to_string_lossy();
    if binary_str.contains('/') || binary_str.contains('\\') {
        Command::new(binary)
    } else {
        Command::new(binary_str.as_ref())
    }
}

/// Spawn `cmd`, write `input` to its stdin and collect its output, all within
/// `timeout`. A child that exits without reading all of stdin is not an error.
async fn run_command(
    mut cmd: Command,
    input: Option<&str>,
    timeout: Duration,
) -> Result<Output, ProviderError> {
    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    let mut child = cmd.spawn().map_err(ProviderError::Io)?;
    let stdin = child.stdin.take();

    let exchange = async move {
        if let Some(mut stdin) = stdin {
            let written = match input {
                Some(text) => stdin.write_all(text.as_bytes()).await,
                None => Ok(()),
            };
            if let Err(e) = written.and(stdin.shutdown().await) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e);
                }
            }
        }
        child.wait_with_output().await
    };

    tokio_timeout(timeout, exchange)
        .await
        .map_err(|_| ProviderError::Timeout(timeout))?
        .map_err(ProviderError::Io)
}

/// Text analysis backed by a model CLI
pub struct CliAnalyzer {
    runner: Arc<dyn Runner>,
    timeout: Duration,
}

impl CliAnalyzer {
    pub fn new(runner: Arc<dyn Runner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }
}

#[async_trait]
impl TextAnalyzer for CliAnalyzer {
    async fn analyze(&self, text: &str) -> Result<Option<AnalysisResponse>, ProviderError> {
        let prompt = build_analysis_prompt(text);
        debug!(
            "Invoking {} analysis with {} byte prompt",
            self.runner.name(),
            prompt.len()
        );

        let output = self.runner.execute(&prompt, self.timeout).await?;
        debug!("Analysis completed in {:?}", output.duration);

        Ok(parse_analysis(&output.stdout))
    }
}

/// Create the analyzer selected in the config
pub fn create_analyzer(config: &Config) -> Arc<dyn TextAnalyzer> {
    let runner: Arc<dyn Runner> = match config.analysis.provider {
        Provider::ClaudeCli => Arc::new(ClaudeRunner {
            binary: config.providers.claude_cli.binary.clone(),
            model: config.providers.claude_cli.model.clone(),
        }),
        Provider::CodexCli => Arc::new(CodexRunner {
            binary: config.providers.codex_cli.binary.clone(),
            model: config.providers.codex_cli.model.clone(),
        }),
    };
    Arc::new(CliAnalyzer::new(
        runner,
        Duration::from_secs(config.timeout_sec),
    ))
}

/// Create the image synthesizer, degrading to placeholders when none is configured
pub fn create_synthesizer(config: &Config) -> Arc<dyn ImageSynthesizer> {
    let image = &config.providers.image;
    match &image.binary {
        Some(binary) => Arc::new(CommandImageSynthesizer {
            binary: binary.clone(),
            args: image.args.clone(),
            mime_type: image.mime_type.clone(),
            timeout: Duration::from_secs(config.timeout_sec),
        }),
        None => {
            warn!("No image command configured; every item will get a placeholder");
            Arc::new(PlaceholderSynthesizer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedRunner(String);

    #[async_trait]
    impl Runner for CannedRunner {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn execute(
            &self,
            _prompt: &str,
            _timeout: Duration,
        ) -> Result<ProviderOutput, ProviderError> {
            Ok(ProviderOutput {
                stdout: self.0.clone(),
                stderr: String::new(),
                duration: Duration::ZERO,
                exit_code: 0,
            })
        }
    }

    #[tokio::test]
    async fn test_cli_analyzer_parses_runner_output() {
        let runner = Arc::new(CannedRunner(
            r#"{"result": "{\"scenes\": [], \"entities\": [{\"name\": \"Kaelen\", \"category\": \"Personaje\", \"visualDescriptionPrompt\": \"guardian\"}]}"}"#
                .to_string(),
        ));
        let analyzer = CliAnalyzer::new(runner, Duration::from_secs(1));
        let response = analyzer.analyze("chapter").await.unwrap().unwrap();
        assert_eq!(response.entities.len(), 1);
        assert_eq!(response.entities[0].name, "Kaelen");
    }

    #[tokio::test]
    async fn test_cli_analyzer_unusable_output_is_none() {
        let runner = Arc::new(CannedRunner("I could not find any scenes.".to_string()));
        let analyzer = CliAnalyzer::new(runner, Duration::from_secs(1));
        assert!(analyzer.analyze("chapter").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_synthesizer_degrades() {
        let synth = create_synthesizer(&Config::default());
        assert_eq!(synth.generate("anything").await.unwrap(), ImageRef::Placeholder);
    }
}
