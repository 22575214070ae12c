mod defaults;
mod types;

pub use types::*;

use crate::error::ConfigError;
use defaults::*;
use std::path::Path;

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            style_suffix: default_style_suffix(),
            regenerate_min_description_len: default_regenerate_min_description_len(),
            request_delay_ms: default_request_delay_ms(),
            timeout_sec: default_timeout_sec(),
            report_dir: default_report_dir(),
            analysis: AnalysisConfig::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if present, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the config
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_sec == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_sec",
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.providers.image.mime_type.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "providers.image.mime_type",
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.regenerate_min_description_len, 20);
        assert_eq!(config.analysis.provider, Provider::ClaudeCli);
        assert!(config.providers.image.binary.is_none());
        assert!(config.style_suffix.starts_with("Dark moody aesthetic"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "request_delay_ms: 250\nanalysis:\n  provider: codex_cli\nproviders:\n  image:\n    binary: /usr/local/bin/render\n    args: [\"--out\", \"{{output}}\"]"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.request_delay_ms, 250);
        assert_eq!(config.analysis.provider, Provider::CodexCli);
        assert_eq!(config.providers.image.args, vec!["--out", "{output}"]);
        assert_eq!(config.providers.image.mime_type, "image/png");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.timeout_sec, 300);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = Config {
            timeout_sec: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "timeout_sec", .. })
        ));
    }
}
