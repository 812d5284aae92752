// src/utils/config.rs
//! Engine configuration
//!
//! Layered with the `config` crate:
//!
//! 1. built-in defaults
//! 2. `mock-engine.{toml,yaml,json}` in the working directory, or the file named
//!    by `MOCK_ENGINE_CONFIG`
//! 3. `MOCK_ENGINE_*` environment variables (`__` separates sections, lists
//!    are comma separated), e.g. `MOCK_ENGINE_MOCKS__MOCK_LIST=api.example.com`

use crate::session::config::MockOptions;
use crate::utils::errors::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_STEM: &str = "mock-engine";
const CONFIG_PATH_ENV: &str = "MOCK_ENGINE_CONFIG";
const ENV_PREFIX: &str = "MOCK_ENGINE";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "mock_replay_engine=info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default `start()` options for every session
    pub mocks: MockOptions,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load defaults, then the optional config file, then the environment
    pub fn load() -> Result<Self> {
        let file = std::env::var(CONFIG_PATH_ENV)
            .map(|path| File::with_name(&path).required(true))
            .unwrap_or_else(|_| File::with_name(CONFIG_FILE_STEM).required(false));

        Self::load_from(file, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(
        file: File<config::FileSourceFile, config::FileFormat>,
        env: Environment,
    ) -> Result<Self> {
        let settings = Config::builder()
            .add_source(Config::try_from(&EngineConfig::default())?)
            .add_source(file)
            .add_source(
                env.prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("mocks.skip_query_params")
                    .with_list_parse_key("mocks.skip_post_params")
                    .with_list_parse_key("mocks.ok_list")
                    .with_list_parse_key("mocks.mock_list"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    fn no_file() -> File<config::FileSourceFile, config::FileFormat> {
        File::with_name("does-not-exist-mock-engine").required(false)
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::load_from(no_file(), env(&[])).unwrap();

        assert_eq!(config.mocks.namespace, "__remocks__");
        assert!(config.mocks.root_dir.ends_with("__mocks__"));
        assert!(config.mocks.mock_list.is_empty());
        assert!(!config.mocks.force);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_env_overrides() {
        let config = EngineConfig::load_from(
            no_file(),
            env(&[
                ("MOCK_ENGINE_MOCKS__NAMESPACE", "ui-suite"),
                ("MOCK_ENGINE_MOCKS__FORCE", "true"),
                ("MOCK_ENGINE_MOCKS__CI", "true"),
                ("MOCK_ENGINE_MOCKS__SKIP_QUERY_PARAMS", "ts,nonce"),
                ("MOCK_ENGINE_LOGGING__FORMAT", "json"),
            ]),
        )
        .unwrap();

        assert_eq!(config.mocks.namespace, "ui-suite");
        assert!(config.mocks.force);
        assert!(config.mocks.ci);
        assert_eq!(config.mocks.skip_query_params, vec!["ts", "nonce"]);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_file_layer_accepts_single_string_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mock-engine.json");
        std::fs::write(
            &path,
            r#"{ "mocks": { "mock_list": "localhost:3000/api", "ok_list": ["example.com/health"] } }"#,
        )
        .unwrap();

        let file = File::from(path.as_path()).required(true);
        let config = EngineConfig::load_from(file, env(&[])).unwrap();

        assert_eq!(config.mocks.mock_list.iter().collect::<Vec<_>>(), vec!["localhost:3000/api"]);
        assert_eq!(config.mocks.ok_list.len(), 1);
    }
}
