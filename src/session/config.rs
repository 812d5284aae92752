// src/session/config.rs
//! Session start options

use crate::interception::host::InterceptionTarget;
use crate::interception::policy::{PolicyConfig, UrlList};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_ROOT_DIR: &str = "__mocks__";
const DEFAULT_NAMESPACE: &str = "__remocks__";

/// Serializable `start()` options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockOptions {
    /// Store root
    pub root_dir: PathBuf,

    /// Sub-folder grouping the mocks of one suite
    pub namespace: String,

    /// Query parameters ignored when fingerprinting
    pub skip_query_params: Vec<String>,

    /// Body fields ignored when fingerprinting
    pub skip_post_params: Vec<String>,

    /// URL substrings answered with a synthetic 200 "OK"
    pub ok_list: UrlList,

    /// URL substrings served from / recorded to the store
    pub mock_list: UrlList,

    /// Overwrite existing records with live responses
    pub force: bool,

    /// Strict mode: a missing mock fails drain()/stop()
    pub ci: bool,

    pub verbose: bool,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            root_dir: std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(DEFAULT_ROOT_DIR),
            namespace: DEFAULT_NAMESPACE.to_string(),
            skip_query_params: Vec::new(),
            skip_post_params: Vec::new(),
            ok_list: UrlList::new(),
            mock_list: UrlList::new(),
            force: false,
            ci: ci_from_env(),
            verbose: false,
        }
    }
}

impl MockOptions {
    /// `<root_dir>/<namespace>`
    pub fn work_dir(&self) -> PathBuf {
        self.root_dir.join(&self.namespace)
    }

    pub fn policy(&self) -> PolicyConfig {
        PolicyConfig {
            mock_list: self.mock_list.clone(),
            ok_list: self.ok_list.clone(),
        }
    }
}

/// Truthy `CI` environment variable, as set by most CI providers
fn ci_from_env() -> bool {
    std::env::var("CI")
        .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Options plus the page/target the session binds to
#[derive(Clone, Default)]
pub struct SessionConfig {
    pub options: MockOptions,
    pub target: Option<Arc<dyn InterceptionTarget>>,
}

impl SessionConfig {
    pub fn new(target: Arc<dyn InterceptionTarget>) -> Self {
        Self {
            options: MockOptions::default(),
            target: Some(target),
        }
    }

    pub fn from_options(options: MockOptions, target: Option<Arc<dyn InterceptionTarget>>) -> Self {
        Self { options, target }
    }

    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.options.root_dir = root_dir.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.options.namespace = namespace.into();
        self
    }

    pub fn with_mock_list(mut self, mock_list: impl Into<UrlList>) -> Self {
        self.options.mock_list = mock_list.into();
        self
    }

    pub fn with_ok_list(mut self, ok_list: impl Into<UrlList>) -> Self {
        self.options.ok_list = ok_list.into();
        self
    }

    pub fn with_skip_query_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.skip_query_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_skip_post_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.skip_post_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.options.force = force;
        self
    }

    pub fn with_ci(mut self, ci: bool) -> Self {
        self.options.ci = ci;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.options.verbose = verbose;
        self
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("options", &self.options)
            .field("target", &self.target.as_ref().map(|t| t.target_id()))
            .finish()
    }
}
