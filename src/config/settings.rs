use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Write debug logs to a file
    #[serde(default)]
    pub debug: bool,

    /// Optional log file or directory (defaults next to the config file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_path: Option<String>,

    /// Log rotation strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_rotation: Option<DebugLogRotation>,

    /// How many rotated log files to keep (0 = keep everything)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_keep: Option<usize>,

    /// Search and answer backend
    #[serde(default)]
    pub backend: Backend,

    /// Search behaviour
    #[serde(default)]
    pub search: SearchSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            debug_log_path: None,
            debug_log_rotation: None,
            debug_log_keep: None,
            backend: Backend::default(),
            search: SearchSettings::default(),
        }
    }
}

impl Config {
    /// Reject values that would make every request fail
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.base_url must not be empty".into()));
        }
        if url::Url::parse(&self.backend.base_url).is_err() {
            return Err(ConfigError::Invalid(format!(
                "backend.base_url is not a valid URL: {}",
                self.backend.base_url
            )));
        }
        if self.backend.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "backend.request_timeout_secs must be > 0".into(),
            ));
        }
        if self.backend.stall_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "backend.stall_timeout_secs must be > 0".into(),
            ));
        }
        if self.search.context_size == 0 {
            return Err(ConfigError::Invalid(
                "search.context_size must be > 0, otherwise no summary is ever requested".into(),
            ));
        }
        Ok(())
    }
}

/// The HTTP service answering `/search` and `/answer`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backend {
    /// Base URL, e.g. `http://localhost:5001`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_search_path")]
    pub search_path: String,

    #[serde(default = "default_answer_path")]
    pub answer_path: String,

    /// Total time allowed for one search request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Longest gap tolerated between two reads of the answer stream
    #[serde(default = "default_stall_timeout")]
    pub stall_timeout_secs: u64,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            search_path: default_search_path(),
            answer_path: default_answer_path(),
            request_timeout_secs: default_request_timeout(),
            stall_timeout_secs: default_stall_timeout(),
        }
    }
}

impl Backend {
    /// Join the base URL with an endpoint path
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn search_url(&self) -> String {
        self.endpoint(&self.search_path)
    }

    pub fn answer_url(&self) -> String {
        self.endpoint(&self.answer_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// How many top results are forwarded to the answer endpoint
    #[serde(default = "default_context_size")]
    pub context_size: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            context_size: default_context_size(),
        }
    }
}

/// Debug log rotation strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DebugLogRotation {
    /// Single file, appended forever
    None,
    /// One file per day
    Daily,
    /// One file per run
    Session,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn default_base_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_search_path() -> String {
    "/search".to_string()
}

fn default_answer_path() -> String {
    "/answer".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_stall_timeout() -> u64 {
    60
}

fn default_context_size() -> usize {
    2
}
