//! Session configuration loading.

use std::path::Path;

use serde::Deserialize;
use tracing_subscriber::filter::Directive;

use crate::error::ConfigError;

pub const DEFAULT_THREAD_ID: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Thread id reported to DAP clients.
    pub thread_id: u32,
    /// Deepest stack level unwound into frames; `None` unwinds everything.
    pub max_stack_depth: Option<usize>,
    /// Tracing directive applied by the replay binary; validated on load.
    pub log_filter: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            thread_id: DEFAULT_THREAD_ID,
            max_stack_depth: None,
            log_filter: None,
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: SessionToml =
            toml::from_str(text).map_err(|err| ConfigError(format!("procdbg.toml: {err}")))?;
        raw.into_config()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|err| ConfigError(format!("procdbg.toml: {err}")))?;
        Self::from_toml_str(&text)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionToml {
    #[serde(default)]
    session: SessionSection,
    #[serde(default)]
    log: LogSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionSection {
    thread_id: Option<u32>,
    max_stack_depth: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LogSection {
    filter: Option<String>,
}

impl SessionToml {
    fn into_config(self) -> Result<SessionConfig, ConfigError> {
        let thread_id = self.session.thread_id.unwrap_or(DEFAULT_THREAD_ID);
        if thread_id == 0 {
            return Err(ConfigError("session.thread_id must be at least 1".into()));
        }
        if self.session.max_stack_depth == Some(0) {
            return Err(ConfigError(
                "session.max_stack_depth must be at least 1".into(),
            ));
        }
        let log_filter = self
            .log
            .filter
            .map(|filter| filter.trim().to_string())
            .filter(|filter| !filter.is_empty());
        if let Some(filter) = log_filter.as_deref() {
            filter
                .parse::<Directive>()
                .map_err(|err| ConfigError(format!("log.filter '{filter}': {err}")))?;
        }
        Ok(SessionConfig {
            thread_id,
            max_stack_depth: self.session.max_stack_depth,
            log_filter,
        })
    }
}
