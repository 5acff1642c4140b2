//! Raw frame and variable data as reported by the debugger engine.

use serde::{Deserialize, Serialize};

/// Debugger-supplied descriptor for one call-stack level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStackFrame {
    pub name: String,
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl RawStackFrame {
    #[must_use]
    pub fn new(name: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            line,
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Capability set every backend variable representation provides.
pub trait RawVariable: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;
    fn value(&self) -> &str;
    /// Declared type, when the debugger reports one.
    fn type_name(&self) -> Option<&str>;
}

/// Plain variable record, as carried by transcripts and most transports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugVariable {
    pub name: String,
    pub value: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl DebugVariable {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            type_name: None,
        }
    }

    #[must_use]
    pub fn typed(
        name: impl Into<String>,
        value: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            type_name: Some(type_name.into()),
        }
    }
}

impl RawVariable for DebugVariable {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }
}
