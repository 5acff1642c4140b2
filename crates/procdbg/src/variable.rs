//! Presentation wrapper around one raw debugger variable.

use std::fmt;
use std::sync::Arc;

use crate::protocol::Variable;
use crate::raw::RawVariable;
use crate::thread::DebugThread;

/// A raw variable as shown under one frame's cache generation.
#[derive(Clone)]
pub struct VariableView {
    thread: Arc<dyn DebugThread>,
    raw: Arc<dyn RawVariable>,
}

impl VariableView {
    pub fn new(thread: Arc<dyn DebugThread>, raw: Arc<dyn RawVariable>) -> Self {
        Self { thread, raw }
    }

    pub fn name(&self) -> &str {
        self.raw.name()
    }

    pub fn value(&self) -> &str {
        self.raw.value()
    }

    pub fn type_name(&self) -> Option<&str> {
        self.raw.type_name()
    }

    pub fn thread(&self) -> &Arc<dyn DebugThread> {
        &self.thread
    }

    /// Render for a `variables` response. Snapshots are flat, so no child
    /// reference is handed out.
    #[must_use]
    pub fn to_protocol(&self) -> Variable {
        Variable {
            name: self.name().to_string(),
            value: self.value().to_string(),
            r#type: self.type_name().map(str::to_string),
            variables_reference: 0,
        }
    }
}

impl PartialEq for VariableView {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.value() == other.value()
            && self.type_name() == other.type_name()
    }
}

impl Eq for VariableView {}

impl fmt::Debug for VariableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableView")
            .field("name", &self.name())
            .field("value", &self.value())
            .field("type", &self.type_name())
            .finish()
    }
}
