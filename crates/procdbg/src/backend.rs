//! Transport seam towards the database-side debugger.
//! - DebugBackend: commands, stack and variable requests
//! - ScriptedBackend: in-memory transport driven by a transcript

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::raw::{DebugVariable, RawStackFrame};

/// Execution-control command sent to the debugger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    StepInto,
    StepOver,
    StepReturn,
    Resume,
    Suspend,
    Terminate,
}

/// Connection to the debugger engine for one debugged thread.
pub trait DebugBackend: Send + std::fmt::Debug {
    fn send_command(&mut self, command: ControlCommand) -> Result<(), BackendError>;
    /// Call stack of the suspended thread, innermost frame first.
    fn request_stack(&mut self) -> Result<Vec<RawStackFrame>, BackendError>;
    /// Variables of the innermost suspended frame.
    fn request_variables(&mut self) -> Result<Vec<DebugVariable>, BackendError>;
}

/// Recorded debugger state replayed by [`ScriptedBackend`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transcript {
    #[serde(default)]
    pub frames: Vec<RawStackFrame>,
    #[serde(default)]
    pub variables: Vec<DebugVariable>,
    #[serde(default)]
    pub fail_fetch: bool,
}

impl Transcript {
    pub fn from_json_str(text: &str) -> Result<Self, BackendError> {
        serde_json::from_str(text).map_err(|err| BackendError::new(format!("transcript: {err}")))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| BackendError::new(format!("{}: {err}", path.display())))?;
        Self::from_json_str(&text)
    }
}

/// In-memory backend that serves a transcript and records commands.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    transcript: Transcript,
    commands: Vec<ControlCommand>,
    rejected: Option<ControlCommand>,
}

impl ScriptedBackend {
    #[must_use]
    pub fn new(transcript: Transcript) -> Self {
        Self {
            transcript,
            commands: Vec::new(),
            rejected: None,
        }
    }

    pub fn commands(&self) -> &[ControlCommand] {
        &self.commands
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    /// Make the backend refuse one kind of command.
    pub fn reject(&mut self, command: ControlCommand) {
        self.rejected = Some(command);
    }
}

impl DebugBackend for ScriptedBackend {
    fn send_command(&mut self, command: ControlCommand) -> Result<(), BackendError> {
        if self.rejected == Some(command) {
            return Err(BackendError::new(format!("{command:?} rejected by debugger")));
        }
        self.commands.push(command);
        Ok(())
    }

    fn request_stack(&mut self) -> Result<Vec<RawStackFrame>, BackendError> {
        Ok(self.transcript.frames.clone())
    }

    fn request_variables(&mut self) -> Result<Vec<DebugVariable>, BackendError> {
        if self.transcript.fail_fetch {
            return Err(BackendError::new("debugger did not answer variable request"));
        }
        Ok(self.transcript.variables.clone())
    }
}
