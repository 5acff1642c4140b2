//! Execution-state owner interface consumed by stack frames.

use std::fmt;
use std::sync::Arc;

use crate::error::{ControlError, FetchError};
use crate::raw::RawVariable;

/// Execution state of a debugged thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// Executing without a pending stop.
    Running,
    /// Paused at a statement; frames and variables are available.
    Suspended,
    /// A step command is in flight.
    Stepping,
    /// The session is gone; no further actions are accepted.
    Terminated,
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Running => "running",
            Self::Suspended => "suspended",
            Self::Stepping => "stepping",
            Self::Terminated => "terminated",
        };
        f.write_str(text)
    }
}

/// Single authority for suspend/resume/step state shared by all frames of a
/// debugging session.
pub trait DebugThread: Send + Sync + fmt::Debug {
    fn can_step_into(&self) -> bool;
    fn can_step_over(&self) -> bool;
    fn can_step_return(&self) -> bool;
    fn is_stepping(&self) -> bool;
    fn can_resume(&self) -> bool;
    fn can_suspend(&self) -> bool;
    fn can_terminate(&self) -> bool;
    fn is_suspended(&self) -> bool;
    fn is_terminated(&self) -> bool;

    fn step_into(&self) -> Result<(), ControlError>;
    fn step_over(&self) -> Result<(), ControlError>;
    fn step_return(&self) -> Result<(), ControlError>;
    fn resume(&self) -> Result<(), ControlError>;
    fn suspend(&self) -> Result<(), ControlError>;
    fn terminate(&self) -> Result<(), ControlError>;

    /// Variables of the currently suspended frame, in debugger order.
    fn fetch_variables(&self) -> Result<Vec<Arc<dyn RawVariable>>, FetchError>;
}
