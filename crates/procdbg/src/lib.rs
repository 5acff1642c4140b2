//! Stack frame model for debugging database-side procedural programs.
//!
//! A [`StackFrame`] is one suspended call-stack level. It forwards every
//! execution-control query and action to its owning [`DebugThread`] and keeps
//! a lazily fetched variable snapshot that stays valid until
//! [`StackFrame::invalidate`] is called.

pub mod backend;
pub mod config;
pub mod error;
mod frame;
pub mod protocol;
pub mod raw;
pub mod replay;
mod session;
mod thread;
mod variable;

pub use backend::{ControlCommand, DebugBackend, ScriptedBackend, Transcript};
pub use config::SessionConfig;
pub use error::{BackendError, ConfigError, ControlError, FetchError};
pub use frame::{
    CacheRead, CacheState, RegisterGroup, StackFrame, VariableCache, UNKNOWN_CHAR_OFFSET,
};
pub use raw::{DebugVariable, RawStackFrame, RawVariable};
pub use session::DebugSession;
pub use thread::{DebugThread, ExecutionState};
pub use variable::VariableView;
