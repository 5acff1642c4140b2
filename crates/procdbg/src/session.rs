//! Debug session owning execution state for one debugged thread.
//! - queries/actions: validated against ExecutionState, forwarded to the backend
//! - stack_frames: unwind once per suspension, invalidate on every state change
//! - fetch_variables: snapshot of the suspended frame

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use crate::backend::{ControlCommand, DebugBackend};
use crate::config::SessionConfig;
use crate::error::{ControlError, FetchError};
use crate::frame::StackFrame;
use crate::protocol::{StackTraceResponseBody, Thread};
use crate::raw::RawVariable;
use crate::thread::{DebugThread, ExecutionState};

#[derive(Debug)]
struct SessionState<B> {
    mode: ExecutionState,
    backend: B,
    /// Frames unwound for the current suspension. Held weakly: each frame
    /// keeps its session alive, not the other way round.
    frames: Option<Vec<Weak<StackFrame>>>,
    /// Frames of an earlier unwind within the same suspension that callers
    /// still hold; they are invalidated together with `frames`.
    detached: Vec<Weak<StackFrame>>,
}

impl<B> SessionState<B> {
    fn take_live_frames(&mut self) -> Vec<Arc<StackFrame>> {
        let current = self.frames.take().unwrap_or_default();
        let detached = std::mem::take(&mut self.detached);
        current
            .iter()
            .chain(&detached)
            .filter_map(Weak::upgrade)
            .collect()
    }

    /// Move the current generation aside before a re-unwind, keeping only
    /// frames somebody still holds.
    fn detach_frames(&mut self) {
        if let Some(frames) = self.frames.take() {
            self.detached.extend(frames);
        }
        self.detached.retain(|frame| frame.strong_count() > 0);
    }
}

#[derive(Debug)]
pub struct DebugSession<B: DebugBackend> {
    config: SessionConfig,
    state: Mutex<SessionState<B>>,
}

impl<B: DebugBackend + 'static> DebugSession<B> {
    /// Attach to a running thread.
    #[must_use]
    pub fn new(backend: B, config: SessionConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            state: Mutex::new(SessionState {
                mode: ExecutionState::Running,
                backend,
                frames: None,
                detached: Vec::new(),
            }),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> ExecutionState {
        self.state.lock().mode
    }

    /// Run `f` against the backend while holding the session lock.
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        f(&mut self.state.lock().backend)
    }

    /// The backend reported that the thread stopped (breakpoint, step end,
    /// requested pause). Frames from the previous suspension are discarded.
    pub fn handle_stopped(&self) {
        let stale = {
            let mut state = self.state.lock();
            if state.mode == ExecutionState::Terminated {
                return;
            }
            debug!(from = %state.mode, "thread stopped");
            state.mode = ExecutionState::Suspended;
            state.take_live_frames()
        };
        invalidate_all(&stale);
    }

    /// Frames of the current suspension, innermost first. Repeated calls
    /// return the same frame objects until execution state changes; if a
    /// caller dropped one of them the stack is unwound again, and frames
    /// still held from the earlier unwind stay tracked for invalidation.
    ///
    /// The debugger reports variables for the suspended frame only, so only
    /// level 0 carries a meaningful snapshot. Outer levels fetch through the
    /// same session and see that same snapshot.
    pub fn stack_frames(self: &Arc<Self>) -> Result<Vec<Arc<StackFrame>>, FetchError> {
        let mut state = self.state.lock();
        ensure_suspended(state.mode)?;
        if let Some(frames) = state.frames.as_ref() {
            let live = frames.iter().filter_map(Weak::upgrade).collect::<Vec<_>>();
            if live.len() == frames.len() {
                return Ok(live);
            }
        }

        state.detach_frames();
        let mut raw_frames = state.backend.request_stack()?;
        if let Some(depth) = self.config.max_stack_depth {
            raw_frames.truncate(depth);
        }
        let thread: Arc<dyn DebugThread> = self.clone();
        let frames = raw_frames
            .into_iter()
            .map(|raw| Arc::new(StackFrame::new(Arc::clone(&thread), raw)))
            .collect::<Vec<_>>();
        debug!(count = frames.len(), "unwound call stack");
        state.frames = Some(frames.iter().map(Arc::downgrade).collect());
        Ok(frames)
    }

    /// Render the current stack for a `stackTrace` response. Frame ids are
    /// stack levels, innermost frame is 0.
    pub fn stack_trace(self: &Arc<Self>) -> Result<StackTraceResponseBody, FetchError> {
        let frames = self.stack_frames()?;
        let stack_frames = frames
            .iter()
            .enumerate()
            .map(|(level, frame)| {
                let id = u32::try_from(level).unwrap_or(u32::MAX);
                frame.to_protocol(id)
            })
            .collect::<Vec<_>>();
        Ok(StackTraceResponseBody {
            total_frames: Some(u32::try_from(stack_frames.len()).unwrap_or(u32::MAX)),
            stack_frames,
        })
    }

    #[must_use]
    pub fn protocol_thread(&self, name: impl Into<String>) -> Thread {
        Thread {
            id: self.config.thread_id,
            name: name.into(),
        }
    }

    fn control(
        &self,
        action: &'static str,
        command: ControlCommand,
        next: Option<ExecutionState>,
    ) -> Result<(), ControlError> {
        let stale = {
            let mut state = self.state.lock();
            let previous = state.mode;
            if !allows(command, previous) {
                return Err(ControlError::InvalidState {
                    action,
                    state: previous,
                });
            }
            state
                .backend
                .send_command(command)
                .map_err(|source| ControlError::Backend { action, source })?;
            if let Some(next) = next {
                state.mode = next;
            }
            debug!(action, from = %previous, to = %state.mode, "control action applied");
            if next.is_some() {
                state.take_live_frames()
            } else {
                Vec::new()
            }
        };
        invalidate_all(&stale);
        Ok(())
    }
}

fn allows(command: ControlCommand, mode: ExecutionState) -> bool {
    match command {
        ControlCommand::StepInto
        | ControlCommand::StepOver
        | ControlCommand::StepReturn
        | ControlCommand::Resume => mode == ExecutionState::Suspended,
        ControlCommand::Suspend => {
            matches!(mode, ExecutionState::Running | ExecutionState::Stepping)
        }
        ControlCommand::Terminate => mode != ExecutionState::Terminated,
    }
}

fn ensure_suspended(mode: ExecutionState) -> Result<(), FetchError> {
    match mode {
        ExecutionState::Suspended => Ok(()),
        ExecutionState::Terminated => Err(FetchError::Terminated),
        other => Err(FetchError::NotSuspended(other)),
    }
}

/// Invalidate outside the session lock: frames call back into the session
/// while holding their own cache lock.
fn invalidate_all(frames: &[Arc<StackFrame>]) {
    for frame in frames {
        frame.invalidate();
    }
}

impl<B: DebugBackend + 'static> DebugThread for DebugSession<B> {
    fn can_step_into(&self) -> bool {
        allows(ControlCommand::StepInto, self.state())
    }

    fn can_step_over(&self) -> bool {
        allows(ControlCommand::StepOver, self.state())
    }

    fn can_step_return(&self) -> bool {
        allows(ControlCommand::StepReturn, self.state())
    }

    fn is_stepping(&self) -> bool {
        self.state() == ExecutionState::Stepping
    }

    fn can_resume(&self) -> bool {
        allows(ControlCommand::Resume, self.state())
    }

    fn can_suspend(&self) -> bool {
        allows(ControlCommand::Suspend, self.state())
    }

    fn can_terminate(&self) -> bool {
        allows(ControlCommand::Terminate, self.state())
    }

    fn is_suspended(&self) -> bool {
        self.state() == ExecutionState::Suspended
    }

    fn is_terminated(&self) -> bool {
        self.state() == ExecutionState::Terminated
    }

    fn step_into(&self) -> Result<(), ControlError> {
        self.control(
            "step into",
            ControlCommand::StepInto,
            Some(ExecutionState::Stepping),
        )
    }

    fn step_over(&self) -> Result<(), ControlError> {
        self.control(
            "step over",
            ControlCommand::StepOver,
            Some(ExecutionState::Stepping),
        )
    }

    fn step_return(&self) -> Result<(), ControlError> {
        self.control(
            "step return",
            ControlCommand::StepReturn,
            Some(ExecutionState::Stepping),
        )
    }

    fn resume(&self) -> Result<(), ControlError> {
        self.control("resume", ControlCommand::Resume, Some(ExecutionState::Running))
    }

    /// Requests a pause; the thread counts as suspended only once the
    /// backend reports the stop through [`DebugSession::handle_stopped`].
    fn suspend(&self) -> Result<(), ControlError> {
        self.control("suspend", ControlCommand::Suspend, None)
    }

    fn terminate(&self) -> Result<(), ControlError> {
        self.control(
            "terminate",
            ControlCommand::Terminate,
            Some(ExecutionState::Terminated),
        )
    }

    fn fetch_variables(&self) -> Result<Vec<Arc<dyn RawVariable>>, FetchError> {
        let mut state = self.state.lock();
        ensure_suspended(state.mode)?;
        let variables = state.backend.request_variables()?;
        debug!(count = variables.len(), "fetched variables");
        Ok(variables
            .into_iter()
            .map(|variable| Arc::new(variable) as Arc<dyn RawVariable>)
            .collect())
    }
}
