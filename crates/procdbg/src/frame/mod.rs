//! Suspended stack frame module map.
//! - cache: dirty/fresh variable cache
//! - tests: frame behaviour against a recording thread

mod cache;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{ControlError, FetchError};
use crate::protocol::{self, Source};
use crate::raw::RawStackFrame;
use crate::thread::DebugThread;
use crate::variable::VariableView;

pub use cache::{CacheRead, CacheState, VariableCache};

/// Character offsets are not reported by procedure debuggers.
pub const UNKNOWN_CHAR_OFFSET: i32 = -1;

/// Register state is not part of this debugger model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterGroup {
    pub name: String,
}

/// One call-stack level captured at a suspension.
#[derive(Debug)]
pub struct StackFrame {
    thread: Arc<dyn DebugThread>,
    raw: RawStackFrame,
    cache: Mutex<VariableCache<VariableView>>,
}

impl StackFrame {
    pub fn new(thread: Arc<dyn DebugThread>, raw: RawStackFrame) -> Self {
        Self {
            thread,
            raw,
            cache: Mutex::new(VariableCache::new()),
        }
    }

    pub fn thread(&self) -> &Arc<dyn DebugThread> {
        &self.thread
    }

    pub fn raw(&self) -> &RawStackFrame {
        &self.raw
    }

    pub fn line_number(&self) -> u32 {
        self.raw.line
    }

    /// Display name, `"<frame-name> line: <line>"`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{} line: {}", self.raw.name, self.raw.line)
    }

    pub fn char_start(&self) -> i32 {
        UNKNOWN_CHAR_OFFSET
    }

    pub fn char_end(&self) -> i32 {
        UNKNOWN_CHAR_OFFSET
    }

    pub fn register_groups(&self) -> &[RegisterGroup] {
        &[]
    }

    pub fn has_register_groups(&self) -> bool {
        false
    }

    /// Advisory: variables can only be fetched while the thread is suspended.
    pub fn has_variables(&self) -> bool {
        self.thread.is_suspended()
    }

    /// Variables of this frame, fetched from the owning thread on the first
    /// read after construction or [`invalidate`](Self::invalidate).
    ///
    /// A failed fetch is recorded (see [`last_fetch_error`](Self::last_fetch_error))
    /// and the previous list is returned; the next read does not retry.
    /// Concurrent readers wait for the in-flight fetch.
    pub fn variables(&self) -> Vec<VariableView> {
        let mut cache = self.cache.lock();
        let outcome = cache.read(|| {
            let raw = self.thread.fetch_variables()?;
            Ok(raw
                .into_iter()
                .map(|variable| VariableView::new(Arc::clone(&self.thread), variable))
                .collect())
        });
        match outcome {
            CacheRead::Cached => {}
            CacheRead::Rebuilt(count) => {
                debug!(frame = %self.raw.name, line = self.raw.line, count, "variables rebuilt");
            }
            CacheRead::Failed(err) => {
                warn!(
                    frame = %self.raw.name,
                    line = self.raw.line,
                    error = %err,
                    "variable fetch failed; keeping previous snapshot"
                );
            }
        }
        cache.entries().to_vec()
    }

    /// Mark the cached variables stale.
    pub fn invalidate(&self) {
        self.cache.lock().invalidate();
    }

    pub fn is_dirty(&self) -> bool {
        self.cache.lock().state() == CacheState::Dirty
    }

    /// Failure recorded by the most recent fetch, if it failed.
    pub fn last_fetch_error(&self) -> Option<FetchError> {
        self.cache.lock().last_error().cloned()
    }

    #[must_use]
    pub fn to_protocol(&self, id: u32) -> protocol::StackFrame {
        protocol::StackFrame {
            id,
            name: self.name(),
            source: self.raw.source.as_ref().map(|path| Source {
                name: Some(self.raw.name.clone()),
                path: Some(path.clone()),
            }),
            line: self.raw.line,
            column: 0,
        }
    }

    pub fn can_step_into(&self) -> bool {
        self.thread.can_step_into()
    }

    pub fn can_step_over(&self) -> bool {
        self.thread.can_step_over()
    }

    pub fn can_step_return(&self) -> bool {
        self.thread.can_step_return()
    }

    pub fn is_stepping(&self) -> bool {
        self.thread.is_stepping()
    }

    pub fn step_into(&self) -> Result<(), ControlError> {
        self.thread.step_into()
    }

    pub fn step_over(&self) -> Result<(), ControlError> {
        self.thread.step_over()
    }

    pub fn step_return(&self) -> Result<(), ControlError> {
        self.thread.step_return()
    }

    pub fn can_resume(&self) -> bool {
        self.thread.can_resume()
    }

    pub fn can_suspend(&self) -> bool {
        self.thread.can_suspend()
    }

    pub fn is_suspended(&self) -> bool {
        self.thread.is_suspended()
    }

    pub fn resume(&self) -> Result<(), ControlError> {
        self.thread.resume()
    }

    pub fn suspend(&self) -> Result<(), ControlError> {
        self.thread.suspend()
    }

    pub fn can_terminate(&self) -> bool {
        self.thread.can_terminate()
    }

    pub fn is_terminated(&self) -> bool {
        self.thread.is_terminated()
    }

    pub fn terminate(&self) -> Result<(), ControlError> {
        self.thread.terminate()
    }
}
