//! Frame unit tests.
//! - lazy fetch, cache stability and invalidation
//! - fail-soft fetches
//! - pass-through of execution control

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use expect_test::expect;
use parking_lot::Mutex;

use super::*;
use crate::error::BackendError;
use crate::raw::{DebugVariable, RawVariable};
use crate::thread::ExecutionState;

/// Thread double that records every call and serves a configurable snapshot.
#[derive(Debug, Default)]
struct RecordingThread {
    calls: Mutex<Vec<&'static str>>,
    variables: Mutex<Vec<DebugVariable>>,
    fail_fetch: AtomicBool,
    fetches: AtomicUsize,
    fetch_delay: Option<Duration>,
    suspended: AtomicBool,
}

impl RecordingThread {
    fn with_variables(variables: &[(&str, &str)]) -> Arc<Self> {
        let thread = Self::default();
        *thread.variables.lock() = variables
            .iter()
            .map(|(name, value)| DebugVariable::new(*name, *value))
            .collect();
        Arc::new(thread)
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().push(call);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl DebugThread for RecordingThread {
    fn can_step_into(&self) -> bool {
        self.record("can_step_into");
        true
    }

    fn can_step_over(&self) -> bool {
        self.record("can_step_over");
        false
    }

    fn can_step_return(&self) -> bool {
        self.record("can_step_return");
        true
    }

    fn is_stepping(&self) -> bool {
        self.record("is_stepping");
        false
    }

    fn can_resume(&self) -> bool {
        self.record("can_resume");
        true
    }

    fn can_suspend(&self) -> bool {
        self.record("can_suspend");
        false
    }

    fn can_terminate(&self) -> bool {
        self.record("can_terminate");
        true
    }

    fn is_suspended(&self) -> bool {
        self.record("is_suspended");
        self.suspended.load(Ordering::SeqCst)
    }

    fn is_terminated(&self) -> bool {
        self.record("is_terminated");
        false
    }

    fn step_into(&self) -> Result<(), ControlError> {
        self.record("step_into");
        Ok(())
    }

    fn step_over(&self) -> Result<(), ControlError> {
        self.record("step_over");
        Ok(())
    }

    fn step_return(&self) -> Result<(), ControlError> {
        self.record("step_return");
        Ok(())
    }

    fn resume(&self) -> Result<(), ControlError> {
        self.record("resume");
        Ok(())
    }

    fn suspend(&self) -> Result<(), ControlError> {
        self.record("suspend");
        Err(ControlError::InvalidState {
            action: "suspend",
            state: ExecutionState::Suspended,
        })
    }

    fn terminate(&self) -> Result<(), ControlError> {
        self.record("terminate");
        Ok(())
    }

    fn fetch_variables(&self) -> Result<Vec<Arc<dyn RawVariable>>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.fetch_delay {
            thread::sleep(delay);
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(FetchError::Backend(BackendError::new("debugger unreachable")));
        }
        Ok(self
            .variables
            .lock()
            .iter()
            .cloned()
            .map(|variable| Arc::new(variable) as Arc<dyn RawVariable>)
            .collect())
    }
}

fn frame_on(thread: &Arc<RecordingThread>) -> StackFrame {
    StackFrame::new(thread.clone(), RawStackFrame::new("proc1", 42))
}

fn names(variables: &[VariableView]) -> Vec<&str> {
    variables.iter().map(VariableView::name).collect()
}

#[test]
fn location_needs_no_fetch() {
    let thread = RecordingThread::with_variables(&[]);
    let frame = frame_on(&thread);
    assert_eq!(frame.line_number(), 42);
    assert_eq!(frame.name(), "proc1 line: 42");
    assert_eq!(thread.fetches(), 0);
}

#[test]
fn first_read_fetches_once() {
    let thread = RecordingThread::with_variables(&[("x", "1"), ("y", "2")]);
    let frame = frame_on(&thread);
    assert!(frame.is_dirty());

    let variables = frame.variables();
    assert_eq!(thread.fetches(), 1);
    assert!(!frame.is_dirty());
    assert_eq!(names(&variables), ["x", "y"]);
    assert_eq!(variables[0].value(), "1");
    assert_eq!(variables[1].value(), "2");
}

#[test]
fn consecutive_reads_share_one_fetch() {
    let thread = RecordingThread::with_variables(&[("x", "1")]);
    let frame = frame_on(&thread);
    let first = frame.variables();
    thread.variables.lock().push(DebugVariable::new("late", "3"));
    let second = frame.variables();
    assert_eq!(thread.fetches(), 1);
    assert_eq!(first, second);
}

#[test]
fn invalidate_forces_refetch() {
    let thread = RecordingThread::with_variables(&[("x", "1")]);
    let frame = frame_on(&thread);
    frame.variables();

    *thread.variables.lock() = vec![DebugVariable::new("x", "5"), DebugVariable::new("z", "0")];
    frame.invalidate();
    assert!(frame.is_dirty());

    let variables = frame.variables();
    assert_eq!(thread.fetches(), 2);
    assert_eq!(names(&variables), ["x", "z"]);
    assert_eq!(variables[0].value(), "5");
}

#[test]
fn failed_refetch_serves_previous_snapshot() {
    let thread = RecordingThread::with_variables(&[("x", "1"), ("y", "2")]);
    let frame = frame_on(&thread);
    let before = frame.variables();

    thread.fail_fetch.store(true, Ordering::SeqCst);
    frame.invalidate();
    let after = frame.variables();

    assert_eq!(thread.fetches(), 2);
    assert_eq!(names(&after), ["x", "y"]);
    assert_eq!(before, after);
    assert!(!frame.is_dirty());
    assert!(matches!(
        frame.last_fetch_error(),
        Some(FetchError::Backend(_))
    ));

    frame.variables();
    assert_eq!(thread.fetches(), 2);
}

#[test]
fn failed_first_fetch_yields_empty_list() {
    let thread = RecordingThread::with_variables(&[("x", "1")]);
    thread.fail_fetch.store(true, Ordering::SeqCst);
    let frame = frame_on(&thread);

    assert!(frame.variables().is_empty());
    assert!(!frame.is_dirty());

    thread.fail_fetch.store(false, Ordering::SeqCst);
    frame.invalidate();
    assert_eq!(names(&frame.variables()), ["x"]);
    assert!(frame.last_fetch_error().is_none());
}

#[test]
fn concurrent_reads_do_not_race_the_fetch() {
    let thread = Arc::new(RecordingThread {
        fetch_delay: Some(Duration::from_millis(50)),
        variables: Mutex::new(vec![DebugVariable::new("a", "1"), DebugVariable::new("b", "2")]),
        ..RecordingThread::default()
    });
    let frame = Arc::new(frame_on(&thread));

    let handles = (0..4)
        .map(|_| {
            let frame = Arc::clone(&frame);
            thread::spawn(move || frame.variables())
        })
        .collect::<Vec<_>>();
    for handle in handles {
        let variables = handle.join().unwrap();
        assert_eq!(names(&variables), ["a", "b"]);
    }
    assert_eq!(thread.fetches(), 1);
}

#[test]
fn has_variables_follows_suspension() {
    let thread = RecordingThread::with_variables(&[]);
    let frame = frame_on(&thread);
    assert!(!frame.has_variables());
    thread.suspended.store(true, Ordering::SeqCst);
    assert!(frame.has_variables());
    assert_eq!(thread.fetches(), 0);
}

#[test]
fn control_queries_and_actions_pass_through() {
    let thread = RecordingThread::with_variables(&[]);
    let frame = frame_on(&thread);

    assert!(frame.can_step_into());
    assert!(!frame.can_step_over());
    assert!(frame.can_step_return());
    assert!(!frame.is_stepping());
    assert!(frame.can_resume());
    assert!(!frame.can_suspend());
    assert!(frame.can_terminate());
    assert!(!frame.is_suspended());
    assert!(!frame.is_terminated());
    frame.step_into().unwrap();
    frame.step_over().unwrap();
    frame.resume().unwrap();
    frame.terminate().unwrap();

    assert_eq!(
        thread.calls(),
        [
            "can_step_into",
            "can_step_over",
            "can_step_return",
            "is_stepping",
            "can_resume",
            "can_suspend",
            "can_terminate",
            "is_suspended",
            "is_terminated",
            "step_into",
            "step_over",
            "resume",
            "terminate",
        ]
    );
    assert_eq!(thread.fetches(), 0);
}

#[test]
fn step_return_invokes_the_action() {
    let thread = RecordingThread::with_variables(&[]);
    let frame = frame_on(&thread);
    frame.step_return().unwrap();
    assert_eq!(thread.calls(), ["step_return"]);
}

#[test]
fn control_errors_propagate_unchanged() {
    let thread = RecordingThread::with_variables(&[]);
    let frame = frame_on(&thread);
    let err = frame.suspend().unwrap_err();
    assert_eq!(err, thread.suspend().unwrap_err());
    assert_eq!(err.to_string(), "cannot suspend while suspended");
}

#[test]
fn control_actions_leave_cache_alone() {
    let thread = RecordingThread::with_variables(&[("x", "1")]);
    let frame = frame_on(&thread);
    frame.variables();
    frame.resume().unwrap();
    frame.step_over().unwrap();
    assert!(!frame.is_dirty());
}

#[test]
fn unknown_surfaces_are_fixed() {
    let thread = RecordingThread::with_variables(&[]);
    let frame = frame_on(&thread);
    assert!(frame.register_groups().is_empty());
    assert!(!frame.has_register_groups());
    assert_eq!(frame.char_start(), -1);
    assert_eq!(frame.char_end(), -1);
    assert!(thread.calls().is_empty());
}

#[test]
fn renders_protocol_frame() {
    let thread = RecordingThread::with_variables(&[]);
    let frame = StackFrame::new(
        thread.clone(),
        RawStackFrame::new("proc1", 42).with_source("public.proc1"),
    );
    let json = serde_json::to_string(&frame.to_protocol(3)).unwrap();
    expect![[r#"{"id":3,"name":"proc1 line: 42","source":{"name":"proc1","path":"public.proc1"},"line":42,"column":0}"#]]
        .assert_eq(&json);
}

#[test]
fn renders_protocol_variables() {
    let thread = Arc::new(RecordingThread::default());
    *thread.variables.lock() = vec![
        DebugVariable::typed("total", "12.50", "numeric"),
        DebugVariable::new("label", "abc"),
    ];
    let frame = frame_on(&thread);
    let rendered = frame
        .variables()
        .iter()
        .map(VariableView::to_protocol)
        .collect::<Vec<_>>();
    let json = serde_json::to_string(&rendered).unwrap();
    expect![[r#"[{"name":"total","value":"12.50","type":"numeric","variablesReference":0},{"name":"label","value":"abc","variablesReference":0}]"#]]
        .assert_eq(&json);
}
