//! Replay of a recorded suspension as DAP response bodies.

use serde::Serialize;

use crate::backend::{ScriptedBackend, Transcript};
use crate::config::SessionConfig;
use crate::error::FetchError;
use crate::protocol::{Scope, ScopesResponseBody, StackTraceResponseBody, VariablesResponseBody};
use crate::session::DebugSession;

/// Variables reference of the innermost frame's locals scope.
pub const LOCALS_REFERENCE: u32 = 1;

/// Responses a front end would receive for one suspension. Scopes and
/// variables cover the innermost frame, the only level the debugger reports
/// variables for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Replay {
    pub stack_trace: StackTraceResponseBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<ScopesResponseBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<VariablesResponseBody>,
    #[serde(skip)]
    pub fetch_error: Option<FetchError>,
}

/// Stop a scripted session on `transcript` and collect its responses.
pub fn replay(transcript: Transcript, config: SessionConfig) -> Result<Replay, FetchError> {
    let session = DebugSession::new(ScriptedBackend::new(transcript), config);
    session.handle_stopped();

    let frames = session.stack_frames()?;
    let stack_trace = session.stack_trace()?;
    let Some(frame) = frames.first() else {
        return Ok(Replay {
            stack_trace,
            scopes: None,
            variables: None,
            fetch_error: None,
        });
    };
    let scopes = ScopesResponseBody {
        scopes: vec![Scope {
            name: "Locals".to_string(),
            variables_reference: LOCALS_REFERENCE,
            expensive: false,
        }],
    };
    let variables = VariablesResponseBody {
        variables: frame
            .variables()
            .iter()
            .map(|variable| variable.to_protocol())
            .collect(),
    };
    Ok(Replay {
        stack_trace,
        scopes: Some(scopes),
        variables: Some(variables),
        fetch_error: frame.last_fetch_error(),
    })
}
