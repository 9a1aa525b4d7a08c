//! Error types for the input resolver
//!
//! Two layers:
//! - [`RuntimeError`]: a single failed call against the XR runtime. Per-frame
//!   callers degrade these to defaults and keep going.
//! - [`InputError`]: a failure while constructing an input source. These are
//!   surfaced to the caller and the device is not created.

use thiserror::Error;

use crate::runtime::ActionKind;

/// Failure of one capability call against the XR runtime
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The runtime returned a failure code for the call
    #[error("runtime call `{call}` failed with result {code}")]
    CallFailed { call: &'static str, code: i32 },

    /// The capability is not available on this runtime
    #[error("runtime capability `{0}` is not supported")]
    Unsupported(&'static str),

    /// The handle passed to the call is not known to the runtime
    #[error("unknown handle {0} passed to `{1}`")]
    InvalidHandle(u64, &'static str),
}

impl RuntimeError {
    pub fn failed(call: &'static str, code: i32) -> Self {
        RuntimeError::CallFailed { call, code }
    }
}

/// Construction-time failure of an input source or session
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to create action `{name}`")]
    ActionCreation {
        name: String,
        #[source]
        source: RuntimeError,
    },

    #[error("action `{name}` already exists as {existing:?}, requested {requested:?}")]
    ActionKindMismatch {
        name: String,
        existing: ActionKind,
        requested: ActionKind,
    },

    #[error("failed to suggest {count} bindings for profile `{profile}`")]
    SuggestBindings {
        profile: String,
        count: usize,
        #[source]
        source: RuntimeError,
    },

    #[error("failed to create hand tracker")]
    HandTracker(#[source] RuntimeError),

    #[error("empty binding path for action `{0}`")]
    EmptyBindingPath(String),
}
