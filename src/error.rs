//! Error types for the cv-workflow library.
//!
//! One enum, [`WorkflowError`], covers every way a step can fail. The
//! variants fall into three groups:
//!
//! * **Remote** — the service answered, but not with success
//!   ([`WorkflowError::RemoteCallFailed`]), answered with a body we cannot
//!   use ([`WorkflowError::MalformedResponse`]), or could not be reached
//!   at all ([`WorkflowError::Transport`]).
//! * **Ordering** — a step was invoked before its prerequisite succeeded
//!   ([`WorkflowError::StepNotReady`]). No request is sent.
//! * **Local** — the document or a form edit was rejected before anything
//!   went over the wire.
//!
//! None of them mutate session state: a [`crate::workflow::Session`] only
//! replaces its state after a transition returns `Ok`.

use crate::workflow::Step;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the cv-workflow library.
#[derive(Debug, Error)]
pub enum WorkflowError {
    // ── Remote errors ─────────────────────────────────────────────────────
    /// The service returned a non-2xx status.
    ///
    /// Displays as the raw response body and nothing else: the service text
    /// is the whole error surface shown to the user.
    #[error("{body}")]
    RemoteCallFailed { step: Step, status: u16, body: String },

    /// The request never produced a status (connection refused, DNS,
    /// timeout, broken body stream).
    #[error("{step} request could not be completed: {source}")]
    Transport {
        step: Step,
        #[source]
        source: reqwest::Error,
    },

    /// A 2xx response whose body does not have the expected shape.
    #[error("{step} response is malformed: {detail}")]
    MalformedResponse { step: Step, detail: String },

    // ── Ordering errors ───────────────────────────────────────────────────
    /// The step's prerequisite has not completed in this session.
    #[error("Cannot {step} yet: {reason}")]
    StepNotReady { step: Step, reason: &'static str },

    // ── Upload errors ─────────────────────────────────────────────────────
    /// Document was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Extension is not one of pdf, doc, docx.
    #[error("Unsupported file type '{extension}' for '{path}'\nChoose a .pdf, .doc or .docx file.")]
    UnsupportedFileType { path: PathBuf, extension: String },

    /// The leading bytes contradict the file extension.
    #[error("'{path}' does not look like a {expected} file (first bytes: {magic:02x?})")]
    ContentMismatch {
        path: PathBuf,
        expected: &'static str,
        magic: Vec<u8>,
    },

    /// Reading the document failed after it was found.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Form errors ───────────────────────────────────────────────────────
    /// A form edit was rejected; the field keeps its previous value.
    #[error("Invalid value {value:?} for {field}: {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// Unknown form field name.
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl WorkflowError {
    /// The step this error belongs to, when it came from a remote call or
    /// an ordering check.
    pub fn step(&self) -> Option<Step> {
        match self {
            WorkflowError::RemoteCallFailed { step, .. }
            | WorkflowError::Transport { step, .. }
            | WorkflowError::MalformedResponse { step, .. }
            | WorkflowError::StepNotReady { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// HTTP status of a failed remote call.
    pub fn status(&self) -> Option<u16> {
        match self {
            WorkflowError::RemoteCallFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}
