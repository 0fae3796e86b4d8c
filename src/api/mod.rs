//! The seam between the workflow and the CV service.
//!
//! [`WorkflowApi`] has one method per remote call. Implementations return
//! the raw [`RemoteReply`] for any HTTP status and reserve `Err` for calls
//! that never got a status back. Deciding what a status means is the
//! workflow's job, which keeps the transitions in [`crate::workflow`] pure
//! and lets tests drive them with a canned reply.
//!
//! ```text
//! Session ──▶ WorkflowApi ──▶ RemoteReply ──▶ WorkflowState::after_*
//!             (HttpApi / fake)  (status, body)   (pure transition)
//! ```

pub mod http;

use crate::error::WorkflowError;
use crate::profile::CandidateProfile;
use crate::upload::FileUpload;
use crate::workflow::Step;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

pub use http::HttpApi;

/// Status and body text of one remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteReply {
    pub status: u16,
    pub body: String,
}

impl RemoteReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body of a 2xx reply; any other status becomes
    /// [`WorkflowError::RemoteCallFailed`] carrying the body verbatim.
    pub fn into_success(self, step: Step) -> Result<String, WorkflowError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(WorkflowError::RemoteCallFailed {
                step,
                status: self.status,
                body: self.body,
            })
        }
    }

    /// Decode the body of a 2xx reply as JSON.
    pub fn into_json<T: DeserializeOwned>(self, step: Step) -> Result<T, WorkflowError> {
        let body = self.into_success(step)?;
        serde_json::from_str(&body).map_err(|e| WorkflowError::MalformedResponse {
            step,
            detail: format!("{e} (body: {})", truncate(&body, 200)),
        })
    }
}

/// The three calls the workflow makes.
///
/// Implementations must be `Send + Sync` so a session can be moved across
/// tasks.
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    /// `POST /cvs/save` with the document as a multipart `file` part.
    async fn save_file(&self, upload: &FileUpload) -> Result<RemoteReply, WorkflowError>;

    /// `POST /cvs/extract` with `{"fileId": file_key}`.
    async fn extract(&self, file_key: &str) -> Result<RemoteReply, WorkflowError>;

    /// `POST /emails/generate` with the reviewed profile.
    async fn generate(&self, profile: &CandidateProfile) -> Result<RemoteReply, WorkflowError>;
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max).collect();
        format!("{cut}\u{2026}")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn success_range_is_2xx() {
        assert!(RemoteReply::new(200, "").is_success());
        assert!(RemoteReply::new(204, "").is_success());
        assert!(!RemoteReply::new(302, "").is_success());
        assert!(!RemoteReply::new(500, "").is_success());
    }

    #[test]
    fn failure_keeps_body_verbatim() {
        let err = RemoteReply::new(500, "server error")
            .into_success(Step::Submit)
            .unwrap_err();
        assert_eq!(err.to_string(), "server error");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn non_json_success_is_malformed() {
        let err = RemoteReply::new(200, "<html>")
            .into_json::<Value>(Step::Extract)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::MalformedResponse { step: Step::Extract, .. }));
    }

    #[test]
    fn truncate_long_bodies() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 3), "abc\u{2026}");
    }
}
