//! Session state machine for the upload → extract → submit workflow.
//!
//! ```text
//!          upload ok           extract ok            submit ok
//!   Empty ──────────▶ Uploaded ──────────▶ Extracted ──────────▶ Submitted
//! ```
//!
//! Any failure leaves the state where it was. Steps may be repeated: a new
//! upload from any state goes back to `Uploaded`, extraction may be re-run
//! once a key exists, and submission may be re-run once fields exist.
//!
//! [`WorkflowState`] transitions are pure: `after_*` takes the current state
//! and a [`RemoteReply`] and returns the next state or an error. [`Session`]
//! owns the state, performs the calls through a [`WorkflowApi`], and only
//! replaces its state when a transition returns `Ok`.

use crate::api::{RemoteReply, WorkflowApi};
use crate::error::WorkflowError;
use crate::form::ProfileForm;
use crate::profile::{CandidateProfile, ExtractedProfile};
use crate::progress::{NoopObserver, Observer};
use crate::upload::FileUpload;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// The three remote steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Upload,
    Extract,
    Submit,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Upload => "upload",
            Step::Extract => "extract",
            Step::Submit => "submit",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An extraction result: the decoded record plus the body as received, for
/// display.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    pub raw: Value,
    pub profile: ExtractedProfile,
}

/// Where a session is in the workflow.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum WorkflowState {
    #[default]
    Empty,
    Uploaded {
        file_key: String,
    },
    Extracted {
        file_key: String,
        fields: ExtractedFields,
    },
    Submitted {
        file_key: String,
        fields: ExtractedFields,
        response: Value,
    },
}

#[derive(Deserialize)]
struct SaveResponse {
    key: String,
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Empty => "empty",
            WorkflowState::Uploaded { .. } => "uploaded",
            WorkflowState::Extracted { .. } => "extracted",
            WorkflowState::Submitted { .. } => "submitted",
        }
    }

    pub fn file_key(&self) -> Option<&str> {
        match self {
            WorkflowState::Empty => None,
            WorkflowState::Uploaded { file_key }
            | WorkflowState::Extracted { file_key, .. }
            | WorkflowState::Submitted { file_key, .. } => Some(file_key),
        }
    }

    pub fn extracted(&self) -> Option<&ExtractedFields> {
        match self {
            WorkflowState::Extracted { fields, .. } | WorkflowState::Submitted { fields, .. } => {
                Some(fields)
            }
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&Value> {
        match self {
            WorkflowState::Submitted { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Whether `step` may be invoked from this state.
    pub fn ready_for(&self, step: Step) -> Result<(), WorkflowError> {
        match step {
            Step::Upload => Ok(()),
            Step::Extract if self.file_key().is_none() => Err(WorkflowError::StepNotReady {
                step,
                reason: "no file has been uploaded",
            }),
            Step::Submit if self.extracted().is_none() => Err(WorkflowError::StepNotReady {
                step,
                reason: "no data has been extracted",
            }),
            _ => Ok(()),
        }
    }

    /// Apply an upload reply. A new upload replaces the file key and drops
    /// fields extracted from the previous document.
    pub fn after_upload(&self, reply: RemoteReply) -> Result<WorkflowState, WorkflowError> {
        let saved: SaveResponse = reply.into_json(Step::Upload)?;
        if saved.key.is_empty() {
            return Err(WorkflowError::MalformedResponse {
                step: Step::Upload,
                detail: "empty `key` in save response".into(),
            });
        }
        Ok(WorkflowState::Uploaded {
            file_key: saved.key,
        })
    }

    /// Apply an extraction reply.
    pub fn after_extract(&self, reply: RemoteReply) -> Result<WorkflowState, WorkflowError> {
        self.ready_for(Step::Extract)?;
        let file_key = self.file_key().unwrap_or_default().to_string();

        let raw: Value = reply.into_json(Step::Extract)?;
        let profile =
            ExtractedProfile::from_json(&raw).map_err(|e| WorkflowError::MalformedResponse {
                step: Step::Extract,
                detail: e.to_string(),
            })?;

        Ok(WorkflowState::Extracted {
            file_key,
            fields: ExtractedFields { raw, profile },
        })
    }

    /// Apply a submission reply.
    pub fn after_submit(&self, reply: RemoteReply) -> Result<WorkflowState, WorkflowError> {
        let (file_key, fields) = match self {
            WorkflowState::Extracted { file_key, fields }
            | WorkflowState::Submitted {
                file_key, fields, ..
            } => (file_key.clone(), fields.clone()),
            _ => {
                return Err(WorkflowError::StepNotReady {
                    step: Step::Submit,
                    reason: "no data has been extracted",
                })
            }
        };

        let response: Value = reply.into_json(Step::Submit)?;
        Ok(WorkflowState::Submitted {
            file_key,
            fields,
            response,
        })
    }
}

/// One user's pass through the workflow.
///
/// Every method takes `&mut self`, so a session never has two calls in
/// flight.
pub struct Session {
    api: Arc<dyn WorkflowApi>,
    state: WorkflowState,
    observer: Observer,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("api", &"<dyn WorkflowApi>")
            .field("state", &self.state)
            .finish()
    }
}

impl Session {
    /// Start an empty session.
    pub fn new(api: Arc<dyn WorkflowApi>) -> Self {
        Self {
            api,
            state: WorkflowState::Empty,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = observer;
        self
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn into_state(self) -> WorkflowState {
        self.state
    }

    /// Step 1: send the document and remember the returned key.
    pub async fn upload(&mut self, upload: &FileUpload) -> Result<&WorkflowState, WorkflowError> {
        self.observer.on_step_start(Step::Upload);
        let next = match self.api.save_file(upload).await {
            Ok(reply) => self.state.after_upload(reply),
            Err(e) => Err(e),
        };
        self.commit(Step::Upload, next)
    }

    /// Step 2: ask the service to extract fields from the uploaded document.
    pub async fn extract(&mut self) -> Result<&WorkflowState, WorkflowError> {
        self.state.ready_for(Step::Extract)?;
        let file_key = self.state.file_key().unwrap_or_default().to_string();

        self.observer.on_step_start(Step::Extract);
        let next = match self.api.extract(&file_key).await {
            Ok(reply) => self.state.after_extract(reply),
            Err(e) => Err(e),
        };
        self.commit(Step::Extract, next)
    }

    /// The review form, pre-populated from the extracted fields.
    pub fn review_form(&self) -> Result<ProfileForm, WorkflowError> {
        self.state.ready_for(Step::Submit)?;
        self.state
            .extracted()
            .map(|f| ProfileForm::from_extracted(&f.profile))
            .ok_or(WorkflowError::StepNotReady {
                step: Step::Submit,
                reason: "no data has been extracted",
            })
    }

    /// Step 3: send the reviewed profile.
    pub async fn submit(
        &mut self,
        profile: &CandidateProfile,
    ) -> Result<&WorkflowState, WorkflowError> {
        self.state.ready_for(Step::Submit)?;

        self.observer.on_step_start(Step::Submit);
        let next = match self.api.generate(profile).await {
            Ok(reply) => self.state.after_submit(reply),
            Err(e) => Err(e),
        };
        self.commit(Step::Submit, next)
    }

    fn commit(
        &mut self,
        step: Step,
        next: Result<WorkflowState, WorkflowError>,
    ) -> Result<&WorkflowState, WorkflowError> {
        match next {
            Ok(state) => {
                info!("{step}: {} → {}", self.state.name(), state.name());
                self.state = state;
                self.observer.on_step_complete(step);
                Ok(&self.state)
            }
            Err(e) => {
                warn!("{step} failed, staying {}: {e}", self.state.name());
                self.observer.on_step_error(step, &e.to_string());
                Err(e)
            }
        }
    }
}
