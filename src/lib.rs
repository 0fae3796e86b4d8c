//! # cv-workflow
//!
//! Client for a CV processing service: upload a document, let the service
//! extract candidate fields from it, review and edit those fields, then
//! submit them for e-mail generation.
//!
//! The service does all the heavy lifting. This crate keeps the per-session
//! state, enforces the order of the steps, renders the extracted record as
//! an editable form, and reports the service's own error text when a call
//! fails.
//!
//! ## Workflow Overview
//!
//! ```text
//! document
//!  │
//!  ├─ 1. Upload   POST /cvs/save        multipart file  → { key }
//!  ├─ 2. Extract  POST /cvs/extract     { fileId: key } → partial profile
//!  ├─ 3. Review   ProfileForm           edit fields locally
//!  └─ 4. Submit   POST /emails/generate CandidateProfile → JSON response
//! ```
//!
//! Each step is only available after the previous one succeeded. A failed
//! call leaves the session exactly as it was, so the step can be retried.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cv_workflow::{ClientConfig, FileUpload, FormField, HttpApi, Session};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = HttpApi::new(ClientConfig::default())?;
//!     let mut session = Session::new(Arc::new(api));
//!
//!     session.upload(&FileUpload::from_path("cv.pdf").await?).await?;
//!     session.extract().await?;
//!
//!     let mut form = session.review_form()?;
//!     form.set(FormField::Age, "30")?;
//!
//!     let state = session.submit(&form.to_profile()).await?;
//!     println!("{}", serde_json::to_string_pretty(&state.response())?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `cvflow` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod profile;
pub mod progress;
pub mod upload;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use api::{HttpApi, RemoteReply, WorkflowApi};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_API_BASE};
pub use error::WorkflowError;
pub use form::{join_list, split_int_list, split_list, FormField, ProfileForm};
pub use profile::{CandidateProfile, ExtractedProfile, HoursAWeek, SalaryPeriod, TravelMode};
pub use progress::{NoopObserver, Observer, StepObserver};
pub use upload::{DocumentKind, FileUpload};
pub use workflow::{ExtractedFields, Session, Step, WorkflowState};
