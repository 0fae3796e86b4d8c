//! Client configuration.
//!
//! All connection behaviour is controlled through [`ClientConfig`], built via
//! its [`ClientConfigBuilder`]. The defaults match a service running locally
//! on port 3000 with no timeouts: a slow extraction simply blocks the step
//! until the service answers.

use crate::error::WorkflowError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// API base used when none is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api/v1";

/// Path of the document upload endpoint, relative to the API base.
pub const SAVE_PATH: &str = "/cvs/save";
/// Path of the field extraction endpoint.
pub const EXTRACT_PATH: &str = "/cvs/extract";
/// Path of the submission endpoint.
pub const GENERATE_PATH: &str = "/emails/generate";

/// Configuration for talking to the CV service.
///
/// # Example
/// ```rust
/// use cv_workflow::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .api_base("http://cv.internal:8080/api/v1/")
///     .timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.endpoint("/cvs/save"), "http://cv.internal:8080/api/v1/cvs/save");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to. Stored without a
    /// trailing slash. Default: [`DEFAULT_API_BASE`].
    pub api_base: String,

    /// Whole-request timeout in seconds. Default: none.
    ///
    /// Extraction runs a model on the service side and can take a long
    /// time, so the client waits indefinitely unless told otherwise.
    pub timeout_secs: Option<u64>,

    /// TCP connect timeout in seconds. Default: none.
    pub connect_timeout_secs: Option<u64>,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: None,
            connect_timeout_secs: None,
            user_agent: concat!("cv-workflow/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full URL for an endpoint path such as [`SAVE_PATH`].
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        let base: String = base.into();
        self.config.api_base = base.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = Some(secs);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, WorkflowError> {
        let c = &self.config;
        let url = reqwest::Url::parse(&c.api_base).map_err(|e| {
            WorkflowError::InvalidConfig(format!("API base '{}' is not a URL: {e}", c.api_base))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(WorkflowError::InvalidConfig(format!(
                "API base must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if c.timeout_secs == Some(0) || c.connect_timeout_secs == Some(0) {
            return Err(WorkflowError::InvalidConfig(
                "Timeouts must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_service_without_timeouts() {
        let c = ClientConfig::default();
        assert_eq!(c.api_base, "http://localhost:3000/api/v1");
        assert_eq!(c.timeout(), None);
        assert_eq!(c.connect_timeout(), None);
        assert!(c.user_agent.starts_with("cv-workflow/"));
    }

    #[test]
    fn endpoint_joins_with_single_slash() {
        let c = ClientConfig::builder()
            .api_base("https://example.com/api/v1//")
            .build()
            .unwrap();
        assert_eq!(c.endpoint(SAVE_PATH), "https://example.com/api/v1/cvs/save");
        assert_eq!(c.endpoint("emails/generate"), "https://example.com/api/v1/emails/generate");
    }

    #[test]
    fn rejects_non_http_base() {
        let err = ClientConfig::builder()
            .api_base("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_relative_base() {
        assert!(ClientConfig::builder().api_base("/api/v1").build().is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(ClientConfig::builder().timeout_secs(0).build().is_err());
        assert!(ClientConfig::builder().connect_timeout_secs(0).build().is_err());
    }

    #[test]
    fn timeouts_convert_to_durations() {
        let c = ClientConfig::builder()
            .timeout_secs(30)
            .connect_timeout_secs(5)
            .build()
            .unwrap();
        assert_eq!(c.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(c.connect_timeout(), Some(Duration::from_secs(5)));
    }
}
