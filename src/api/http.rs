//! [`WorkflowApi`] over HTTP with reqwest.

use super::{RemoteReply, WorkflowApi};
use crate::config::{ClientConfig, EXTRACT_PATH, GENERATE_PATH, SAVE_PATH};
use crate::error::WorkflowError;
use crate::profile::CandidateProfile;
use crate::upload::FileUpload;
use crate::workflow::Step;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use tracing::{debug, info};

/// Talks to the CV service at [`ClientConfig::api_base`].
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    config: ClientConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractRequest<'a> {
    file_id: &'a str,
}

impl HttpApi {
    /// Build a client from the configuration. No timeout is applied unless
    /// the configuration sets one.
    pub fn new(config: ClientConfig) -> Result<Self, WorkflowError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(t) = config.timeout() {
            builder = builder.timeout(t);
        }
        if let Some(t) = config.connect_timeout() {
            builder = builder.connect_timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| WorkflowError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send(&self, step: Step, request: RequestBuilder) -> Result<RemoteReply, WorkflowError> {
        let response = request
            .send()
            .await
            .map_err(|source| WorkflowError::Transport { step, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| WorkflowError::Transport { step, source })?;

        debug!("{step}: HTTP {} ({} bytes)", status.as_u16(), body.len());
        Ok(RemoteReply::new(status.as_u16(), body))
    }
}

#[async_trait]
impl WorkflowApi for HttpApi {
    async fn save_file(&self, upload: &FileUpload) -> Result<RemoteReply, WorkflowError> {
        let url = self.config.endpoint(SAVE_PATH);
        info!("Uploading {} to {}", upload.file_name, url);

        let part = Part::bytes(upload.content.clone())
            .file_name(upload.file_name.clone())
            .mime_str(upload.mime_type())
            .map_err(|source| WorkflowError::Transport {
                step: Step::Upload,
                source,
            })?;
        let form = Form::new().part("file", part);

        self.send(Step::Upload, self.client.post(url).multipart(form))
            .await
    }

    async fn extract(&self, file_key: &str) -> Result<RemoteReply, WorkflowError> {
        let url = self.config.endpoint(EXTRACT_PATH);
        info!("Requesting extraction of {} from {}", file_key, url);

        let body = ExtractRequest { file_id: file_key };
        self.send(Step::Extract, self.client.post(url).json(&body))
            .await
    }

    async fn generate(&self, profile: &CandidateProfile) -> Result<RemoteReply, WorkflowError> {
        let url = self.config.endpoint(GENERATE_PATH);
        info!("Submitting profile for '{}' to {}", profile.name, url);

        self.send(Step::Submit, self.client.post(url).json(profile))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_request_uses_file_id_key() {
        let v = serde_json::to_value(ExtractRequest { file_id: "f1" }).unwrap();
        assert_eq!(v, serde_json::json!({"fileId": "f1"}));
    }

    #[test]
    fn new_keeps_config() {
        let config = ClientConfig::builder()
            .api_base("http://127.0.0.1:9/api")
            .timeout_secs(5)
            .build()
            .unwrap();
        let api = HttpApi::new(config.clone()).unwrap();
        assert_eq!(api.config(), &config);
    }
}
