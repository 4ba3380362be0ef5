use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use imoscope_types::{ChatError, ImageAttachment, SERVER_ERROR_FALLBACK};

use crate::request_logger;
use crate::responses::{AnalyzeResponse, ErrorBody, FollowUpRequest, FollowUpResponse};

/// Seam between the conversation controller and the analysis service.
/// The controller only ever talks to this trait; tests script it with a mock.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Upload an image plus the opening prompt, starting a server-side session.
    async fn analyze(
        &self,
        image: &ImageAttachment,
        prompt: &str,
    ) -> Result<AnalyzeResponse, ChatError>;

    /// Ask a follow-up question on an existing session.
    async fn follow_up(
        &self,
        session_id: &str,
        prompt: &str,
    ) -> Result<FollowUpResponse, ChatError>;
}

/// reqwest implementation of [`AnalysisBackend`].
pub struct AnalysisClient {
    base_url: String,
    client: reqwest::Client,
}

impl AnalysisClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn analyze_url(&self) -> String {
        format!("{}/api/analyze", self.base_url)
    }

    fn followup_url(&self) -> String {
        format!("{}/api/followup", self.base_url)
    }

    /// Map a non-success response to `ChatError::Server`, preferring the
    /// service's own error text over the generic fallback.
    async fn server_error(response: reqwest::Response) -> ChatError {
        let status = response.status();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) if !body.error.is_empty() => body.error,
            _ => SERVER_ERROR_FALLBACK.to_string(),
        };
        request_logger::log_failure(status.as_u16(), &message);
        ChatError::Server(message)
    }
}

#[async_trait]
impl AnalysisBackend for AnalysisClient {
    async fn analyze(
        &self,
        image: &ImageAttachment,
        prompt: &str,
    ) -> Result<AnalyzeResponse, ChatError> {
        let url = self.analyze_url();
        request_logger::log_analyze_request(&url, &image.file_name, image.bytes.len(), prompt);

        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(image.format.mime())
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        let form = Form::new().part("image", part).text("prompt", prompt.to_string());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        let parsed: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Server(format!("Malformed response from server: {}", e)))?;
        request_logger::log_analyze_response(&parsed);
        Ok(parsed)
    }

    async fn follow_up(
        &self,
        session_id: &str,
        prompt: &str,
    ) -> Result<FollowUpResponse, ChatError> {
        let url = self.followup_url();
        let request = FollowUpRequest {
            session_id: session_id.to_string(),
            prompt: prompt.to_string(),
        };
        request_logger::log_followup_request(&url, &request);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ChatError::Server(format!("Malformed response from server: {}", e)))
    }
}
