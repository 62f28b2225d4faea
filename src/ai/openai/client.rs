use super::types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::input::Credential;
use crate::{Error, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Thin HTTP layer shared by OpenAI request types.
///
/// Holds no credential; every call receives one. No request timeout is set,
/// so the transport's own limits apply.
pub struct OpenAiHttpClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
}

impl OpenAiHttpClient {
    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::new_with_client(base_url, client))
    }

    pub fn new_with_client(base_url: String, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// POST a JSON body and return the raw response once the status is known to be successful.
    pub async fn send<Req: Serialize>(
        &self,
        path: &str,
        request: &Req,
        credential: &Credential,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(credential.expose())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to OpenAI: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("OpenAI API error (status {}): {}", status, error_text);
            return Err(Error::AiProvider(format!(
                "OpenAI API error (status {}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }

    pub async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        request: &Req,
        credential: &Credential,
    ) -> Result<Resp> {
        let response = self.send(path, request, credential).await?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse OpenAI response: {}\nBody: {}", e, body);
            Error::Serialization(e)
        })
    }

    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
        credential: &Credential,
    ) -> Result<ChatCompletionResponse> {
        self.post(CHAT_COMPLETIONS_PATH, request, credential).await
    }

    /// Start a streamed chat completion; the body is left unread.
    pub async fn chat_completion_stream(
        &self,
        request: &ChatCompletionRequest,
        credential: &Credential,
    ) -> Result<Response> {
        self.send(CHAT_COMPLETIONS_PATH, request, credential).await
    }
}
