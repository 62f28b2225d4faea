use super::client::OpenAiHttpClient;
use super::sse::{parse_line, SseEvent, SseLineBuffer};
use super::types::{ChatCompletionRequest, ChatMessage, ChatMessageContent, MessagePart};
use crate::ai::{AnalysisResponse, CompletionService};
use crate::input::Credential;
use crate::models::{AnalysisRequest, ResponseMode};
use crate::{Error, Result};
use async_trait::async_trait;
use futures_util::StreamExt;

/// Chat completions client that sends one text part and one image part.
pub struct OpenAiVisionClient {
    http: OpenAiHttpClient,
}

impl OpenAiVisionClient {
    pub fn new(base_url: String) -> Result<Self> {
        Ok(Self {
            http: OpenAiHttpClient::new(base_url)?,
        })
    }

    pub fn new_with_client(base_url: String, client: reqwest::Client) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(base_url, client),
        }
    }

    fn build_request(request: &AnalysisRequest, stream: bool) -> ChatCompletionRequest {
        let user_message = ChatMessage {
            role: "user".to_string(),
            content: Some(ChatMessageContent::Parts(vec![
                MessagePart::text(request.prompt().to_string()),
                MessagePart::image_url(request.image().data_url()),
            ])),
        };

        ChatCompletionRequest {
            model: request.model().to_string(),
            messages: vec![user_message],
            max_tokens: request.max_tokens(),
            stream,
        }
    }

    async fn complete_once(
        &self,
        request: &ChatCompletionRequest,
        credential: &Credential,
    ) -> Result<AnalysisResponse> {
        let response = self.http.chat_completion(request, credential).await?;

        let text = response
            .choices
            .first()
            .and_then(|choice| match &choice.message.content {
                Some(ChatMessageContent::Text(text)) => Some(text.clone()),
                _ => None,
            })
            .ok_or_else(|| Error::AiProvider("No response from OpenAI chat API".to_string()))?;

        tracing::info!("Received description ({} chars)", text.chars().count());
        Ok(AnalysisResponse::single(text))
    }

    async fn complete_streaming(
        &self,
        request: &ChatCompletionRequest,
        credential: &Credential,
    ) -> Result<AnalysisResponse> {
        let response = self.http.chat_completion_stream(request, credential).await?;
        let body = response.bytes_stream();

        let fragments = async_stream::stream! {
            futures_util::pin_mut!(body);
            let mut lines = SseLineBuffer::default();
            loop {
                let (batch, finished) = match body.next().await {
                    Some(Ok(chunk)) => (lines.push(&chunk), false),
                    Some(Err(e)) => {
                        tracing::error!("OpenAI stream interrupted: {}", e);
                        yield Err(Error::Http(e));
                        return;
                    }
                    None => (lines.finish(), true),
                };

                for line in batch {
                    match parse_line(&line) {
                        Ok(SseEvent::Fragment(text)) => yield Ok(text),
                        Ok(SseEvent::Done) => return,
                        Ok(SseEvent::Skip) => {}
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }

                if finished {
                    tracing::debug!("OpenAI stream ended without [DONE]");
                    return;
                }
            }
        };

        Ok(AnalysisResponse::streaming(fragments))
    }
}

#[cfg(test)]
impl OpenAiVisionClient {
    fn for_server(base_url: String) -> Self {
        Self::new_with_client(base_url, reqwest::Client::new())
    }
}

#[async_trait]
impl CompletionService for OpenAiVisionClient {
    async fn submit(
        &self,
        request: &AnalysisRequest,
        credential: &Credential,
        mode: ResponseMode,
    ) -> Result<AnalysisResponse> {
        tracing::debug!(
            "Sending {} analysis request (model: {}, {} bytes of base64)",
            match mode {
                ResponseMode::Streaming => "streaming",
                ResponseMode::SingleShot => "single-shot",
            },
            request.model(),
            request.image().data.len()
        );

        match mode {
            ResponseMode::Streaming => {
                let body = Self::build_request(request, true);
                self.complete_streaming(&body, credential).await
            }
            ResponseMode::SingleShot => {
                let body = Self::build_request(request, false);
                self.complete_once(&body, credential).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::openai::client::CHAT_COMPLETIONS_PATH;
    use crate::models::{EncodedImage, Variant};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(variant: Variant) -> AnalysisRequest {
        AnalysisRequest::new(
            "Describe lo que ves en la imagen en español.".to_string(),
            EncodedImage {
                mime_type: "image/png".to_string(),
                data: "iVBORw0KGgo=".to_string(),
            },
            variant,
        )
    }

    fn credential() -> Credential {
        Credential::new("test-key").unwrap()
    }

    fn sse_body(fragments: &[&str]) -> String {
        let mut body = String::new();
        body.push_str(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"},\"finish_reason\":null}]}\n\n",
        );
        for fragment in fragments {
            let chunk = serde_json::json!({
                "choices": [{ "delta": { "content": fragment }, "finish_reason": null }]
            });
            body.push_str(&format!("data: {}\n\n", chunk));
        }
        body.push_str("data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n");
        body.push_str("data: [DONE]\n\n");
        body
    }

    #[tokio::test]
    async fn test_single_shot_parses_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_PATH))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "max_tokens": 500,
                "stream": false,
                "messages": [{
                    "role": "user",
                    "content": [
                        { "type": "text", "text": "Describe lo que ves en la imagen en español." },
                        { "type": "image_url", "image_url": { "url": "data:image/png;base64,iVBORw0KGgo=" } }
                    ]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "Un gato naranja." },
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiVisionClient::for_server(server.uri());
        let response = client
            .submit(&request(Variant::Canvas), &credential(), ResponseMode::SingleShot)
            .await
            .unwrap();

        assert_eq!(response.collect_text().await.unwrap(), "Un gato naranja.");
    }

    #[tokio::test]
    async fn test_streaming_yields_fragments_in_order() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_PATH))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o",
                "max_tokens": 1200,
                "stream": true
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_body(&["Hola", " mundo"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiVisionClient::for_server(server.uri());
        let mut response = client
            .submit(&request(Variant::Upload), &credential(), ResponseMode::Streaming)
            .await
            .unwrap();

        let mut fragments = Vec::new();
        while let Some(fragment) = response.next_fragment().await {
            fragments.push(fragment.unwrap());
        }
        assert_eq!(fragments, vec!["Hola", " mundo"]);
    }

    #[tokio::test]
    async fn test_streaming_malformed_chunk_surfaces_error() {
        let server = MockServer::start().await;

        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"Hola\"}}]}\n\ndata: {oops\n\n";
        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let client = OpenAiVisionClient::for_server(server.uri());
        let mut response = client
            .submit(&request(Variant::Upload), &credential(), ResponseMode::Streaming)
            .await
            .unwrap();

        assert_eq!(response.next_fragment().await.unwrap().unwrap(), "Hola");
        let err = response.next_fragment().await.unwrap().unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
        assert!(response.next_fragment().await.is_none());
    }

    #[tokio::test]
    async fn test_rejected_credential_returns_ai_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let client = OpenAiVisionClient::for_server(server.uri());
        let err = client
            .submit(&request(Variant::Upload), &credential(), ResponseMode::Streaming)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::AiProvider(_)));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_single_shot_rejects_empty_choices() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let client = OpenAiVisionClient::for_server(server.uri());
        let err = client
            .submit(&request(Variant::Canvas), &credential(), ResponseMode::SingleShot)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_single_shot_unparseable_body_is_serialization_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let client = OpenAiVisionClient::for_server(server.uri());
        let err = client
            .submit(&request(Variant::Canvas), &credential(), ResponseMode::SingleShot)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
        assert_eq!(err.kind(), crate::FailureKind::RequestFailure);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        let client = OpenAiVisionClient::for_server("http://127.0.0.1:9".to_string());
        let err = client
            .submit(&request(Variant::Canvas), &credential(), ResponseMode::SingleShot)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
