//! Completion service integration
//!
//! Sends the prompt and encoded image to a hosted multimodal chat completion
//! endpoint. Streaming and single-shot replies are both surfaced as an
//! [`AnalysisResponse`].

pub mod mock;
pub mod openai;
pub mod response;

pub use mock::MockCompletionClient;
pub use openai::OpenAiVisionClient;
pub use response::AnalysisResponse;

use crate::input::Credential;
use crate::models::{AnalysisRequest, ResponseMode};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Submit one request. The credential is supplied per call and never stored.
    async fn submit(
        &self,
        request: &AnalysisRequest,
        credential: &Credential,
        mode: ResponseMode,
    ) -> Result<AnalysisResponse>;
}
