use super::{AnalysisResponse, CompletionService};
use crate::input::Credential;
use crate::models::{AnalysisRequest, ResponseMode};
use crate::{Error, Result};
use async_trait::async_trait;
use futures_util::stream;
use std::sync::{Arc, Mutex};

pub struct MockCompletionClient {
    responses: Arc<Mutex<Vec<Vec<String>>>>,
    submitted: Arc<Mutex<Vec<(AnalysisRequest, ResponseMode)>>>,
    failure: Arc<Mutex<Option<String>>>,
    mid_stream_failure: Arc<Mutex<Option<String>>>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            submitted: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            mid_stream_failure: Arc::new(Mutex::new(None)),
        }
    }

    /// Queue a response delivered as the given fragments.
    pub fn with_fragments(self, fragments: &[&str]) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(fragments.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn with_response(self, text: &str) -> Self {
        self.with_fragments(&[text])
    }

    /// Fail every submission before any text is produced.
    pub fn with_failure(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Deliver the queued fragments, then fail.
    pub fn with_mid_stream_failure(self, message: &str) -> Self {
        *self.mid_stream_failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn submitted_prompts(&self) -> Vec<String> {
        self.submitted
            .lock()
            .unwrap()
            .iter()
            .map(|(request, _)| request.prompt().to_string())
            .collect()
    }

    pub fn submitted_requests(&self) -> Vec<(AnalysisRequest, ResponseMode)> {
        self.submitted.lock().unwrap().clone()
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionService for MockCompletionClient {
    async fn submit(
        &self,
        request: &AnalysisRequest,
        _credential: &Credential,
        mode: ResponseMode,
    ) -> Result<AnalysisResponse> {
        let call = {
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push((request.clone(), mode));
            submitted.len()
        };

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::AiProvider(message));
        }

        let fragments = {
            let responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                // Default mock response
                vec!["Una imagen de prueba.".to_string()]
            } else {
                responses[(call - 1) % responses.len()].clone()
            }
        };

        let mut items: Vec<Result<String>> = Vec::new();
        match mode {
            ResponseMode::Streaming => items.extend(fragments.into_iter().map(Ok)),
            ResponseMode::SingleShot => items.push(Ok(fragments.concat())),
        }
        if let Some(message) = self.mid_stream_failure.lock().unwrap().clone() {
            items.push(Err(Error::AiProvider(message)));
        }

        Ok(AnalysisResponse::streaming(stream::iter(items)))
    }
}
