//! Application orchestration for one image analysis.
//!
//! Each triggered action runs collect → encode → build prompt → request →
//! render to completion. Every failure ends up as a view on the surface; none
//! propagates out of [`App::analyze`].

use crate::ai::{CompletionService, OpenAiVisionClient};
use crate::input::{Credential, ImageSource, InputForm};
use crate::models::{AnalysisRequest, Config, EncodedImage, ResponseMode, Variant};
use crate::render::{ResponseRenderer, Surface, View, Warning};
use crate::{image, prompts, Error, Result};
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

/// How an analysis ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Completed(String),
    /// Preconditions were missing; no request was sent.
    Rejected(Vec<Warning>),
    /// A user-facing error message was shown.
    Failed(String),
}

impl AnalysisOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisOutcome::Completed(_))
    }
}

/// Runs the analysis pipeline against a completion service.
pub struct App {
    completion: Box<dyn CompletionService>,
    variant: Variant,
}

impl App {
    /// Build an app from a concrete completion service.
    ///
    /// Integration tests use this to inject mocks.
    pub fn with_services(completion: Box<dyn CompletionService>, variant: Variant) -> Self {
        Self {
            completion,
            variant,
        }
    }

    /// Construct an app talking to the OpenAI endpoint named in the config.
    pub fn from_config(config: &Config, variant: Variant) -> Result<Self> {
        info!(
            "Completion provider: OpenAI at {} (model: {})",
            config.openai_base_url,
            variant.model()
        );
        let client = OpenAiVisionClient::new(config.openai_base_url.clone())?;
        Ok(Self::with_services(Box::new(client), variant))
    }

    /// Run one analysis for the current form state.
    pub async fn analyze(
        &self,
        form: &InputForm,
        surface: &mut dyn Surface,
        mode: ResponseMode,
    ) -> AnalysisOutcome {
        let analysis_id = Uuid::new_v4();
        let span = tracing::info_span!("analysis", id = %analysis_id, variant = ?self.variant);
        self.run(form, surface, mode).instrument(span).await
    }

    async fn run(
        &self,
        form: &InputForm,
        surface: &mut dyn Surface,
        mode: ResponseMode,
    ) -> AnalysisOutcome {
        let mut renderer = ResponseRenderer::new(surface, mode);

        let (source, credential) = match Self::check_preconditions(form) {
            Ok(inputs) => inputs,
            Err(missing) => {
                for e in &missing {
                    warn!("Analysis rejected: {}", e);
                }
                let warnings: Vec<Warning> =
                    missing.iter().filter_map(Warning::for_error).collect();
                renderer.reject(&warnings);
                return AnalysisOutcome::Rejected(warnings);
            }
        };

        let encoded = match encode_source(source.clone()).await {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("Failed to encode image: {}", e);
                return AnalysisOutcome::Failed(renderer.fail(&e));
            }
        };

        let prompt = prompts::build_prompt(prompts::BASE_INSTRUCTION, form.optional_context());
        let request = AnalysisRequest::new(prompt, encoded, self.variant);
        info!(
            "Submitting analysis (prompt: {} chars, image: {})",
            request.prompt().chars().count(),
            request.image().mime_type
        );

        renderer.begin();
        let mut response = match self.completion.submit(&request, credential, mode).await {
            Ok(response) => response,
            Err(e) => {
                error!("Analysis request failed: {}", e);
                return AnalysisOutcome::Failed(renderer.fail(&e));
            }
        };

        while let Some(fragment) = response.next_fragment().await {
            match fragment {
                Ok(text) => renderer.push_fragment(&text),
                Err(e) => {
                    error!(
                        "Analysis failed after {} chars: {}",
                        renderer.text().chars().count(),
                        e
                    );
                    return AnalysisOutcome::Failed(renderer.fail(&e));
                }
            }
        }

        let text = renderer.complete();
        info!("Analysis complete ({} chars)", text.chars().count());
        AnalysisOutcome::Completed(text)
    }

    /// One error per missing input, in display order.
    fn check_preconditions(
        form: &InputForm,
    ) -> std::result::Result<(&ImageSource, &Credential), Vec<Error>> {
        match (&form.image, &form.credential) {
            (Some(source), Some(credential)) => Ok((source, credential)),
            (image, credential) => {
                let mut missing = Vec::new();
                if image.is_none() {
                    missing.push(Error::MissingImage);
                }
                if credential.is_none() {
                    missing.push(Error::MissingCredential);
                }
                Err(missing)
            }
        }
    }
}

/// Show a failure that stopped the analysis before it could start.
pub fn report_setup_failure(surface: &mut dyn Surface, err: &Error) -> AnalysisOutcome {
    error!("Analysis could not start: {}", err);
    let mut renderer = ResponseRenderer::new(surface, ResponseMode::SingleShot);
    AnalysisOutcome::Failed(renderer.fail(err))
}

/// Show an image that could not be read, preceded by the credential warning
/// when the form has no key either.
pub fn report_input_failure(
    form: &InputForm,
    err: &Error,
    surface: &mut dyn Surface,
) -> AnalysisOutcome {
    if form.credential.is_none() {
        warn!("Analysis rejected: {}", Error::MissingCredential);
        surface.show(View::Warning(Warning::MissingCredential));
    }
    report_setup_failure(surface, err)
}

/// Materialize and encode off the async runtime.
async fn encode_source(source: ImageSource) -> Result<EncodedImage> {
    tokio::task::spawn_blocking(move || {
        let input = image::materialize(&source)?;
        Ok(image::encode(&input))
    })
    .await
    .map_err(|e| Error::Encoding(format!("Image encoding task join error: {}", e)))?
}
