//! Response rendering
//!
//! Turns the analysis lifecycle into views on a user-facing [`Surface`]. The
//! [`ResponseRenderer`] owns the buffer that streamed fragments are
//! accumulated into.

pub mod mock;
pub mod state;
pub mod terminal;

pub use mock::RecordingSurface;
pub use state::AnalysisState;
pub use terminal::TerminalSurface;

use crate::models::ResponseMode;
use crate::{Error, FailureKind};
use std::fmt;

/// Appended to partial text while a stream is still arriving.
pub const PROGRESS_MARKER: char = '▌';

/// Precondition that was not met when the action was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    MissingImage,
    MissingCredential,
}

impl Warning {
    pub fn message(self) -> &'static str {
        match self {
            Warning::MissingImage => "⚠️ Por favor sube una imagen.",
            Warning::MissingCredential => "⚠️ Ingresa tu API key.",
        }
    }

    /// The warning shown in place of a precondition error.
    pub fn for_error(err: &Error) -> Option<Self> {
        match err.kind() {
            FailureKind::MissingInput => Some(Warning::MissingImage),
            FailureKind::MissingCredential => Some(Warning::MissingCredential),
            _ => None,
        }
    }
}

/// Something the surface should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Partial text, shown with the progress marker.
    Progress(String),
    /// Final text, shown verbatim.
    Result(String),
    Warning(Warning),
    Error(String),
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Progress(text) => write!(f, "{}{}", text, PROGRESS_MARKER),
            View::Result(text) => f.write_str(text),
            View::Warning(warning) => f.write_str(warning.message()),
            View::Error(message) => f.write_str(message),
        }
    }
}

/// Display target for views. Each call replaces the result region.
pub trait Surface {
    fn show(&mut self, view: View);
}

/// The view for a state, if that state has anything to show.
pub fn render(state: &AnalysisState) -> Option<View> {
    match state {
        AnalysisState::Idle | AnalysisState::AwaitingResponse => None,
        AnalysisState::Streaming(text) => Some(View::Progress(text.clone())),
        AnalysisState::Complete(text) => Some(View::Result(text.clone())),
        AnalysisState::Error(message) => Some(View::Error(message.clone())),
    }
}

pub fn error_message(err: &Error) -> String {
    format!("Ocurrió un error: {}", err)
}

/// Drives one analysis' views and owns its accumulation buffer.
pub struct ResponseRenderer<'a> {
    surface: &'a mut dyn Surface,
    mode: ResponseMode,
    state: AnalysisState,
    buffer: String,
}

impl<'a> ResponseRenderer<'a> {
    pub fn new(surface: &'a mut dyn Surface, mode: ResponseMode) -> Self {
        Self {
            surface,
            mode,
            state: AnalysisState::Idle,
            buffer: String::new(),
        }
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    fn transition(&mut self, next: AnalysisState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "invalid transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
        if let Some(view) = render(&self.state) {
            self.surface.show(view);
        }
    }

    /// Show one warning per unmet precondition.
    pub fn reject(&mut self, warnings: &[Warning]) {
        for warning in warnings {
            self.surface.show(View::Warning(*warning));
        }
        let summary = warnings
            .iter()
            .map(|w| w.message())
            .collect::<Vec<_>>()
            .join(" ");
        // Warnings are the visible output; the error view is not repeated.
        self.state = AnalysisState::Error(summary);
    }

    pub fn begin(&mut self) {
        self.buffer.clear();
        self.transition(AnalysisState::AwaitingResponse);
    }

    /// Append a fragment. In streaming mode the partial text is shown immediately.
    pub fn push_fragment(&mut self, fragment: &str) {
        self.buffer.push_str(fragment);
        if self.mode == ResponseMode::Streaming {
            self.transition(AnalysisState::Streaming(self.buffer.clone()));
        }
    }

    /// Replace the progress view with the final text and return it.
    pub fn complete(&mut self) -> String {
        let text = self.buffer.clone();
        self.transition(AnalysisState::Complete(text.clone()));
        text
    }

    /// Show the error. Partial text already on the surface stays there.
    pub fn fail(&mut self, err: &Error) -> String {
        let message = error_message(err);
        self.transition(AnalysisState::Error(message.clone()));
        message
    }

    pub fn reset(&mut self) {
        self.transition(AnalysisState::Idle);
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_view_display() {
        assert_eq!(View::Progress("Hola".into()).to_string(), "Hola▌");
        assert_eq!(View::Result("Hola".into()).to_string(), "Hola");
        assert_eq!(
            View::Warning(Warning::MissingImage).to_string(),
            "⚠️ Por favor sube una imagen."
        );
    }

    #[test]
    fn test_warning_for_error() {
        assert_eq!(
            Warning::for_error(&Error::MissingImage),
            Some(Warning::MissingImage)
        );
        assert_eq!(
            Warning::for_error(&Error::MissingCredential),
            Some(Warning::MissingCredential)
        );
        assert_eq!(Warning::for_error(&Error::AiProvider("x".into())), None);
    }

    #[test]
    fn test_render_states() {
        assert_eq!(render(&AnalysisState::Idle), None);
        assert_eq!(render(&AnalysisState::AwaitingResponse), None);
        assert_eq!(
            render(&AnalysisState::Streaming("a".into())),
            Some(View::Progress("a".into()))
        );
        assert_eq!(
            render(&AnalysisState::Complete("a".into())),
            Some(View::Result("a".into()))
        );
    }

    #[test]
    fn test_streaming_renders_after_every_fragment() {
        let mut surface = RecordingSurface::new();
        let mut renderer = ResponseRenderer::new(&mut surface, ResponseMode::Streaming);

        renderer.begin();
        renderer.push_fragment("Hola");
        renderer.push_fragment(" mundo");
        let text = renderer.complete();
        assert_eq!(text, "Hola mundo");

        assert_eq!(
            surface.views(),
            vec![
                View::Progress("Hola".into()),
                View::Progress("Hola mundo".into()),
                View::Result("Hola mundo".into()),
            ]
        );
        assert_eq!(surface.displayed(), "Hola mundo");
    }

    #[test]
    fn test_single_shot_renders_only_final_text() {
        let mut surface = RecordingSurface::new();
        let mut renderer = ResponseRenderer::new(&mut surface, ResponseMode::SingleShot);

        renderer.begin();
        renderer.push_fragment("Un perro");
        assert_eq!(renderer.state(), &AnalysisState::AwaitingResponse);
        renderer.complete();

        assert_eq!(surface.views(), vec![View::Result("Un perro".into())]);
    }

    #[test]
    fn test_failure_keeps_partial_text_visible() {
        let mut surface = RecordingSurface::new();
        let mut renderer = ResponseRenderer::new(&mut surface, ResponseMode::Streaming);

        renderer.begin();
        renderer.push_fragment("Hola");
        let message = renderer.fail(&Error::AiProvider("connection reset".into()));
        assert!(message.starts_with("Ocurrió un error:"));

        assert_eq!(
            surface.views(),
            vec![View::Progress("Hola".into()), View::Error(message)]
        );
    }

    #[test]
    fn test_reset_after_completion_allows_next_action() {
        let mut surface = RecordingSurface::new();
        let mut renderer = ResponseRenderer::new(&mut surface, ResponseMode::Streaming);

        renderer.begin();
        renderer.push_fragment("Primera");
        renderer.complete();
        renderer.reset();
        assert_eq!(renderer.state(), &AnalysisState::Idle);
        assert_eq!(renderer.text(), "");

        renderer.begin();
        renderer.push_fragment("Segunda");
        assert_eq!(renderer.complete(), "Segunda");
    }

    #[test]
    fn test_reject_shows_each_warning() {
        let mut surface = RecordingSurface::new();
        let mut renderer = ResponseRenderer::new(&mut surface, ResponseMode::Streaming);

        renderer.reject(&[Warning::MissingImage, Warning::MissingCredential]);
        assert!(renderer.state().is_terminal());

        assert_eq!(
            surface.views(),
            vec![
                View::Warning(Warning::MissingImage),
                View::Warning(Warning::MissingCredential)
            ]
        );
    }
}
