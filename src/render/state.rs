/// Lifecycle of one analysis as seen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    AwaitingResponse,
    /// Text accumulated so far.
    Streaming(String),
    Complete(String),
    /// User-facing message.
    Error(String),
}

impl AnalysisState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisState::Complete(_) | AnalysisState::Error(_))
    }

    pub fn can_transition_to(&self, next: &AnalysisState) -> bool {
        use AnalysisState::*;
        matches!(
            (self, next),
            (Idle, AwaitingResponse)
                | (Idle, Error(_))
                | (AwaitingResponse, Streaming(_))
                | (AwaitingResponse, Complete(_))
                | (AwaitingResponse, Error(_))
                | (Streaming(_), Streaming(_))
                | (Streaming(_), Complete(_))
                | (Streaming(_), Error(_))
                | (Complete(_), Idle)
                | (Error(_), Idle)
        )
    }
}
