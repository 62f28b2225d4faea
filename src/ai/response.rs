use crate::Result;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};

/// A finite, one-shot sequence of text fragments.
///
/// Single-shot completions are a sequence of exactly one fragment. The
/// sequence is consumed by value and cannot be restarted.
pub struct AnalysisResponse {
    fragments: BoxStream<'static, Result<String>>,
}

impl AnalysisResponse {
    pub fn single(text: String) -> Self {
        Self {
            fragments: stream::once(async move { Ok(text) }).boxed(),
        }
    }

    pub fn streaming<S>(fragments: S) -> Self
    where
        S: Stream<Item = Result<String>> + Send + 'static,
    {
        Self {
            fragments: fragments.boxed(),
        }
    }

    pub async fn next_fragment(&mut self) -> Option<Result<String>> {
        self.fragments.next().await
    }

    /// Drain the remaining fragments into one string.
    pub async fn collect_text(mut self) -> Result<String> {
        let mut text = String::new();
        while let Some(fragment) = self.next_fragment().await {
            text.push_str(&fragment?);
        }
        Ok(text)
    }
}

impl std::fmt::Debug for AnalysisResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisResponse").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[tokio::test]
    async fn test_single_yields_one_fragment() {
        let mut response = AnalysisResponse::single("Un perro".to_string());
        assert_eq!(response.next_fragment().await.unwrap().unwrap(), "Un perro");
        assert!(response.next_fragment().await.is_none());
    }

    #[tokio::test]
    async fn test_streaming_preserves_order() {
        let fragments = vec![Ok("Hola".to_string()), Ok(" mundo".to_string())];
        let response = AnalysisResponse::streaming(stream::iter(fragments));
        assert_eq!(response.collect_text().await.unwrap(), "Hola mundo");
    }

    #[tokio::test]
    async fn test_collect_text_stops_at_error() {
        let fragments = vec![
            Ok("Hola".to_string()),
            Err(Error::AiProvider("connection reset".to_string())),
            Ok(" mundo".to_string()),
        ];
        let response = AnalysisResponse::streaming(stream::iter(fragments));
        assert!(response.collect_text().await.is_err());
    }
}
