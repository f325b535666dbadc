//! Generative model abstraction.
//!
//! A [`GenerativeModel`] accepts instructions, a prompt and a JSON schema and
//! returns a stream of text deltas that together form one JSON document.
//! Dropping the stream cancels the request.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;

use super::error::ModelError;

/// Everything a model needs for one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub instructions: String,
    pub prompt: String,
    pub schema: Value,
}

/// Stream of text deltas from a model.
pub type ModelStream = BoxStream<'static, Result<String, ModelError>>;

/// A schema-constrained text generator.
///
/// Methods return boxed futures so the trait can be used as `dyn GenerativeModel`.
pub trait GenerativeModel: Send + Sync {
    /// Start generating. The returned stream yields text deltas.
    fn stream(&self, request: GenerationRequest) -> BoxFuture<'_, Result<ModelStream, ModelError>>;

    /// Hint that a request is coming soon. Has no observable effect on results.
    fn prewarm(&self) -> BoxFuture<'_, ()> {
        Box::pin(async {})
    }

    /// Model name for logging.
    fn name(&self) -> &str;
}

/// A model that replays a fixed sequence of text deltas.
///
/// Used for offline runs and tests.
#[derive(Debug)]
pub struct ScriptedModel {
    chunks: Vec<String>,
    delay: Duration,
    failure: Option<ModelError>,
    refuse: Option<ModelError>,
    requests: Mutex<Vec<GenerationRequest>>,
    prewarms: AtomicUsize,
}

impl ScriptedModel {
    /// Replay `chunks` in order with no delay.
    pub fn new<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            delay: Duration::ZERO,
            failure: None,
            refuse: None,
            requests: Mutex::new(Vec::new()),
            prewarms: AtomicUsize::new(0),
        }
    }

    /// Split a complete document into chunks of `chunk_chars` characters.
    pub fn from_document(document: &str, chunk_chars: usize) -> Self {
        let chars: Vec<char> = document.chars().collect();
        let chunks = chars
            .chunks(chunk_chars.max(1))
            .map(|chunk| chunk.iter().collect::<String>());
        Self::new(chunks)
    }

    /// A model whose `stream` call itself fails.
    pub fn unavailable(error: ModelError) -> Self {
        let mut model = Self::new(Vec::<String>::new());
        model.refuse = Some(error);
        model
    }

    /// Wait `delay` before each chunk.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Yield `error` after the last chunk.
    pub fn with_failure(mut self, error: ModelError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    /// Number of `prewarm` calls received.
    pub fn prewarm_count(&self) -> usize {
        self.prewarms.load(Ordering::SeqCst)
    }
}

impl GenerativeModel for ScriptedModel {
    fn stream(&self, request: GenerationRequest) -> BoxFuture<'_, Result<ModelStream, ModelError>> {
        Box::pin(async move {
            self.requests.lock().push(request);
            if let Some(error) = &self.refuse {
                return Err(error.clone());
            }

            let items: Vec<Result<String, ModelError>> = self
                .chunks
                .iter()
                .cloned()
                .map(Ok)
                .chain(self.failure.clone().map(Err))
                .collect();
            let delay = self.delay;

            Ok(stream::iter(items)
                .then(move |item| async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    item
                })
                .boxed())
        })
    }

    fn prewarm(&self) -> BoxFuture<'_, ()> {
        self.prewarms.fetch_add(1, Ordering::SeqCst);
        Box::pin(async {})
    }

    fn name(&self) -> &str {
        "Scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            instructions: "be brief".to_string(),
            prompt: "plan a day".to_string(),
            schema: Value::Null,
        }
    }

    #[tokio::test]
    async fn test_scripted_model_replays_chunks() {
        let model = ScriptedModel::from_document(r#"{"destination":"X"}"#, 5);
        let chunks: Vec<_> = model.stream(request()).await.unwrap().collect().await;
        let text: String = chunks.into_iter().map(Result::unwrap).collect();

        assert_eq!(text, r#"{"destination":"X"}"#);
        assert_eq!(model.requests(), vec![request()]);
    }

    #[tokio::test]
    async fn test_scripted_model_trailing_failure() {
        let model = ScriptedModel::new(["{"]).with_failure(ModelError::Http("reset".to_string()));
        let items: Vec<_> = model.stream(request()).await.unwrap().collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn test_unavailable_model_refuses() {
        let model = ScriptedModel::unavailable(ModelError::Unavailable("429".to_string()));
        assert!(model.stream(request()).await.is_err());
    }

    #[tokio::test]
    async fn test_prewarm_is_counted() {
        let model = ScriptedModel::new(Vec::<String>::new());
        model.prewarm().await;
        assert_eq!(model.prewarm_count(), 1);
    }
}
