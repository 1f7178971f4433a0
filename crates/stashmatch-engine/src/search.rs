use std::future::Future;

use async_trait::async_trait;

use crate::error::SearchError;

/// Name lookup supplied by the host: a registry query returning remote
/// candidates, or a catalog query returning local entities.
///
/// Results are expected in the collaborator's relevance order; the ranker
/// keeps that order for equal scores. Timeouts are the implementor's concern
/// and should surface as [`SearchError::Timeout`].
#[async_trait]
pub trait NameSearch<T>: Send + Sync {
    async fn search(&self, name: &str) -> Result<Vec<T>, SearchError>;
}

/// Adapts an async closure into a [`NameSearch`].
///
/// ```rust,ignore
/// let search = SearchFn::new(|name: String| async move { registry.find_studios(&name).await });
/// ```
pub struct SearchFn<F> {
    f: F,
}

impl<F> SearchFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<T, F, Fut> NameSearch<T> for SearchFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>, SearchError>> + Send + 'static,
    T: Send + 'static,
{
    async fn search(&self, name: &str) -> Result<Vec<T>, SearchError> {
        (self.f)(name.to_string()).await
    }
}
