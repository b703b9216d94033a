//! Query executor seam
//!
//! The validator treats the endpoint as an oracle: it hands over query text it
//! did not produce and reads back solution mappings. Transport, retries and
//! result parsing live behind [`QueryExecutor`].

use async_trait::async_trait;
use hashbrown::{HashMap, HashSet};
use parking_lot::{Mutex, RwLock};
use std::fmt::Debug;
use std::sync::Arc;

use crate::binding::Binding;
use crate::error::{Result, ValidationError};

/// Runs one query and returns its solution mappings
///
/// A returned error is fatal to the validation run.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn run_query(&self, id: &str, sparql: &str) -> Result<Vec<Binding>>;
}

#[async_trait]
impl<T: QueryExecutor + ?Sized> QueryExecutor for Arc<T> {
    async fn run_query(&self, id: &str, sparql: &str) -> Result<Vec<Binding>> {
        (**self).run_query(id, sparql).await
    }
}

/// In-memory executor answering by query id
///
/// Unknown ids answer with no solutions. Every call is logged, in order, and
/// ids registered with [`fail_on`](Self::fail_on) answer with an endpoint error.
#[derive(Clone, Default)]
pub struct MemoryEndpoint {
    results: Arc<RwLock<HashMap<String, Vec<Binding>>>>,
    failures: Arc<RwLock<HashSet<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl Debug for MemoryEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEndpoint")
            .field("query_count", &self.results.read().len())
            .field("failure_count", &self.failures.read().len())
            .field("call_count", &self.calls.lock().len())
            .finish()
    }
}

impl MemoryEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `id` with `bindings`, builder style
    pub fn with_results<I>(self, id: impl Into<String>, bindings: I) -> Self
    where
        I: IntoIterator<Item = Binding>,
    {
        self.set_results(id, bindings);
        self
    }

    /// Replace the answer for `id`
    pub fn set_results<I>(&self, id: impl Into<String>, bindings: I)
    where
        I: IntoIterator<Item = Binding>,
    {
        self.results
            .write()
            .insert(id.into(), bindings.into_iter().collect());
    }

    /// Make `id` fail with an endpoint error
    pub fn fail_on(self, id: impl Into<String>) -> Self {
        self.failures.write().insert(id.into());
        self
    }

    /// Query ids received so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of times `id` was queried
    pub fn call_count(&self, id: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.as_str() == id).count()
    }
}

#[async_trait]
impl QueryExecutor for MemoryEndpoint {
    async fn run_query(&self, id: &str, _sparql: &str) -> Result<Vec<Binding>> {
        self.calls.lock().push(id.to_string());
        if self.failures.read().contains(id) {
            return Err(ValidationError::endpoint(id, "injected failure"));
        }
        Ok(self.results.read().get(id).cloned().unwrap_or_default())
    }
}
