//! Debounced queries where only the newest request may update what is shown.

use std::future::Future;
use std::sync::{ Arc, Mutex, MutexGuard, PoisonError };
use std::time::Duration;

use log::debug;
use tokio::task::JoinHandle;

use crate::errors::{ ErrorReport, RegistryResult };
use crate::models::property::{ Property, SearchQuery };
use crate::models::user::User;
use crate::traits::backend::BackendApi;

/// Result of the most recent query that was allowed to land
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome<Q, R> {
    pub generation: u64,
    pub query: Q,
    pub result: Result<R, ErrorReport>,
}

struct SearchState<Q, R> {
    generation: u64,
    pending: Option<JoinHandle<()>>,
    latest: Option<SearchOutcome<Q, R>>,
}

impl<Q, R> SearchState<Q, R> {
    /// Store an outcome only if no newer query was issued after it
    fn accept(&mut self, outcome: SearchOutcome<Q, R>) -> bool {
        if outcome.generation != self.generation {
            return false;
        }
        self.latest = Some(outcome);
        true
    }
}

/// Last-write-wins debounced search.
///
/// Each `issue` supersedes the previous query: its task is aborted, and a
/// response that still arrives is discarded by generation number.
pub struct DebouncedSearch<Q, R> {
    debounce: Duration,
    state: Arc<Mutex<SearchState<Q, R>>>,
}

impl<Q, R> DebouncedSearch<Q, R>
    where Q: Clone + Send + 'static, R: Clone + Send + 'static
{
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            state: Arc::new(
                Mutex::new(SearchState {
                    generation: 0,
                    pending: None,
                    latest: None,
                })
            ),
        }
    }

    fn state(&self) -> MutexGuard<'_, SearchState<Q, R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Schedule `fetch(query)` after the debounce window. Must be called
    /// inside a tokio runtime.
    pub fn issue<F, Fut>(&self, query: Q, fetch: F) -> u64
        where F: FnOnce(Q) -> Fut + Send + 'static, Fut: Future<Output = RegistryResult<R>> + Send + 'static
    {
        let mut state = self.state();
        state.generation += 1;
        let generation = state.generation;
        if let Some(previous) = state.pending.take() {
            previous.abort();
        }

        let shared = Arc::clone(&self.state);
        let debounce = self.debounce;
        state.pending = Some(
            tokio::spawn(async move {
                tokio::time::sleep(debounce).await;
                let result = fetch(query.clone()).await.map_err(|err| ErrorReport::from(&err));

                let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                if !state.accept(SearchOutcome { generation, query, result }) {
                    debug!("Discarding stale search result {}", generation);
                }
            })
        );
        generation
    }

    /// Wait for the newest scheduled query to land
    pub async fn settle(&self) {
        let pending = self.state().pending.take();
        if let Some(handle) = pending {
            // An aborted task is a superseded query, nothing to report.
            let _ = handle.await;
        }
    }

    pub fn latest(&self) -> Option<SearchOutcome<Q, R>> {
        self.state().latest.clone()
    }

    pub fn generation(&self) -> u64 {
        self.state().generation
    }
}

impl<Q, R> Drop for DebouncedSearch<Q, R> {
    fn drop(&mut self) {
        if let Some(pending) = self.state.lock().unwrap_or_else(PoisonError::into_inner).pending.take() {
            pending.abort();
        }
    }
}

/// Counterparty lookup for the transfer wizard
pub struct UserLookup {
    backend: Arc<dyn BackendApi>,
    exclude: Vec<String>,
    search: DebouncedSearch<String, Vec<User>>,
}

impl UserLookup {
    pub fn new(backend: Arc<dyn BackendApi>, exclude: Vec<String>, debounce: Duration) -> Self {
        Self { backend, exclude, search: DebouncedSearch::new(debounce) }
    }

    /// Blank terms clear the results without a request
    pub fn type_term(&self, term: &str) -> u64 {
        let term = term.trim().to_string();
        let backend = Arc::clone(&self.backend);
        let exclude = self.exclude.clone();
        self.search.issue(term, move |term| async move {
            if term.is_empty() {
                return Ok(Vec::new());
            }
            backend.search_users(&term, &exclude).await
        })
    }

    pub async fn settle(&self) {
        self.search.settle().await
    }

    pub fn results(&self) -> Option<SearchOutcome<String, Vec<User>>> {
        self.search.latest()
    }
}

/// The search view: re-queries on every change, then filters the latest
/// results by free text
pub struct PropertySearch {
    backend: Arc<dyn BackendApi>,
    search: DebouncedSearch<SearchQuery, Vec<Property>>,
}

impl PropertySearch {
    pub fn new(backend: Arc<dyn BackendApi>, debounce: Duration) -> Self {
        Self { backend, search: DebouncedSearch::new(debounce) }
    }

    pub fn update(&self, query: SearchQuery) -> u64 {
        let backend = Arc::clone(&self.backend);
        self.search.issue(query, move |query| async move { backend.search_properties(&query).await })
    }

    pub async fn settle(&self) {
        self.search.settle().await
    }

    pub fn outcome(&self) -> Option<SearchOutcome<SearchQuery, Vec<Property>>> {
        self.search.latest()
    }

    /// Latest results narrowed by the text of the query that produced them
    pub fn visible(&self) -> Result<Vec<Property>, ErrorReport> {
        let outcome = match self.search.latest() {
            Some(outcome) => outcome,
            None => {
                return Ok(Vec::new());
            }
        };
        let text = outcome.query.text.trim().to_string();
        Ok(
            outcome.result?
                .into_iter()
                .filter(|property| text.is_empty() || property.matches_text(&text))
                .collect()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_generation_is_rejected() {
        let mut state: SearchState<&str, u32> = SearchState { generation: 2, pending: None, latest: None };
        assert!(!state.accept(SearchOutcome { generation: 1, query: "ab", result: Ok(1) }));
        assert!(state.latest.is_none());
        assert!(state.accept(SearchOutcome { generation: 2, query: "abc", result: Ok(2) }));
        assert_eq!(state.latest.map(|o| o.query), Some("abc"));
    }
}
