//! Debounced shopper search.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, error, instrument};

use super::store::{MAX_SEARCH_RESULTS, ProfileStore, ProfileSummary, SearchIndex};

/// Queries shorter than this clear the results instead of searching.
pub const MIN_QUERY_LEN: usize = 6;

/// Pick the index for a query.
///
/// Anything with `@` is an email, anything with a letter is a name, and a
/// digit followed by digits, spaces or dashes is a phone number.
#[must_use]
pub fn classify(query: &str) -> SearchIndex {
    let query = query.trim();
    if query.contains('@') {
        return SearchIndex::Email;
    }
    if query.chars().any(|c| c.is_ascii_alphabetic()) {
        return SearchIndex::Name;
    }
    let mut chars = query.chars();
    let looks_like_phone = chars.next().is_some_and(|c| c.is_ascii_digit())
        && chars.all(|c| c.is_ascii_digit() || c == ' ' || c == '-');
    if looks_like_phone {
        SearchIndex::Phone
    } else {
        SearchIndex::Name
    }
}

/// What happened to one keystroke's query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Too short; results were cleared.
    Cleared,
    /// A later keystroke arrived within the debounce window.
    Superseded,
    /// A search was already running, or this query was just searched.
    Skipped,
    /// The store answered. Empty on store failure.
    Completed(Vec<ProfileSummary>),
}

/// Search-as-you-type over the profile store.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CustomerSearch {
    inner: Arc<SearchInner>,
}

struct SearchInner {
    store: Arc<dyn ProfileStore>,
    debounce: Duration,
    state: Mutex<SearchState>,
}

#[derive(Default)]
struct SearchState {
    /// Bumped on every keystroke; a pending search only runs if it is still current.
    generation: u64,
    in_flight: bool,
    last_searched: Option<String>,
    results: Vec<ProfileSummary>,
}

impl std::fmt::Debug for CustomerSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerSearch")
            .field("debounce", &self.inner.debounce)
            .finish_non_exhaustive()
    }
}

impl CustomerSearch {
    pub fn new(store: Arc<dyn ProfileStore>, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(SearchInner {
                store,
                debounce,
                state: Mutex::new(SearchState::default()),
            }),
        }
    }

    /// Feed the current contents of the search box.
    ///
    /// Resolves once the debounce window has passed and the search (if any)
    /// has finished.
    #[instrument(skip(self))]
    pub async fn input(&self, query: &str) -> SearchOutcome {
        let generation = {
            let mut state = self.state();
            state.generation += 1;
            if query.chars().count() < MIN_QUERY_LEN {
                state.results.clear();
                return SearchOutcome::Cleared;
            }
            state.generation
        };

        tokio::time::sleep(self.inner.debounce).await;

        {
            let mut state = self.state();
            if state.generation != generation {
                return SearchOutcome::Superseded;
            }
            if state.in_flight || state.last_searched.as_deref() == Some(query) {
                debug!("Search skipped");
                return SearchOutcome::Skipped;
            }
            state.in_flight = true;
            state.last_searched = Some(query.to_owned());
        }
        let _in_flight = InFlight(&self.inner);

        let index = classify(query);
        let prefix = query.trim().to_lowercase();
        let results = match self.inner.store.search(index, &prefix).await {
            Ok(mut results) => {
                results.truncate(MAX_SEARCH_RESULTS);
                results
            }
            Err(e) => {
                error!(error = %e, index = %index, "Customer search failed");
                Vec::new()
            }
        };

        self.state().results.clone_from(&results);
        SearchOutcome::Completed(results)
    }

    /// Results of the most recent completed search.
    #[must_use]
    pub fn results(&self) -> Vec<ProfileSummary> {
        self.state().results.clone()
    }

    /// Forget the query, the results and any pending keystroke.
    pub fn clear(&self) {
        let mut state = self.state();
        state.generation += 1;
        state.last_searched = None;
        state.results.clear();
    }

    fn state(&self) -> MutexGuard<'_, SearchState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the in-flight marker even if the search future is dropped.
struct InFlight<'a>(&'a SearchInner);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_flight = false;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::profile::{InMemoryProfileStore, ProfileRecord};

    const DEBOUNCE: Duration = Duration::from_millis(500);

    fn store() -> Arc<InMemoryProfileStore> {
        let record = ProfileRecord {
            email: Some("jane@example.com".to_string()),
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            phone: Some("0400 111 222".to_string()),
            ..ProfileRecord::default()
        };
        Arc::new(InMemoryProfileStore::with_records("customers", [record]))
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("jane@ex"), SearchIndex::Email);
        assert_eq!(classify("Jane Doe"), SearchIndex::Name);
        assert_eq!(classify("0400 111-222"), SearchIndex::Phone);
        assert_eq!(classify("  0400111 "), SearchIndex::Phone);
        assert_eq!(classify("+61400111"), SearchIndex::Name);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_clears_without_searching() {
        let store = store();
        let search = CustomerSearch::new(store.clone(), DEBOUNCE);
        assert_eq!(search.input("jane").await, SearchOutcome::Cleared);
        assert_eq!(store.search_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_supersedes_earlier_keystroke() {
        let store = store();
        let search = CustomerSearch::new(store.clone(), DEBOUNCE);

        let first = tokio::spawn({
            let search = search.clone();
            async move { search.input("jane@e").await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = search.input("jane@ex").await;

        assert_eq!(first.await.unwrap(), SearchOutcome::Superseded);
        match second {
            SearchOutcome::Completed(results) => {
                assert_eq!(results.len(), 1);
                assert_eq!(results[0].email, "jane@example.com");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(store.search_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_query_is_skipped() {
        let store = store();
        let search = CustomerSearch::new(store.clone(), DEBOUNCE);

        assert!(matches!(
            search.input("jane doe").await,
            SearchOutcome::Completed(_)
        ));
        assert_eq!(search.input("jane doe").await, SearchOutcome::Skipped);
        assert_eq!(store.search_count(), 1);
        assert_eq!(search.results().len(), 1);

        search.clear();
        assert!(search.results().is_empty());
        assert!(matches!(
            search.input("jane doe").await,
            SearchOutcome::Completed(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_failure_yields_empty_results() {
        let store = store();
        store.set_failure(Some("throttled".to_string()));
        let search = CustomerSearch::new(store, DEBOUNCE);
        assert_eq!(
            search.input("jane@example").await,
            SearchOutcome::Completed(Vec::new())
        );
    }
}
