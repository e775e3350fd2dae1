//! Customer search against a fixture's profiles.

use std::path::Path;
use std::sync::Arc;

use concierge_extension::ExtensionConfig;
use concierge_extension::profile::{
    CustomerSearch, InMemoryProfileStore, MIN_QUERY_LEN, SearchOutcome, classify,
};
use tracing::{info, warn};

use super::fixture;

/// Run one search the way the search box would.
///
/// # Errors
///
/// Returns an error if the fixture or configuration cannot be loaded.
pub async fn run(query: &str, fixture_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let fixture = fixture::load(fixture_path).await?;
    let config = ExtensionConfig::from_env()?;

    let store = Arc::new(InMemoryProfileStore::with_records(
        config.profile_table.clone(),
        fixture.profiles,
    ));
    let search = CustomerSearch::new(store, config.search_debounce);

    match search.input(query).await {
        SearchOutcome::Completed(results) => {
            info!(index = %classify(query), count = results.len(), "Search completed");
            for result in results {
                info!(
                    email = %result.email,
                    name = %format!("{} {}", result.first_name, result.last_name),
                    phone = %result.phone,
                    "Match"
                );
            }
        }
        SearchOutcome::Cleared => {
            warn!(min = MIN_QUERY_LEN, "Query too short, no search was run");
        }
        other => warn!(outcome = ?other, "No search was run"),
    }
    Ok(())
}
