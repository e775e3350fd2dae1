//! Run a session against a simulated terminal.

use std::path::Path;
use std::sync::Arc;

use concierge_extension::bridge::SimulatedTerminal;
use concierge_extension::discount::StrategyRegistry;
use concierge_extension::profile::InMemoryProfileStore;
use concierge_extension::sink::{FormSubmissionSink, HttpFormSink, LoggingFormSink};
use concierge_extension::workflow::Resolution;
use concierge_extension::{Collaborators, ExtensionConfig, Orchestrator, SessionStore};
use tracing::info;

use super::fixture;

/// Drive Startup through Close with the fixture's order, profiles and form.
///
/// # Errors
///
/// Returns an error if the fixture or configuration cannot be loaded, or a
/// workflow step fails.
pub async fn run(fixture_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let fixture = fixture::load(fixture_path).await?;
    let config = ExtensionConfig::from_env()?;

    let terminal = Arc::new(
        fixture
            .account
            .map_or_else(SimulatedTerminal::empty, SimulatedTerminal::with_account),
    );
    let profiles = Arc::new(InMemoryProfileStore::with_records(
        config.profile_table.clone(),
        fixture.profiles,
    ));
    let sink: Arc<dyn FormSubmissionSink> = match &config.form_sink {
        Some(sink_config) => {
            let sink = HttpFormSink::new(sink_config)?;
            info!(endpoint = %sink.endpoint(), "Submitting forms over HTTP");
            Arc::new(sink)
        }
        None => Arc::new(LoggingFormSink::new()),
    };

    let session = SessionStore::new();
    let orchestrator = Orchestrator::new(
        config,
        session.clone(),
        Collaborators {
            bridge: terminal.clone(),
            profiles,
            sink,
            registry: Arc::new(StrategyRegistry::with_builtins()),
        },
    );

    let watcher = session.clone();
    let subscription = session.subscribe(move || {
        tracing::debug!(flags = ?watcher.flags(), "Session changed");
    });

    let mut resolution = orchestrator.startup().await??;
    info!(?resolution, "Session started");
    if resolution == Resolution::Search {
        if let Some(email) = &fixture.select {
            resolution = orchestrator.select_search_result(email).await?;
            info!(?resolution, "Search result selected");
        }
    }

    let outcome = match fixture.form {
        Some(form) => orchestrator.submit(form).await?,
        None => orchestrator.close().await?,
    };
    subscription.unsubscribe();

    info!(outcome = %serde_json::to_string(&outcome)?, "Session closed");
    for call in terminal.calls() {
        info!(call = %serde_json::to_string(&call)?, "Terminal call");
    }
    Ok(())
}
