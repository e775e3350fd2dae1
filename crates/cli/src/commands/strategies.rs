//! List the discount strategy registry.

use concierge_extension::discount::StrategyRegistry;
use tracing::info;

/// Log every registered segment with its policy.
///
/// # Errors
///
/// Returns an error if a policy cannot be resolved or serialized.
pub fn list() -> Result<(), Box<dyn std::error::Error>> {
    let registry = StrategyRegistry::with_builtins();
    for segment in registry.segments() {
        let policy = registry.get_strategy(&segment)?;
        info!(segment = %segment, policy = %serde_json::to_string(&policy)?, "Strategy");
    }
    Ok(())
}
