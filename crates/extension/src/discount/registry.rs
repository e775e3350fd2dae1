//! Segment to strategy registry.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use concierge_core::{Amount, Segment};
use thiserror::Error;
use tracing::{debug, warn};

use super::policy::{DiscountPolicy, Guard, LineRule};

/// Builds the policy for one segment.
pub type StrategyFactory = Arc<dyn Fn() -> DiscountPolicy + Send + Sync>;

/// Order total a `Loyalty` order must exceed, in minor units.
pub const LOYALTY_THRESHOLD: i64 = 19_999;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("No discount strategy registered for segment \"{0}\"")]
    NotFound(Segment),
    #[error("A discount strategy is already registered for segment \"{0}\"")]
    AlreadyRegistered(Segment),
}

/// Strategies keyed by segment. There is no fallback strategy.
pub struct StrategyRegistry {
    strategies: RwLock<BTreeMap<Segment, StrategyFactory>>,
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("segments", &self.segments())
            .finish()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl StrategyRegistry {
    /// A registry with no strategies.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            strategies: RwLock::new(BTreeMap::new()),
        }
    }

    /// A registry holding the built-in segments.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        for (segment, factory) in builtins() {
            if let Err(e) = registry.register_arc(segment, factory) {
                warn!(error = %e, "Skipping duplicate built-in strategy");
            }
        }
        registry
    }

    /// Register a strategy. The first registration for a segment wins.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::AlreadyRegistered` if the segment is taken.
    pub fn register_strategy(
        &self,
        segment: impl Into<Segment>,
        factory: impl Fn() -> DiscountPolicy + Send + Sync + 'static,
    ) -> Result<(), RegistryError> {
        self.register_arc(segment.into(), Arc::new(factory))
    }

    /// Resolve the policy for `segment`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for an unregistered segment.
    pub fn get_strategy(&self, segment: &Segment) -> Result<DiscountPolicy, RegistryError> {
        let factory = self
            .strategies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(segment)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(segment.clone()))?;
        Ok(factory())
    }

    /// Registered segments, sorted.
    #[must_use]
    pub fn segments(&self) -> Vec<Segment> {
        self.strategies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    fn register_arc(&self, segment: Segment, factory: StrategyFactory) -> Result<(), RegistryError> {
        let mut strategies = self
            .strategies
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if strategies.contains_key(&segment) {
            return Err(RegistryError::AlreadyRegistered(segment));
        }
        debug!(segment = %segment, "Registered discount strategy");
        strategies.insert(segment, factory);
        Ok(())
    }
}

fn club(name: &'static str, code: &'static str) -> (Segment, StrategyFactory) {
    (
        Segment::new(name),
        Arc::new(move || DiscountPolicy::lines(name, vec![LineRule::new(code, "Wine")])),
    )
}

fn builtins() -> Vec<(Segment, StrategyFactory)> {
    vec![
        club("Club Silver", "ClubSilver"),
        club("Club Gold", "ClubGold"),
        club("Club Platinum", "ClubPlatinum"),
        (
            Segment::new("VIP"),
            Arc::new(|| DiscountPolicy::order("VIP", "VIP")),
        ),
        (
            Segment::new("Loyalty"),
            Arc::new(|| {
                DiscountPolicy::order("Loyalty", "Loyalty")
                    .with_guard(Guard::TotalAbove(Amount::from(LOYALTY_THRESHOLD)))
            }),
        ),
        (
            Segment::new("Friends and Family"),
            Arc::new(|| {
                DiscountPolicy::lines(
                    "Friends and Family",
                    vec![
                        LineRule::new("FriendsandFamilyWine", "Wines"),
                        LineRule::new("FriendsandFamilyBeer", "Beers"),
                        LineRule::new("FriendsandFamilyFood", "Food"),
                        LineRule::new("Comp", "Desserts"),
                    ],
                )
            }),
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::discount::DiscountScope;

    #[test]
    fn test_builtin_segments() {
        let registry = StrategyRegistry::with_builtins();
        let segments: Vec<String> = registry
            .segments()
            .iter()
            .map(|s| s.as_str().to_owned())
            .collect();
        assert_eq!(
            segments,
            vec![
                "Club Gold",
                "Club Platinum",
                "Club Silver",
                "Friends and Family",
                "Loyalty",
                "VIP"
            ]
        );
    }

    #[test]
    fn test_get_strategy() {
        let registry = StrategyRegistry::with_builtins();
        let policy = registry.get_strategy(&Segment::new("Club Gold")).unwrap();
        assert_eq!(
            policy.scope,
            DiscountScope::Lines {
                rules: vec![LineRule::new("ClubGold", "Wine")]
            }
        );

        let loyalty = registry.get_strategy(&Segment::new("Loyalty")).unwrap();
        assert_eq!(
            loyalty.guard,
            Some(Guard::TotalAbove(Amount::from(19_999)))
        );
    }

    #[test]
    fn test_unknown_segment() {
        let registry = StrategyRegistry::with_builtins();
        let err = registry.get_strategy(&Segment::new("Gold")).unwrap_err();
        assert_eq!(err, RegistryError::NotFound(Segment::new("Gold")));
    }

    #[test]
    fn test_first_registration_wins() {
        let registry = StrategyRegistry::empty();
        registry
            .register_strategy("Staff", || DiscountPolicy::order("Staff", "Staff10"))
            .unwrap();
        let err = registry
            .register_strategy("Staff", || DiscountPolicy::order("Staff", "Staff50"))
            .unwrap_err();
        assert_eq!(err, RegistryError::AlreadyRegistered(Segment::new("Staff")));

        let policy = registry.get_strategy(&Segment::new("Staff")).unwrap();
        assert_eq!(
            policy.scope,
            DiscountScope::Order {
                code: "Staff10".to_string()
            }
        );
    }
}
