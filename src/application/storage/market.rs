//! Storage behind a single-market topic, with per-entity watchers.

use parking_lot::RwLock;
use tokio::sync::watch;

use super::watchers::Watchers;
use crate::domain::{ContentChange, Market, MarketId, Odd, Outcome, OutcomeId};

struct MarketState {
    market: Option<Market>,
    market_watchers: Watchers<MarketId, Market>,
    outcome_watchers: Watchers<OutcomeId, Outcome>,
}

impl MarketState {
    fn notify(&mut self) {
        let Self {
            market,
            market_watchers,
            outcome_watchers,
        } = self;
        market_watchers.refresh(|id| market.as_ref().filter(|m| &m.id == id).cloned());
        outcome_watchers.refresh(|id| market.as_ref().and_then(|m| m.outcome(id)).cloned());
    }
}

/// Storage of a single-market topic.
pub struct MarketStorage {
    state: RwLock<MarketState>,
}

impl Default for MarketStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketStorage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MarketState {
                market: None,
                market_watchers: Watchers::new(),
                outcome_watchers: Watchers::new(),
            }),
        }
    }

    #[must_use]
    pub fn market(&self) -> Option<Market> {
        self.state.read().market.clone()
    }

    /// Replace the stored market. `None` means the market is gone.
    pub fn set_market(&self, market: Option<Market>) -> bool {
        let mut state = self.state.write();
        if state.market == market {
            return false;
        }
        state.market = market;
        state.notify();
        true
    }

    /// Apply an incremental change. Returns whether the market changed.
    pub fn apply(&self, change: &ContentChange) -> bool {
        let mut state = self.state.write();
        let Some(market) = state.market.as_mut() else {
            return false;
        };

        let changed = match change {
            ContentChange::MarketTradability {
                market_id,
                is_tradable,
            } if *market_id == market.id && market.is_tradable != *is_tradable => {
                market.is_tradable = *is_tradable;
                true
            }
            ContentChange::EnableMarket(id) if *id == market.id && !market.is_tradable => {
                market.is_tradable = true;
                true
            }
            ContentChange::SuspendMarket(id) if *id == market.id && market.is_tradable => {
                market.is_tradable = false;
                true
            }
            ContentChange::AddMarket(added) if added.id == market.id && *added != *market => {
                *market = added.clone();
                true
            }
            ContentChange::OutcomeOdd {
                outcome_id,
                numerator,
                denominator,
            } => match (
                market.outcome_mut(outcome_id),
                Odd::parse(numerator.as_deref(), denominator.as_deref()),
            ) {
                (Some(outcome), Some(odd)) if outcome.odd != odd => {
                    outcome.odd = odd;
                    true
                }
                _ => false,
            },
            ContentChange::OutcomeTradability {
                outcome_id,
                is_tradable,
            } => match market.outcome_mut(outcome_id) {
                Some(outcome) if outcome.is_tradable != *is_tradable => {
                    outcome.is_tradable = *is_tradable;
                    true
                }
                _ => false,
            },
            _ => false,
        };

        if changed {
            state.notify();
        }
        changed
    }

    #[must_use]
    pub fn contains_market(&self, id: &MarketId) -> bool {
        self.state
            .read()
            .market
            .as_ref()
            .is_some_and(|market| &market.id == id)
    }

    #[must_use]
    pub fn contains_outcome(&self, id: &OutcomeId) -> bool {
        self.state
            .read()
            .market
            .as_ref()
            .is_some_and(|market| market.contains_outcome(id))
    }

    /// Whether an incremental change targets this market or its outcomes.
    #[must_use]
    pub fn concerns(&self, change: &ContentChange) -> bool {
        match change {
            ContentChange::MarketTradability { market_id: id, .. }
            | ContentChange::EnableMarket(id)
            | ContentChange::SuspendMarket(id) => self.contains_market(id),
            ContentChange::AddMarket(market) => self.contains_market(&market.id),
            ContentChange::OutcomeOdd { outcome_id, .. }
            | ContentChange::OutcomeTradability { outcome_id, .. } => {
                self.contains_outcome(outcome_id)
            }
            _ => false,
        }
    }

    pub fn watch_market(&self, id: MarketId) -> watch::Receiver<Option<Market>> {
        let mut state = self.state.write();
        let current = state.market.as_ref().filter(|m| m.id == id).cloned();
        state.market_watchers.watch(id, current)
    }

    pub fn watch_outcome(&self, id: OutcomeId) -> watch::Receiver<Option<Outcome>> {
        let mut state = self.state.write();
        let current = state
            .market
            .as_ref()
            .and_then(|m| m.outcome(&id))
            .cloned();
        state.outcome_watchers.watch(id, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::market_with_outcomes;

    #[test]
    fn odd_update_reaches_outcome_watcher() {
        let storage = MarketStorage::new();
        storage.set_market(Some(market_with_outcomes("m1", &["o1", "o2"])));
        let mut o2 = storage.watch_outcome(OutcomeId::new("o2"));
        o2.borrow_and_update();

        assert!(storage.apply(&ContentChange::OutcomeOdd {
            outcome_id: OutcomeId::new("o2"),
            numerator: Some("3".into()),
            denominator: Some("1".into()),
        }));
        assert_eq!(o2.borrow().as_ref().map(|o| o.odd), Some(Odd::new(3, 1)));
    }

    #[test]
    fn suspended_market_can_be_reopened() {
        let storage = MarketStorage::new();
        storage.set_market(Some(market_with_outcomes("m1", &["o1"])));
        let mut market = storage.watch_market(MarketId::new("m1"));
        market.borrow_and_update();

        assert!(storage.apply(&ContentChange::SuspendMarket(MarketId::new("m1"))));
        assert_eq!(market.borrow_and_update().as_ref().map(|m| m.is_tradable), Some(false));
        assert!(storage.contains_outcome(&OutcomeId::new("o1")));

        assert!(storage.apply(&ContentChange::EnableMarket(MarketId::new("m1"))));
        assert_eq!(market.borrow().as_ref().map(|m| m.is_tradable), Some(true));
    }

    #[test]
    fn changes_for_other_markets_are_ignored() {
        let storage = MarketStorage::new();
        storage.set_market(Some(market_with_outcomes("m1", &["o1"])));
        let change = ContentChange::MarketTradability {
            market_id: MarketId::new("m9"),
            is_tradable: false,
        };
        assert!(!storage.concerns(&change));
        assert!(!storage.apply(&change));
    }
}
