//! Markets, outcomes and fractional odds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{EventId, MarketId, OutcomeId};

/// Fractional odd as published by the feed, e.g. `5/2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Odd {
    pub numerator: u32,
    pub denominator: u32,
}

impl Odd {
    #[must_use]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Parse the textual numerator / denominator pair carried by odd updates.
    ///
    /// Returns `None` when either side is missing, not a number, or the
    /// denominator is zero.
    #[must_use]
    pub fn parse(numerator: Option<&str>, denominator: Option<&str>) -> Option<Self> {
        let numerator = numerator?.trim().parse().ok()?;
        let denominator: u32 = denominator?.trim().parse().ok()?;
        if denominator == 0 {
            return None;
        }
        Some(Self::new(numerator, denominator))
    }

    /// Decimal (European) representation: `1 + numerator / denominator`.
    #[must_use]
    pub fn decimal(&self) -> Decimal {
        if self.denominator == 0 {
            return Decimal::ONE;
        }
        Decimal::ONE + Decimal::from(self.numerator) / Decimal::from(self.denominator)
    }
}

/// A selectable outcome inside a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub id: OutcomeId,
    #[serde(default)]
    pub name: String,
    pub odd: Odd,
    #[serde(default = "default_tradable")]
    pub is_tradable: bool,
}

/// A betting market with its outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub id: MarketId,
    #[serde(default)]
    pub name: String,
    /// Owning event, when the feed reports it.
    #[serde(default)]
    pub event_id: Option<EventId>,
    #[serde(default = "default_tradable")]
    pub is_tradable: bool,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

const fn default_tradable() -> bool {
    true
}

impl Market {
    /// Find an outcome by id.
    #[must_use]
    pub fn outcome(&self, id: &OutcomeId) -> Option<&Outcome> {
        self.outcomes.iter().find(|outcome| &outcome.id == id)
    }

    pub(crate) fn outcome_mut(&mut self, id: &OutcomeId) -> Option<&mut Outcome> {
        self.outcomes.iter_mut().find(|outcome| &outcome.id == id)
    }

    #[must_use]
    pub fn contains_outcome(&self, id: &OutcomeId) -> bool {
        self.outcome(id).is_some()
    }
}
