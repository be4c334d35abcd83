//! Keyed collection of events with per-entity change streams.

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::trace;

use super::watchers::Watchers;
use crate::domain::{
    ContentChange, Event, EventId, EventLiveData, Market, MarketId, Odd, Outcome, OutcomeId,
};

struct EventsState {
    events: Vec<Event>,
    event_watchers: Watchers<EventId, Event>,
    live_data_watchers: Watchers<EventId, EventLiveData>,
    market_watchers: Watchers<MarketId, Market>,
    outcome_watchers: Watchers<OutcomeId, Outcome>,
}

impl EventsState {
    fn event(&self, id: &EventId) -> Option<&Event> {
        self.events.iter().find(|event| &event.id == id)
    }

    fn event_mut(&mut self, id: &EventId) -> Option<&mut Event> {
        self.events.iter_mut().find(|event| &event.id == id)
    }

    fn market(&self, id: &MarketId) -> Option<&Market> {
        self.events.iter().find_map(|event| event.market(id))
    }

    fn market_mut(&mut self, id: &MarketId) -> Option<&mut Market> {
        self.events.iter_mut().find_map(|event| event.market_mut(id))
    }

    fn outcome(&self, id: &OutcomeId) -> Option<&Outcome> {
        self.events.iter().find_map(|event| event.outcome(id))
    }

    fn outcome_mut(&mut self, id: &OutcomeId) -> Option<&mut Outcome> {
        self.events
            .iter_mut()
            .flat_map(|event| event.markets.iter_mut())
            .find_map(|market| market.outcome_mut(id))
    }

    /// Insert or replace by id. Returns whether anything changed.
    fn upsert(&mut self, event: Event) -> bool {
        match self.event_mut(&event.id) {
            Some(existing) if *existing == event => false,
            Some(existing) => {
                *existing = event;
                true
            }
            None => {
                self.events.push(event);
                true
            }
        }
    }

    fn notify(&mut self) {
        let Self {
            events,
            event_watchers,
            live_data_watchers,
            market_watchers,
            outcome_watchers,
        } = self;

        event_watchers.refresh(|id| events.iter().find(|event| &event.id == id).cloned());
        live_data_watchers.refresh(|id| {
            events
                .iter()
                .find(|event| &event.id == id)
                .map(|event| event.live_data.clone())
        });
        market_watchers.refresh(|id| events.iter().find_map(|event| event.market(id)).cloned());
        outcome_watchers.refresh(|id| events.iter().find_map(|event| event.outcome(id)).cloned());
    }
}

/// Events seen so far on one topic, in arrival order, merged by id.
pub struct EventsStorage {
    state: RwLock<EventsState>,
}

impl Default for EventsStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl EventsStorage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(EventsState {
                events: Vec::new(),
                event_watchers: Watchers::new(),
                live_data_watchers: Watchers::new(),
                market_watchers: Watchers::new(),
                outcome_watchers: Watchers::new(),
            }),
        }
    }

    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.state.read().events.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().events.is_empty()
    }

    #[must_use]
    pub fn event(&self, id: &EventId) -> Option<Event> {
        self.state.read().event(id).cloned()
    }

    /// Merge events by id: newer data replaces older, new ids are appended.
    /// Returns whether storage changed.
    pub fn merge_events(&self, events: Vec<Event>) -> bool {
        let mut state = self.state.write();
        let mut changed = false;
        for event in events {
            changed |= state.upsert(event);
        }
        if changed {
            state.notify();
        }
        changed
    }

    /// Replace the whole content.
    pub fn replace_events(&self, events: Vec<Event>) -> bool {
        let mut state = self.state.write();
        if state.events == events {
            return false;
        }
        state.events = events;
        state.notify();
        true
    }

    pub fn update_live_data(&self, event_id: &EventId, live_data: &EventLiveData) -> bool {
        let mut state = self.state.write();
        let Some(event) = state.event_mut(event_id) else {
            return false;
        };
        let before = event.live_data.clone();
        event.live_data.merge(live_data);
        if event.live_data == before {
            return false;
        }
        state.notify();
        true
    }

    /// Apply a snapshot or incremental change. Returns whether storage changed.
    pub fn apply(&self, change: &ContentChange) -> bool {
        let mut state = self.state.write();
        let changed = Self::apply_locked(&mut state, change);
        if changed {
            trace!(events = state.events.len(), "Events storage updated");
            state.notify();
        }
        changed
    }

    fn apply_locked(state: &mut EventsState, change: &ContentChange) -> bool {
        match change {
            ContentChange::Events(events) => events
                .iter()
                .fold(false, |changed, event| state.upsert(event.clone()) | changed),
            ContentChange::EventDetails(Some(event)) | ContentChange::AddEvent(event) => {
                state.upsert(event.clone())
            }
            ContentChange::RemoveEvent(id) => {
                let before = state.events.len();
                state.events.retain(|event| &event.id != id);
                state.events.len() != before
            }
            ContentChange::AddMarket(market) => {
                let single_event = state.events.len() == 1;
                let target = state.events.iter_mut().find(|event| {
                    market.event_id.as_ref() == Some(&event.id)
                        || (market.event_id.is_none() && single_event)
                });
                let Some(event) = target else {
                    return false;
                };
                match event.market_mut(&market.id) {
                    Some(existing) if existing == market => false,
                    Some(existing) => {
                        *existing = market.clone();
                        true
                    }
                    None => {
                        event.markets.push(market.clone());
                        true
                    }
                }
            }
            ContentChange::SuspendMarket(id) => set_if_changed(
                state.market_mut(id).map(|market| &mut market.is_tradable),
                false,
            ),
            ContentChange::EnableMarket(id) => set_if_changed(
                state.market_mut(id).map(|market| &mut market.is_tradable),
                true,
            ),
            ContentChange::MarketTradability {
                market_id,
                is_tradable,
            } => set_if_changed(
                state.market_mut(market_id).map(|market| &mut market.is_tradable),
                *is_tradable,
            ),
            ContentChange::EventState { event_id, state: status } => set_if_changed(
                state.event_mut(event_id).map(|event| &mut event.live_data.status),
                Some(status.clone()),
            ),
            ContentChange::EventTime {
                event_id,
                match_time,
            } => set_if_changed(
                state
                    .event_mut(event_id)
                    .map(|event| &mut event.live_data.match_time),
                Some(match_time.clone()),
            ),
            ContentChange::EventScore {
                event_id,
                home,
                away,
            } => {
                let Some(event) = state.event_mut(event_id) else {
                    return false;
                };
                let before = event.live_data.clone();
                event.live_data.merge(&EventLiveData {
                    home_score: *home,
                    away_score: *away,
                    ..EventLiveData::default()
                });
                event.live_data != before
            }
            ContentChange::EventMarketCount {
                event_id,
                market_count,
            } => set_if_changed(
                state.event_mut(event_id).map(|event| &mut event.market_count),
                Some(*market_count),
            ),
            ContentChange::OutcomeOdd {
                outcome_id,
                numerator,
                denominator,
            } => {
                let Some(odd) = Odd::parse(numerator.as_deref(), denominator.as_deref()) else {
                    return false;
                };
                set_if_changed(
                    state.outcome_mut(outcome_id).map(|outcome| &mut outcome.odd),
                    odd,
                )
            }
            ContentChange::OutcomeTradability {
                outcome_id,
                is_tradable,
            } => set_if_changed(
                state
                    .outcome_mut(outcome_id)
                    .map(|outcome| &mut outcome.is_tradable),
                *is_tradable,
            ),
            ContentChange::EventDetails(None)
            | ContentChange::LiveData(_)
            | ContentChange::MarketDetails(_)
            | ContentChange::Sports(_)
            | ContentChange::AddSport(_) => false,
        }
    }

    #[must_use]
    pub fn contains_event(&self, id: &EventId) -> bool {
        self.state.read().event(id).is_some()
    }

    #[must_use]
    pub fn contains_market(&self, id: &MarketId) -> bool {
        self.state.read().market(id).is_some()
    }

    #[must_use]
    pub fn contains_outcome(&self, id: &OutcomeId) -> bool {
        self.state.read().outcome(id).is_some()
    }

    /// Whether an incremental change targets an entity held here.
    #[must_use]
    pub fn concerns(&self, change: &ContentChange) -> bool {
        let state = self.state.read();
        match change {
            ContentChange::RemoveEvent(id)
            | ContentChange::EventState { event_id: id, .. }
            | ContentChange::EventTime { event_id: id, .. }
            | ContentChange::EventScore { event_id: id, .. }
            | ContentChange::EventMarketCount { event_id: id, .. } => state.event(id).is_some(),
            ContentChange::AddMarket(market) => market
                .event_id
                .as_ref()
                .is_some_and(|id| state.event(id).is_some()),
            ContentChange::SuspendMarket(id)
            | ContentChange::EnableMarket(id)
            | ContentChange::MarketTradability { market_id: id, .. } => {
                state.market(id).is_some()
            }
            ContentChange::OutcomeOdd { outcome_id, .. }
            | ContentChange::OutcomeTradability { outcome_id, .. } => {
                state.outcome(outcome_id).is_some()
            }
            _ => false,
        }
    }

    pub fn watch_event(&self, id: EventId) -> watch::Receiver<Option<Event>> {
        let mut state = self.state.write();
        let current = state.event(&id).cloned();
        state.event_watchers.watch(id, current)
    }

    pub fn watch_live_data(&self, id: EventId) -> watch::Receiver<Option<EventLiveData>> {
        let mut state = self.state.write();
        let current = state.event(&id).map(|event| event.live_data.clone());
        state.live_data_watchers.watch(id, current)
    }

    pub fn watch_market(&self, id: MarketId) -> watch::Receiver<Option<Market>> {
        let mut state = self.state.write();
        let current = state.market(&id).cloned();
        state.market_watchers.watch(id, current)
    }

    pub fn watch_outcome(&self, id: OutcomeId) -> watch::Receiver<Option<Outcome>> {
        let mut state = self.state.write();
        let current = state.outcome(&id).cloned();
        state.outcome_watchers.watch(id, current)
    }
}

fn set_if_changed<T: PartialEq>(slot: Option<&mut T>, value: T) -> bool {
    match slot {
        Some(slot) if *slot != value => {
            *slot = value;
            true
        }
        _ => false,
    }
}
