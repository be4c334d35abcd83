//! Raw socket frame -> [`ContentUpdate`].
//!
//! Frames are JSON envelopes:
//!
//! - `{"notificationType": "LISTENING_STARTED", "data": "<session token>"}`
//! - `{"notificationType": "CONTENT_CHANGES", "data": [<container>, ...]}`
//!
//! A container without `path` is a snapshot of its topic; with `path` it is
//! an incremental change whose entity ids are read from the path.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

use super::path::{extract_id, match_minutes, EVENT_KEY, MARKET_KEY, SELECTION_KEY};
use crate::domain::{
    ContentChange, ContentIdentifier, ContentParseError, ContentRoute, ContentType, ContentUpdate,
    Event, EventId, Market, MarketId, OutcomeId, SportType,
};

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Content(#[from] ContentParseError),

    #[error("ignored change at '{path}' ({change_type})")]
    Ignored { path: String, change_type: String },
}

/// Decoded socket frame.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketNotification {
    /// The socket session is ready; carries the session token.
    ListeningStarted { session_token: String },
    ContentChanges(Vec<ContentUpdate>),
    Unknown,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    notification_type: String,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Container {
    content_id: ContentIdentifier,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    change_type: Option<String>,
    #[serde(default)]
    change: Option<Value>,
}

#[derive(Deserialize)]
struct SelectionChange {
    #[serde(rename = "idfoselection")]
    selection_id: Option<String>,
    #[serde(rename = "currentpriceup")]
    numerator: Option<String>,
    #[serde(rename = "currentpricedown")]
    denominator: Option<String>,
    /// Present (even as `null`) when the selection was suspended or reopened.
    #[serde(
        default,
        rename = "idfoselectionsuspensiontype",
        deserialize_with = "present"
    )]
    suspension_type: Option<Option<String>>,
}

fn present<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Option<String>>, D::Error> {
    Option::<String>::deserialize(deserializer).map(Some)
}

const SUSPENDED: &str = "N/O";

#[derive(Deserialize)]
struct ScoreChange {
    home: Option<u32>,
    away: Option<u32>,
}

#[derive(Deserialize)]
struct GroupChange {
    #[serde(default)]
    events: Value,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SocketMessageDecoder;

impl SocketMessageDecoder {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode one text frame. Containers that fail to decode are skipped.
    pub fn decode(&self, frame: &str) -> Result<SocketNotification, DecodeError> {
        let envelope: Envelope = serde_json::from_str(frame)?;
        match envelope.notification_type.as_str() {
            "LISTENING_STARTED" => match envelope.data {
                Value::String(session_token) => Ok(SocketNotification::ListeningStarted { session_token }),
                _ => Ok(SocketNotification::Unknown),
            },
            "CONTENT_CHANGES" => {
                let containers = match envelope.data {
                    Value::Array(containers) => containers,
                    _ => Vec::new(),
                };
                let updates = containers
                    .into_iter()
                    .filter_map(|container| match self.decode_container(container) {
                        Ok(update) => Some(update),
                        Err(err) => {
                            debug!(error = %err, "Skipping content change");
                            None
                        }
                    })
                    .collect();
                Ok(SocketNotification::ContentChanges(updates))
            }
            other => {
                trace!(notification_type = other, "Unknown notification");
                Ok(SocketNotification::Unknown)
            }
        }
    }

    /// Decode one content container.
    pub fn decode_container(&self, container: Value) -> Result<ContentUpdate, DecodeError> {
        let container: Container = serde_json::from_value(container)?;
        let change = match container.path {
            Some(path) => decode_change(
                &container.content_id,
                &path,
                container.change_type.as_deref().unwrap_or_default(),
                container.change,
            )?,
            None => decode_snapshot(&container.content_id, container.change)?,
        };
        Ok(ContentUpdate::new(container.content_id, change))
    }
}

fn lenient_list<T: DeserializeOwned>(value: Option<Value>) -> Vec<T> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

fn optional<T: DeserializeOwned>(value: Option<Value>) -> Result<Option<T>, DecodeError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
    }
}

fn required<T: DeserializeOwned>(value: Option<&Value>) -> Result<T, DecodeError> {
    Ok(T::deserialize(value.unwrap_or(&Value::Null))?)
}

fn decode_snapshot(
    identifier: &ContentIdentifier,
    change: Option<Value>,
) -> Result<ContentChange, DecodeError> {
    let decoded = match identifier.content_type() {
        ContentType::LiveEvents | ContentType::PreLiveEvents => {
            ContentChange::Events(lenient_list::<Event>(change))
        }
        ContentType::LiveSports | ContentType::PreLiveSports | ContentType::AllSports => {
            ContentChange::Sports(lenient_list::<SportType>(change))
        }
        ContentType::EventGroup | ContentType::OutrightEventGroup => {
            let events = match change {
                Some(Value::Array(events)) => Value::Array(events),
                other => optional::<GroupChange>(other)?
                    .map(|group| group.events)
                    .unwrap_or_default(),
            };
            ContentChange::Events(lenient_list::<Event>(Some(events)))
        }
        ContentType::EventSummary => {
            ContentChange::Events(optional::<Event>(change)?.into_iter().collect())
        }
        ContentType::EventDetails => ContentChange::EventDetails(optional(change)?),
        ContentType::EventLiveData => ContentChange::LiveData(optional(change)?),
        ContentType::Market => ContentChange::MarketDetails(optional(change)?),
    };
    Ok(decoded)
}

fn decode_change(
    identifier: &ContentIdentifier,
    path: &str,
    change_type: &str,
    change: Option<Value>,
) -> Result<ContentChange, DecodeError> {
    let has = |needle: &str| path.contains(needle);
    let updated = change_type.contains("updated");
    let added = change_type.contains("added");
    let removed = change_type.contains("removed");
    let event_id = || extract_id(path, EVENT_KEY).map(EventId::new);
    let market_id = || extract_id(path, MARKET_KEY).map(MarketId::new);

    if has(EVENT_KEY) && has(MARKET_KEY) && !has(SELECTION_KEY) {
        if added {
            let mut market: Market = required(change.as_ref())?;
            if market.event_id.is_none() {
                market.event_id = event_id();
            }
            return Ok(ContentChange::AddMarket(market));
        }
        if let Some(market_id) = market_id() {
            if removed {
                return Ok(ContentChange::SuspendMarket(market_id));
            }
            if has("istradable") && updated {
                return Ok(ContentChange::MarketTradability {
                    market_id,
                    is_tradable: required(change.as_ref())?,
                });
            }
        }
    }

    if has(SELECTION_KEY) && has("istradable") && updated {
        if let Some(outcome_id) = extract_id(path, SELECTION_KEY) {
            return Ok(ContentChange::OutcomeTradability {
                outcome_id: OutcomeId::new(outcome_id),
                is_tradable: required(change.as_ref())?,
            });
        }
    }

    if has(SELECTION_KEY) && (updated || has("selections")) {
        let selection: SelectionChange = required(change.as_ref())?;
        let outcome_id = selection
            .selection_id
            .or_else(|| extract_id(path, SELECTION_KEY));
        if let Some(outcome_id) = outcome_id {
            let outcome_id = OutcomeId::new(outcome_id);
            if selection.numerator.is_some() || selection.denominator.is_some() {
                return Ok(ContentChange::OutcomeOdd {
                    outcome_id,
                    numerator: selection.numerator,
                    denominator: selection.denominator,
                });
            }
            if let Some(suspension) = selection.suspension_type {
                return Ok(ContentChange::OutcomeTradability {
                    outcome_id,
                    is_tradable: suspension.as_deref() != Some(SUSPENDED),
                });
            }
        }
    }

    if let Some(event_id) = event_id() {
        if has("numMarkets") && updated {
            return Ok(ContentChange::EventMarketCount {
                event_id,
                market_count: required(change.as_ref())?,
            });
        }
        if has("liveDataSummary") {
            if has("scores") && (has("MATCH_SCORE") || has("CURRENT_SCORE")) {
                let score: ScoreChange = required(change.as_ref())?;
                return Ok(ContentChange::EventScore {
                    event_id,
                    home: score.home,
                    away: score.away,
                });
            }
            if has("matchTime") && updated {
                let match_time: String = required(change.as_ref())?;
                if let Some(minutes) = match_minutes(&match_time) {
                    return Ok(ContentChange::EventTime {
                        event_id,
                        match_time: minutes,
                    });
                }
            }
            if has("status") {
                return Ok(ContentChange::EventState {
                    event_id,
                    state: required(change.as_ref())?,
                });
            }
        }
        if added && !has(MARKET_KEY) {
            return Ok(ContentChange::AddEvent(required(change.as_ref())?));
        }
        if removed && !has(MARKET_KEY) {
            return Ok(ContentChange::RemoveEvent(event_id));
        }
    }

    if has("istradable") && updated {
        if let ContentRoute::Market { market_id } = identifier.content_route() {
            let is_tradable: bool = required(change.as_ref())?;
            return Ok(if is_tradable {
                ContentChange::EnableMarket(market_id.clone())
            } else {
                ContentChange::SuspendMarket(market_id.clone())
            });
        }
    }

    if has("idfosporttype") && added {
        return Ok(ContentChange::AddSport(required(change.as_ref())?));
    }

    Err(DecodeError::Ignored {
        path: path.to_string(),
        change_type: change_type.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Odd;

    fn changes(frame: &str) -> Vec<ContentUpdate> {
        match SocketMessageDecoder::new().decode(frame).unwrap() {
            SocketNotification::ContentChanges(updates) => updates,
            other => panic!("unexpected notification {other:?}"),
        }
    }

    #[test]
    fn listening_started_carries_token() {
        let decoded = SocketMessageDecoder::new()
            .decode(r#"{"notificationType":"LISTENING_STARTED","data":"tok-1"}"#)
            .unwrap();
        assert_eq!(
            decoded,
            SocketNotification::ListeningStarted {
                session_token: "tok-1".into()
            }
        );
    }

    #[test]
    fn unknown_notification() {
        let decoded = SocketMessageDecoder::new()
            .decode(r#"{"notificationType":"HEARTBEAT"}"#)
            .unwrap();
        assert_eq!(decoded, SocketNotification::Unknown);
        assert!(SocketMessageDecoder::new().decode("not json").is_err());
    }

    #[test]
    fn event_list_snapshot_skips_bad_entries() {
        let updates = changes(
            r#"{"notificationType":"CONTENT_CHANGES","data":[
                {"contentId":{"type":"liveDataSummaryAdvancedListBySportType","id":"FBL/0"},
                 "change":[{"id":"e1"},{"broken":true},{"id":"e2"}]}
            ]}"#,
        );
        assert_eq!(updates.len(), 1);
        let ContentChange::Events(events) = &updates[0].change else {
            panic!("expected events");
        };
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn event_summary_snapshot_is_a_single_event() {
        let updates = changes(
            r#"{"notificationType":"CONTENT_CHANGES","data":[
                {"contentId":{"type":"eventSummary","id":"e1"},"change":{"id":"e1"}}
            ]}"#,
        );
        let ContentChange::Events(events) = &updates[0].change else {
            panic!("expected events");
        };
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, EventId::new("e1"));
    }

    #[test]
    fn invalid_container_is_skipped() {
        let updates = changes(
            r#"{"notificationType":"CONTENT_CHANGES","data":[
                {"contentId":{"type":"nope","id":"1"},"change":[]},
                {"contentId":{"type":"market","id":"m1"}}
            ]}"#,
        );
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].change, ContentChange::MarketDetails(None));
    }

    #[test]
    fn outcome_odd_update() {
        let updates = changes(
            r#"{"notificationType":"CONTENT_CHANGES","data":[
                {"contentId":{"type":"event","id":"e1"},
                 "path":"event[idfoevent='e1'].markets[idfomarket='m1'].selections[idfoselection='o1']",
                 "changeType":"updated",
                 "change":{"idfoselection":"o1","currentpriceup":"5","currentpricedown":"2"}}
            ]}"#,
        );
        let ContentChange::OutcomeOdd {
            outcome_id,
            numerator,
            denominator,
        } = &updates[0].change
        else {
            panic!("expected odd update");
        };
        assert_eq!(outcome_id, &OutcomeId::new("o1"));
        assert_eq!(
            Odd::parse(numerator.as_deref(), denominator.as_deref()),
            Some(Odd::new(5, 2))
        );
    }

    #[test]
    fn selection_suspension_toggles_outcome_tradability() {
        let updates = changes(
            r#"{"notificationType":"CONTENT_CHANGES","data":[
                {"contentId":{"type":"event","id":"e1"},
                 "path":"event[idfoevent='e1'].markets[idfomarket='m1'].selections[idfoselection='o1']",
                 "changeType":"updated",
                 "change":{"idfoselection":"o1","idfoselectionsuspensiontype":"N/O"}},
                {"contentId":{"type":"event","id":"e1"},
                 "path":"event[idfoevent='e1'].markets[idfomarket='m1'].selections[idfoselection='o1']",
                 "changeType":"updated",
                 "change":{"idfoselection":"o1","idfoselectionsuspensiontype":null}},
                {"contentId":{"type":"event","id":"e1"},
                 "path":"event[idfoevent='e1'].markets[idfomarket='m1'].selections[idfoselection='o1']",
                 "changeType":"updated",
                 "change":{"idfoselection":"o1"}}
            ]}"#,
        );
        assert_eq!(updates.len(), 2);
        assert_eq!(
            updates[0].change,
            ContentChange::OutcomeTradability {
                outcome_id: OutcomeId::new("o1"),
                is_tradable: false
            }
        );
        assert_eq!(
            updates[1].change,
            ContentChange::OutcomeTradability {
                outcome_id: OutcomeId::new("o1"),
                is_tradable: true
            }
        );
    }

    #[test]
    fn unparsable_match_time_falls_through_to_ignored() {
        let err = SocketMessageDecoder::new()
            .decode_container(serde_json::json!({
                "contentId": {"type": "event", "id": "e1"},
                "path": "event[idfoevent='e1'].liveDataSummary.matchTime",
                "changeType": "updated",
                "change": "--"
            }))
            .unwrap_err();
        assert!(matches!(err, DecodeError::Ignored { .. }));
    }

    #[test]
    fn market_changes() {
        let updates = changes(
            r#"{"notificationType":"CONTENT_CHANGES","data":[
                {"contentId":{"type":"event","id":"e1"},
                 "path":"event[idfoevent='e1'].markets[idfomarket='m1'].istradable",
                 "changeType":"updated","change":false},
                {"contentId":{"type":"event","id":"e1"},
                 "path":"event[idfoevent='e1'].markets[idfomarket='m2']",
                 "changeType":"added","change":{"id":"m2"}},
                {"contentId":{"type":"event","id":"e1"},
                 "path":"event[idfoevent='e1'].markets[idfomarket='m3']",
                 "changeType":"removed"}
            ]}"#,
        );
        assert_eq!(
            updates[0].change,
            ContentChange::MarketTradability {
                market_id: MarketId::new("m1"),
                is_tradable: false
            }
        );
        let ContentChange::AddMarket(market) = &updates[1].change else {
            panic!("expected added market");
        };
        assert_eq!(market.event_id, Some(EventId::new("e1")));
        assert_eq!(updates[2].change, ContentChange::SuspendMarket(MarketId::new("m3")));
    }

    #[test]
    fn live_data_changes() {
        let updates = changes(
            r#"{"notificationType":"CONTENT_CHANGES","data":[
                {"contentId":{"type":"event","id":"e1"},
                 "path":"event[idfoevent='e1'].liveDataSummary.scores.MATCH_SCORE",
                 "changeType":"updated","change":{"home":2,"away":1}},
                {"contentId":{"type":"event","id":"e1"},
                 "path":"event[idfoevent='e1'].liveDataSummary.matchTime",
                 "changeType":"updated","change":"67:04"},
                {"contentId":{"type":"event","id":"e1"},
                 "path":"event[idfoevent='e1'].liveDataSummary.status",
                 "changeType":"updated","change":"2H"},
                {"contentId":{"type":"event","id":"e1"},
                 "path":"event[idfoevent='e1'].numMarkets",
                 "changeType":"updated","change":42}
            ]}"#,
        );
        let event_id = EventId::new("e1");
        assert_eq!(
            updates[0].change,
            ContentChange::EventScore {
                event_id: event_id.clone(),
                home: Some(2),
                away: Some(1)
            }
        );
        assert_eq!(
            updates[1].change,
            ContentChange::EventTime {
                event_id: event_id.clone(),
                match_time: "67".into()
            }
        );
        assert_eq!(
            updates[2].change,
            ContentChange::EventState {
                event_id: event_id.clone(),
                state: "2H".into()
            }
        );
        assert_eq!(
            updates[3].change,
            ContentChange::EventMarketCount {
                event_id,
                market_count: 42
            }
        );
    }

    #[test]
    fn market_topic_tradability_toggles_availability() {
        let updates = changes(
            r#"{"notificationType":"CONTENT_CHANGES","data":[
                {"contentId":{"type":"market","id":"m1"},"path":"istradable",
                 "changeType":"updated","change":true},
                {"contentId":{"type":"market","id":"m1"},"path":"istradable",
                 "changeType":"updated","change":false}
            ]}"#,
        );
        assert_eq!(updates[0].change, ContentChange::EnableMarket(MarketId::new("m1")));
        assert_eq!(updates[1].change, ContentChange::SuspendMarket(MarketId::new("m1")));
    }

    #[test]
    fn unrecognised_path_is_ignored() {
        let err = SocketMessageDecoder::new()
            .decode_container(serde_json::json!({
                "contentId": {"type": "event", "id": "e1"},
                "path": "something.else",
                "changeType": "updated",
                "change": 1
            }))
            .unwrap_err();
        assert!(matches!(err, DecodeError::Ignored { .. }));
    }
}
