//! Content identifiers: the addressable topics of the live feed.
//!
//! A [`ContentIdentifier`] pairs a [`ContentType`] (topic family) with a
//! [`ContentRoute`] (family-specific parameters). Together they produce the
//! canonical key sent in REST subscribe payloads and carried by every socket
//! frame. The [`PageableId`] drops the volatile paging parameters so all pages
//! of one list resolve to the same owner.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::{EventId, MarketGroupId, MarketId, SportId};

const ROUTE_DATE_FORMAT: &str = "%Y%m%d%H%M";

/// Errors raised while parsing identifiers received from the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentParseError {
    #[error("unknown content type '{0}'")]
    UnknownType(String),

    #[error("malformed route '{route}' for {content_type}: {reason}")]
    MalformedRoute {
        content_type: ContentType,
        route: String,
        reason: &'static str,
    },
}

/// Topic families of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    PreLiveEvents,
    LiveEvents,
    EventGroup,
    OutrightEventGroup,
    EventDetails,
    EventSummary,
    EventLiveData,
    Market,
    LiveSports,
    PreLiveSports,
    AllSports,
}

impl ContentType {
    /// Wire name of the content type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PreLiveEvents => "eventListBySportTypeDate",
            Self::LiveEvents => "liveDataSummaryAdvancedListBySportType",
            Self::EventGroup => "eventGroup",
            Self::OutrightEventGroup => "outrightEventGroup",
            Self::EventDetails => "event",
            Self::EventSummary => "eventSummary",
            Self::EventLiveData => "liveDataExtended",
            Self::Market => "market",
            Self::LiveSports => "liveSportTypes",
            Self::PreLiveSports => "sportTypeByDate",
            Self::AllSports => "sportTypeList",
        }
    }

    /// Whether routes of this type carry paging parameters.
    #[must_use]
    pub const fn is_paginated(&self) -> bool {
        matches!(self, Self::PreLiveEvents | Self::LiveEvents)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ContentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let content_type = match s {
            "eventListBySportTypeDate" => Self::PreLiveEvents,
            "liveDataSummaryAdvancedListBySportType" => Self::LiveEvents,
            "eventGroup" => Self::EventGroup,
            "outrightEventGroup" => Self::OutrightEventGroup,
            "event" => Self::EventDetails,
            "eventSummary" => Self::EventSummary,
            "liveDataExtended" => Self::EventLiveData,
            "market" => Self::Market,
            "liveSportTypes" => Self::LiveSports,
            "sportTypeByDate" => Self::PreLiveSports,
            "sportTypeList" => Self::AllSports,
            other => return Err(ContentParseError::UnknownType(other.to_string())),
        };
        Ok(content_type)
    }
}

/// Ordering requested for pre-live event lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EventListSort {
    /// By start time.
    #[default]
    Date,
    /// By popularity.
    Popular,
}

impl EventListSort {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Date => "T",
            Self::Popular => "P",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "T" => Some(Self::Date),
            "P" => Some(Self::Popular),
            _ => None,
        }
    }
}

/// Family-specific parameters of a topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentRoute {
    PreLiveEvents {
        sport_id: SportId,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
        page_index: u32,
        page_size: u32,
        sort: EventListSort,
    },
    LiveEvents {
        sport_id: SportId,
        page_index: u32,
    },
    EventGroup {
        market_group_id: MarketGroupId,
    },
    OutrightEventGroup {
        market_group_id: MarketGroupId,
    },
    EventDetails {
        event_id: EventId,
    },
    EventSummary {
        event_id: EventId,
    },
    EventLiveData {
        event_id: EventId,
    },
    Market {
        market_id: MarketId,
    },
    LiveSports,
    PreLiveSports {
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    },
    AllSports,
}

fn format_date(date: Option<&DateTime<Utc>>) -> String {
    date.map(|d| d.format(ROUTE_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn parse_date(
    content_type: ContentType,
    route: &str,
    segment: &str,
) -> Result<Option<DateTime<Utc>>, ContentParseError> {
    if segment.is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(segment, ROUTE_DATE_FORMAT)
        .map(|naive| Some(Utc.from_utc_datetime(&naive)))
        .map_err(|_| ContentParseError::MalformedRoute {
            content_type,
            route: route.to_string(),
            reason: "invalid date segment",
        })
}

fn parse_number(
    content_type: ContentType,
    route: &str,
    segment: &str,
) -> Result<u32, ContentParseError> {
    segment
        .parse()
        .map_err(|_| ContentParseError::MalformedRoute {
            content_type,
            route: route.to_string(),
            reason: "invalid numeric segment",
        })
}

impl ContentRoute {
    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        match self {
            Self::PreLiveEvents { .. } => ContentType::PreLiveEvents,
            Self::LiveEvents { .. } => ContentType::LiveEvents,
            Self::EventGroup { .. } => ContentType::EventGroup,
            Self::OutrightEventGroup { .. } => ContentType::OutrightEventGroup,
            Self::EventDetails { .. } => ContentType::EventDetails,
            Self::EventSummary { .. } => ContentType::EventSummary,
            Self::EventLiveData { .. } => ContentType::EventLiveData,
            Self::Market { .. } => ContentType::Market,
            Self::LiveSports => ContentType::LiveSports,
            Self::PreLiveSports { .. } => ContentType::PreLiveSports,
            Self::AllSports => ContentType::AllSports,
        }
    }

    /// Full route string, e.g. `FBL/202210210000/202210212359/0/20/T`.
    #[must_use]
    pub fn route(&self) -> String {
        match self {
            Self::PreLiveEvents {
                sport_id,
                start_date,
                end_date,
                page_index,
                page_size,
                sort,
            } => format!(
                "{sport_id}/{}/{}/{page_index}/{page_size}/{}",
                format_date(start_date.as_ref()),
                format_date(end_date.as_ref()),
                sort.code()
            ),
            Self::LiveEvents {
                sport_id,
                page_index,
            } => format!("{sport_id}/{page_index}"),
            Self::PreLiveSports {
                start_date,
                end_date,
            } => format!(
                "{}/{}",
                format_date(start_date.as_ref()),
                format_date(end_date.as_ref())
            ),
            _ => self.pageable_route(),
        }
    }

    /// Route string without page index and page size.
    #[must_use]
    pub fn pageable_route(&self) -> String {
        match self {
            Self::PreLiveEvents {
                sport_id,
                start_date,
                end_date,
                sort,
                ..
            } => format!(
                "{sport_id}/{}/{}/{}",
                format_date(start_date.as_ref()),
                format_date(end_date.as_ref()),
                sort.code()
            ),
            Self::LiveEvents { sport_id, .. } => sport_id.to_string(),
            Self::EventGroup { market_group_id } | Self::OutrightEventGroup { market_group_id } => {
                market_group_id.to_string()
            }
            Self::EventDetails { event_id }
            | Self::EventSummary { event_id }
            | Self::EventLiveData { event_id } => event_id.to_string(),
            Self::Market { market_id } => market_id.to_string(),
            Self::PreLiveSports { .. } => self.route(),
            Self::LiveSports | Self::AllSports => String::new(),
        }
    }

    #[must_use]
    pub const fn page_index(&self) -> Option<u32> {
        match self {
            Self::PreLiveEvents { page_index, .. } | Self::LiveEvents { page_index, .. } => {
                Some(*page_index)
            }
            _ => None,
        }
    }

    /// Number of events per page; live lists are not bounded by the client.
    #[must_use]
    pub const fn page_size(&self) -> Option<u32> {
        match self {
            Self::PreLiveEvents { page_size, .. } => Some(*page_size),
            _ => None,
        }
    }

    /// The same route pointed at another page, or `None` for unpaged routes.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Option<Self> {
        match self {
            Self::PreLiveEvents {
                sport_id,
                start_date,
                end_date,
                page_size,
                sort,
                ..
            } => Some(Self::PreLiveEvents {
                sport_id: sport_id.clone(),
                start_date: *start_date,
                end_date: *end_date,
                page_index: page,
                page_size: *page_size,
                sort: *sort,
            }),
            Self::LiveEvents { sport_id, .. } => Some(Self::LiveEvents {
                sport_id: sport_id.clone(),
                page_index: page,
            }),
            _ => None,
        }
    }

    /// Parse a route string received for the given content type.
    pub fn parse(content_type: ContentType, route: &str) -> Result<Self, ContentParseError> {
        let malformed = |reason: &'static str| ContentParseError::MalformedRoute {
            content_type,
            route: route.to_string(),
            reason,
        };

        let parsed = match content_type {
            ContentType::PreLiveEvents => {
                let parts: Vec<&str> = route.split('/').collect();
                let [sport, start, end, page, size, sort] = parts.as_slice() else {
                    return Err(malformed("expected six segments"));
                };
                if sport.is_empty() {
                    return Err(malformed("missing sport"));
                }
                Self::PreLiveEvents {
                    sport_id: SportId::new(*sport),
                    start_date: parse_date(content_type, route, start)?,
                    end_date: parse_date(content_type, route, end)?,
                    page_index: parse_number(content_type, route, page)?,
                    page_size: parse_number(content_type, route, size)?,
                    sort: EventListSort::from_code(sort).ok_or_else(|| malformed("unknown sort"))?,
                }
            }
            ContentType::LiveEvents => {
                let (sport, page) = route
                    .split_once('/')
                    .ok_or_else(|| malformed("expected sport/page"))?;
                if sport.is_empty() {
                    return Err(malformed("missing sport"));
                }
                Self::LiveEvents {
                    sport_id: SportId::new(sport),
                    page_index: parse_number(content_type, route, page)?,
                }
            }
            ContentType::PreLiveSports => {
                let (start, end) = route.split_once('/').unwrap_or((route, ""));
                Self::PreLiveSports {
                    start_date: parse_date(content_type, route, start)?,
                    end_date: parse_date(content_type, route, end)?,
                }
            }
            ContentType::LiveSports => Self::LiveSports,
            ContentType::AllSports => Self::AllSports,
            _ if route.is_empty() => return Err(malformed("missing id")),
            ContentType::EventGroup => Self::EventGroup {
                market_group_id: MarketGroupId::new(route),
            },
            ContentType::OutrightEventGroup => Self::OutrightEventGroup {
                market_group_id: MarketGroupId::new(route),
            },
            ContentType::EventDetails => Self::EventDetails {
                event_id: EventId::new(route),
            },
            ContentType::EventSummary => Self::EventSummary {
                event_id: EventId::new(route),
            },
            ContentType::EventLiveData => Self::EventLiveData {
                event_id: EventId::new(route),
            },
            ContentType::Market => Self::Market {
                market_id: MarketId::new(route),
            },
        };
        Ok(parsed)
    }
}

/// Paging-independent key of a topic. All pages of one list share it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageableId(String);

impl PageableId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A uniquely addressable subject of subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentIdentifier {
    route: ContentRoute,
}

impl ContentIdentifier {
    #[must_use]
    pub const fn new(route: ContentRoute) -> Self {
        Self { route }
    }

    /// Parse the `{type, id}` pair carried by payloads and socket frames.
    pub fn parse(content_type: &str, route: &str) -> Result<Self, ContentParseError> {
        let content_type = ContentType::from_str(content_type)?;
        ContentRoute::parse(content_type, route).map(Self::new)
    }

    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        self.route.content_type()
    }

    #[must_use]
    pub const fn content_route(&self) -> &ContentRoute {
        &self.route
    }

    /// Canonical dedup key: type plus full route.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}|{}", self.content_type(), self.route.route())
    }

    #[must_use]
    pub fn pageable_id(&self) -> PageableId {
        PageableId(format!(
            "{}|{}",
            self.content_type(),
            self.route.pageable_route()
        ))
    }

    /// The identifier of another page of the same list.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Option<Self> {
        self.route.with_page(page).map(Self::new)
    }
}

impl fmt::Display for ContentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl Serialize for ContentIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ContentIdentifier", 2)?;
        state.serialize_field("type", self.content_type().as_str())?;
        state.serialize_field("id", &self.route.route())?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ContentIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(rename = "type")]
            content_type: String,
            #[serde(default)]
            id: String,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::parse(&raw.content_type, &raw.id).map_err(de::Error::custom)
    }
}
