//! Per-entity routing and cross-topic update fan-out.

mod support;

use sportsync::application::{ContentStream, Subscription};
use sportsync::domain::{
    ContentChange, ContentUpdate, EventId, EventsGroup, MarketId, Odd, OutcomeId,
};
use sportsync::error::SubscribeError;
use sportsync::testkit::domain::{event_details, event_with_market, sport};
use support::harness::{connected, next_content, take_handle, Harness};

/// A live football list holding `e1` (market `m1`, outcome `o1`) and `e2`
/// (market `m2`, outcome `o2`).
async fn list_with_two_events(h: &Harness) -> (Subscription, ContentStream<Vec<EventsGroup>>) {
    let mut stream = h
        .orchestrator
        .subscribe_live_matches(&sport("FBL", "Football"))
        .await
        .unwrap();
    let handle = take_handle(&mut stream).await;
    h.orchestrator.dispatch(&ContentUpdate::new(
        handle.content_identifier().clone(),
        ContentChange::Events(vec![
            event_with_market("e1", "m1", "o1"),
            event_with_market("e2", "m2", "o2"),
        ]),
    ));
    next_content(&mut stream).await;
    (handle, stream)
}

#[tokio::test]
async fn detail_coordinator_wins_over_list() {
    let h = connected(10).await;
    let (list_handle, _list) = list_with_two_events(&h).await;

    let mut details = h
        .orchestrator
        .subscribe_event_details(&EventId::new("e1"))
        .await
        .unwrap();
    let details_handle = take_handle(&mut details).await;
    h.orchestrator.dispatch(&ContentUpdate::new(
        event_details("e1"),
        ContentChange::EventDetails(Some(event_with_market("e1", "m1", "o1"))),
    ));
    next_content(&mut details).await;

    let live = h
        .orchestrator
        .subscribe_to_event_live_data_updates(&EventId::new("e1"))
        .await
        .unwrap();
    assert_eq!(live.subscription(), Some(&details_handle));

    let market = h
        .orchestrator
        .subscribe_to_event_market_updates(&MarketId::new("m1"))
        .unwrap();
    assert_eq!(market.subscription(), Some(&details_handle));

    // Only the list knows e2.
    let outcome = h
        .orchestrator
        .subscribe_to_event_outcome_updates(&OutcomeId::new("o2"))
        .unwrap();
    assert_eq!(outcome.subscription(), Some(&list_handle));
    assert_eq!(h.api.subscribe_calls().len(), 2);
}

#[tokio::test]
async fn unknown_event_bootstraps_detail_subscription() {
    let h = connected(10).await;

    let live = h
        .orchestrator
        .subscribe_to_event_live_data_updates(&EventId::new("e7"))
        .await
        .unwrap();

    assert_eq!(
        live.subscription().map(|s| s.content_identifier().clone()),
        Some(event_details("e7"))
    );
    assert_eq!(h.orchestrator.active_topics(), vec![event_details("e7")]);
    assert_eq!(h.api.subscribe_calls().len(), 1);
}

#[tokio::test]
async fn unknown_market_or_outcome_is_not_found() {
    let h = connected(10).await;
    let _list = list_with_two_events(&h).await;

    assert_eq!(
        h.orchestrator
            .subscribe_to_event_market_updates(&MarketId::new("m9"))
            .err(),
        Some(SubscribeError::SubscriptionNotFound)
    );
    assert_eq!(
        h.orchestrator
            .subscribe_to_event_outcome_updates(&OutcomeId::new("o9"))
            .err(),
        Some(SubscribeError::SubscriptionNotFound)
    );
}

#[tokio::test]
async fn incremental_update_reaches_every_holder() {
    let h = connected(10).await;
    let (list_handle, mut list) = list_with_two_events(&h).await;

    let mut details = h
        .orchestrator
        .subscribe_event_details(&EventId::new("e1"))
        .await
        .unwrap();
    let _details_handle = take_handle(&mut details).await;
    h.orchestrator.dispatch(&ContentUpdate::new(
        event_details("e1"),
        ContentChange::EventDetails(Some(event_with_market("e1", "m1", "o1"))),
    ));
    next_content(&mut details).await;

    let mut from_details = h
        .orchestrator
        .subscribe_to_event_outcome_updates(&OutcomeId::new("o1"))
        .unwrap();

    // The odd change is published on the list topic.
    assert!(h.orchestrator.dispatch(&ContentUpdate::new(
        list_handle.content_identifier().clone(),
        ContentChange::OutcomeOdd {
            outcome_id: OutcomeId::new("o1"),
            numerator: Some("5".into()),
            denominator: Some("2".into()),
        },
    )));

    let event = next_content(&mut details).await;
    assert_eq!(event.outcome(&OutcomeId::new("o1")).unwrap().odd, Odd::new(5, 2));

    let groups = next_content(&mut list).await;
    let listed = groups[0]
        .events
        .iter()
        .find(|e| e.id == EventId::new("e1"))
        .unwrap();
    assert_eq!(listed.outcome(&OutcomeId::new("o1")).unwrap().odd, Odd::new(5, 2));

    let outcome = from_details.changed().await.unwrap().unwrap();
    assert_eq!(outcome.odd, Odd::new(5, 2));
}

#[tokio::test]
async fn suspended_market_stays_listed_and_reopens() {
    let h = connected(10).await;
    let (list_handle, _list) = list_with_two_events(&h).await;

    let mut market = h
        .orchestrator
        .subscribe_to_event_market_updates(&MarketId::new("m2"))
        .unwrap();
    assert!(market.current().unwrap().is_tradable);

    h.orchestrator.dispatch(&ContentUpdate::new(
        list_handle.content_identifier().clone(),
        ContentChange::SuspendMarket(MarketId::new("m2")),
    ));
    let suspended = market.changed().await.unwrap().unwrap();
    assert!(!suspended.is_tradable);

    h.orchestrator.dispatch(&ContentUpdate::new(
        list_handle.content_identifier().clone(),
        ContentChange::EnableMarket(MarketId::new("m2")),
    ));
    let reopened = market.changed().await.unwrap().unwrap();
    assert!(reopened.is_tradable);
    assert!(h
        .orchestrator
        .subscribe_to_event_market_updates(&MarketId::new("m2"))
        .is_ok());
}
