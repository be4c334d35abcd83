//! Replay of active topics when the socket session rotates.

mod support;

use std::time::Duration;

use sportsync::application::{ReplaySummary, SubscribableContent};
use sportsync::domain::{ContentChange, ContentUpdate, EventId, MarketId, TokenHash, TokenName};
use sportsync::testkit::api::RecordingApi;
use sportsync::testkit::domain::{
    event_details, events, market_topic, market_with_outcomes, sport,
};
use support::harness::{
    connected, connected_with, disconnected, next_content, take_handle, FIRST_TOKEN,
    SECOND_TOKEN,
};

#[tokio::test]
async fn rotation_replays_every_active_topic_under_new_session() {
    let h = connected(10).await;

    let mut list = h
        .orchestrator
        .subscribe_live_matches(&sport("FBL", "Football"))
        .await
        .unwrap();
    let mut details = h
        .orchestrator
        .subscribe_event_details(&EventId::new("e1"))
        .await
        .unwrap();
    let mut market = h
        .orchestrator
        .subscribe_market_details(&MarketId::new("m1"), None)
        .await
        .unwrap();
    let _handles = (
        take_handle(&mut list).await,
        take_handle(&mut details).await,
        take_handle(&mut market).await,
    );
    h.api.reset_calls();

    let summary = h
        .orchestrator
        .on_socket_token(Some(SECOND_TOKEN.to_string()))
        .await;
    assert_eq!(
        summary,
        Some(ReplaySummary {
            replayed: 3,
            failed: 0
        })
    );

    let calls = h.api.subscribe_calls();
    assert_eq!(calls.len(), 3);
    assert!(calls
        .iter()
        .all(|call| call.session == TokenHash::of(SECOND_TOKEN)));
    assert_eq!(
        h.tokens.current(TokenName::SocketSession).as_deref(),
        Some(SECOND_TOKEN)
    );

    // Each stream is told it is connected again.
    assert!(matches!(
        details.next().await,
        Some(SubscribableContent::Connected(_))
    ));
}

#[tokio::test]
async fn first_token_is_not_a_reconnection() {
    let h = disconnected(10);

    assert!(h
        .orchestrator
        .on_socket_token(Some(FIRST_TOKEN.to_string()))
        .await
        .is_none());
    assert!(h
        .orchestrator
        .on_socket_token(Some(FIRST_TOKEN.to_string()))
        .await
        .is_none());
    assert!(h.api.subscribe_calls().is_empty());
    assert_eq!(
        h.tokens.current_hash(TokenName::SocketSession),
        Some(TokenHash::of(FIRST_TOKEN))
    );
}

#[tokio::test]
async fn replay_failure_is_isolated_to_one_topic() {
    let h = connected(10).await;

    let mut details = h
        .orchestrator
        .subscribe_event_details(&EventId::new("e1"))
        .await
        .unwrap();
    let mut market = h
        .orchestrator
        .subscribe_market_details(&MarketId::new("m1"), None)
        .await
        .unwrap();
    let _details_handle = take_handle(&mut details).await;
    let _market_handle = take_handle(&mut market).await;

    h.api.fail_identifier(&event_details("e1"));
    let summary = h
        .orchestrator
        .on_socket_token(Some(SECOND_TOKEN.to_string()))
        .await
        .unwrap();

    assert_eq!(summary.replayed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(h.orchestrator.active_topics(), vec![market_topic("m1")]);
}

#[tokio::test]
async fn released_topics_are_collected_and_not_replayed() {
    let h = connected(10).await;

    let mut kept = h
        .orchestrator
        .subscribe_event_details(&EventId::new("e1"))
        .await
        .unwrap();
    let mut released = h
        .orchestrator
        .subscribe_event_details(&EventId::new("e2"))
        .await
        .unwrap();
    let _kept_handle = take_handle(&mut kept).await;
    let released_handle = take_handle(&mut released).await;

    drop(released_handle);
    h.api.settle().await;
    h.api.reset_calls();

    let summary = h
        .orchestrator
        .on_socket_token(Some(SECOND_TOKEN.to_string()))
        .await
        .unwrap();
    assert_eq!(summary.replayed, 1);
    assert_eq!(
        h.api
            .subscribe_calls()
            .into_iter()
            .map(|call| call.identifier)
            .collect::<Vec<_>>(),
        vec![event_details("e1")]
    );
    assert!(released.next().await.is_none());
}

#[tokio::test]
async fn dropped_handle_unsubscribes_under_current_session() {
    let h = connected(10).await;
    let mut stream = h
        .orchestrator
        .subscribe_event_details(&EventId::new("e1"))
        .await
        .unwrap();
    let handle = take_handle(&mut stream).await;

    h.orchestrator
        .on_socket_token(Some(SECOND_TOKEN.to_string()))
        .await;
    drop(handle);
    h.api.settle().await;

    let calls = h.api.unsubscribe_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].identifier, event_details("e1"));
    assert_eq!(calls[0].session, TokenHash::of(SECOND_TOKEN));
}

#[tokio::test]
async fn lost_session_marks_streams_disconnected_then_replays() {
    let h = connected(10).await;
    let mut stream = h
        .orchestrator
        .subscribe_live_matches(&sport("FBL", "Football"))
        .await
        .unwrap();
    let handle = take_handle(&mut stream).await;
    h.orchestrator.dispatch(&ContentUpdate::new(
        handle.content_identifier().clone(),
        ContentChange::Events(events("e", 2)),
    ));
    next_content(&mut stream).await;

    assert!(h.orchestrator.on_socket_token(None).await.is_none());
    assert!(matches!(
        stream.next().await,
        Some(SubscribableContent::Disconnected)
    ));
    assert!(h.tokens.current(TokenName::SocketSession).is_none());

    h.api.reset_calls();
    let summary = h
        .orchestrator
        .on_socket_token(Some(SECOND_TOKEN.to_string()))
        .await;
    assert_eq!(
        summary,
        Some(ReplaySummary {
            replayed: 1,
            failed: 0
        })
    );
    assert!(matches!(
        stream.next().await,
        Some(SubscribableContent::Connected(_))
    ));
    assert_eq!(h.api.subscribe_calls().len(), 1);
}

#[tokio::test]
async fn replay_includes_associated_pages() {
    let h = connected(2).await;
    let query = sportsync::application::EventListQuery::Live {
        sport: sport("FBL", "Football"),
    };
    let mut stream = h.orchestrator.subscribe_events(&query).await.unwrap();
    let handle = take_handle(&mut stream).await;
    h.orchestrator.dispatch(&ContentUpdate::new(
        handle.content_identifier().clone(),
        ContentChange::Events(events("e", 2)),
    ));
    assert!(h.orchestrator.request_next_page(&query).await.unwrap());
    h.api.reset_calls();

    let summary = h
        .orchestrator
        .on_socket_token(Some(SECOND_TOKEN.to_string()))
        .await
        .unwrap();
    assert_eq!(summary.replayed, 1);
    assert_eq!(h.api.subscribes_for(&TokenHash::of(SECOND_TOKEN)), handle.identifiers());
}

#[tokio::test]
async fn rotation_during_first_subscribe_keeps_the_topic() {
    let h = connected_with(RecordingApi::with_latency(Duration::from_millis(50)), 10).await;

    let market_id = MarketId::new("m1");
    let (subscribed, summary) = tokio::join!(
        h.orchestrator.subscribe_market_details(&market_id, None),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            h.orchestrator
                .on_socket_token(Some(SECOND_TOKEN.to_string()))
                .await
        }
    );
    assert_eq!(
        summary,
        Some(ReplaySummary {
            replayed: 1,
            failed: 0
        })
    );

    let mut stream = subscribed.unwrap();
    let handle = take_handle(&mut stream).await;
    assert_eq!(handle.session(), TokenHash::of(SECOND_TOKEN));
    assert_eq!(h.orchestrator.active_topics(), vec![market_topic("m1")]);
    assert_eq!(
        h.api.subscribes_for(&TokenHash::of(SECOND_TOKEN)),
        vec![market_topic("m1")]
    );
    assert!(h.orchestrator.dispatch(&ContentUpdate::new(
        market_topic("m1"),
        ContentChange::MarketDetails(Some(market_with_outcomes("m1", &["o1"]))),
    )));
}

#[tokio::test]
async fn stale_handle_release_spares_a_fresh_subscription() {
    let h = connected(10).await;
    let mut stale = h
        .orchestrator
        .subscribe_market_details(&MarketId::new("m1"), None)
        .await
        .unwrap();
    let stale_handle = take_handle(&mut stale).await;

    h.api.fail_identifier(&market_topic("m1"));
    let summary = h
        .orchestrator
        .on_socket_token(Some(SECOND_TOKEN.to_string()))
        .await
        .unwrap();
    assert_eq!(summary.failed, 1);
    assert_eq!(stale_handle.session(), TokenHash::of(FIRST_TOKEN));
    h.api.heal();

    let mut fresh = h
        .orchestrator
        .subscribe_market_details(&MarketId::new("m1"), None)
        .await
        .unwrap();
    let _fresh_handle = take_handle(&mut fresh).await;

    drop(stale_handle);
    h.api.settle().await;

    assert!(h
        .api
        .unsubscribe_calls()
        .iter()
        .all(|call| call.session != TokenHash::of(SECOND_TOKEN)));
    assert_eq!(h.orchestrator.active_topics(), vec![market_topic("m1")]);
}
