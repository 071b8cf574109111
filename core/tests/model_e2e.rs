//! `CoinListModel` lifecycle over real HTTP against the mock server.

use std::time::Duration;

use coin_core::{
    CoinListModel, FetchConfig, FetchError, FetchOutcome, RefreshPolicy, ReqwestTransport,
};
use mock_server::{MarketsMock, MarketsReply};
use tokio::task::LocalSet;

const BITCOIN: &str = r#"[{"id":"bitcoin","name":"Bitcoin","symbol":"btc","image":"x","current_price":50000,"price_change_percentage_24h":1.5}]"#;

async fn model_for(mock: &MarketsMock, policy: RefreshPolicy) -> CoinListModel<ReqwestTransport> {
    let addr = mock_server::spawn(mock.clone()).await.unwrap();
    let config = FetchConfig {
        base_url: format!("http://{addr}"),
        policy,
        ..FetchConfig::default()
    };
    CoinListModel::new(config.build_service().unwrap(), config.policy)
}

#[tokio::test]
async fn initialize_loads_single_coin() {
    let mock = MarketsMock::new(MarketsReply::ok(BITCOIN));
    let model = model_for(&mock, RefreshPolicy::default()).await;

    let outcome = model.initialize().await;

    assert!(matches!(outcome, FetchOutcome::Loaded { count: 1 }));
    let state = model.snapshot();
    assert_eq!(state.coins.len(), 1);
    assert_eq!(state.coins[0].id, "bitcoin");
    assert!(state.error.is_none());
}

#[tokio::test]
async fn initialize_with_server_error_leaves_list_empty() {
    let mock = MarketsMock::new(MarketsReply::status(500, ""));
    let model = model_for(&mock, RefreshPolicy::default()).await;

    model.initialize().await;

    let state = model.snapshot();
    assert!(state.coins.is_empty());
    assert!(matches!(state.error, Some(FetchError::ServerError { status: 500 })));
}

#[tokio::test]
async fn refresh_empties_list_before_response_arrives() {
    let mock = MarketsMock::new(MarketsReply::ok(BITCOIN));
    let model = model_for(&mock, RefreshPolicy::default()).await;
    model.initialize().await;
    assert_eq!(model.coins().len(), 1);

    mock.enqueue(MarketsReply::ok(BITCOIN).with_delay(Duration::from_millis(200)));
    let mut observer = model.subscribe();
    observer.borrow_and_update();

    let task = model.refresh();
    assert!(observer.has_changed().unwrap());
    assert!(observer.borrow_and_update().coins.is_empty());

    task.await;
    assert_eq!(observer.borrow_and_update().coins.len(), 1);
}

#[tokio::test]
async fn identical_responses_give_equal_lists() {
    let mock = MarketsMock::default();
    let model = model_for(&mock, RefreshPolicy::default()).await;

    model.initialize().await;
    let first = model.coins();
    model.refresh().await;
    let second = model.coins();

    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert_eq!(mock.hits(), 2);
}

#[tokio::test]
async fn strict_policy_clears_error_after_recovery() {
    let mock = MarketsMock::new(MarketsReply::ok(BITCOIN));
    mock.enqueue(MarketsReply::status(503, ""));
    let model = model_for(&mock, RefreshPolicy::strict()).await;

    model.initialize().await;
    assert!(model.error().is_some());

    model.refresh().await;
    assert!(model.error().is_none());
    assert_eq!(model.coins().len(), 1);
}

#[tokio::test]
async fn default_policy_keeps_error_after_recovery() {
    let mock = MarketsMock::new(MarketsReply::ok(BITCOIN));
    mock.enqueue(MarketsReply::status(503, ""));
    let model = model_for(&mock, RefreshPolicy::default()).await;

    model.initialize().await;
    model.refresh().await;

    assert!(matches!(model.error(), Some(FetchError::ServerError { status: 503 })));
    assert_eq!(model.coins().len(), 1);
}

#[tokio::test]
async fn supersede_cancels_slow_request() {
    let mock = MarketsMock::new(MarketsReply::ok(BITCOIN));
    mock.enqueue(MarketsReply::ok("[]").with_delay(Duration::from_secs(2)));
    let policy = RefreshPolicy {
        supersede_in_flight: true,
        ..RefreshPolicy::default()
    };
    let model = model_for(&mock, policy).await;

    let slow = tokio::spawn(model.initialize());
    // let the slow request reach the server before superseding it
    while mock.hits() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let fresh = model.refresh().await;

    assert!(matches!(fresh, FetchOutcome::Loaded { count: 1 }));
    assert!(matches!(slow.await.unwrap(), FetchOutcome::Superseded));
    assert_eq!(model.coins()[0].id, "bitcoin");
}

#[tokio::test]
async fn tasks_can_run_on_a_single_local_context() {
    let mock = MarketsMock::default();
    let model = model_for(&mock, RefreshPolicy::default()).await;
    let local = LocalSet::new();

    let outcome = local
        .run_until(async {
            let mut observer = model.subscribe();
            let handle = tokio::task::spawn_local(model.initialize());
            observer.changed().await.unwrap();
            assert!(!observer.borrow_and_update().coins.is_empty());
            handle.await.unwrap()
        })
        .await;

    assert!(matches!(outcome, FetchOutcome::Loaded { .. }));
}
