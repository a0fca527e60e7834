//! In-process fan-out tests: a real relay server, real WebSocket clients.

use std::time::Duration;

use height_relay::Height;
use height_relay::api::{CountdownApiClient, HeightUpdate};
use height_relay::relay::{RelayHandle, run_server};
use height_relay::store::{self, HeightStore};
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};

async fn start_relay() -> (HeightStore, RelayHandle) {
    let (height_store, reader) = store::channel();
    let handle = run_server("127.0.0.1:0".parse().unwrap(), reader)
        .await
        .expect("bind relay server");
    (height_store, handle)
}

async fn connect(handle: &RelayHandle) -> WsClient {
    WsClientBuilder::default()
        .build(format!("ws://{}", handle.addr()))
        .await
        .expect("connect to relay")
}

async fn next_update(
    subscription: &mut jsonrpsee::core::client::Subscription<HeightUpdate>,
) -> Height {
    tokio::time::timeout(Duration::from_secs(5), subscription.next())
        .await
        .expect("timed out waiting for newData")
        .expect("subscription ended")
        .expect("malformed newData")
        .current_height
}

#[tokio::test]
async fn new_subscriber_receives_current_height_first() {
    let (height_store, handle) = start_relay().await;
    height_store.set(210_000);

    let client = connect(&handle).await;
    let mut subscription = client.subscribe_heights().await.unwrap();

    assert_eq!(next_update(&mut subscription).await, 210_000);

    // The next message is the next broadcast, not a duplicate of the
    // initial state.
    height_store.set(210_001);
    assert_eq!(next_update(&mut subscription).await, 210_001);
}

#[tokio::test]
async fn broadcast_reaches_every_subscriber_with_same_value() {
    let (height_store, handle) = start_relay().await;
    height_store.set(500);

    let client_a = connect(&handle).await;
    let client_b = connect(&handle).await;
    let mut sub_a = client_a.subscribe_heights().await.unwrap();
    let mut sub_b = client_b.subscribe_heights().await.unwrap();

    assert_eq!(next_update(&mut sub_a).await, 500);
    assert_eq!(next_update(&mut sub_b).await, 500);

    height_store.set(501);
    assert_eq!(next_update(&mut sub_a).await, 501);
    assert_eq!(next_update(&mut sub_b).await, 501);
}

#[tokio::test]
async fn reconnecting_subscriber_gets_latest_not_replay() {
    let (height_store, handle) = start_relay().await;
    height_store.set(100);

    {
        let client = connect(&handle).await;
        let mut subscription = client.subscribe_heights().await.unwrap();
        assert_eq!(next_update(&mut subscription).await, 100);
    }

    // Broadcasts this client misses while disconnected.
    height_store.set(150);
    height_store.set(160);

    let client = connect(&handle).await;
    let mut subscription = client.subscribe_heights().await.unwrap();
    assert_eq!(next_update(&mut subscription).await, 160);

    // No replay of 150: nothing else arrives until the next broadcast.
    let quiet = tokio::time::timeout(Duration::from_millis(300), subscription.next()).await;
    assert!(quiet.is_err(), "expected no replayed updates");
}

#[tokio::test]
async fn get_tip_reports_stored_height() {
    let (height_store, handle) = start_relay().await;

    let client = connect(&handle).await;

    // Nothing observed yet: an error, never a height of zero.
    assert!(client.get_tip().await.is_err());

    height_store.set(210_240);
    assert_eq!(
        client.get_tip().await.unwrap(),
        HeightUpdate {
            current_height: 210_240
        }
    );
}

#[tokio::test]
async fn dead_subscriber_does_not_affect_others() {
    let (height_store, handle) = start_relay().await;
    height_store.set(1);

    let client_a = connect(&handle).await;
    let mut sub_a = client_a.subscribe_heights().await.unwrap();
    assert_eq!(next_update(&mut sub_a).await, 1);

    // Subscribe and immediately drop the connection.
    {
        let client_b = connect(&handle).await;
        let _sub_b = client_b.subscribe_heights().await.unwrap();
    }

    height_store.set(2);
    assert_eq!(next_update(&mut sub_a).await, 2);
}
