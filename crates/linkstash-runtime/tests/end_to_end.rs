use std::time::Duration;

use bytes::Bytes;
use linkstash_client::{ClientError, HandshakeState, ReadinessHandshake, ReadinessPolicy};
use linkstash_protocol::{Broadcast, ContextId, Transport, TransportError};
use linkstash_runtime::{Background, RuntimeConfig, RuntimeError};
use linkstash_store::{LinkStore, StoreConfig};
use linkstash_types::CapturedLink;
use serde_json::{json, Value};

fn fast() -> ReadinessPolicy {
    ReadinessPolicy::unbounded(Duration::from_millis(2))
}

fn launch() -> Background {
    Background::launch(LinkStore::in_memory(), RuntimeConfig::default().with_handshake(fast()))
}

async fn raw(background: &Background, request: &str) -> Value {
    let transport = background.endpoint().connect(ContextId::new());
    let reply = transport.send(Bytes::from(request.to_owned())).await.unwrap();
    serde_json::from_slice(&reply).unwrap()
}

#[tokio::test]
async fn fresh_store_lists_nothing() {
    let background = launch();
    let mut tab = background.connect_tab();
    tab.boot(fast()).await.unwrap();

    assert_eq!(
        raw(&background, r#"{"type":"GET_ALL_LINKS"}"#).await,
        json!({"success": true, "links": []})
    );
    assert!(tab.summary().is_empty());
    background.shutdown().await.unwrap();
}

#[tokio::test]
async fn two_appends_list_newest_first() {
    let background = launch();
    let mut tab = background.connect_tab();
    tab.boot_default().await.unwrap();

    let client = tab.client();
    client
        .append(CapturedLink::new("https://a.example", "https://b.example", 1000).unwrap())
        .await
        .unwrap();
    client
        .append(CapturedLink::new("https://a.example", "https://c.example", 2000).unwrap())
        .await
        .unwrap();

    let links = client.list_all().await.unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].timestamp(), 2000);
    assert_eq!(links[1].timestamp(), 1000);
    assert_eq!(links[1].created_at(), "1970-01-01T00:00:01.000Z");
    assert_ne!(links[0].id(), links[1].id());
    background.shutdown().await.unwrap();
}

#[tokio::test]
async fn mutation_in_one_tab_updates_every_tab() {
    let background = launch();
    let mut writer = background.connect_tab();
    let mut reader = background.connect_tab();
    writer.boot_default().await.unwrap();
    reader.boot_default().await.unwrap();

    writer
        .capture("https://a.example", "https://b.example")
        .await
        .unwrap();
    assert_eq!(reader.pump().await, 1);
    assert_eq!(writer.pump().await, 1);
    assert_eq!(reader.summary().urls(), ["https://b.example"]);
    assert_eq!(writer.summary().len(), 1);

    reader.client().clear_all().await.unwrap();
    reader.pump().await;
    writer.pump().await;
    assert!(reader.summary().is_empty());
    assert!(writer.summary().is_empty());
    background.shutdown().await.unwrap();
}

#[tokio::test]
async fn tab_without_listener_misses_broadcast_without_harm() {
    let background = launch();
    let mut early = background.connect_tab();
    early.boot_default().await.unwrap();

    let gone = background.connect_tab();
    drop(gone);

    early.capture("s", "https://b.example").await.unwrap();
    assert_eq!(early.pump().await, 1);

    let mut late = background.connect_tab();
    assert_eq!(late.pump().await, 0);
    late.boot_default().await.unwrap();
    assert_eq!(late.summary().urls(), ["https://b.example"]);
    background.shutdown().await.unwrap();
}

#[tokio::test]
async fn toggling_summary_on_reloads_it() {
    let config = RuntimeConfig::default()
        .with_handshake(fast())
        .with_summary_enabled(false);
    let background = Background::launch(LinkStore::in_memory(), config);
    let mut tab = background.connect_tab();
    tab.boot_default().await.unwrap();

    tab.capture("s", "t").await.unwrap();
    tab.pump().await;
    assert!(tab.summary().is_empty());

    background.publish_control(Broadcast::OverlayToggle { enabled: true });
    tab.pump().await;
    assert!(tab.summary().is_enabled());
    assert_eq!(tab.summary().urls(), ["t"]);
    background.shutdown().await.unwrap();
}

#[tokio::test]
async fn unknown_type_is_rejected() {
    let background = launch();
    assert_eq!(
        raw(&background, r#"{"type":"RENAME_LINK","id":"1"}"#).await,
        json!({"success": false, "error": "Unknown message type"})
    );
    background.shutdown().await.unwrap();
}

#[tokio::test]
async fn handshake_reaches_ready() {
    let background = launch();
    let tab = background.connect_tab();
    let mut handshake = ReadinessHandshake::new(tab.client(), fast());
    handshake.wait_until_ready().await.unwrap();
    assert_eq!(handshake.state(), HandshakeState::Ready);
    background.shutdown().await.unwrap();
}

#[tokio::test]
async fn calls_after_shutdown_are_transport_errors() {
    let background = launch();
    let mut tab = background.connect_tab();
    tab.boot_default().await.unwrap();
    background.shutdown().await.unwrap();

    let err = tab.client().list_all().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Transport(TransportError::Disconnected)
    ));

    let bounded = ReadinessPolicy::bounded(Duration::from_millis(1), 3);
    let err = tab.boot(bounded).await.unwrap_err();
    assert!(matches!(err, RuntimeError::Handshake(_)));
}

#[tokio::test]
async fn records_survive_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::at(dir.path().join("stash"));

    let background = Background::launch(LinkStore::on_disk(config.clone()), RuntimeConfig::default());
    let mut tab = background.connect_tab();
    tab.boot(fast()).await.unwrap();
    tab.capture("https://a.example", "https://b.example").await.unwrap();
    background.shutdown().await.unwrap();

    let background = Background::launch(LinkStore::on_disk(config), RuntimeConfig::default());
    let mut tab = background.connect_tab();
    tab.boot(fast()).await.unwrap();
    let links = tab.client().list_all().await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].target_url(), "https://b.example");
    background.shutdown().await.unwrap();
}

#[tokio::test]
async fn invalid_capture_never_reaches_gateway() {
    let background = launch();
    let tab = background.connect_tab();
    let err = tab.capture("", "t").await.unwrap_err();
    assert!(matches!(err, RuntimeError::Link(_)));
    background.shutdown().await.unwrap();
}
