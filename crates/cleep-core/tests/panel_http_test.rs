#![allow(clippy::unwrap_used)]
// End-to-end panel tests over HTTP: ParametersPanel -> RpcClient -> wiremock.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cleep_api::RpcClient;
use cleep_core::{
    ClientConfig, CoreError, DeviceStore, EventHub, Notice, NoticeLog, ParametersPanel,
    ReconnectConfig, SyncOutcome, connect, spawn_clock_sync,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn envelope(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "error": false, "message": "", "data": data }))
}

fn module_config(hostname: &str, accounts: &[&str]) -> serde_json::Value {
    json!({
        "hostname": hostname,
        "position": { "latitude": 45.76, "longitude": 4.83 },
        "sun": { "sunrise": 1_700_000_000, "sunset": 1_700_040_000 },
        "country": { "country": "France", "alpha2": "FR" },
        "timezone": "Europe/Paris",
        "authenabled": false,
        "authaccounts": accounts,
    })
}

async fn mount_config(server: &MockServer, config: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/command"))
        .and(body_partial_json(json!({ "to": "parameters", "command": "get_module_config" })))
        .respond_with(envelope(config))
        .mount(server)
        .await;
}

async fn setup() -> (MockServer, ParametersPanel<RpcClient, Arc<NoticeLog>>, Arc<NoticeLog>) {
    let server = MockServer::start().await;
    let client = connect(&ClientConfig::new(Url::parse(&server.uri()).unwrap())).unwrap();
    let notices = Arc::new(NoticeLog::new());
    let panel = ParametersPanel::new(client, Arc::clone(&notices));
    (server, panel, notices)
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn initialize_over_http() {
    let (server, panel, _) = setup().await;
    mount_config(&server, module_config("cleep", &["admin"])).await;

    assert_eq!(panel.initialize().await.unwrap(), SyncOutcome::Applied);

    let view = panel.view();
    assert_eq!(view.hostname, "cleep");
    assert_eq!(view.country.code.as_deref(), Some("FR"));
    assert_eq!(view.account_identifiers(), vec!["admin"]);
}

#[tokio::test]
async fn set_hostname_round_trip() {
    let (server, panel, notices) = setup().await;

    Mock::given(method("POST"))
        .and(path("/command"))
        .and(body_partial_json(json!({
            "to": "parameters",
            "command": "set_hostname",
            "params": { "hostname": "kitchen" },
        })))
        .respond_with(envelope(json!(true)))
        .expect(1)
        .mount(&server)
        .await;
    mount_config(&server, module_config("kitchen", &[])).await;

    panel.set_hostname("kitchen").await.unwrap();

    assert_eq!(panel.view().hostname, "kitchen");
    assert_eq!(notices.take(), vec![Notice::Success("Device name saved".into())]);
}

#[tokio::test]
async fn set_position_sends_server_timeout() {
    let (server, panel, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/command"))
        .and(body_partial_json(json!({ "command": "set_position", "timeout": 30.0 })))
        .respond_with(envelope(json!(true)))
        .expect(1)
        .mount(&server)
        .await;
    mount_config(&server, module_config("cleep", &[])).await;

    panel.set_position(40.71, -74.0).await.unwrap();
}

#[tokio::test]
async fn rejected_command_surfaces_device_message() {
    let (server, panel, notices) = setup().await;

    Mock::given(method("POST"))
        .and(path("/command"))
        .and(body_partial_json(json!({ "command": "enable_auth" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": true,
            "message": "Please add account before enabling auth",
            "data": null,
        })))
        .mount(&server)
        .await;
    mount_config(&server, module_config("cleep", &[])).await;

    let err = panel.set_auth_enabled(true).await.unwrap_err();

    match err {
        CoreError::Rejected { command, message } => {
            assert_eq!(command, "enable_auth");
            assert_eq!(message, "Please add account before enabling auth");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(notices.snapshot().is_empty());
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "no re-fetch after a rejection");
}

#[tokio::test]
async fn clock_device_follows_polled_time_events() {
    let server = MockServer::start().await;
    let client = Arc::new(
        connect(&ClientConfig::new(Url::parse(&server.uri()).unwrap()))
            .unwrap()
            .with_poll_timeout(Duration::from_secs(5)),
    );

    Mock::given(method("POST"))
        .and(path("/command"))
        .and(body_partial_json(json!({ "command": "get_module_devices" })))
        .respond_with(envelope(json!({
            "clock-1": { "uuid": "clock-1", "type": "clock", "name": "Clock" },
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/registerpoll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pollkey": "k-1" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/poll"))
        .respond_with(envelope(json!({
            "event": "parameters.time.now",
            "device_id": "clock-1",
            "params": {
                "timestamp": 1_700_000_000.0, "iso": "2023-11-14T22:13:20",
                "year": 2023, "month": 11, "day": 14, "hour": 22, "minute": 13,
                "weekday": 1, "weekday_literal": "tuesday",
                "sunrise": 1_699_943_000, "sunset": 1_699_978_000,
            },
        })))
        .mount(&server)
        .await;

    let store = Arc::new(DeviceStore::new());
    store
        .fetch_module_devices(client.as_ref(), "parameters")
        .await
        .unwrap();
    let mut devices = store.subscribe();

    let hub = EventHub::default();
    let clock_sync = spawn_clock_sync(&hub, Arc::clone(&store));
    let listener = hub.spawn_listener(client, ReconnectConfig::default());

    tokio::time::timeout(Duration::from_secs(5), devices.changed())
        .await
        .unwrap()
        .unwrap();
    let clock = store.get("clock-1").unwrap();
    assert_eq!(clock.hour, Some(22));
    assert_eq!(clock.minute, Some(13));

    listener.close().await;
    clock_sync.close().await;
}
