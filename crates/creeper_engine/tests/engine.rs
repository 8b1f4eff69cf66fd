use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use creeper_core::{
    ConnParams, FeedSnapshot, NodeId, ProxyNode, SettingChange, SpeedRecord, TestRequest,
};
use creeper_engine::{
    ApiError, EngineEvent, EngineHandle, EngineServices, FeedController, SettingsBackend,
    TestExecutor,
};
use pretty_assertions::assert_eq;
use serde_json::Value;

const WAIT: Duration = Duration::from_secs(5);

fn record(text: &str, speed: f64) -> SpeedRecord {
    SpeedRecord {
        result_text: text.to_string(),
        speed_number: Some(speed),
        title: None,
        last_updated_text: String::new(),
    }
}

struct FakeExecutor;

#[async_trait]
impl TestExecutor for FakeExecutor {
    async fn run_test(&self, request: &TestRequest) -> Result<SpeedRecord, ApiError> {
        match request.node_id.as_str() {
            "broken" => Err(ApiError::Timeout("no answer".to_string())),
            _ => Ok(record("5 MB/s", 5.0)),
        }
    }
}

#[derive(Default)]
struct FakeSettings {
    persisted: Mutex<Vec<SettingChange>>,
    fail_load: bool,
}

#[async_trait]
impl SettingsBackend for FakeSettings {
    async fn load(&self) -> Result<Vec<(String, bool)>, ApiError> {
        if self.fail_load {
            return Err(ApiError::Network("down".to_string()));
        }
        Ok(vec![("auto_update".to_string(), true)])
    }

    async fn persist(&self, change: &SettingChange) -> Option<Value> {
        self.persisted.lock().unwrap().push(change.clone());
        (change.key != "locked").then(|| Value::Bool(change.value))
    }
}

struct FakeFeeds;

fn snapshot() -> FeedSnapshot {
    FeedSnapshot {
        id: "f1".to_string(),
        url: "https://sub.example".to_string(),
        scheme: Some("ssr".to_string()),
        updated_at: None,
        hidden: false,
        nodes: vec![ProxyNode::new("n1", "Tokyo", ConnParams::new())],
    }
}

#[async_trait]
impl FeedController for FakeFeeds {
    async fn list_feeds(&self) -> Result<Vec<FeedSnapshot>, ApiError> {
        Ok(vec![snapshot()])
    }

    async fn active_node(&self) -> Result<Option<NodeId>, ApiError> {
        Ok(Some("n1".to_string()))
    }

    async fn speed_records(&self) -> Result<Vec<(NodeId, SpeedRecord)>, ApiError> {
        Ok(vec![("n1".to_string(), record("3 MB/s", 3.0))])
    }

    async fn edit_feed_url(&self, _feed_id: &str, _url: &str) -> Result<(), ApiError> {
        Ok(())
    }

    async fn delete_feed(&self, feed_id: &str) -> Result<(), ApiError> {
        Err(ApiError::HttpStatus {
            status: 404,
            message: format!("no feed {feed_id}"),
        })
    }

    async fn update_feed(&self, _feed_id: &str) -> Result<FeedSnapshot, ApiError> {
        Ok(snapshot())
    }

    async fn switch_node(&self, _node_id: &str, _params: &ConnParams) -> Result<(), ApiError> {
        Ok(())
    }
}

fn engine_with(settings: FakeSettings) -> (EngineHandle, Arc<FakeSettings>) {
    let settings = Arc::new(settings);
    let services = EngineServices {
        executor: Arc::new(FakeExecutor),
        settings: settings.clone(),
        feeds: Arc::new(FakeFeeds),
    };
    (EngineHandle::new(services).expect("engine"), settings)
}

fn request(node_id: &str) -> TestRequest {
    TestRequest {
        feed_id: "f1".to_string(),
        node_id: node_id.to_string(),
        run: Some(1),
        generation: 0,
        params: ConnParams::new(),
    }
}

#[test]
fn bootstrap_reports_every_load_then_finishes() {
    let (engine, _) = engine_with(FakeSettings::default());
    engine.bootstrap();

    let mut events = Vec::new();
    while let Some(event) = engine.recv_timeout(WAIT) {
        let done = event == EngineEvent::Bootstrapped;
        events.push(event);
        if done {
            break;
        }
    }

    assert_eq!(
        events,
        vec![
            EngineEvent::FeedsLoaded(vec![snapshot()]),
            EngineEvent::SpeedRecordsLoaded(vec![("n1".to_string(), record("3 MB/s", 3.0))]),
            EngineEvent::SettingsLoaded(vec![("auto_update".to_string(), true)]),
            EngineEvent::ActiveNodeLoaded(Some("n1".to_string())),
            EngineEvent::Bootstrapped,
        ]
    );
}

#[test]
fn failed_settings_load_sends_no_settings_event() {
    let (engine, _) = engine_with(FakeSettings {
        fail_load: true,
        ..FakeSettings::default()
    });
    engine.bootstrap();

    let mut saw_settings = false;
    while let Some(event) = engine.recv_timeout(WAIT) {
        match event {
            EngineEvent::SettingsLoaded(_) => saw_settings = true,
            EngineEvent::Bootstrapped => break,
            _ => {}
        }
    }
    assert!(!saw_settings);
}

#[test]
fn test_results_carry_request_identity() {
    let (engine, _) = engine_with(FakeSettings::default());
    engine.run_test(request("n1"));

    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::TestFinished(done)) => {
            assert_eq!(done.node_id, "n1");
            assert_eq!(done.run, Some(1));
            assert_eq!(done.record, Some(record("5 MB/s", 5.0)));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn failed_test_settles_without_record() {
    let (engine, _) = engine_with(FakeSettings::default());
    engine.run_test(request("broken"));

    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::TestFinished(done)) => {
            assert_eq!(done.node_id, "broken");
            assert_eq!(done.record, None);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn persist_outcome_is_reported_per_key() {
    let (engine, settings) = engine_with(FakeSettings::default());
    engine.persist_setting(SettingChange {
        key: "locked".to_string(),
        value: true,
    });

    assert_eq!(
        engine.recv_timeout(WAIT),
        Some(EngineEvent::SettingPersisted {
            key: "locked".to_string(),
            success: false,
        })
    );
    assert_eq!(settings.persisted.lock().unwrap().len(), 1);
}

#[test]
fn feed_command_errors_are_forwarded() {
    let (engine, _) = engine_with(FakeSettings::default());
    engine.delete_feed("f9".to_string());

    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::FeedDeleted { feed_id, result }) => {
            assert_eq!(feed_id, "f9");
            assert!(matches!(result, Err(ApiError::HttpStatus { status: 404, .. })));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}
