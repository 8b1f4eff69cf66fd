use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use creeper_core::{ConnParams, FeedId, NodeId, SettingChange, TestCompletion, TestRequest};
use creeper_logging::{creeper_debug, creeper_info, creeper_warn};

use crate::{
    ApiClient, ApiError, ApiSettings, EngineEvent, FeedController, HttpFeedController,
    HttpSettingsBackend, HttpTestExecutor, SettingsBackend, TestExecutor,
};

enum EngineCommand {
    Bootstrap,
    RunTest(TestRequest),
    PersistSetting(SettingChange),
    EditFeedUrl { feed_id: FeedId, url: String },
    DeleteFeed { feed_id: FeedId },
    UpdateFeed { feed_id: FeedId },
    SwitchNode { node_id: NodeId, params: ConnParams },
}

/// The collaborators commands are executed against.
#[derive(Clone)]
pub struct EngineServices {
    pub executor: Arc<dyn TestExecutor>,
    pub settings: Arc<dyn SettingsBackend>,
    pub feeds: Arc<dyn FeedController>,
}

impl EngineServices {
    /// HTTP implementations sharing one client.
    pub fn http(settings: &ApiSettings) -> Result<Self, ApiError> {
        let client = Arc::new(ApiClient::new(settings)?);
        Ok(Self {
            executor: Arc::new(HttpTestExecutor::new(client.clone(), settings.test_timeout)),
            settings: Arc::new(HttpSettingsBackend::new(client.clone())),
            feeds: Arc::new(HttpFeedController::new(client)),
        })
    }
}

/// Runs commands on a background tokio runtime and reports their outcome
/// as [`EngineEvent`]s.
///
/// Commands are executed as they arrive; ordering between tests of one feed
/// is the caller's job (the orchestrator only ever has one in flight).
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(services: EngineServices) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let services = services.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(&services, command, &event_tx).await;
                });
            }
            creeper_debug!("engine command channel closed");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    /// Loads feeds, speed results, settings and the active node.
    pub fn bootstrap(&self) {
        self.send(EngineCommand::Bootstrap);
    }

    pub fn run_test(&self, request: TestRequest) {
        self.send(EngineCommand::RunTest(request));
    }

    pub fn persist_setting(&self, change: SettingChange) {
        self.send(EngineCommand::PersistSetting(change));
    }

    pub fn edit_feed_url(&self, feed_id: FeedId, url: String) {
        self.send(EngineCommand::EditFeedUrl { feed_id, url });
    }

    pub fn delete_feed(&self, feed_id: FeedId) {
        self.send(EngineCommand::DeleteFeed { feed_id });
    }

    pub fn update_feed(&self, feed_id: FeedId) {
        self.send(EngineCommand::UpdateFeed { feed_id });
    }

    pub fn switch_node(&self, node_id: NodeId, params: ConnParams) {
        self.send(EngineCommand::SwitchNode { node_id, params });
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            creeper_warn!("engine worker is gone, command dropped");
        }
    }
}

async fn bootstrap(services: &EngineServices, events: &mpsc::Sender<EngineEvent>) {
    match services.feeds.list_feeds().await {
        Ok(feeds) => {
            creeper_info!("loaded {} feeds", feeds.len());
            let _ = events.send(EngineEvent::FeedsLoaded(feeds));
        }
        Err(err) => creeper_warn!("failed to load feeds: {}", err),
    }
    match services.feeds.speed_records().await {
        Ok(records) => {
            let _ = events.send(EngineEvent::SpeedRecordsLoaded(records));
        }
        Err(err) => creeper_warn!("failed to load speed results: {}", err),
    }
    // Settings stay non-interactive until this succeeds.
    match services.settings.load().await {
        Ok(values) => {
            let _ = events.send(EngineEvent::SettingsLoaded(values));
        }
        Err(err) => creeper_warn!("failed to load user settings: {}", err),
    }
    match services.feeds.active_node().await {
        Ok(node) => {
            let _ = events.send(EngineEvent::ActiveNodeLoaded(node));
        }
        Err(err) => creeper_warn!("failed to load active node: {}", err),
    }
    let _ = events.send(EngineEvent::Bootstrapped);
}

async fn handle_command(
    services: &EngineServices,
    command: EngineCommand,
    events: &mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Bootstrap => return bootstrap(services, events).await,
        EngineCommand::RunTest(request) => {
            creeper_info!("testing node {} of feed {}", request.node_id, request.feed_id);
            let record = match services.executor.run_test(&request).await {
                Ok(record) => Some(record),
                Err(err) => {
                    creeper_warn!("test of node {} failed: {}", request.node_id, err);
                    None
                }
            };
            EngineEvent::TestFinished(TestCompletion::for_request(&request, record))
        }
        EngineCommand::PersistSetting(change) => {
            let success = services.settings.persist(&change).await.is_some();
            EngineEvent::SettingPersisted {
                key: change.key,
                success,
            }
        }
        EngineCommand::EditFeedUrl { feed_id, url } => {
            let result = services.feeds.edit_feed_url(&feed_id, &url).await;
            EngineEvent::FeedUrlEdited {
                feed_id,
                url,
                result,
            }
        }
        EngineCommand::DeleteFeed { feed_id } => {
            let result = services.feeds.delete_feed(&feed_id).await;
            EngineEvent::FeedDeleted { feed_id, result }
        }
        EngineCommand::UpdateFeed { feed_id } => {
            let result = services.feeds.update_feed(&feed_id).await;
            EngineEvent::FeedUpdated { feed_id, result }
        }
        EngineCommand::SwitchNode { node_id, params } => {
            let result = services.feeds.switch_node(&node_id, &params).await;
            EngineEvent::NodeSwitched { node_id, result }
        }
    };
    let _ = events.send(event);
}
