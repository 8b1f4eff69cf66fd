use crate::{FeedId, FeedSnapshot, NodeId, SpeedRecord, TestCompletion};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Initial feed list from the manager.
    FeedsLoaded(Vec<FeedSnapshot>),
    /// Persisted speed results, keyed by node id.
    SpeedRecordsLoaded(Vec<(NodeId, SpeedRecord)>),
    /// Authoritative user settings from the manager.
    SettingsLoaded(Vec<(String, bool)>),
    /// Currently active node as reported by the manager.
    ActiveNodeLoaded(Option<NodeId>),
    /// User clicked the feed's Test / Stop Test control.
    TestToggleClicked { feed_id: FeedId },
    /// Begin a test pass; no-op while one is running.
    StartTests { feed_id: FeedId },
    /// Cancel the test pass after the in-flight test.
    StopTests { feed_id: FeedId },
    /// User clicked Test on a single node.
    TestNodeClicked { feed_id: FeedId, node_id: NodeId },
    /// The executor settled a test.
    TestFinished(TestCompletion),
    /// User tried to move a settings checkbox to `value`.
    SettingToggled { key: String, value: bool },
    /// The confirmation prompt for `key` was answered.
    ConfirmationAnswered { key: String, accepted: bool },
    /// The persistence call for `key` settled.
    SettingPersisted { key: String, success: bool },
    /// User entered a new url for the feed.
    EditFeedUrlRequested { feed_id: FeedId, url: String },
    FeedUrlEdited {
        feed_id: FeedId,
        url: String,
        success: bool,
    },
    DeleteFeedClicked { feed_id: FeedId },
    FeedDeleted { feed_id: FeedId, success: bool },
    UpdateFeedClicked { feed_id: FeedId },
    /// Refresh finished; `None` when the subscription could not be fetched.
    FeedUpdated {
        feed_id: FeedId,
        snapshot: Option<FeedSnapshot>,
    },
    SwitchNodeClicked { feed_id: FeedId, node_id: NodeId },
    NodeSwitched { node_id: NodeId, success: bool },
    ShowDuplicatesToggled { feed_id: FeedId, show: bool },
    ShowDetailsToggled { feed_id: FeedId, show: bool },
}
