use creeper_core::{FeedId, FeedSnapshot, NodeId, SpeedRecord, TestCompletion};

use crate::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    FeedsLoaded(Vec<FeedSnapshot>),
    SpeedRecordsLoaded(Vec<(NodeId, SpeedRecord)>),
    SettingsLoaded(Vec<(String, bool)>),
    ActiveNodeLoaded(Option<NodeId>),
    /// Startup loads are done; failed ones produced no event.
    Bootstrapped,
    TestFinished(TestCompletion),
    SettingPersisted {
        key: String,
        success: bool,
    },
    FeedUrlEdited {
        feed_id: FeedId,
        url: String,
        result: Result<(), ApiError>,
    },
    FeedDeleted {
        feed_id: FeedId,
        result: Result<(), ApiError>,
    },
    FeedUpdated {
        feed_id: FeedId,
        result: Result<FeedSnapshot, ApiError>,
    },
    NodeSwitched {
        node_id: NodeId,
        result: Result<(), ApiError>,
    },
}
