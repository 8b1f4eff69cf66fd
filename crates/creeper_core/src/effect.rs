use crate::{ConnParams, FeedId, NodeId, SettingChange, TestRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RunTest(TestRequest),
    /// Show a yes/no prompt and answer with `Msg::ConfirmationAnswered`.
    AskConfirmation { key: String, prompt: String },
    PersistSetting(SettingChange),
    /// A setting changed on the server; bound observers should follow.
    SettingCommitted(SettingChange),
    EditFeedUrl { feed_id: FeedId, url: String },
    DeleteFeed { feed_id: FeedId },
    UpdateFeed { feed_id: FeedId },
    SwitchNode {
        feed_id: FeedId,
        node_id: NodeId,
        params: ConnParams,
    },
}
