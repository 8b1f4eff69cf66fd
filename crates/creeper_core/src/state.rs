use crate::view_model::AppViewModel;
use crate::{ConfirmPolicy, Feed, FeedSnapshot, NodeClassifier, NodeId, SettingsStore};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    feeds: Vec<Feed>,
    settings: SettingsStore,
    classifier: NodeClassifier,
    active_node: Option<NodeId>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classifier(mut self, classifier: NodeClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Declares a user setting, optionally gated by confirmation prompts.
    pub fn with_setting(mut self, key: impl Into<String>, confirm: Option<ConfirmPolicy>) -> Self {
        self.settings.register(key, confirm);
        self
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::build(self)
    }

    pub fn feeds(&self) -> &[Feed] {
        &self.feeds
    }

    pub fn feed(&self, feed_id: &str) -> Option<&Feed> {
        self.feeds.iter().find(|feed| feed.id() == feed_id)
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn active_node(&self) -> Option<&str> {
        self.active_node.as_deref()
    }

    /// Returns whether anything changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn feed_mut(&mut self, feed_id: &str) -> Option<&mut Feed> {
        self.feeds.iter_mut().find(|feed| feed.id() == feed_id)
    }

    pub(crate) fn feeds_mut(&mut self) -> &mut [Feed] {
        &mut self.feeds
    }

    pub(crate) fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    pub(crate) fn set_active_node(&mut self, node_id: Option<NodeId>) {
        self.active_node = node_id;
    }

    pub(crate) fn install_feeds(&mut self, snapshots: Vec<FeedSnapshot>) {
        let classifier = self.classifier.clone();
        self.feeds = snapshots
            .into_iter()
            .map(|snapshot| Feed::from_snapshot(snapshot, &classifier))
            .collect();
    }

    pub(crate) fn refresh_feed(&mut self, feed_id: &str, snapshot: FeedSnapshot) -> bool {
        let classifier = self.classifier.clone();
        match self.feed_mut(feed_id) {
            Some(feed) => {
                feed.replace_nodes(snapshot, &classifier);
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove_feed(&mut self, feed_id: &str) -> bool {
        let before = self.feeds.len();
        self.feeds.retain(|feed| feed.id() != feed_id);
        self.feeds.len() != before
    }
}
