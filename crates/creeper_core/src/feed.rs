use crate::{
    FeedId, NodeClassifier, Orchestrator, ProxyNode, RunState, SettingToggle, SpeedRecord,
    SpeedRecordStore, TestCompletion, TestRequest,
};

/// Settings key prefix for the per-feed "Hidden" checkbox.
pub const HIDE_FEED_KEY_PREFIX: &str = "hide_feed:";

/// A feed as delivered by the manager, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub id: FeedId,
    pub url: String,
    pub scheme: Option<String>,
    /// Unix seconds of the last successful subscription refresh.
    pub updated_at: Option<i64>,
    pub hidden: bool,
    pub nodes: Vec<ProxyNode>,
}

/// A subscription source and the panel state attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    id: FeedId,
    url: String,
    scheme: Option<String>,
    updated_at: Option<i64>,
    hidden: SettingToggle,
    nodes: Vec<ProxyNode>,
    /// Bumped every time `nodes` is replaced.
    generation: u64,
    speeds: SpeedRecordStore,
    orchestrator: Orchestrator,
    show_duplicates: bool,
    show_details: bool,
    updating: bool,
}

impl Feed {
    pub fn hide_key(feed_id: &str) -> String {
        format!("{HIDE_FEED_KEY_PREFIX}{feed_id}")
    }

    pub(crate) fn from_snapshot(snapshot: FeedSnapshot, classifier: &NodeClassifier) -> Self {
        let mut nodes = snapshot.nodes;
        classifier.classify(snapshot.scheme.as_deref(), &mut nodes);
        Self {
            hidden: SettingToggle::new(Self::hide_key(&snapshot.id), snapshot.hidden),
            id: snapshot.id,
            url: snapshot.url,
            scheme: snapshot.scheme,
            updated_at: snapshot.updated_at,
            nodes,
            generation: 0,
            speeds: SpeedRecordStore::new(),
            orchestrator: Orchestrator::default(),
            show_duplicates: false,
            show_details: false,
            updating: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn updated_at(&self) -> Option<i64> {
        self.updated_at
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.current_value()
    }

    pub fn hidden_toggle(&self) -> &SettingToggle {
        &self.hidden
    }

    pub fn nodes(&self) -> &[ProxyNode] {
        &self.nodes
    }

    pub fn node(&self, node_id: &str) -> Option<&ProxyNode> {
        self.nodes.iter().find(|node| node.id == node_id)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn speeds(&self) -> &SpeedRecordStore {
        &self.speeds
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn run_state(&self) -> RunState {
        self.orchestrator.state()
    }

    pub fn duplicate_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.duplicate).count()
    }

    pub fn highest_speed(&self) -> Option<f64> {
        self.speeds.highest_speed(&self.nodes)
    }

    pub fn shows_duplicates(&self) -> bool {
        self.show_duplicates
    }

    pub fn shows_details(&self) -> bool {
        self.show_details
    }

    pub fn is_updating(&self) -> bool {
        self.updating
    }

    /// The Update control is offered only with a url and nothing in flight.
    pub fn can_update(&self) -> bool {
        !self.url.is_empty() && !self.updating
    }

    pub(crate) fn set_url(&mut self, url: String) {
        self.url = url;
    }

    pub(crate) fn set_updating(&mut self, updating: bool) {
        self.updating = updating;
    }

    pub(crate) fn set_show_duplicates(&mut self, show: bool) {
        // Nothing to reveal without duplicates.
        self.show_duplicates = show && self.duplicate_count() > 0;
    }

    pub(crate) fn set_show_details(&mut self, show: bool) {
        self.show_details = show;
    }

    pub(crate) fn hidden_toggle_mut(&mut self) -> &mut SettingToggle {
        &mut self.hidden
    }

    pub(crate) fn seed_speed(&mut self, node_id: &str, record: &SpeedRecord) -> bool {
        if self.node(node_id).is_none() {
            return false;
        }
        self.speeds.insert(node_id, record.clone());
        true
    }

    /// Installs a refreshed node list. Anything in flight against the old
    /// list is invalidated.
    pub(crate) fn replace_nodes(&mut self, snapshot: FeedSnapshot, classifier: &NodeClassifier) {
        let mut nodes = snapshot.nodes;
        classifier.classify(snapshot.scheme.as_deref(), &mut nodes);
        self.url = snapshot.url;
        self.scheme = snapshot.scheme;
        self.updated_at = snapshot.updated_at;
        self.nodes = nodes;
        self.generation += 1;
        self.orchestrator.invalidate(&self.id);
        if self.duplicate_count() == 0 {
            self.show_duplicates = false;
        }
    }

    pub(crate) fn start_tests(&mut self) -> Option<TestRequest> {
        self.orchestrator
            .start(&self.id, self.generation, &mut self.nodes)
    }

    pub(crate) fn stop_tests(&mut self) -> bool {
        self.orchestrator.stop(&self.id)
    }

    pub(crate) fn test_node(&mut self, node_id: &str) -> Option<TestRequest> {
        self.orchestrator
            .test_single(&self.id, self.generation, &mut self.nodes, node_id)
    }

    pub(crate) fn finish_test(&mut self, completion: TestCompletion) -> Option<TestRequest> {
        self.orchestrator.finish(
            self.generation,
            &mut self.nodes,
            &mut self.speeds,
            completion,
        )
    }
}
