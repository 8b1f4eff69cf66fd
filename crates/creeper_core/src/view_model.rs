use crate::{speed_color, AppState, Feed, FeedId, NodeId, ProxyNode, SettingToggle, SpeedColor};

/// Speed cell text while a node's test is in flight.
pub const TESTING_TEXT: &str = "\u{1F3CD}\u{FE0F} Testing...";
pub const TESTING_UPDATE_TEXT: &str = "...";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub feeds: Vec<FeedView>,
    pub settings: Vec<SettingView>,
    pub active_node: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingView {
    pub key: String,
    /// Always the authoritative value, never the raw input.
    pub checked: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedView {
    pub feed_id: FeedId,
    pub url: String,
    pub scheme: Option<String>,
    pub updated_at: Option<i64>,
    pub hidden: SettingView,
    pub duplicate_count: usize,
    pub show_duplicates: bool,
    pub show_details: bool,
    pub testing: bool,
    pub test_label: &'static str,
    pub update_label: &'static str,
    pub update_enabled: bool,
    pub highest_speed: Option<f64>,
    pub rows: Vec<NodeRowView>,
}

impl FeedView {
    /// `(updated 5 minutes ago)`, or empty when the feed was never fetched.
    pub fn update_tip(&self, now: i64) -> String {
        match self.updated_at {
            Some(at) => format!("(updated {})", format_elapsed(now.saturating_sub(at))),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowClass {
    pub duplicate: bool,
    pub active: bool,
    pub testing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRowView {
    pub node_id: NodeId,
    pub name: String,
    pub speed_text: Option<String>,
    pub speed_title: Option<String>,
    pub update_text: Option<String>,
    pub color: SpeedColor,
    pub class: RowClass,
    /// Whether Test / Switch are offered for this row.
    pub can_test: bool,
}

impl AppViewModel {
    pub(crate) fn build(state: &AppState) -> Self {
        Self {
            feeds: state
                .feeds()
                .iter()
                .map(|feed| feed_view(feed, state.active_node()))
                .collect(),
            settings: state
                .settings()
                .iter()
                .map(|toggle| setting_view(toggle, state.settings().is_known(toggle.key())))
                .collect(),
            active_node: state.active_node().map(ToOwned::to_owned),
        }
    }
}

fn setting_view(toggle: &SettingToggle, known: bool) -> SettingView {
    SettingView {
        key: toggle.key().to_string(),
        checked: toggle.current_value(),
        disabled: !known || !toggle.is_interactive(),
    }
}

fn feed_view(feed: &Feed, active_node: Option<&str>) -> FeedView {
    let testing = feed.orchestrator().is_running();
    let highest_speed = feed.highest_speed();
    FeedView {
        feed_id: feed.id().to_string(),
        url: feed.url().to_string(),
        scheme: feed.scheme().map(ToOwned::to_owned),
        updated_at: feed.updated_at(),
        hidden: setting_view(feed.hidden_toggle(), true),
        duplicate_count: feed.duplicate_count(),
        show_duplicates: feed.shows_duplicates(),
        show_details: feed.shows_details(),
        testing,
        test_label: if testing { "Stop Test" } else { "Test" },
        update_label: if feed.is_updating() {
            "Updating"
        } else {
            "Update"
        },
        update_enabled: feed.can_update(),
        highest_speed,
        rows: feed
            .nodes()
            .iter()
            .filter(|node| feed.shows_duplicates() || !node.duplicate)
            .map(|node| row_view(feed, node, highest_speed, active_node))
            .collect(),
    }
}

fn row_view(
    feed: &Feed,
    node: &ProxyNode,
    highest_speed: Option<f64>,
    active_node: Option<&str>,
) -> NodeRowView {
    let record = feed.speeds().get(&node.id);
    let (speed_text, update_text) = if node.testing {
        (
            Some(TESTING_TEXT.to_string()),
            Some(TESTING_UPDATE_TEXT.to_string()),
        )
    } else {
        (
            record.map(|r| r.result_text.clone()),
            record.map(|r| r.last_updated_text.clone()),
        )
    };
    let speed_number = if node.testing {
        None
    } else {
        record.and_then(|r| r.speed_number)
    };
    let class = if node.duplicate {
        RowClass {
            duplicate: true,
            ..RowClass::default()
        }
    } else {
        RowClass {
            duplicate: false,
            active: active_node == Some(node.id.as_str()),
            testing: node.testing,
        }
    };

    NodeRowView {
        node_id: node.id.clone(),
        name: node.display_name.clone(),
        speed_text: if node.duplicate { None } else { speed_text },
        speed_title: record.and_then(|r| r.title.clone()).filter(|_| !node.testing),
        update_text,
        color: speed_color(speed_number, highest_speed),
        class,
        can_test: node.eligible_for_test && !node.duplicate,
    }
}

/// Coarse human-readable age, e.g. `3 hours ago`.
pub fn format_elapsed(seconds: i64) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;

    let seconds = seconds.max(0);
    let (count, unit) = if seconds < MINUTE {
        return "just now".to_string();
    } else if seconds < HOUR {
        (seconds / MINUTE, "minute")
    } else if seconds < DAY {
        (seconds / HOUR, "hour")
    } else {
        (seconds / DAY, "day")
    };
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} {unit}{plural} ago")
}
