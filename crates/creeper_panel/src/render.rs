use creeper_core::{AppViewModel, FeedView, NodeRowView, SettingView};

/// Renders the view model as plain text, one line per setting, feed and
/// visible node.
pub fn render(view: &AppViewModel, now: i64) -> String {
    let mut lines = Vec::new();
    for setting in &view.settings {
        lines.push(setting_line(setting));
    }
    for feed in &view.feeds {
        lines.push(feed_line(feed, now));
        for row in &feed.rows {
            lines.push(row_line(row, feed.show_details));
        }
    }
    lines.join("\n")
}

fn checkbox(setting: &SettingView) -> &'static str {
    match (setting.checked, setting.disabled) {
        (true, false) => "[x]",
        (false, false) => "[ ]",
        (true, true) => "[x]*",
        (false, true) => "[ ]*",
    }
}

fn setting_line(setting: &SettingView) -> String {
    format!("{} {}", checkbox(setting), setting.key)
}

fn feed_line(feed: &FeedView, now: i64) -> String {
    let mut line = format!("== {}", feed.feed_id);
    if !feed.url.is_empty() {
        line.push(' ');
        line.push_str(&feed.url);
    }
    if let Some(scheme) = &feed.scheme {
        line.push_str(&format!(" <{scheme}>"));
    }
    let tip = feed.update_tip(now);
    if !tip.is_empty() {
        line.push(' ');
        line.push_str(&tip);
    }
    if feed.duplicate_count > 0 {
        line.push_str(&format!(" dup:{}", feed.duplicate_count));
    }
    line.push_str(&format!(" hidden{}", checkbox(&feed.hidden)));
    line.push_str(&format!(" [{}]", feed.test_label));
    if feed.update_enabled {
        line.push_str(&format!(" [{}]", feed.update_label));
    } else {
        line.push_str(&format!(" ({})", feed.update_label));
    }
    line
}

fn row_line(row: &NodeRowView, details: bool) -> String {
    let marker = if row.class.active {
        '*'
    } else if row.class.testing {
        '~'
    } else if row.class.duplicate {
        '='
    } else {
        ' '
    };
    let mut line = format!("  {marker} {}", row.name);
    if details {
        line.push_str(&format!(" ({})", row.node_id));
    }
    if let Some(speed) = &row.speed_text {
        line.push_str(&format!("  {speed}"));
    }
    if let Some(updated) = &row.update_text {
        line.push_str(&format!("  {updated}"));
    }
    line.push_str(&format!("  {}", row.color));
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use creeper_core::{
        update, AppState, ConnParams, FeedSnapshot, Msg, ProxyNode, SpeedRecord, PENDING_COLOR,
    };

    fn node(id: &str, port: Option<&str>) -> ProxyNode {
        let mut params = ConnParams::new();
        params.insert("server", id);
        if let Some(port) = port {
            params.insert("server_port", port);
        }
        ProxyNode::new(id, id.to_uppercase(), params)
    }

    fn state_with_feed() -> AppState {
        let snapshot = FeedSnapshot {
            id: "f1".to_string(),
            url: "https://sub.example".to_string(),
            scheme: Some("ssr".to_string()),
            updated_at: Some(1_000),
            hidden: false,
            nodes: vec![node("a", Some("443")), node("b", Some("443"))],
        };
        let (state, _) = update(AppState::new(), Msg::FeedsLoaded(vec![snapshot]));
        let record = SpeedRecord {
            result_text: "10 MB/s".to_string(),
            speed_number: Some(10.0),
            title: None,
            last_updated_text: "2024-01-01 00:00:00".to_string(),
        };
        let (state, _) = update(state, Msg::SpeedRecordsLoaded(vec![("a".to_string(), record)]));
        let (state, _) = update(state, Msg::ActiveNodeLoaded(Some("a".to_string())));
        state
    }

    #[test]
    fn feed_header_shows_url_scheme_and_age() {
        let text = render(&state_with_feed().view(), 1_000 + 7_200);
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "== f1 https://sub.example <ssr> (updated 2 hours ago) hidden[ ] [Test] [Update]"
        );
    }

    #[test]
    fn rows_show_speed_and_color() {
        let text = render(&state_with_feed().view(), 1_000);
        let rows: Vec<String> = text.lines().skip(1).map(str::to_string).collect();
        assert_eq!(
            rows,
            vec![
                "  * A  10 MB/s  2024-01-01 00:00:00  rgb(255, 0, 191)".to_string(),
                format!("    B  {PENDING_COLOR}"),
            ]
        );
    }
}
