use creeper_core::{
    speed_color, update, AppState, ConnParams, FeedSnapshot, Msg, ProxyNode, Rgb, SpeedColor,
    SpeedRecord, FAST_COLOR, SLOW_COLOR,
};
use pretty_assertions::assert_eq;

fn record(speed: Option<f64>) -> SpeedRecord {
    SpeedRecord {
        result_text: "n/a".to_string(),
        speed_number: speed,
        title: None,
        last_updated_text: String::new(),
    }
}

#[test]
fn zero_or_missing_baseline_is_pending() {
    for speed in [None, Some(0.0), Some(3.2), Some(100.0)] {
        assert_eq!(speed_color(speed, None), SpeedColor::Pending);
        assert_eq!(speed_color(speed, Some(0.0)), SpeedColor::Pending);
    }
}

#[test]
fn missing_speed_is_pending() {
    assert_eq!(speed_color(None, Some(12.0)), SpeedColor::Pending);
}

#[test]
fn endpoints_map_exactly() {
    assert_eq!(speed_color(Some(8.5), Some(8.5)), SpeedColor::Rgb(FAST_COLOR));
    assert_eq!(speed_color(Some(0.0), Some(8.5)), SpeedColor::Rgb(SLOW_COLOR));
    assert_eq!(FAST_COLOR, Rgb::new(255.0, 0.0, 191.0));
    assert_eq!(SLOW_COLOR, Rgb::new(11.0, 75.0, 215.0));
}

#[test]
fn rows_are_colored_against_feed_maximum() {
    let node = |id: &str, server: &str| {
        let params: ConnParams = [("server", server), ("server_port", "80")]
            .into_iter()
            .collect();
        ProxyNode::new(id, id, params)
    };
    let snapshot = FeedSnapshot {
        id: "f".to_string(),
        url: "https://sub.example.com".to_string(),
        scheme: Some("ssr".to_string()),
        updated_at: None,
        hidden: false,
        nodes: vec![node("a", "h1"), node("b", "h2"), node("c", "h3")],
    };
    let (state, _) = update(AppState::new(), Msg::FeedsLoaded(vec![snapshot]));
    let (state, _) = update(
        state,
        Msg::SpeedRecordsLoaded(vec![
            ("a".to_string(), record(Some(10.0))),
            ("b".to_string(), record(Some(0.0))),
        ]),
    );

    let view = state.view();
    let feed = &view.feeds[0];
    assert_eq!(feed.highest_speed, Some(10.0));
    let colors: Vec<String> = feed.rows.iter().map(|row| row.color.to_string()).collect();
    assert_eq!(
        colors,
        vec![
            "rgb(255, 0, 191)".to_string(),
            "rgb(11, 75, 215)".to_string(),
            "#c5ae08".to_string(),
        ]
    );
}

#[test]
fn all_zero_speeds_have_no_baseline() {
    let params: ConnParams = [("server", "h"), ("server_port", "1")].into_iter().collect();
    let snapshot = FeedSnapshot {
        id: "f".to_string(),
        url: String::new(),
        scheme: Some("ssr".to_string()),
        updated_at: None,
        hidden: false,
        nodes: vec![ProxyNode::new("a", "a", params)],
    };
    let (state, _) = update(AppState::new(), Msg::FeedsLoaded(vec![snapshot]));
    let (state, _) = update(
        state,
        Msg::SpeedRecordsLoaded(vec![("a".to_string(), record(Some(0.0)))]),
    );
    assert_eq!(state.view().feeds[0].rows[0].color, SpeedColor::Pending);
}
