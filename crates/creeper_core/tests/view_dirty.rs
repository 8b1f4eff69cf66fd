use creeper_core::{update, AppState, FeedSnapshot, Msg};

fn feed(id: &str) -> FeedSnapshot {
    FeedSnapshot {
        id: id.to_string(),
        url: "https://sub.example.com".to_string(),
        scheme: None,
        updated_at: None,
        hidden: false,
        nodes: Vec::new(),
    }
}

#[test]
fn visible_changes_mark_the_view_dirty_once() {
    let (mut state, _) = update(AppState::new(), Msg::FeedsLoaded(vec![feed("f")]));
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());

    let (mut state, _) = update(
        state,
        Msg::ShowDetailsToggled {
            feed_id: "f".to_string(),
            show: true,
        },
    );
    assert!(state.consume_dirty());
    assert!(state.view().feeds[0].show_details);
}

#[test]
fn messages_for_unknown_feeds_leave_the_view_clean() {
    let (mut state, _) = update(AppState::new(), Msg::FeedsLoaded(vec![feed("f")]));
    state.consume_dirty();

    let before = state.clone();
    let (mut next, effects) = update(
        state,
        Msg::ShowDuplicatesToggled {
            feed_id: "missing".to_string(),
            show: true,
        },
    );
    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
    assert_eq!(next, before);
}
