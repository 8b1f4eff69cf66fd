use creeper_logging::{creeper_debug, creeper_warn};
use url::Url;

use crate::{AppState, Effect, Feed, Msg, SettingChange, ToggleStep, HIDE_FEED_KEY_PREFIX};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FeedsLoaded(snapshots) => {
            state.install_feeds(snapshots);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SpeedRecordsLoaded(records) => {
            let mut seeded = false;
            for (node_id, record) in &records {
                for feed in state.feeds_mut() {
                    seeded |= feed.seed_speed(node_id, record);
                }
            }
            if seeded {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SettingsLoaded(values) => {
            state.settings_mut().load(values);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ActiveNodeLoaded(node_id) => {
            state.set_active_node(node_id);
            state.mark_dirty();
            Vec::new()
        }
        Msg::TestToggleClicked { feed_id } => {
            let running = state
                .feed(&feed_id)
                .is_some_and(|feed| feed.orchestrator().is_running());
            if running {
                stop_tests(&mut state, &feed_id)
            } else {
                start_tests(&mut state, &feed_id)
            }
        }
        Msg::StartTests { feed_id } => start_tests(&mut state, &feed_id),
        Msg::StopTests { feed_id } => stop_tests(&mut state, &feed_id),
        Msg::TestNodeClicked { feed_id, node_id } => {
            let request = state
                .feed_mut(&feed_id)
                .and_then(|feed| feed.test_node(&node_id));
            match request {
                Some(request) => {
                    state.mark_dirty();
                    vec![Effect::RunTest(request)]
                }
                None => Vec::new(),
            }
        }
        Msg::TestFinished(completion) => {
            let feed_id = completion.feed_id.clone();
            let Some(feed) = state.feed_mut(&feed_id) else {
                creeper_debug!("result for unknown feed {} dropped", feed_id);
                return (state, Vec::new());
            };
            let next = feed.finish_test(completion);
            state.mark_dirty();
            next.map(Effect::RunTest).into_iter().collect()
        }
        Msg::SettingToggled { key, value } => {
            let step = match hidden_feed_id(&key) {
                Some(feed_id) => match state.feed_mut(feed_id) {
                    Some(feed) => feed.hidden_toggle_mut().request(value),
                    None => ToggleStep::Ignored,
                },
                None => state.settings_mut().request(&key, value),
            };
            match step {
                ToggleStep::Ignored => Vec::new(),
                ToggleStep::Confirm { prompt } => {
                    state.mark_dirty();
                    vec![Effect::AskConfirmation { key, prompt }]
                }
                ToggleStep::Persist(change) => {
                    state.mark_dirty();
                    vec![Effect::PersistSetting(change)]
                }
            }
        }
        Msg::ConfirmationAnswered { key, accepted } => {
            let change = match hidden_feed_id(&key) {
                Some(feed_id) => state
                    .feed_mut(feed_id)
                    .and_then(|feed| feed.hidden_toggle_mut().answer(accepted)),
                None => state.settings_mut().answer(&key, accepted),
            };
            state.mark_dirty();
            change.map(Effect::PersistSetting).into_iter().collect()
        }
        Msg::SettingPersisted { key, success } => {
            let committed = match hidden_feed_id(&key) {
                Some(feed_id) => state
                    .feed_mut(feed_id)
                    .and_then(|feed| feed.hidden_toggle_mut().resolve(success)),
                None => state.settings_mut().resolve(&key, success),
            };
            state.mark_dirty();
            if !success {
                creeper_warn!("setting {} was not applied", key);
            }
            committed
                .map(|value| Effect::SettingCommitted(SettingChange { key, value }))
                .into_iter()
                .collect()
        }
        Msg::EditFeedUrlRequested { feed_id, url } => {
            let url = url.trim().to_string();
            let changed = state
                .feed(&feed_id)
                .is_some_and(|feed| feed.url() != url);
            if !changed {
                Vec::new()
            } else if Url::parse(&url).is_err() {
                creeper_warn!("rejected feed url {:?}", url);
                Vec::new()
            } else {
                vec![Effect::EditFeedUrl { feed_id, url }]
            }
        }
        Msg::FeedUrlEdited {
            feed_id,
            url,
            success,
        } => match state.feed_mut(&feed_id) {
            Some(feed) if success => {
                feed.set_url(url);
                state.mark_dirty();
                Vec::new()
            }
            _ => Vec::new(),
        },
        Msg::DeleteFeedClicked { feed_id } => {
            if state.feed(&feed_id).is_some() {
                vec![Effect::DeleteFeed { feed_id }]
            } else {
                Vec::new()
            }
        }
        Msg::FeedDeleted { feed_id, success } => {
            if success && state.remove_feed(&feed_id) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::UpdateFeedClicked { feed_id } => match state.feed_mut(&feed_id) {
            Some(feed) if feed.can_update() => {
                feed.set_updating(true);
                state.mark_dirty();
                vec![Effect::UpdateFeed { feed_id }]
            }
            _ => Vec::new(),
        },
        Msg::FeedUpdated { feed_id, snapshot } => {
            if let Some(feed) = state.feed_mut(&feed_id) {
                feed.set_updating(false);
                state.mark_dirty();
            }
            if let Some(snapshot) = snapshot {
                state.refresh_feed(&feed_id, snapshot);
            }
            Vec::new()
        }
        Msg::SwitchNodeClicked { feed_id, node_id } => {
            let node = state
                .feed(&feed_id)
                .and_then(|feed| feed.node(&node_id))
                .filter(|node| !node.duplicate && node.eligible_for_test);
            match node {
                Some(node) => vec![Effect::SwitchNode {
                    params: node.params.clone(),
                    feed_id,
                    node_id,
                }],
                None => Vec::new(),
            }
        }
        Msg::NodeSwitched { node_id, success } => {
            if success {
                state.set_active_node(Some(node_id));
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ShowDuplicatesToggled { feed_id, show } => {
            if let Some(feed) = state.feed_mut(&feed_id) {
                feed.set_show_duplicates(show);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ShowDetailsToggled { feed_id, show } => {
            if let Some(feed) = state.feed_mut(&feed_id) {
                feed.set_show_details(show);
                state.mark_dirty();
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn start_tests(state: &mut AppState, feed_id: &str) -> Vec<Effect> {
    let Some(feed) = state.feed_mut(feed_id) else {
        return Vec::new();
    };
    if feed.orchestrator().is_running() {
        return Vec::new();
    }
    let request = feed.start_tests();
    state.mark_dirty();
    request.map(Effect::RunTest).into_iter().collect()
}

fn stop_tests(state: &mut AppState, feed_id: &str) -> Vec<Effect> {
    if state.feed_mut(feed_id).is_some_and(Feed::stop_tests) {
        state.mark_dirty();
    }
    Vec::new()
}

fn hidden_feed_id(key: &str) -> Option<&str> {
    key.strip_prefix(HIDE_FEED_KEY_PREFIX)
}
