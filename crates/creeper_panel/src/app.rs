use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use creeper_core::{update, AppState, FeedId, Msg};
use creeper_engine::EngineServices;
use creeper_logging::{creeper_debug, creeper_info};

use crate::config::PanelConfig;
use crate::effects::{AssumeYes, Confirm, EffectRunner, Inbound, TerminalConfirm};
use crate::render::render;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A `key=true|false` request given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingRequest {
    pub key: String,
    pub value: bool,
}

impl SettingRequest {
    pub fn parse(arg: &str) -> Result<Self> {
        let Some((key, value)) = arg.split_once('=') else {
            bail!("expected key=true|false, got {:?}", arg);
        };
        let value = match value.trim() {
            "true" | "on" | "1" => true,
            "false" | "off" | "0" => false,
            other => bail!("setting {} needs true or false, got {:?}", key, other),
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("setting name is empty in {:?}", arg);
        }
        Ok(Self {
            key: key.to_string(),
            value,
        })
    }
}

pub fn initial_state(config: &PanelConfig) -> AppState {
    config.settings.iter().fold(
        AppState::new().with_classifier(config.classifier()),
        |state, entry| state.with_setting(entry.key.clone(), entry.confirm_policy()),
    )
}

/// Loads everything, applies the requested changes, optionally runs a test
/// pass, then prints the panel.
pub fn run(config: &PanelConfig, requests: Vec<SettingRequest>) -> Result<()> {
    let services =
        EngineServices::http(&config.api_settings()).context("failed to set up api client")?;
    let confirm: Box<dyn Confirm> = if config.assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalConfirm)
    };
    let runner = EffectRunner::new(services, confirm).context("failed to start engine")?;

    let mut session = Session {
        state: initial_state(config),
        runner,
        ready: false,
        screen: Screen::default(),
    };
    session.runner.bootstrap();

    while !session.is_finished() {
        match session.runner.next(POLL_INTERVAL) {
            Some(Inbound::Ready) => {
                session.ready = true;
                for request in &requests {
                    session.dispatch(Msg::SettingToggled {
                        key: request.key.clone(),
                        value: request.value,
                    });
                }
                if let Some(feed_id) = &config.test_feed {
                    session.start_tests(feed_id.clone());
                }
                session.show();
            }
            Some(Inbound::Msg(msg)) => session.dispatch(msg),
            None => {}
        }
    }

    session.show();
    Ok(())
}

/// Prints the panel whenever its text changes.
#[derive(Debug, Default)]
struct Screen {
    last: Option<String>,
}

impl Screen {
    fn show(&mut self, text: String) -> bool {
        if self.last.as_ref() == Some(&text) {
            return false;
        }
        println!("{text}\n");
        self.last = Some(text);
        true
    }
}

struct Session {
    state: AppState,
    runner: EffectRunner,
    ready: bool,
    screen: Screen,
}

impl Session {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let dirty = state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);
        // Startup loads arrive in a burst; the first frame is shown on ready.
        if dirty && self.ready {
            self.show();
        }
    }

    fn show(&mut self) {
        let text = render(&self.state.view(), Utc::now().timestamp());
        if !self.screen.show(text) {
            creeper_debug!("view unchanged");
        }
    }

    fn start_tests(&mut self, feed_id: FeedId) {
        if self.state.feed(&feed_id).is_none() {
            creeper_info!("feed {} not found, nothing to test", feed_id);
            return;
        }
        creeper_info!("starting test pass on feed {}", feed_id);
        self.dispatch(Msg::StartTests { feed_id });
    }

    fn is_finished(&self) -> bool {
        self.ready && is_settled(&self.state)
    }
}

/// Nothing is waiting on the engine or a prompt.
fn is_settled(state: &AppState) -> bool {
    let feeds_idle = state.feeds().iter().all(|feed| {
        !feed.orchestrator().is_running()
            && !feed.orchestrator().has_test_in_flight()
            && !feed.is_updating()
            && feed.hidden_toggle().is_interactive()
    });
    feeds_idle && state.settings().iter().all(|toggle| toggle.is_interactive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_requests_parse_booleans() {
        assert_eq!(
            SettingRequest::parse("allow_lan=true").unwrap(),
            SettingRequest {
                key: "allow_lan".to_string(),
                value: true,
            }
        );
        assert!(!SettingRequest::parse("allow_lan=off").unwrap().value);
        assert!(SettingRequest::parse("allow_lan").is_err());
        assert!(SettingRequest::parse("allow_lan=maybe").is_err());
        assert!(SettingRequest::parse("=true").is_err());
    }

    #[test]
    fn screen_skips_identical_frames() {
        let mut screen = Screen::default();
        assert!(screen.show("a".to_string()));
        assert!(!screen.show("a".to_string()));
        assert!(screen.show("b".to_string()));
    }

    #[test]
    fn initial_state_registers_configured_settings() {
        let state = initial_state(&PanelConfig::default());
        let keys: Vec<&str> = state.settings().iter().map(|t| t.key()).collect();
        assert_eq!(keys, vec!["allow_lan"]);
        assert!(!state.settings().is_loaded());
        assert!(is_settled(&state));
    }
}
