use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use creeper_core::{Effect, Msg};
use creeper_engine::{EngineEvent, EngineHandle, EngineServices};
use creeper_logging::{creeper_debug, creeper_info, creeper_warn};

/// What the app loop receives from the engine side.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Msg(Msg),
    /// Startup loads have all settled.
    Ready,
}

/// Answers `AskConfirmation` effects.
pub trait Confirm: Send {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Asks on the terminal; anything but `y`/`yes` declines.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(err) => {
                creeper_warn!("could not read confirmation: {}", err);
                false
            }
        }
    }
}

pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, prompt: &str) -> bool {
        creeper_info!("auto-confirmed: {}", prompt);
        true
    }
}

pub struct EffectRunner {
    engine: EngineHandle,
    confirm: Box<dyn Confirm>,
    /// Answers produced locally, delivered before engine events.
    local: VecDeque<Msg>,
}

impl EffectRunner {
    pub fn new(services: EngineServices, confirm: Box<dyn Confirm>) -> io::Result<Self> {
        Ok(Self {
            engine: EngineHandle::new(services)?,
            confirm,
            local: VecDeque::new(),
        })
    }

    pub fn bootstrap(&self) {
        self.engine.bootstrap();
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RunTest(request) => {
                    creeper_debug!("RunTest node={} run={:?}", request.node_id, request.run);
                    self.engine.run_test(request);
                }
                Effect::AskConfirmation { key, prompt } => {
                    let accepted = self.confirm.confirm(&prompt);
                    self.local
                        .push_back(Msg::ConfirmationAnswered { key, accepted });
                }
                Effect::PersistSetting(change) => self.engine.persist_setting(change),
                Effect::SettingCommitted(change) => {
                    creeper_info!("setting {} is now {}", change.key, change.value);
                }
                Effect::EditFeedUrl { feed_id, url } => self.engine.edit_feed_url(feed_id, url),
                Effect::DeleteFeed { feed_id } => self.engine.delete_feed(feed_id),
                Effect::UpdateFeed { feed_id } => self.engine.update_feed(feed_id),
                Effect::SwitchNode {
                    node_id, params, ..
                } => self.engine.switch_node(node_id, params),
            }
        }
    }

    /// Next input for the update loop, waiting up to `timeout` for the
    /// engine.
    pub fn next(&mut self, timeout: Duration) -> Option<Inbound> {
        if let Some(msg) = self.local.pop_front() {
            return Some(Inbound::Msg(msg));
        }
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

pub fn map_event(event: EngineEvent) -> Inbound {
    let msg = match event {
        EngineEvent::FeedsLoaded(feeds) => Msg::FeedsLoaded(feeds),
        EngineEvent::SpeedRecordsLoaded(records) => Msg::SpeedRecordsLoaded(records),
        EngineEvent::SettingsLoaded(values) => Msg::SettingsLoaded(values),
        EngineEvent::ActiveNodeLoaded(node) => Msg::ActiveNodeLoaded(node),
        EngineEvent::Bootstrapped => return Inbound::Ready,
        EngineEvent::TestFinished(done) => Msg::TestFinished(done),
        EngineEvent::SettingPersisted { key, success } => Msg::SettingPersisted { key, success },
        EngineEvent::FeedUrlEdited {
            feed_id,
            url,
            result,
        } => Msg::FeedUrlEdited {
            success: outcome("edit feed url", &feed_id, result),
            feed_id,
            url,
        },
        EngineEvent::FeedDeleted { feed_id, result } => Msg::FeedDeleted {
            success: outcome("delete feed", &feed_id, result),
            feed_id,
        },
        EngineEvent::FeedUpdated { feed_id, result } => {
            let snapshot = match result {
                Ok(snapshot) => Some(snapshot),
                Err(err) => {
                    creeper_warn!("update feed {} failed: {}", feed_id, err);
                    None
                }
            };
            Msg::FeedUpdated { feed_id, snapshot }
        }
        EngineEvent::NodeSwitched { node_id, result } => Msg::NodeSwitched {
            success: outcome("switch node", &node_id, result),
            node_id,
        },
    };
    Inbound::Msg(msg)
}

fn outcome(action: &str, target: &str, result: Result<(), creeper_engine::ApiError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            creeper_warn!("{} {} failed: {}", action, target, err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use creeper_engine::ApiError;

    #[test]
    fn bootstrap_completion_is_ready() {
        assert_eq!(map_event(EngineEvent::Bootstrapped), Inbound::Ready);
    }

    #[test]
    fn failed_commands_become_unsuccessful_msgs() {
        let event = EngineEvent::NodeSwitched {
            node_id: "n1".to_string(),
            result: Err(ApiError::Timeout("slow".to_string())),
        };
        assert_eq!(
            map_event(event),
            Inbound::Msg(Msg::NodeSwitched {
                node_id: "n1".to_string(),
                success: false,
            })
        );

        let event = EngineEvent::FeedUpdated {
            feed_id: "f1".to_string(),
            result: Err(ApiError::Network("down".to_string())),
        };
        assert_eq!(
            map_event(event),
            Inbound::Msg(Msg::FeedUpdated {
                feed_id: "f1".to_string(),
                snapshot: None,
            })
        );
    }

    #[test]
    fn edited_url_is_carried_through() {
        let event = EngineEvent::FeedUrlEdited {
            feed_id: "f1".to_string(),
            url: "https://sub.example/new".to_string(),
            result: Ok(()),
        };
        assert_eq!(
            map_event(event),
            Inbound::Msg(Msg::FeedUrlEdited {
                feed_id: "f1".to_string(),
                url: "https://sub.example/new".to_string(),
                success: true,
            })
        );
    }
}
