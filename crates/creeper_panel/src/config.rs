use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use creeper_core::{ConfirmPolicy, FeedId, NodeClassifier, RequiresParam};
use creeper_engine::ApiSettings;
use creeper_logging::{creeper_info, LogDestination, LogLevel};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "creeper.ron";

/// A settings checkbox the panel offers, with its optional prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingEntry {
    pub key: String,
    #[serde(default)]
    pub confirm_on_check: Option<String>,
    #[serde(default)]
    pub confirm_on_uncheck: Option<String>,
}

impl SettingEntry {
    pub fn confirm_policy(&self) -> Option<ConfirmPolicy> {
        if self.confirm_on_check.is_none() && self.confirm_on_uncheck.is_none() {
            return None;
        }
        Some(ConfirmPolicy {
            on_check: self.confirm_on_check.clone(),
            on_uncheck: self.confirm_on_uncheck.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub base_url: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub test_timeout_ms: u64,
    /// Nodes without this connection parameter are never tested.
    pub eligibility_param: String,
    pub log_destination: LogDestination,
    pub log_level: LogLevel,
    /// Feed to run a full test pass on once everything is loaded.
    pub test_feed: Option<FeedId>,
    /// Answer every confirmation prompt with yes instead of asking.
    pub assume_yes: bool,
    pub settings: Vec<SettingEntry>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        Self {
            base_url: api.base_url,
            connect_timeout_ms: millis(api.connect_timeout),
            request_timeout_ms: millis(api.request_timeout),
            test_timeout_ms: millis(api.test_timeout),
            eligibility_param: "server_port".to_string(),
            log_destination: LogDestination::default(),
            log_level: LogLevel::default(),
            test_feed: None,
            assume_yes: false,
            settings: vec![SettingEntry {
                key: "allow_lan".to_string(),
                confirm_on_check: Some(
                    "Allow other devices on the local network to use this proxy?".to_string(),
                ),
                confirm_on_uncheck: None,
            }],
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl PanelConfig {
    /// Reads the config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                creeper_info!("no config at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read config {:?}", path))
            }
        };
        ron::from_str(&content).with_context(|| format!("failed to parse config {:?}", path))
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            test_timeout: Duration::from_millis(self.test_timeout_ms),
        }
    }

    pub fn classifier(&self) -> NodeClassifier {
        NodeClassifier::new(RequiresParam::new(self.eligibility_param.clone()))
    }
}
