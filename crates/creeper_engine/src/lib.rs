//! Creeper engine: manager API clients and effect execution.
mod client;
mod engine;
mod error;
mod executor;
mod feeds;
mod settings;
mod speed;
mod types;
mod user_settings;

pub use client::ApiClient;
pub use engine::{EngineHandle, EngineServices};
pub use error::ApiError;
pub use executor::{HttpTestExecutor, TestExecutor};
pub use feeds::{parse_feed_list, FeedController, HttpFeedController};
pub use settings::ApiSettings;
pub use speed::{format_update_time, parse_speed_cache, parse_speed_report, parse_speed_text};
pub use types::EngineEvent;
pub use user_settings::{HttpSettingsBackend, SettingsBackend};
