//! Creeper core: pure panel state machine and view-model helpers.
mod classify;
mod color;
mod effect;
mod feed;
mod model;
mod msg;
mod orchestrator;
mod settings;
mod speed;
mod state;
mod toggle;
mod update;
mod view_model;

pub use classify::{
    mark_duplicates, Eligibility, Equivalence, KeyedEquivalence, NodeClassifier, RequiresParam,
};
pub use color::{speed_color, Rgb, SpeedColor, FAST_COLOR, PENDING_COLOR, SLOW_COLOR};
pub use effect::Effect;
pub use feed::{Feed, FeedSnapshot, HIDE_FEED_KEY_PREFIX};
pub use model::{ConnParams, FeedId, NodeId, ProxyNode, RunId};
pub use msg::Msg;
pub use orchestrator::{Orchestrator, RunState, TestCompletion, TestRequest};
pub use settings::SettingsStore;
pub use speed::{SpeedRecord, SpeedRecordStore};
pub use state::AppState;
pub use toggle::{ConfirmPolicy, SettingChange, SettingToggle, TogglePhase, ToggleStep};
pub use update::update;
pub use view_model::{
    format_elapsed, AppViewModel, FeedView, NodeRowView, RowClass, SettingView, TESTING_TEXT,
    TESTING_UPDATE_TEXT,
};
