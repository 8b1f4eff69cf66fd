use std::sync::Arc;

use creeper_core::SettingChange;
use creeper_logging::creeper_warn;
use serde::Serialize;
use serde_json::Value;

use crate::{ApiClient, ApiError};

/// Server side of the settings checkboxes.
#[async_trait::async_trait]
pub trait SettingsBackend: Send + Sync {
    /// Current values. Non-boolean entries are left out.
    async fn load(&self) -> Result<Vec<(String, bool)>, ApiError>;

    /// Applies one change. `None` means the change was not applied.
    async fn persist(&self, change: &SettingChange) -> Option<Value>;
}

#[derive(Debug, Serialize)]
struct SettingBody<'a> {
    key: &'a str,
    value: bool,
}

#[derive(Debug, Clone)]
pub struct HttpSettingsBackend {
    client: Arc<ApiClient>,
}

impl HttpSettingsBackend {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl SettingsBackend for HttpSettingsBackend {
    async fn load(&self) -> Result<Vec<(String, bool)>, ApiError> {
        let body = self.client.get_json("api/user_settings").await?;
        let entries = body
            .as_object()
            .ok_or_else(|| ApiError::Decode("settings are not an object".to_string()))?;
        Ok(entries
            .iter()
            .filter_map(|(key, value)| Some((key.clone(), value.as_bool()?)))
            .collect())
    }

    async fn persist(&self, change: &SettingChange) -> Option<Value> {
        let body = SettingBody {
            key: &change.key,
            value: change.value,
        };
        match self.client.post_json("api/user_settings", &body, None).await {
            Ok(Value::Null) => {
                creeper_warn!("setting {} refused by manager", change.key);
                None
            }
            Ok(value) => Some(value),
            Err(err) => {
                creeper_warn!("setting {} not persisted: {}", change.key, err);
                None
            }
        }
    }
}
