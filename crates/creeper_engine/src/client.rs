use std::time::Duration;

use creeper_logging::{creeper_debug, creeper_warn};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use url::Url;

use crate::{ApiError, ApiSettings};

/// JSON client for the manager's local HTTP API.
///
/// Mutating calls carry the CSRF token from `/api/token` as a `token` query
/// parameter. The token is fetched lazily and refreshed once when the
/// manager rejects it (it changes whenever the manager restarts).
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: Mutex<Option<String>>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let mut base = Url::parse(&settings.base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .no_proxy()
            .build()?;
        Ok(Self {
            http,
            base,
            token: Mutex::new(None),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    pub async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.endpoint(path)?;
        creeper_debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }

    pub async fn post_json<B>(
        &self,
        path: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        match self.post_once(path, body, timeout).await {
            Err(ApiError::HttpStatus { status: 400, message }) if message == "bad token" => {
                creeper_warn!("manager rejected token, refreshing");
                *self.token.lock().await = None;
                self.post_once(path, body, timeout).await
            }
            other => other,
        }
    }

    async fn post_once<B>(
        &self,
        path: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let token = self.token().await?;
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut().append_pair("token", &token);
        creeper_debug!("POST {}", url.path());

        let mut request = self.http.post(url).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;
        read_json(response).await
    }

    async fn token(&self) -> Result<String, ApiError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }
        let body = self.get_json("api/token").await?;
        let token = body
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Decode("token missing".to_string()))?
            .to_string();
        *cached = Some(token.clone());
        Ok(token)
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(ApiError::HttpStatus {
            status: status.as_u16(),
            message: error_message(&body).unwrap_or_else(|| status.to_string()),
        });
    }
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
}

/// The manager reports failures as `{"error": "..."}`.
fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value.get("error")?.as_str().map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_without_trailing_slash_keeps_prefix() {
        let settings = ApiSettings {
            base_url: "http://127.0.0.1:8964/panel".to_string(),
            ..ApiSettings::default()
        };
        let client = ApiClient::new(&settings).unwrap();
        assert_eq!(
            client.endpoint("/api/token").unwrap().as_str(),
            "http://127.0.0.1:8964/panel/api/token"
        );
    }

    #[test]
    fn error_body_is_extracted() {
        assert_eq!(
            error_message(br#"{"error": "bad token"}"#).as_deref(),
            Some("bad token")
        );
        assert_eq!(error_message(b"<html>"), None);
    }
}
