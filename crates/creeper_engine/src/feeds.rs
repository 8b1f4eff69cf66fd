use std::borrow::Cow;
use std::sync::Arc;

use creeper_core::{ConnParams, FeedSnapshot, NodeId, ProxyNode, SpeedRecord};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::{parse_speed_cache, ApiClient, ApiError};

/// Feed operations owned by the manager. The panel only requests them.
#[async_trait::async_trait]
pub trait FeedController: Send + Sync {
    async fn list_feeds(&self) -> Result<Vec<FeedSnapshot>, ApiError>;
    async fn active_node(&self) -> Result<Option<NodeId>, ApiError>;
    /// Results of earlier test passes.
    async fn speed_records(&self) -> Result<Vec<(NodeId, SpeedRecord)>, ApiError>;
    async fn edit_feed_url(&self, feed_id: &str, url: &str) -> Result<(), ApiError>;
    async fn delete_feed(&self, feed_id: &str) -> Result<(), ApiError>;
    async fn update_feed(&self, feed_id: &str) -> Result<FeedSnapshot, ApiError>;
    async fn switch_node(&self, node_id: &str, params: &ConnParams) -> Result<(), ApiError>;
}

#[derive(Debug, Deserialize)]
struct RawFeed {
    uid: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    update: Option<f64>,
    #[serde(default)]
    scheme: Option<String>,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    proxies: Vec<RawProxy>,
}

#[derive(Debug, Deserialize)]
struct RawProxy {
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    conf: Map<String, Value>,
}

impl RawFeed {
    fn into_snapshot(self) -> FeedSnapshot {
        let feed_id = self.uid;
        let nodes = self
            .proxies
            .into_iter()
            .enumerate()
            .map(|(index, proxy)| proxy.into_node(&feed_id, index))
            .collect();
        FeedSnapshot {
            url: self.url.unwrap_or_default(),
            scheme: self.scheme,
            updated_at: self.update.filter(|secs| secs.is_finite()).map(|secs| secs as i64),
            hidden: self.hidden,
            nodes,
            id: feed_id,
        }
    }
}

impl RawProxy {
    fn into_node(self, feed_id: &str, index: usize) -> ProxyNode {
        let params: ConnParams = self
            .conf
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .collect();
        let id = self
            .uid
            .or_else(|| params.text("uid").map(Cow::into_owned))
            .unwrap_or_else(|| format!("{feed_id}#{index}"));
        // ssr feeds call it `remark`, vmess feeds `ps`.
        let name = ["remark", "ps", "server", "add"]
            .iter()
            .filter_map(|key| params.text(key))
            .find(|text| !text.is_empty())
            .map(Cow::into_owned)
            .unwrap_or_else(|| id.clone());
        ProxyNode::new(id, name, params)
    }
}

/// Parses the manager's `feed.json`. The manager's duplicate flags are
/// ignored; the panel classifies nodes itself.
pub fn parse_feed_list(body: Value) -> Result<Vec<FeedSnapshot>, ApiError> {
    let feeds: Vec<RawFeed> =
        serde_json::from_value(body).map_err(|err| ApiError::Decode(err.to_string()))?;
    Ok(feeds.into_iter().map(RawFeed::into_snapshot).collect())
}

fn parse_feed(body: Value) -> Result<FeedSnapshot, ApiError> {
    let feed: RawFeed =
        serde_json::from_value(body).map_err(|err| ApiError::Decode(err.to_string()))?;
    Ok(feed.into_snapshot())
}

#[derive(Debug, Clone)]
pub struct HttpFeedController {
    client: Arc<ApiClient>,
}

impl HttpFeedController {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl FeedController for HttpFeedController {
    async fn list_feeds(&self) -> Result<Vec<FeedSnapshot>, ApiError> {
        match self.client.get_json("feed.json").await {
            Ok(body) => parse_feed_list(body),
            // No feed file yet.
            Err(ApiError::HttpStatus { status: 404, .. }) => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    async fn active_node(&self) -> Result<Option<NodeId>, ApiError> {
        match self.client.get_json("cur_node.json").await {
            Ok(body) => Ok(body.get("uid").and_then(Value::as_str).map(ToOwned::to_owned)),
            Err(ApiError::HttpStatus { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn speed_records(&self) -> Result<Vec<(NodeId, SpeedRecord)>, ApiError> {
        match self.client.get_json("speed.json").await {
            Ok(body) => Ok(parse_speed_cache(&body)),
            Err(ApiError::HttpStatus { status: 404, .. }) => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    async fn edit_feed_url(&self, feed_id: &str, url: &str) -> Result<(), ApiError> {
        self.client
            .post_json("api/edit_feed", &json!({ "uid": feed_id, "url": url }), None)
            .await
            .map(drop)
    }

    async fn delete_feed(&self, feed_id: &str) -> Result<(), ApiError> {
        self.client
            .post_json("api/delete_feed", &json!({ "uid": feed_id }), None)
            .await
            .map(drop)
    }

    async fn update_feed(&self, feed_id: &str) -> Result<FeedSnapshot, ApiError> {
        let body = self
            .client
            .post_json("api/update_feed", &json!({ "uid": feed_id }), None)
            .await?;
        parse_feed(body)
    }

    async fn switch_node(&self, node_id: &str, params: &ConnParams) -> Result<(), ApiError> {
        let mut body = params.to_json();
        body.insert("uid".to_string(), Value::String(node_id.to_string()));
        self.client
            .post_json("api/switch_node", &body, None)
            .await
            .map(drop)
    }
}
