use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::{Map, Value};

pub type FeedId = String;
pub type NodeId = String;
pub type RunId = u64;

/// Connection parameters of a proxy node, as delivered by the feed.
///
/// Values keep their JSON type so they reach the manager unchanged;
/// [`ConnParams::text`] gives the string view used for comparisons, in which
/// `"443"` and `443` are equal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnParams(BTreeMap<String, Value>);

impl ConnParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn text(&self, key: &str) -> Option<Cow<'_, str>> {
        match self.0.get(key)? {
            Value::Null => None,
            Value::String(text) => Some(Cow::Borrowed(text)),
            other => Some(Cow::Owned(other.to_string())),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The parameters as a JSON object body.
    pub fn to_json(&self) -> Map<String, Value> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ConnParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One proxy endpoint belonging to a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyNode {
    pub id: NodeId,
    pub display_name: String,
    pub params: ConnParams,
    /// Set from the external eligibility predicate when the list is built.
    pub eligible_for_test: bool,
    pub duplicate: bool,
    pub testing: bool,
}

impl ProxyNode {
    pub fn new(id: impl Into<NodeId>, display_name: impl Into<String>, params: ConnParams) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            params,
            eligible_for_test: true,
            duplicate: false,
            testing: false,
        }
    }
}
