use std::fmt;
use std::sync::Arc;

use crate::{ConnParams, ProxyNode};

/// Decides whether two nodes point at the same endpoint.
pub trait Equivalence: Send + Sync {
    fn equivalent(&self, a: &ConnParams, b: &ConnParams) -> bool;
}

impl<F> Equivalence for F
where
    F: Fn(&ConnParams, &ConnParams) -> bool + Send + Sync,
{
    fn equivalent(&self, a: &ConnParams, b: &ConnParams) -> bool {
        self(a, b)
    }
}

/// Decides whether a node exposes what a test executor needs.
pub trait Eligibility: Send + Sync {
    fn eligible(&self, params: &ConnParams) -> bool;
}

impl<F> Eligibility for F
where
    F: Fn(&ConnParams) -> bool + Send + Sync,
{
    fn eligible(&self, params: &ConnParams) -> bool {
        self(params)
    }
}

/// Nodes are equivalent when every listed key carries the same value.
/// A key missing on both sides counts as equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedEquivalence {
    keys: Vec<String>,
}

impl KeyedEquivalence {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Key sets used by the subscription formats the manager understands.
    pub fn for_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "ssr" => Some(Self::new(["server", "server_port"])),
            "vmess" => Some(Self::new(["add", "port", "net", "host", "path"])),
            _ => None,
        }
    }
}

impl Equivalence for KeyedEquivalence {
    fn equivalent(&self, a: &ConnParams, b: &ConnParams) -> bool {
        self.keys.iter().all(|key| a.text(key) == b.text(key))
    }
}

/// A node is eligible when it carries the named connection parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiresParam(pub String);

impl RequiresParam {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl Eligibility for RequiresParam {
    fn eligible(&self, params: &ConnParams) -> bool {
        params.contains(&self.0)
    }
}

/// Marks every non-first member of each equivalence class as duplicate.
/// Returns the number of duplicates found.
pub fn mark_duplicates<E: Equivalence + ?Sized>(nodes: &mut [ProxyNode], equivalence: &E) -> usize {
    let mut canonical: Vec<usize> = Vec::new();
    let mut duplicates = 0;
    for index in 0..nodes.len() {
        let is_duplicate = canonical
            .iter()
            .any(|&first| equivalence.equivalent(&nodes[first].params, &nodes[index].params));
        nodes[index].duplicate = is_duplicate;
        if is_duplicate {
            duplicates += 1;
        } else {
            canonical.push(index);
        }
    }
    duplicates
}

/// The externally supplied predicates applied whenever a feed's node list
/// is installed or replaced.
#[derive(Clone)]
pub struct NodeClassifier {
    equivalence: Option<Arc<dyn Equivalence>>,
    eligibility: Arc<dyn Eligibility>,
}

impl NodeClassifier {
    pub fn new(eligibility: impl Eligibility + 'static) -> Self {
        Self {
            equivalence: None,
            eligibility: Arc::new(eligibility),
        }
    }

    /// Overrides the per-scheme key comparison.
    pub fn with_equivalence(mut self, equivalence: impl Equivalence + 'static) -> Self {
        self.equivalence = Some(Arc::new(equivalence));
        self
    }

    pub fn classify(&self, scheme: Option<&str>, nodes: &mut [ProxyNode]) -> usize {
        for node in nodes.iter_mut() {
            node.eligible_for_test = self.eligibility.eligible(&node.params);
        }
        match &self.equivalence {
            Some(equivalence) => mark_duplicates(nodes, equivalence.as_ref()),
            None => match scheme.and_then(KeyedEquivalence::for_scheme) {
                Some(keyed) => mark_duplicates(nodes, &keyed),
                None => mark_duplicates(nodes, &|a: &ConnParams, b: &ConnParams| a == b),
            },
        }
    }
}

impl Default for NodeClassifier {
    fn default() -> Self {
        Self::new(RequiresParam::new("server_port"))
    }
}

impl fmt::Debug for NodeClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeClassifier")
            .field("custom_equivalence", &self.equivalence.is_some())
            .finish_non_exhaustive()
    }
}

impl PartialEq for NodeClassifier {
    fn eq(&self, other: &Self) -> bool {
        let same_equivalence = match (&self.equivalence, &other.equivalence) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_equivalence && Arc::ptr_eq(&self.eligibility, &other.eligibility)
    }
}
