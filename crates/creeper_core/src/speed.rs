use std::collections::BTreeMap;

use crate::{NodeId, ProxyNode};

/// Latest measured result for one node. Always replaced as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedRecord {
    pub result_text: String,
    pub speed_number: Option<f64>,
    pub title: Option<String>,
    pub last_updated_text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpeedRecordStore {
    records: BTreeMap<NodeId, SpeedRecord>,
}

impl SpeedRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node_id: &str) -> Option<&SpeedRecord> {
        self.records.get(node_id)
    }

    /// Stores `record` for `node_id`, dropping whatever was there before.
    pub fn insert(&mut self, node_id: impl Into<NodeId>, record: SpeedRecord) {
        self.records.insert(node_id.into(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maximum recorded speed over the non-duplicate members of `nodes`.
    pub fn highest_speed(&self, nodes: &[ProxyNode]) -> Option<f64> {
        nodes
            .iter()
            .filter(|node| !node.duplicate)
            .filter_map(|node| self.get(&node.id)?.speed_number)
            .filter(|speed| speed.is_finite())
            .fold(None, |best, speed| match best {
                Some(best) if best >= speed => Some(best),
                _ => Some(speed),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConnParams;

    fn record(speed: Option<f64>) -> SpeedRecord {
        SpeedRecord {
            result_text: speed.map(|s| format!("{s:.2}MiB/s")).unwrap_or_default(),
            speed_number: speed,
            title: None,
            last_updated_text: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn highest_speed_ignores_duplicates_and_missing_records() {
        let mut nodes = vec![
            ProxyNode::new("a", "A", ConnParams::new()),
            ProxyNode::new("b", "B", ConnParams::new()),
            ProxyNode::new("c", "C", ConnParams::new()),
            ProxyNode::new("d", "D", ConnParams::new()),
        ];
        nodes[1].duplicate = true;

        let mut store = SpeedRecordStore::new();
        assert_eq!(store.highest_speed(&nodes), None);

        store.insert("a", record(Some(3.5)));
        store.insert("b", record(Some(9.0)));
        store.insert("c", record(None));
        assert_eq!(store.highest_speed(&nodes), Some(3.5));
    }

    #[test]
    fn insert_replaces_whole_record() {
        let mut store = SpeedRecordStore::new();
        store.insert("a", record(Some(1.0)));
        store.insert(
            "a",
            SpeedRecord {
                title: Some("t".into()),
                ..record(Some(2.0))
            },
        );
        assert_eq!(store.len(), 1);
        let rec = store.get("a").unwrap();
        assert_eq!(rec.speed_number, Some(2.0));
        assert_eq!(rec.title.as_deref(), Some("t"));
    }
}
