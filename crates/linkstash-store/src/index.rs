use std::collections::{BTreeSet, HashMap};

use linkstash_types::{LinkId, LinkRecord};

/// Ordering key shared by all secondary indexes: timestamp first, id as a
/// tie-breaker so equal timestamps still get distinct entries.
type OrderKey = (i64, LinkId);

/// Primary collection plus its secondary indexes.
///
/// The primary map is keyed by `id`. Secondary indexes (`timestamp`,
/// `sourceUrl`, `targetUrl`) are non-unique and hold `(timestamp, id)` keys
/// so every lookup comes back newest first.
#[derive(Debug, Default)]
pub struct LinkIndexes {
    primary: HashMap<LinkId, LinkRecord>,
    by_timestamp: BTreeSet<OrderKey>,
    by_source: HashMap<String, BTreeSet<OrderKey>>,
    by_target: HashMap<String, BTreeSet<OrderKey>>,
}

impl LinkIndexes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record into the primary collection and every index.
    ///
    /// Returns `false` (and changes nothing) if the id is already present.
    pub fn insert(&mut self, record: LinkRecord) -> bool {
        if self.primary.contains_key(record.id()) {
            return false;
        }
        let key = (record.timestamp(), record.id().clone());
        self.by_timestamp.insert(key.clone());
        self.by_source
            .entry(record.source_url().to_owned())
            .or_default()
            .insert(key.clone());
        self.by_target
            .entry(record.target_url().to_owned())
            .or_default()
            .insert(key);
        self.primary.insert(record.id().clone(), record);
        true
    }

    pub fn contains(&self, id: &LinkId) -> bool {
        self.primary.contains_key(id)
    }

    pub fn get(&self, id: &LinkId) -> Option<&LinkRecord> {
        self.primary.get(id)
    }

    /// All records, descending by timestamp.
    pub fn newest_first(&self) -> Vec<LinkRecord> {
        self.collect(self.by_timestamp.iter())
    }

    /// Records captured on `source_url`, newest first.
    pub fn with_source(&self, source_url: &str) -> Vec<LinkRecord> {
        self.by_source
            .get(source_url)
            .map(|keys| self.collect(keys.iter()))
            .unwrap_or_default()
    }

    /// Records pointing at `target_url`, newest first.
    pub fn with_target(&self, target_url: &str) -> Vec<LinkRecord> {
        self.by_target
            .get(target_url)
            .map(|keys| self.collect(keys.iter()))
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.primary.clear();
        self.by_timestamp.clear();
        self.by_source.clear();
        self.by_target.clear();
    }

    pub fn len(&self) -> usize {
        self.primary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    /// Every primary record appears in every index and vice versa.
    pub fn is_consistent(&self) -> bool {
        let indexed = |set: &BTreeSet<OrderKey>| {
            set.iter().all(|(ts, id)| {
                self.primary
                    .get(id)
                    .is_some_and(|record| record.timestamp() == *ts)
            })
        };
        let url_total = |map: &HashMap<String, BTreeSet<OrderKey>>| {
            map.values().map(BTreeSet::len).sum::<usize>()
        };

        self.by_timestamp.len() == self.primary.len()
            && indexed(&self.by_timestamp)
            && url_total(&self.by_source) == self.primary.len()
            && url_total(&self.by_target) == self.primary.len()
            && self.by_source.values().all(indexed)
            && self.by_target.values().all(indexed)
    }

    fn collect<'a>(&self, keys: impl DoubleEndedIterator<Item = &'a OrderKey>) -> Vec<LinkRecord> {
        keys.rev()
            .filter_map(|(_, id)| self.primary.get(id).cloned())
            .collect()
    }
}
