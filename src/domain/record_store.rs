//! Dedup/merge record store
//!
//! Process-wide accumulation of business records for a single run. Merges to
//! different keys proceed concurrently; merges to the same key serialize on
//! that record's own lock. The store converges to the same content for any
//! completion order of the crawl tasks (see the merge rules in
//! [`crate::domain::business::BusinessRecord::apply`]).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::domain::business::{BusinessKey, BusinessRecord, FieldPatch};

/// Key-to-record map with per-key mutual exclusion.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: RwLock<HashMap<BusinessKey, Arc<Mutex<BusinessRecord>>>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a patch into the record for `key`, creating it on first sight.
    pub async fn merge(&self, key: &BusinessKey, patch: &FieldPatch) {
        let slot = {
            let records = self.records.read().await;
            records.get(key).cloned()
        };
        let slot = match slot {
            Some(slot) => slot,
            None => {
                let mut records = self.records.write().await;
                records
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(BusinessRecord::default())))
                    .clone()
            }
        };
        let mut record = slot.lock().await;
        record.apply(patch);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Deterministic, field-complete view for export: keys sorted, every
    /// record filled to the union of all field names seen this run.
    pub async fn snapshot(&self) -> BTreeMap<BusinessKey, BusinessRecord> {
        let records = self.records.read().await;
        let mut out = BTreeMap::new();
        for (key, slot) in records.iter() {
            out.insert(key.clone(), slot.lock().await.clone());
        }
        drop(records);

        let all_fields: BTreeSet<String> = out
            .values()
            .flat_map(|record| record.field_names().map(String::from))
            .collect();
        for record in out.values_mut() {
            record.fill_missing(all_fields.iter().map(String::as_str));
        }
        out
    }
}
