//! Identity-keyed, insertion-ordered record set.

use crate::record::Record;
use std::collections::HashMap;

/// One collection's records.
///
/// Records are kept in insertion order; a `HashMap` from identity key to
/// vector index makes upserts O(1). Invariant: no two records share an
/// identity key.
#[derive(Debug, Default)]
pub(crate) struct Collection {
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl Collection {
    /// Inserts or replaces a record under `key`.
    ///
    /// Returns `true` if the record was new, `false` if an existing record
    /// with the same key was replaced in place.
    pub(crate) fn upsert(&mut self, key: String, record: Record) -> bool {
        match self.index.get(&key) {
            Some(&pos) => {
                self.records[pos] = record;
                false
            }
            None => {
                self.index.insert(key, self.records.len());
                self.records.push(record);
                true
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn records(&self) -> &[Record] {
        &self.records
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}
