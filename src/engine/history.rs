//! Cycle history.
//!
//! Bounded append-only log of per-cycle records. The cap keeps memory
//! flat for long-running deployments; the oldest records are evicted
//! first. Export to a time-series sink can hang off this later.

use std::collections::VecDeque;

use crate::types::CycleRecord;

pub struct CycleHistory {
    records: VecDeque<CycleRecord>,
    max_records: usize,
}

impl CycleHistory {
    pub fn new(max_records: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_records.min(1024)),
            max_records: max_records.max(1),
        }
    }

    /// Append a record, evicting the oldest when at capacity.
    pub fn push(&mut self, record: CycleRecord) {
        if self.records.len() == self.max_records {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record, if any.
    pub fn latest(&self) -> Option<&CycleRecord> {
        self.records.back()
    }

    /// Records oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &CycleRecord> {
        self.records.iter()
    }
}
