//! State resolver: fold journal records into current per-decision state.
//!
//! Records are applied strictly in journal order. Applying them all at once
//! (rebuild) or one at a time as they are appended (write path) produces the
//! same state, which is what keeps the index and the journal consistent.

use std::collections::HashMap;

use crate::decision::{Decision, DecisionRecord};

/// Current merged state of every decision ID seen in the journal.
///
/// Iteration follows the order in which each ID first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedState {
    order: Vec<String>,
    records: HashMap<String, DecisionRecord>,
}

impl ResolvedState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one record on top of the accumulated state.
    ///
    /// A mutation for an ID that was never created is kept as-is; it shows
    /// up in [`ResolvedState::orphans`] until a creation record arrives.
    pub fn apply(&mut self, record: DecisionRecord) {
        if let Some(existing) = self.records.get_mut(&record.id) {
            existing.merge(record);
        } else {
            self.order.push(record.id.clone());
            self.records.insert(record.id.clone(), record);
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&DecisionRecord> {
        self.records.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Merged records in first-seen order, orphans included.
    pub fn records(&self) -> impl Iterator<Item = &DecisionRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Consume the state, yielding merged records in first-seen order.
    #[must_use]
    pub fn into_records(mut self) -> Vec<DecisionRecord> {
        self.order
            .iter()
            .filter_map(|id| self.records.remove(id))
            .collect()
    }

    /// Every complete decision, in first-seen order.
    #[must_use]
    pub fn decisions(&self) -> Vec<Decision> {
        self.records()
            .filter_map(|record| Decision::try_from(record.clone()).ok())
            .collect()
    }

    /// IDs whose records never formed a complete decision.
    #[must_use]
    pub fn orphans(&self) -> Vec<&str> {
        self.records()
            .filter(|record| !record.missing_required_fields().is_empty())
            .map(|record| record.id.as_str())
            .collect()
    }
}

/// Resolve an ordered sequence of journal records into current state.
pub fn resolve(records: impl IntoIterator<Item = DecisionRecord>) -> ResolvedState {
    let mut state = ResolvedState::new();
    for record in records {
        state.apply(record);
    }
    state
}
