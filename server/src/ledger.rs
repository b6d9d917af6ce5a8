use log::info;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Group history ledger: per objective, the exact participant-id sets that
/// have already completed a round there.
///
/// Equality is full-set equality. A superset or subset of a recorded group
/// is a different group and is not blocked. Entries persist for the process
/// lifetime; there is no removal.
#[derive(Debug, Default)]
pub struct GroupLedger {
    completed: HashMap<u32, HashSet<BTreeSet<u32>>>,
}

impl GroupLedger {
    pub fn new() -> Self {
        Self {
            completed: HashMap::new(),
        }
    }

    pub fn has_exact_group(&self, objective_id: u32, group: &BTreeSet<u32>) -> bool {
        self.completed
            .get(&objective_id)
            .map(|groups| groups.contains(group))
            .unwrap_or(false)
    }

    /// Records a completed group. Groups with fewer than 2 members are not
    /// recorded; inserting a set that already exists is a no-op. Returns
    /// whether a new entry was added.
    pub fn record(&mut self, objective_id: u32, group: &BTreeSet<u32>) -> bool {
        if group.len() < 2 {
            return false;
        }
        let inserted = self
            .completed
            .entry(objective_id)
            .or_default()
            .insert(group.clone());
        if inserted {
            info!(
                "Recorded completed group {:?} for objective {}",
                group, objective_id
            );
        }
        inserted
    }

    pub fn group_count(&self, objective_id: u32) -> usize {
        self.completed
            .get(&objective_id)
            .map(|groups| groups.len())
            .unwrap_or(0)
    }
}
