//! Per-employee lock table.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

/// Table size at which unused handles are first dropped.
const PRUNE_THRESHOLD: usize = 1024;

/// Hands out one mutex per employee so that read-then-write sequences on
/// the same employee's records run one at a time, while different
/// employees proceed in parallel.
///
/// Handles that no caller holds are dropped once the table reaches its
/// high-water mark, so the table tracks active employees rather than every
/// employee ever seen.
#[derive(Debug)]
pub(crate) struct EmployeeLocks {
    table: Mutex<LockTable>,
}

#[derive(Debug)]
struct LockTable {
    handles: HashMap<String, Arc<Mutex<()>>>,
    prune_at: usize,
    min_prune_at: usize,
}

impl Default for EmployeeLocks {
    fn default() -> Self {
        Self::with_prune_threshold(PRUNE_THRESHOLD)
    }
}

impl EmployeeLocks {
    /// Creates a table that starts pruning at `threshold` entries.
    pub(crate) fn with_prune_threshold(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            table: Mutex::new(LockTable {
                handles: HashMap::new(),
                prune_at: threshold,
                min_prune_at: threshold,
            }),
        }
    }

    /// Returns the mutex guarding `employee_id`, creating it on first use.
    pub(crate) fn handle(&self, employee_id: &str) -> Arc<Mutex<()>> {
        let mut table = self.table.lock();
        if table.handles.len() >= table.prune_at && !table.handles.contains_key(employee_id) {
            table.prune();
        }
        Arc::clone(
            table
                .handles
                .entry(employee_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.table.lock().handles.len()
    }
}

impl LockTable {
    /// Drops handles only the table still references. A handle held or
    /// awaited by a caller has a strong count above one and survives.
    fn prune(&mut self) {
        let before = self.handles.len();
        self.handles.retain(|_, handle| Arc::strong_count(handle) > 1);
        // Next scan once the live set doubles.
        self.prune_at = (self.handles.len() * 2).max(self.min_prune_at);
        debug!(
            dropped = before - self.handles.len(),
            live = self.handles.len(),
            "Pruned employee lock table"
        );
    }
}
