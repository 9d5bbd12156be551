use crate::models::ContractKey;
use std::collections::HashMap;

/// Process-lifetime map from contract identity to last-observed open
/// interest. Mutated only during a refresh; cleared together with the
/// watchlist.
#[derive(Debug, Default)]
pub struct OiDeltaTracker {
    previous: HashMap<ContractKey, u64>,
}

impl OiDeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the change since the prior observation and store
    /// `current_oi` as the new baseline, unconditionally.
    ///
    /// The first observation for a key yields `(0, 0.0)`: there is no
    /// prior baseline, and comparing against zero OI would fabricate a
    /// delta. A prior baseline of zero also yields `0%`, so a jump from
    /// zero OI reports `0%` rather than infinity.
    pub fn update(&mut self, key: &ContractKey, current_oi: u64) -> (i64, f64) {
        let result = match self.previous.get(key) {
            None => (0, 0.0),
            Some(&prev) => {
                let change = current_oi as i64 - prev as i64;
                let pct = if prev > 0 {
                    change as f64 / prev as f64 * 100.0
                } else {
                    0.0
                };
                (change, pct)
            }
        };
        self.previous.insert(key.clone(), current_oi);
        result
    }

    /// Whether a baseline has been recorded for this key.
    pub fn has_baseline(&self, key: &ContractKey) -> bool {
        self.previous.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.previous.clear();
    }
}
