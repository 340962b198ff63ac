//! Bastion defenders.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Defenders {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub armed: bool,
    /// One-turn buff; cleared on the next turn advance.
    #[serde(default)]
    pub patrol_advantage: bool,
}

impl Defenders {
    pub fn add(&mut self, n: u32) {
        self.count += n;
    }

    /// Removing the last defender also clears the armed flag.
    pub fn remove(&mut self, n: u32) {
        self.count = self.count.saturating_sub(n);
        if self.count == 0 {
            self.armed = false;
        }
    }

    /// Arming cost scales with headcount.
    pub fn arming_cost_gp(&self) -> i64 {
        100 + i64::from(self.count) * 100
    }
}
