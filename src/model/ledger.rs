//! Per-faction political capital.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Scores are clamped to this symmetric bound.
pub const CAPITAL_BOUND: i64 = 100;

/// Key used when a faction name normalizes to nothing. Callers should flag
/// this rather than silently dropping the delta.
pub const UNKNOWN_FACTION: &str = "(unnamed)";

/// Split a composite target string ("Blackstone & Rowthorn") into its
/// member names. A plain name yields a single-element vector.
pub fn split_targets(target: &str) -> Vec<&str> {
    target
        .split('&')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn normalize(faction: &str) -> String {
    let key = faction.trim().to_lowercase();
    if key.is_empty() {
        UNKNOWN_FACTION.to_string()
    } else {
        key
    }
}

/// Mapping from normalized faction name to a bounded signed score.
/// Absent factions implicitly sit at 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoliticalLedger {
    scores: BTreeMap<String, i64>,
}

impl PoliticalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signed delta to a faction's score, clamped to the bound.
    /// Always succeeds; unknown or empty names collapse onto a stable
    /// fallback key.
    pub fn add(&mut self, faction: &str, delta: i64) -> i64 {
        let entry = self.scores.entry(normalize(faction)).or_insert(0);
        *entry = (*entry + delta).clamp(-CAPITAL_BOUND, CAPITAL_BOUND);
        *entry
    }

    pub fn get(&self, faction: &str) -> i64 {
        self.scores.get(&normalize(faction)).copied().unwrap_or(0)
    }

    /// Snapshot for rendering, in stable key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.scores.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_faction_reads_zero() {
        let ledger = PoliticalLedger::new();
        assert_eq!(ledger.get("Blackstone"), 0);
    }

    #[test]
    fn add_then_get_round_trips() {
        let mut ledger = PoliticalLedger::new();
        ledger.add("Blackstone", 8);
        assert_eq!(ledger.get("Blackstone"), 8);
        ledger.add("Blackstone", -3);
        assert_eq!(ledger.get("Blackstone"), 5);
    }

    #[test]
    fn keys_are_case_and_whitespace_insensitive() {
        let mut ledger = PoliticalLedger::new();
        ledger.add("  Blackstone ", 5);
        assert_eq!(ledger.get("blackstone"), 5);
        ledger.add("BLACKSTONE", 5);
        assert_eq!(ledger.get("Blackstone"), 10);
    }

    #[test]
    fn scores_clamp_at_bound() {
        let mut ledger = PoliticalLedger::new();
        ledger.add("a", 90);
        ledger.add("a", 25);
        assert_eq!(ledger.get("a"), CAPITAL_BOUND);
        ledger.add("b", -90);
        ledger.add("b", -25);
        assert_eq!(ledger.get("b"), -CAPITAL_BOUND);
    }

    #[test]
    fn empty_name_falls_back_to_stable_key() {
        let mut ledger = PoliticalLedger::new();
        ledger.add("   ", 5);
        assert_eq!(ledger.get(""), 5);
        assert_eq!(ledger.get(UNKNOWN_FACTION), 5);
    }

    #[test]
    fn split_targets_on_conjunction() {
        assert_eq!(
            split_targets("Blackstone & Rowthorn"),
            vec!["Blackstone", "Rowthorn"]
        );
        assert_eq!(split_targets("Blackstone"), vec!["Blackstone"]);
        assert_eq!(split_targets(" & Rowthorn"), vec!["Rowthorn"]);
    }
}
