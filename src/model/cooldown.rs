//! Per-action-kind turn lockouts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::order::ActionKind;

/// Turns an action kind stays locked after a bad-failure outcome.
pub const BAD_FAILURE_COOLDOWN: u32 = 2;

/// Mapping from action-kind key to remaining turns until it can be
/// attempted again. A missing entry means available; `tick` purges zeroed
/// entries as hygiene, but `turns_left` treats missing as 0 either way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CooldownRegistry {
    remaining: BTreeMap<String, u32>,
}

impl CooldownRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns_left(&self, kind: ActionKind) -> u32 {
        self.remaining.get(kind.key()).copied().unwrap_or(0)
    }

    /// Overwrites any existing value. Last-write-wins is intentional: only
    /// bad failures set cooldowns, and a locked kind cannot be re-attempted
    /// until the lock clears.
    pub fn set_cooldown(&mut self, kind: ActionKind, turns: u32) {
        self.remaining.insert(kind.key().to_string(), turns);
    }

    /// Called once per turn advance.
    pub fn tick(&mut self) {
        for turns in self.remaining.values_mut() {
            *turns = turns.saturating_sub(1);
        }
        self.remaining.retain(|_, turns| *turns > 0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.remaining.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_kind_is_available() {
        let cooldowns = CooldownRegistry::new();
        assert_eq!(cooldowns.turns_left(ActionKind::Summit), 0);
    }

    #[test]
    fn counts_down_to_zero_and_stays() {
        let mut cooldowns = CooldownRegistry::new();
        cooldowns.set_cooldown(ActionKind::Summit, 2);
        assert_eq!(cooldowns.turns_left(ActionKind::Summit), 2);
        cooldowns.tick();
        assert_eq!(cooldowns.turns_left(ActionKind::Summit), 1);
        cooldowns.tick();
        assert_eq!(cooldowns.turns_left(ActionKind::Summit), 0);
        cooldowns.tick();
        assert_eq!(cooldowns.turns_left(ActionKind::Summit), 0);
    }

    #[test]
    fn set_overwrites_rather_than_stacks() {
        let mut cooldowns = CooldownRegistry::new();
        cooldowns.set_cooldown(ActionKind::Arbitration, 2);
        cooldowns.set_cooldown(ActionKind::Arbitration, 1);
        assert_eq!(cooldowns.turns_left(ActionKind::Arbitration), 1);
    }

    #[test]
    fn zeroed_entries_are_purged() {
        let mut cooldowns = CooldownRegistry::new();
        cooldowns.set_cooldown(ActionKind::Consortium, 1);
        cooldowns.tick();
        assert_eq!(cooldowns.iter().count(), 0);
    }
}
