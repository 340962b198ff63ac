//! The whole application state, passed by reference into every engine
//! operation. Constructed at startup or load, mutated only through the
//! engine, serialized wholesale on save.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cooldown::CooldownRegistry;
use super::garrison::Defenders;
use super::inventory::StoredItem;
use super::ledger::PoliticalLedger;
use super::log::ActivityLog;
use super::order::Order;
use super::records::RecordBook;
use super::trade::TradeNetwork;
use crate::id::IdGenerator;

pub const MIN_PARTY_LEVEL: u32 = 1;
pub const MAX_PARTY_LEVEL: u32 = 20;
pub const MAX_FACILITY_LEVEL: u32 = 3;

fn default_party_level() -> u32 {
    7
}

fn default_turn() -> u32 {
    1
}

/// Result of the most recent bastion event roll, kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastEvent {
    pub roll: i64,
    pub name: String,
    #[serde(default)]
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BastionState {
    #[serde(default)]
    pub treasury_gp: i64,
    #[serde(default = "default_party_level")]
    pub party_level: u32,
    #[serde(default = "default_turn")]
    pub turn: u32,
    #[serde(default)]
    pub defenders: Defenders,
    #[serde(default)]
    pub military: Vec<StoredItem>,
    #[serde(default)]
    pub warehouse: Vec<StoredItem>,
    /// Facility id -> current level (1..=3). Absent means level 1.
    #[serde(default)]
    pub facility_levels: BTreeMap<String, u32>,
    #[serde(default)]
    pub ledger: PoliticalLedger,
    #[serde(default)]
    pub cooldowns: CooldownRegistry,
    /// Pending orders in issuance order.
    #[serde(default)]
    pub orders: Vec<Order>,
    /// Indexed singleton flag: at most one trade-network upgrade order may
    /// be pending system-wide. Checked before enqueue, not by scanning.
    #[serde(default)]
    pub network_upgrade_pending: bool,
    #[serde(default)]
    pub records: RecordBook,
    #[serde(default)]
    pub trade_network: TradeNetwork,
    #[serde(default)]
    pub last_event: Option<LastEvent>,
    #[serde(default)]
    pub log: ActivityLog,
    #[serde(default)]
    pub id_gen: IdGenerator,
}

impl Default for BastionState {
    fn default() -> Self {
        Self::new()
    }
}

impl BastionState {
    pub fn new() -> Self {
        Self {
            treasury_gp: 0,
            party_level: default_party_level(),
            turn: default_turn(),
            defenders: Defenders::default(),
            military: Vec::new(),
            warehouse: Vec::new(),
            facility_levels: BTreeMap::new(),
            ledger: PoliticalLedger::new(),
            cooldowns: CooldownRegistry::new(),
            orders: Vec::new(),
            network_upgrade_pending: false,
            records: RecordBook::new(),
            trade_network: TradeNetwork::new(),
            last_event: None,
            log: ActivityLog::new(),
            id_gen: IdGenerator::new(),
        }
    }

    /// A hand-edited save can hold a 0; levels read as at least 1.
    pub fn facility_level(&self, facility: &str) -> u32 {
        self.facility_levels
            .get(facility)
            .copied()
            .unwrap_or(1)
            .max(1)
    }

    pub fn set_party_level(&mut self, level: u32) {
        self.party_level = level.clamp(MIN_PARTY_LEVEL, MAX_PARTY_LEVEL);
    }

    /// Treasury never goes negative.
    pub fn credit_gp(&mut self, amount: i64) {
        self.treasury_gp = (self.treasury_gp + amount).max(0);
    }

    pub fn debit_gp(&mut self, amount: i64) {
        self.treasury_gp = (self.treasury_gp - amount).max(0);
    }

    pub fn can_afford(&self, cost_gp: i64) -> bool {
        cost_gp <= self.treasury_gp
    }

    /// Remove and return every order maturing exactly on `turn`, preserving
    /// issuance order. Equality is the documented policy: turns advance by
    /// one, so a range match would only mask a driver bug.
    pub fn drain_matured(&mut self, turn: u32) -> Vec<Order> {
        let mut matured = Vec::new();
        self.orders.retain(|order| {
            if order.matures_turn == turn {
                matured.push(order.clone());
                false
            } else {
                true
            }
        });
        matured
    }

    pub fn log(&mut self, category: &str, message: impl Into<String>) {
        let turn = self.turn;
        self.log.log(turn, category, message);
    }
}
