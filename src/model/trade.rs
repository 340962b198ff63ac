//! Trade network: derived state opened by a successful consortium.

use serde::{Deserialize, Serialize};

pub const STABILITY_MAX: i64 = 100;
pub const YIELD_BONUS_MAX: i64 = 200;
pub const STABILITY_INVESTMENT_STEP: i64 = 10;
pub const YIELD_INVESTMENT_STEP: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Difficulty class a route of this tier must hold against each turn.
    pub fn stability_dc(self) -> i64 {
        match self {
            RiskTier::Low => 8,
            RiskTier::Medium => 11,
            RiskTier::High => 14,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    Active,
    Disrupted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRoute {
    pub id: u64,
    /// Normalized faction name; at most one route per faction.
    pub faction: String,
    pub commodity: String,
    pub risk: RiskTier,
    /// Seeded from the consortium contract's rolled income, never re-rolled.
    pub yield_per_turn: i64,
    pub stability_dc: i64,
    pub status: RouteStatus,
}

/// Singleton network state. `active` stays false until the first
/// consortium succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeNetwork {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub strategy: String,
    /// Percentage [0, 100].
    #[serde(default)]
    pub stability: i64,
    /// Percentage [0, 200].
    #[serde(default)]
    pub yield_bonus: i64,
    #[serde(default)]
    pub high_risk_routing: bool,
    #[serde(default)]
    pub last_resolved_turn: u32,
    #[serde(default)]
    pub routes: Vec<TradeRoute>,
}

impl Default for TradeNetwork {
    fn default() -> Self {
        Self {
            active: false,
            strategy: String::new(),
            stability: 50,
            yield_bonus: 0,
            high_risk_routing: false,
            last_resolved_turn: 0,
            routes: Vec::new(),
        }
    }
}

impl TradeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route_for(&self, faction: &str) -> Option<&TradeRoute> {
        let key = faction.trim().to_lowercase();
        self.routes.iter().find(|r| r.faction == key)
    }

    /// Open a route for a faction. Idempotent: if a route for the
    /// normalized name already exists, it is left untouched and `false`
    /// is returned.
    pub fn open_route(
        &mut self,
        id: u64,
        faction: &str,
        commodity: &str,
        risk: RiskTier,
        yield_per_turn: i64,
    ) -> bool {
        let key = faction.trim().to_lowercase();
        if key.is_empty() || self.routes.iter().any(|r| r.faction == key) {
            return false;
        }
        self.routes.push(TradeRoute {
            id,
            faction: key,
            commodity: commodity.to_string(),
            risk,
            yield_per_turn: yield_per_turn.max(0),
            stability_dc: risk.stability_dc(),
            status: RouteStatus::Active,
        });
        true
    }

    pub fn apply_stability_investment(&mut self, delta: i64) {
        self.stability = (self.stability + delta).clamp(0, STABILITY_MAX);
    }

    pub fn apply_yield_investment(&mut self, delta: i64) {
        self.yield_bonus = (self.yield_bonus + delta).clamp(0, YIELD_BONUS_MAX);
    }

    pub fn toggle_high_risk(&mut self) -> bool {
        self.high_risk_routing = !self.high_risk_routing;
        self.high_risk_routing
    }
}
