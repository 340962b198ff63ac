//! Delayed-effect order tickets.
//!
//! An `Order` is created when the player commits a facility function. Its
//! gold cost is deducted at issue time; the order then sits in the queue
//! until the current turn reaches its maturation turn, at which point the
//! resolution engine consumes it exactly once.

use serde::{Deserialize, Serialize};

/// The negotiation posture for a delegation visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Conciliatory,
    Assertive,
    Opportunistic,
}

impl Tone {
    /// Modifier applied to both delegation checks.
    pub fn check_modifier(self) -> i64 {
        match self {
            Tone::Conciliatory => 2,
            Tone::Assertive => 0,
            Tone::Opportunistic => -2,
        }
    }

    /// Scale factor on the delegation gold reward.
    pub fn reward_factor(self) -> f64 {
        match self {
            Tone::Conciliatory => 0.85,
            Tone::Assertive => 1.0,
            Tone::Opportunistic => 1.15,
        }
    }
}

/// Deterministic trade-network investment channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkUpgradeKind {
    Stability,
    Yield,
    ToggleHighRisk,
}

/// Every action the resolution engine knows how to resolve.
///
/// This is a closed set: new kinds require engine changes, there is no
/// plugin mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    TradeAgreement,
    Arbitration,
    Summit,
    HostDelegation,
    Consortium,
    UpgradeFacility,
    NetworkUpgrade(NetworkUpgradeKind),
}

impl ActionKind {
    /// Stable string key, used for cooldown bookkeeping and log lines.
    pub fn key(self) -> &'static str {
        match self {
            ActionKind::TradeAgreement => "trade_agreement",
            ActionKind::Arbitration => "arbitration",
            ActionKind::Summit => "summit",
            ActionKind::HostDelegation => "host_delegation",
            ActionKind::Consortium => "consortium",
            ActionKind::UpgradeFacility => "upgrade_facility",
            ActionKind::NetworkUpgrade(NetworkUpgradeKind::Stability) => "network_stability",
            ActionKind::NetworkUpgrade(NetworkUpgradeKind::Yield) => "network_yield",
            ActionKind::NetworkUpgrade(NetworkUpgradeKind::ToggleHighRisk) => {
                "network_toggle_high_risk"
            }
        }
    }

    /// Kinds that roll against a DC and can therefore land on a cooldown.
    pub fn is_diplomatic(self) -> bool {
        matches!(
            self,
            ActionKind::TradeAgreement
                | ActionKind::Arbitration
                | ActionKind::Summit
                | ActionKind::Consortium
        )
    }

    /// Default difficulty class, before any catalog override.
    pub fn base_dc(self) -> Option<i64> {
        match self {
            ActionKind::TradeAgreement => Some(14),
            ActionKind::Arbitration => Some(15),
            ActionKind::Summit => Some(14),
            ActionKind::Consortium => Some(16),
            // host_delegation rolls two independent checks, see the engine
            ActionKind::HostDelegation => None,
            ActionKind::UpgradeFacility | ActionKind::NetworkUpgrade(_) => None,
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Structured order metadata. The original tracker stuffed these into an
/// untyped map; here they are explicit fields, all optional because only
/// emissary actions carry them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderMeta {
    #[serde(default)]
    pub kind: Option<ActionKind>,
    #[serde(default)]
    pub tone: Option<Tone>,
    /// Target faction name, or a pair joined by " & " for summits.
    #[serde(default)]
    pub target: Option<String>,
}

/// A committed, in-progress action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub facility: String,
    pub function: String,
    #[serde(default)]
    pub option_index: Option<usize>,
    #[serde(default)]
    pub option_label: Option<String>,
    pub label: String,
    /// Already deducted from the treasury at issue time.
    pub cost_gp: i64,
    pub issued_turn: u32,
    pub matures_turn: u32,
    #[serde(default)]
    pub meta: OrderMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_modifiers() {
        assert_eq!(Tone::Conciliatory.check_modifier(), 2);
        assert_eq!(Tone::Assertive.check_modifier(), 0);
        assert_eq!(Tone::Opportunistic.check_modifier(), -2);
    }

    #[test]
    fn diplomatic_kinds_roll_against_a_dc() {
        for kind in [
            ActionKind::TradeAgreement,
            ActionKind::Arbitration,
            ActionKind::Summit,
            ActionKind::Consortium,
        ] {
            assert!(kind.is_diplomatic());
            assert!(kind.base_dc().is_some(), "{kind} should have a DC");
        }
        assert!(!ActionKind::HostDelegation.is_diplomatic());
        assert!(!ActionKind::UpgradeFacility.is_diplomatic());
    }

    #[test]
    fn keys_are_stable() {
        assert_eq!(ActionKind::TradeAgreement.key(), "trade_agreement");
        assert_eq!(
            ActionKind::NetworkUpgrade(NetworkUpgradeKind::ToggleHighRisk).key(),
            "network_toggle_high_risk"
        );
    }

    #[test]
    fn order_deserializes_without_meta() {
        // Older saves predate the meta block entirely.
        let json = r#"{
            "id": 7, "facility": "envoys_hall", "function": "trade_agreement",
            "label": "Envoy's Hall: Negotiate Trade Agreement",
            "cost_gp": 150, "issued_turn": 3, "matures_turn": 5
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert!(order.meta.kind.is_none());
        assert!(order.option_label.is_none());
    }
}
