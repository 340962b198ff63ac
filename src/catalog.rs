//! Static facility and function definitions.
//!
//! The tracker normally loads these from data files; the crate ships a
//! built-in catalog and the types derive `Deserialize` so an external file
//! can replace it without code changes. The engine treats the catalog as
//! read-only.

use serde::{Deserialize, Serialize};

use crate::model::order::{ActionKind, NetworkUpgradeKind};

/// Special behavior descriptor attached to a function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum SpecialDef {
    /// Queues a diplomatic or economic order resolved by the engine.
    EmissaryAction {
        kind: ActionKind,
        #[serde(default)]
        dc_override: Option<i64>,
        /// Base per-turn income range before the tier multiplier.
        #[serde(default)]
        income_range: Option<(i64, i64)>,
        /// Contract duration in turns before the tier adjustment.
        #[serde(default)]
        contract_turns: Option<u32>,
    },
    /// Raises the owning facility's level by one on completion.
    UpgradeFacility {
        /// Cost to reach level 2, then level 3.
        cost_by_level: Vec<i64>,
    },
    /// Small randomized treasury grant plus a log line.
    FavourBlessing {
        #[serde(default)]
        grant_range: Option<(i64, i64)>,
    },
    /// Narrative-only specials: a log line on completion.
    OracleHint,
    BlessingRest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionOption {
    pub label: String,
    #[serde(default)]
    pub cost_gp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub cost_gp: i64,
    #[serde(default)]
    pub options: Vec<FunctionOption>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub special: Option<SpecialDef>,
}

impl FunctionDef {
    /// Effective cost: a chosen option with its own cost wins over the
    /// function's base cost.
    pub fn cost_for(&self, option_index: Option<usize>) -> i64 {
        option_index
            .and_then(|idx| self.options.get(idx))
            .and_then(|opt| opt.cost_gp)
            .unwrap_or(self.cost_gp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub required_level: u32,
    #[serde(default = "FacilityDef::default_max_level")]
    pub max_level: u32,
    #[serde(default)]
    pub functions: Vec<FunctionDef>,
}

impl FacilityDef {
    fn default_max_level() -> u32 {
        crate::model::MAX_FACILITY_LEVEL
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub facilities: Vec<FacilityDef>,
}

impl Catalog {
    pub fn facility(&self, facility_id: &str) -> Option<&FacilityDef> {
        self.facilities.iter().find(|f| f.id == facility_id)
    }

    pub fn function(&self, facility_id: &str, function_id: &str) -> Option<&FunctionDef> {
        self.facility(facility_id)?
            .functions
            .iter()
            .find(|f| f.id == function_id)
    }

    /// Turns until an order of this kind matures. Higher facility levels
    /// shave turns off, floored at 1.
    pub fn order_duration(&self, kind: ActionKind, facility_level: u32) -> u32 {
        let base: u32 = match kind {
            ActionKind::TradeAgreement | ActionKind::Arbitration | ActionKind::Summit => 2,
            ActionKind::Consortium => 3,
            ActionKind::HostDelegation => 1,
            ActionKind::UpgradeFacility => 2,
            ActionKind::NetworkUpgrade(_) => 1,
        };
        base.saturating_sub(facility_level.saturating_sub(1)).max(1)
    }

    /// Default per-turn income range for kinds that create contracts.
    pub fn default_income_range(kind: ActionKind) -> (i64, i64) {
        match kind {
            ActionKind::TradeAgreement => (40, 80),
            ActionKind::Arbitration => (50, 90),
            ActionKind::Consortium => (60, 120),
            ActionKind::HostDelegation => (80, 140),
            _ => (0, 0),
        }
    }

    /// Default contract duration before tier adjustment.
    pub fn default_contract_turns(kind: ActionKind) -> u32 {
        match kind {
            ActionKind::TradeAgreement => 6,
            ActionKind::Arbitration => 5,
            ActionKind::Consortium => 8,
            ActionKind::Summit => 4,
            ActionKind::HostDelegation => 3,
            _ => 0,
        }
    }

    /// The catalog the tracker ships with.
    pub fn builtin() -> Self {
        let emissary = |kind: ActionKind, cost_gp: i64| FunctionDef {
            id: kind.key().to_string(),
            label: match kind {
                ActionKind::TradeAgreement => "Negotiate Trade Agreement",
                ActionKind::Arbitration => "Offer Arbitration",
                ActionKind::Summit => "Convene Summit",
                ActionKind::HostDelegation => "Host Delegation",
                ActionKind::Consortium => "Charter Trade Consortium",
                _ => unreachable!("emissary helper only covers diplomatic kinds"),
            }
            .to_string(),
            cost_gp,
            options: Vec::new(),
            notes: None,
            special: Some(SpecialDef::EmissaryAction {
                kind,
                dc_override: None,
                income_range: None,
                contract_turns: None,
            }),
        };

        let upgrade = |cost_by_level: Vec<i64>| FunctionDef {
            id: "upgrade".to_string(),
            label: "Upgrade Facility".to_string(),
            cost_gp: 0,
            options: Vec::new(),
            notes: None,
            special: Some(SpecialDef::UpgradeFacility { cost_by_level }),
        };

        let network_upgrade = |kind: NetworkUpgradeKind, label: &str, cost_gp: i64| FunctionDef {
            id: ActionKind::NetworkUpgrade(kind).key().to_string(),
            label: label.to_string(),
            cost_gp,
            options: Vec::new(),
            notes: None,
            special: Some(SpecialDef::EmissaryAction {
                kind: ActionKind::NetworkUpgrade(kind),
                dc_override: None,
                income_range: None,
                contract_turns: None,
            }),
        };

        Catalog {
            facilities: vec![
                FacilityDef {
                    id: "envoys_hall".to_string(),
                    name: "Envoy's Hall".to_string(),
                    required_level: 5,
                    max_level: 3,
                    functions: vec![
                        emissary(ActionKind::TradeAgreement, 150),
                        emissary(ActionKind::Summit, 200),
                        emissary(ActionKind::HostDelegation, 100),
                        emissary(ActionKind::Arbitration, 175),
                        emissary(ActionKind::Consortium, 300),
                        upgrade(vec![500, 1200]),
                    ],
                },
                FacilityDef {
                    id: "trade_hall".to_string(),
                    name: "Trade Hall".to_string(),
                    required_level: 9,
                    max_level: 3,
                    functions: vec![
                        network_upgrade(
                            NetworkUpgradeKind::Stability,
                            "Invest in Route Stability",
                            250,
                        ),
                        network_upgrade(NetworkUpgradeKind::Yield, "Invest in Route Yield", 250),
                        network_upgrade(
                            NetworkUpgradeKind::ToggleHighRisk,
                            "Toggle High-Risk Routing",
                            0,
                        ),
                        upgrade(vec![600, 1500]),
                    ],
                },
                FacilityDef {
                    id: "shrine".to_string(),
                    name: "Shrine".to_string(),
                    required_level: 5,
                    max_level: 3,
                    functions: vec![
                        FunctionDef {
                            id: "favour".to_string(),
                            label: "Seek Favour".to_string(),
                            cost_gp: 50,
                            options: Vec::new(),
                            notes: None,
                            special: Some(SpecialDef::FavourBlessing {
                                grant_range: Some((10, 60)),
                            }),
                        },
                        FunctionDef {
                            id: "rest".to_string(),
                            label: "Blessing of Rest".to_string(),
                            cost_gp: 0,
                            options: Vec::new(),
                            notes: None,
                            special: Some(SpecialDef::BlessingRest),
                        },
                    ],
                },
                FacilityDef {
                    id: "observatory".to_string(),
                    name: "Observatory".to_string(),
                    required_level: 13,
                    max_level: 3,
                    functions: vec![FunctionDef {
                        id: "oracle".to_string(),
                        label: "Consult the Oracle".to_string(),
                        cost_gp: 100,
                        options: Vec::new(),
                        notes: None,
                        special: Some(SpecialDef::OracleHint),
                    }],
                },
                FacilityDef {
                    id: "workshop".to_string(),
                    name: "Workshop".to_string(),
                    required_level: 5,
                    max_level: 3,
                    functions: vec![FunctionDef {
                        id: "craft".to_string(),
                        label: "Craft Goods".to_string(),
                        cost_gp: 30,
                        options: vec![
                            FunctionOption {
                                label: "Travel rations".to_string(),
                                cost_gp: Some(20),
                            },
                            FunctionOption {
                                label: "Iron fittings".to_string(),
                                cost_gp: Some(45),
                            },
                            FunctionOption {
                                label: "Waxed rope".to_string(),
                                cost_gp: Some(25),
                            },
                        ],
                        notes: Some("Crafted goods land in the warehouse.".to_string()),
                        special: None,
                    }],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_all_emissary_kinds() {
        let catalog = Catalog::builtin();
        for kind in [
            ActionKind::TradeAgreement,
            ActionKind::Summit,
            ActionKind::HostDelegation,
            ActionKind::Arbitration,
            ActionKind::Consortium,
        ] {
            assert!(
                catalog.function("envoys_hall", kind.key()).is_some(),
                "missing {kind}"
            );
        }
    }

    #[test]
    fn option_cost_wins_over_function_cost() {
        let catalog = Catalog::builtin();
        let craft = catalog.function("workshop", "craft").unwrap();
        assert_eq!(craft.cost_for(None), 30);
        assert_eq!(craft.cost_for(Some(1)), 45);
        // Out-of-range option index falls back to the base cost.
        assert_eq!(craft.cost_for(Some(9)), 30);
    }

    #[test]
    fn order_duration_shrinks_with_level_but_floors_at_one() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.order_duration(ActionKind::Consortium, 1), 3);
        assert_eq!(catalog.order_duration(ActionKind::Consortium, 2), 2);
        assert_eq!(catalog.order_duration(ActionKind::Consortium, 3), 1);
        assert_eq!(catalog.order_duration(ActionKind::TradeAgreement, 3), 1);
    }

    #[test]
    fn catalog_round_trips_through_json() {
        let catalog = Catalog::builtin();
        let json = serde_json::to_string(&catalog).unwrap();
        let restored: Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.facilities, catalog.facilities);
    }
}
