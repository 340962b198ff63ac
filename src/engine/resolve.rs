//! The action resolution engine.
//!
//! Consumes one matured order, collects whatever die rolls it needs from
//! the blocking input provider, maps them to an outcome tier, and applies
//! the consequences. All rolls are gathered **before** any state mutation,
//! so a cancelled prompt aborts the whole resolution with the ledger,
//! cooldowns, and records untouched.

use rand::RngCore;
use serde::Serialize;

use crate::catalog::{Catalog, SpecialDef};
use crate::engine::dice::{random_int_in_range, roll_die};
use crate::engine::tier::{OutcomeTier, TierEffects, resolve_tier, tier_effects};
use crate::model::cooldown::BAD_FAILURE_COOLDOWN;
use crate::model::inventory::append_item;
use crate::model::ledger::split_targets;
use crate::model::order::{ActionKind, NetworkUpgradeKind, Order, Tone};
use crate::model::records::{DiplomaticRecord, RecordPayload};
use crate::model::state::BastionState;
use crate::model::trade::{
    RiskTier, STABILITY_INVESTMENT_STEP, YIELD_INVESTMENT_STEP,
};

/// Host-delegation check DCs. The two checks are independent; the shared
/// modifier comes from the envoy bonus plus the chosen tone.
const DELEGATION_DIPLOMACY_DC: i64 = 13;
const DELEGATION_INSIGHT_DC: i64 = 12;

/// Base cost-reduction a summit accord grants, before tier adjustment.
const SUMMIT_BASE_REDUCTION_PCT: i64 = 25;

const ROUTE_COMMODITIES: &[&str] = &["iron", "grain", "silk", "timber", "salt", "dye"];

/// What the engine needs answered before it can continue a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollRequest {
    pub label: String,
    pub modifier: i64,
    pub dc: i64,
}

/// A player-entered die result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DieRoll {
    pub natural: i64,
    pub total: i64,
}

/// Blocking input provider. Returning `None` means the prompt was
/// dismissed; the engine aborts the resolution before mutating anything.
/// The turn driver guarantees at most one resolution (and therefore one
/// outstanding prompt) at a time.
pub trait RollPrompt {
    fn prompt(&mut self, request: &RollRequest) -> Option<DieRoll>;
}

/// Rolls a d20 itself instead of asking the player. Used for headless
/// runs and tests.
pub struct AutoRoller<R: RngCore> {
    rng: R,
}

impl<R: RngCore> AutoRoller<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore> RollPrompt for AutoRoller<R> {
    fn prompt(&mut self, request: &RollRequest) -> Option<DieRoll> {
        let natural = roll_die(&mut self.rng, 20);
        Some(DieRoll {
            natural,
            total: natural + request.modifier,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckDetail {
    pub name: String,
    pub natural: i64,
    pub modifier: i64,
    pub total: i64,
    pub dc: i64,
}

/// The ephemeral result of one completed resolution. Produced fresh each
/// time, persisted only through the activity log.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionOutcome {
    pub order_id: u64,
    pub label: String,
    pub tier: Option<OutcomeTier>,
    pub checks: Vec<CheckDetail>,
    pub narrative: Vec<String>,
    /// Human-readable descriptions of every applied state change.
    pub changes: Vec<String>,
}

/// Terminal disposition of one matured order.
#[derive(Debug, Clone, Serialize)]
pub enum Resolution {
    Completed(ResolutionOutcome),
    /// Cooldown gate: no roll was made and nothing changed. The order is
    /// voided without refund.
    Blocked {
        order_id: u64,
        kind: ActionKind,
        turns_left: u32,
    },
    /// A prompt was dismissed; the order is dropped with no mutation.
    Cancelled { order_id: u64, label: String },
    /// The order's facility or function no longer resolves; completes
    /// with no effect rather than failing the drain batch.
    NoOp { order_id: u64, label: String },
}

/// Resolve one matured order. The order has already been removed from the
/// queue; whatever happens here is its final disposition.
pub fn resolve_order(
    state: &mut BastionState,
    catalog: &Catalog,
    rng: &mut dyn RngCore,
    roller: &mut dyn RollPrompt,
    order: Order,
) -> Resolution {
    // The singleton channel frees up however this order ends.
    if matches!(order.meta.kind, Some(ActionKind::NetworkUpgrade(_))) {
        state.network_upgrade_pending = false;
    }

    let Some(function) = catalog.function(&order.facility, &order.function) else {
        tracing::warn!(
            facility = order.facility,
            function = order.function,
            "order references unknown definition; completing with no effect"
        );
        state.log("Order", format!("{}: completed (no effect).", order.label));
        return Resolution::NoOp {
            order_id: order.id,
            label: order.label,
        };
    };

    // Hard gate: a kind on cooldown is refused before any roll. The cost
    // is not refunded.
    if let Some(kind) = order.meta.kind {
        let turns_left = state.cooldowns.turns_left(kind);
        if kind.is_diplomatic() && turns_left > 0 {
            state.log(
                "Blocked",
                format!(
                    "{}: refused, {kind} is locked for {turns_left} more turn(s).",
                    order.label
                ),
            );
            return Resolution::Blocked {
                order_id: order.id,
                kind,
                turns_left,
            };
        }
    }

    match order.meta.kind {
        Some(kind @ (ActionKind::TradeAgreement | ActionKind::Arbitration | ActionKind::Consortium)) => {
            resolve_contract(state, catalog, rng, roller, order, kind, function.special.as_ref())
        }
        Some(ActionKind::Summit) => {
            resolve_summit(state, rng, roller, order, function.special.as_ref())
        }
        Some(ActionKind::HostDelegation) => {
            resolve_delegation(state, rng, roller, order, function.special.as_ref())
        }
        Some(ActionKind::UpgradeFacility) => resolve_upgrade(state, catalog, order),
        Some(ActionKind::NetworkUpgrade(which)) => resolve_network_upgrade(state, order, which),
        None => resolve_plain(state, rng, order, function.special.as_ref()),
    }
}

/// Shared check bonus: steadier parties and better facilities negotiate
/// harder.
fn envoy_modifier(state: &BastionState, facility: &str) -> i64 {
    i64::from(state.party_level) / 3 + i64::from(state.facility_level(facility)) - 1
}

fn emissary_params(
    special: Option<&SpecialDef>,
    kind: ActionKind,
) -> (i64, (i64, i64), u32) {
    let mut dc = kind.base_dc().unwrap_or(10);
    let mut income = Catalog::default_income_range(kind);
    let mut turns = Catalog::default_contract_turns(kind);
    if let Some(SpecialDef::EmissaryAction {
        dc_override,
        income_range,
        contract_turns,
        ..
    }) = special
    {
        if let Some(over) = dc_override {
            dc = *over;
        }
        if let Some(range) = income_range {
            income = *range;
        }
        if let Some(t) = contract_turns {
            turns = *t;
        }
    }
    (dc, income, turns)
}

fn contract_turns_for(base: u32, effects: &TierEffects) -> u32 {
    let adjusted = i64::from(base) + effects.duration_adjust;
    adjusted.max(1) as u32
}

/// The generic contract family: trade_agreement, arbitration, consortium.
fn resolve_contract(
    state: &mut BastionState,
    _catalog: &Catalog,
    rng: &mut dyn RngCore,
    roller: &mut dyn RollPrompt,
    order: Order,
    kind: ActionKind,
    special: Option<&SpecialDef>,
) -> Resolution {
    let (dc, income_range, base_turns) = emissary_params(special, kind);
    let modifier = envoy_modifier(state, &order.facility);
    let target = order.meta.target.clone().unwrap_or_default();

    let request = RollRequest {
        label: order.label.clone(),
        modifier,
        dc,
    };
    let Some(roll) = roller.prompt(&request) else {
        return cancel(state, order);
    };

    let tier = resolve_tier(roll.natural, roll.total, dc);
    let effects = tier_effects(tier);
    let base_income = random_int_in_range(rng, income_range.0, income_range.1);
    let income = (base_income as f64 * effects.income_multiplier).round() as i64;

    let mut narrative = vec![format!(
        "{}: rolled {} + {} = {} vs DC {} — {}.",
        order.label, roll.natural, modifier, roll.total, dc, tier
    )];
    let mut changes = Vec::new();

    for faction in split_targets(&target) {
        let score = state.ledger.add(faction, effects.capital_delta);
        changes.push(format!(
            "{faction}: political capital {:+} (now {score})",
            effects.capital_delta
        ));
    }

    if effects.income_multiplier > 0.0 {
        let turns = contract_turns_for(base_turns, &effects);
        let payload = match kind {
            ActionKind::TradeAgreement => RecordPayload::Agreement {
                income_per_turn: income,
            },
            ActionKind::Arbitration => RecordPayload::Arbitration {
                income_per_turn: income,
            },
            _ => RecordPayload::Consortium {
                income_per_turn: income,
            },
        };
        let record = DiplomaticRecord {
            id: state.id_gen.next_id(),
            title: format!("{} — {target}", order.label),
            targets: split_targets(&target)
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
            remaining_turns: turns,
            payload,
        };
        state.records.insert(record);
        changes.push(format!("contract: {income}gp/turn for {turns} turns"));

        append_item(
            &mut state.warehouse,
            &format!("{} charter", kind.key().replace('_', " ")),
            1,
            None,
            Some(&target),
            &order.facility,
        );

        if kind == ActionKind::Consortium {
            open_consortium_routes(state, rng, &target, income, &mut changes);
        }
    } else {
        narrative.push("No contract was signed.".to_string());
        if tier == OutcomeTier::BadFailure {
            state.cooldowns.set_cooldown(kind, BAD_FAILURE_COOLDOWN);
            changes.push(format!(
                "{kind} locked for {BAD_FAILURE_COOLDOWN} turns"
            ));
        }
    }

    finish(
        state,
        order,
        Some(tier),
        vec![CheckDetail {
            name: "negotiation".to_string(),
            natural: roll.natural,
            modifier,
            total: roll.total,
            dc,
        }],
        narrative,
        changes,
    )
}

fn open_consortium_routes(
    state: &mut BastionState,
    rng: &mut dyn RngCore,
    target: &str,
    income: i64,
    changes: &mut Vec<String>,
) {
    if !state.trade_network.active {
        state.trade_network.active = true;
        state.trade_network.strategy = "chartered consortium".to_string();
        changes.push("trade network established".to_string());
    }
    let risk = if state.trade_network.high_risk_routing {
        RiskTier::High
    } else {
        RiskTier::Medium
    };
    for faction in split_targets(target) {
        let commodity =
            ROUTE_COMMODITIES[random_int_in_range(rng, 0, ROUTE_COMMODITIES.len() as i64 - 1) as usize];
        let id = state.id_gen.next_id();
        if state
            .trade_network
            .open_route(id, faction, commodity, risk, income)
        {
            changes.push(format!("route opened: {faction} ({commodity}, {income}gp/turn)"));
        }
    }
}

/// Summits target a pair of factions; the capital delta lands on each.
fn resolve_summit(
    state: &mut BastionState,
    _rng: &mut dyn RngCore,
    roller: &mut dyn RollPrompt,
    order: Order,
    special: Option<&SpecialDef>,
) -> Resolution {
    let (dc, _, base_turns) = emissary_params(special, ActionKind::Summit);
    let modifier = envoy_modifier(state, &order.facility);
    let target = order.meta.target.clone().unwrap_or_default();

    let request = RollRequest {
        label: order.label.clone(),
        modifier,
        dc,
    };
    let Some(roll) = roller.prompt(&request) else {
        return cancel(state, order);
    };

    let tier = resolve_tier(roll.natural, roll.total, dc);
    let effects = tier_effects(tier);

    let mut narrative = vec![format!(
        "{}: rolled {} + {} = {} vs DC {} — {}.",
        order.label, roll.natural, modifier, roll.total, dc, tier
    )];
    let mut changes = Vec::new();

    // Applied once per named faction, independently.
    for faction in split_targets(&target) {
        let score = state.ledger.add(faction, effects.capital_delta);
        changes.push(format!(
            "{faction}: political capital {:+} (now {score})",
            effects.capital_delta
        ));
    }

    if effects.income_multiplier > 0.0 {
        let adjust = match tier {
            OutcomeTier::Failure => -10,
            OutcomeTier::Success => 0,
            OutcomeTier::GreatSuccess => 10,
            OutcomeTier::CriticalSuccess => 20,
            OutcomeTier::BadFailure => 0,
        };
        let reduction = (SUMMIT_BASE_REDUCTION_PCT + adjust).clamp(0, 90);
        let turns = contract_turns_for(base_turns, &effects);
        state.records.insert(DiplomaticRecord {
            id: state.id_gen.next_id(),
            title: format!("Summit — {target}"),
            targets: split_targets(&target)
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
            remaining_turns: turns,
            payload: RecordPayload::Summit {
                cost_reduction_pct: reduction,
            },
        });
        changes.push(format!("summit accord: {reduction}% off outreach for {turns} turns"));
    } else {
        narrative.push("The summit dissolved without accord.".to_string());
        state
            .cooldowns
            .set_cooldown(ActionKind::Summit, BAD_FAILURE_COOLDOWN);
        changes.push(format!("summit locked for {BAD_FAILURE_COOLDOWN} turns"));
    }

    finish(
        state,
        order,
        Some(tier),
        vec![CheckDetail {
            name: "mediation".to_string(),
            natural: roll.natural,
            modifier,
            total: roll.total,
            dc,
        }],
        narrative,
        changes,
    )
}

/// The only two-roll kind. Both rolls are collected before any mutation;
/// cancelling either aborts the whole resolution.
fn resolve_delegation(
    state: &mut BastionState,
    rng: &mut dyn RngCore,
    roller: &mut dyn RollPrompt,
    order: Order,
    special: Option<&SpecialDef>,
) -> Resolution {
    let (_, reward_range, base_turns) = emissary_params(special, ActionKind::HostDelegation);
    let tone = order.meta.tone.unwrap_or(Tone::Assertive);
    let modifier = envoy_modifier(state, &order.facility) + tone.check_modifier();
    let target = order.meta.target.clone().unwrap_or_default();

    let diplomacy = RollRequest {
        label: format!("{} — diplomacy", order.label),
        modifier,
        dc: DELEGATION_DIPLOMACY_DC,
    };
    let Some(first) = roller.prompt(&diplomacy) else {
        return cancel(state, order);
    };
    let insight = RollRequest {
        label: format!("{} — insight", order.label),
        modifier,
        dc: DELEGATION_INSIGHT_DC,
    };
    let Some(second) = roller.prompt(&insight) else {
        return cancel(state, order);
    };

    let successes = u32::from(first.total >= DELEGATION_DIPLOMACY_DC)
        + u32::from(second.total >= DELEGATION_INSIGHT_DC);
    // Zero successes but both totals within 2 of their DC reads as a
    // strained-but-salvageable visit, not an insult.
    let weak = successes == 0
        && first.total >= DELEGATION_DIPLOMACY_DC - 2
        && second.total >= DELEGATION_INSIGHT_DC - 2;

    let capital_delta = match successes {
        2 => 10,
        1 => 4,
        _ if weak => 0,
        _ => -12,
    };

    let mut narrative = vec![format!(
        "{}: diplomacy {} vs DC {DELEGATION_DIPLOMACY_DC}, insight {} vs DC {DELEGATION_INSIGHT_DC} ({} success(es){}).",
        order.label,
        first.total,
        second.total,
        successes,
        if weak { ", near miss" } else { "" }
    )];
    let mut changes = Vec::new();

    if capital_delta != 0 {
        for faction in split_targets(&target) {
            let score = state.ledger.add(faction, capital_delta);
            changes.push(format!(
                "{faction}: political capital {capital_delta:+} (now {score})"
            ));
        }
    }

    let avg = (reward_range.0 + reward_range.1) / 2;
    if successes > 0 || weak {
        let reward =
            (random_int_in_range(rng, reward_range.0, reward_range.1) as f64 * tone.reward_factor())
                .round() as i64;
        state.credit_gp(reward);
        changes.push(format!("treasury +{reward}gp in gifts"));
    } else {
        let penalty = avg / 6 + if avg % 6 > 0 { 1 } else { 0 };
        state.debit_gp(penalty);
        narrative.push("The delegation departed offended.".to_string());
        changes.push(format!("treasury -{penalty}gp in reparations"));
    }

    // The visit happened either way; track its duration.
    state.records.insert(DiplomaticRecord {
        id: state.id_gen.next_id(),
        title: format!("Delegation — {target}"),
        targets: split_targets(&target)
            .iter()
            .map(|s| s.to_lowercase())
            .collect(),
        remaining_turns: base_turns,
        payload: RecordPayload::Delegation { tone },
    });

    finish(
        state,
        order,
        None,
        vec![
            CheckDetail {
                name: "diplomacy".to_string(),
                natural: first.natural,
                modifier,
                total: first.total,
                dc: DELEGATION_DIPLOMACY_DC,
            },
            CheckDetail {
                name: "insight".to_string(),
                natural: second.natural,
                modifier,
                total: second.total,
                dc: DELEGATION_INSIGHT_DC,
            },
        ],
        narrative,
        changes,
    )
}

/// Deterministic: +1 facility level if below max.
fn resolve_upgrade(state: &mut BastionState, catalog: &Catalog, order: Order) -> Resolution {
    let max_level = catalog
        .facility(&order.facility)
        .map(|f| f.max_level)
        .unwrap_or(crate::model::MAX_FACILITY_LEVEL);
    let level = state.facility_level(&order.facility);

    let (narrative, changes) = if level >= max_level {
        (
            vec![format!("{}: already at maximum level.", order.label)],
            Vec::new(),
        )
    } else {
        let new_level = level + 1;
        state
            .facility_levels
            .insert(order.facility.clone(), new_level);
        (
            vec![format!("{}: works complete.", order.label)],
            vec![format!("{} is now level {new_level}", order.facility)],
        )
    };

    finish(state, order, None, Vec::new(), narrative, changes)
}

fn resolve_network_upgrade(
    state: &mut BastionState,
    order: Order,
    which: NetworkUpgradeKind,
) -> Resolution {
    let change = match which {
        NetworkUpgradeKind::Stability => {
            state
                .trade_network
                .apply_stability_investment(STABILITY_INVESTMENT_STEP);
            format!("network stability now {}%", state.trade_network.stability)
        }
        NetworkUpgradeKind::Yield => {
            state
                .trade_network
                .apply_yield_investment(YIELD_INVESTMENT_STEP);
            format!("network yield bonus now {}%", state.trade_network.yield_bonus)
        }
        NetworkUpgradeKind::ToggleHighRisk => {
            let on = state.trade_network.toggle_high_risk();
            format!(
                "high-risk routing {}",
                if on { "engaged" } else { "stood down" }
            )
        }
    };

    let narrative = vec![format!("{}: complete.", order.label)];
    finish(state, order, None, Vec::new(), narrative, vec![change])
}

/// Functions without an action kind: favour blessings, oracle hints,
/// rest, plain crafting.
fn resolve_plain(
    state: &mut BastionState,
    rng: &mut dyn RngCore,
    order: Order,
    special: Option<&SpecialDef>,
) -> Resolution {
    let mut narrative = Vec::new();
    let mut changes = Vec::new();

    match special {
        Some(SpecialDef::FavourBlessing { grant_range }) => {
            let (lo, hi) = grant_range.unwrap_or((10, 60));
            let grant = random_int_in_range(rng, lo, hi);
            state.credit_gp(grant);
            narrative.push(format!("{}: the offering is answered.", order.label));
            changes.push(format!("treasury +{grant}gp"));
        }
        Some(SpecialDef::OracleHint) => {
            narrative.push(format!(
                "{}: the oracle speaks in riddles; note the omen.",
                order.label
            ));
        }
        Some(SpecialDef::BlessingRest) => {
            narrative.push(format!(
                "{}: the garrison rests easy this turn.",
                order.label
            ));
        }
        _ => {
            // Crafted or procured goods land in the warehouse.
            if let Some(option_label) = &order.option_label {
                append_item(
                    &mut state.warehouse,
                    option_label,
                    1,
                    None,
                    None,
                    &order.facility,
                );
                narrative.push(format!("{}: completed — {option_label}.", order.label));
                changes.push(format!("warehouse: +1 {option_label}"));
            } else {
                narrative.push(format!("{}: completed.", order.label));
            }
        }
    }

    finish(state, order, None, Vec::new(), narrative, changes)
}

fn cancel(state: &mut BastionState, order: Order) -> Resolution {
    state.log("Cancelled", format!("{}: roll cancelled, order dropped.", order.label));
    Resolution::Cancelled {
        order_id: order.id,
        label: order.label,
    }
}

fn finish(
    state: &mut BastionState,
    order: Order,
    tier: Option<OutcomeTier>,
    checks: Vec<CheckDetail>,
    narrative: Vec<String>,
    changes: Vec<String>,
) -> Resolution {
    for line in &narrative {
        state.log("Resolution", line.clone());
    }
    for line in &changes {
        state.log("Change", line.clone());
    }
    tracing::debug!(order = order.id, ?tier, "order resolved");
    Resolution::Completed(ResolutionOutcome {
        order_id: order.id,
        label: order.label,
        tier,
        checks,
        narrative,
        changes,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::model::order::OrderMeta;

    /// Replays a fixed script of prompt answers.
    struct ScriptedRoller {
        answers: VecDeque<Option<DieRoll>>,
    }

    impl ScriptedRoller {
        fn new(answers: Vec<Option<DieRoll>>) -> Self {
            Self {
                answers: answers.into(),
            }
        }

        fn roll(natural: i64, total: i64) -> Option<DieRoll> {
            Some(DieRoll { natural, total })
        }
    }

    impl RollPrompt for ScriptedRoller {
        fn prompt(&mut self, _request: &RollRequest) -> Option<DieRoll> {
            self.answers.pop_front().unwrap_or(None)
        }
    }

    fn setup() -> (BastionState, Catalog, SmallRng) {
        let mut state = BastionState::new();
        state.party_level = 7;
        state.treasury_gp = 1000;
        (state, Catalog::builtin(), SmallRng::seed_from_u64(42))
    }

    fn emissary_order(state: &mut BastionState, kind: ActionKind, target: &str) -> Order {
        Order {
            id: state.id_gen.next_id(),
            facility: "envoys_hall".to_string(),
            function: kind.key().to_string(),
            option_index: None,
            option_label: None,
            label: format!("Envoy's Hall: {}", kind.key()),
            cost_gp: 150,
            issued_turn: 1,
            matures_turn: 3,
            meta: OrderMeta {
                kind: Some(kind),
                tone: None,
                target: Some(target.to_string()),
            },
        }
    }

    #[test]
    fn critical_success_creates_contract_and_capital() {
        let (mut state, catalog, mut rng) = setup();
        let order = emissary_order(&mut state, ActionKind::TradeAgreement, "Blackstone");
        // Natural 20: critical regardless of total.
        let mut roller = ScriptedRoller::new(vec![ScriptedRoller::roll(20, 22)]);

        let resolution = resolve_order(&mut state, &catalog, &mut rng, &mut roller, order);
        let Resolution::Completed(outcome) = resolution else {
            panic!("expected completion");
        };
        assert_eq!(outcome.tier, Some(OutcomeTier::CriticalSuccess));
        assert_eq!(state.ledger.get("Blackstone"), 25);
        assert_eq!(state.records.agreements.len(), 1);
        // Base duration 6, critical +2.
        assert_eq!(state.records.agreements[0].remaining_turns, 8);
        // Contract charter filed in the warehouse.
        assert_eq!(state.warehouse.len(), 1);
    }

    #[test]
    fn bad_failure_sets_cooldown_and_no_record() {
        let (mut state, catalog, mut rng) = setup();
        let order = emissary_order(&mut state, ActionKind::Arbitration, "Rowthorn");
        let mut roller = ScriptedRoller::new(vec![ScriptedRoller::roll(3, 3)]);

        let resolution = resolve_order(&mut state, &catalog, &mut rng, &mut roller, order);
        let Resolution::Completed(outcome) = resolution else {
            panic!("expected completion");
        };
        assert_eq!(outcome.tier, Some(OutcomeTier::BadFailure));
        assert!(state.records.arbitrations.is_empty());
        assert_eq!(state.cooldowns.turns_left(ActionKind::Arbitration), 2);
        assert_eq!(state.ledger.get("Rowthorn"), -20);
    }

    #[test]
    fn cooldown_gate_blocks_before_rolling() {
        let (mut state, catalog, mut rng) = setup();
        state.cooldowns.set_cooldown(ActionKind::Summit, 2);
        let order = emissary_order(&mut state, ActionKind::Summit, "Blackstone & Rowthorn");
        // Roller would panic the test if consulted.
        struct NeverRoller;
        impl RollPrompt for NeverRoller {
            fn prompt(&mut self, _request: &RollRequest) -> Option<DieRoll> {
                panic!("blocked resolution must not roll");
            }
        }
        let resolution =
            resolve_order(&mut state, &catalog, &mut rng, &mut NeverRoller, order);
        assert!(matches!(
            resolution,
            Resolution::Blocked {
                kind: ActionKind::Summit,
                turns_left: 2,
                ..
            }
        ));
        assert_eq!(state.ledger.get("Blackstone"), 0);
    }

    #[test]
    fn summit_applies_delta_to_each_faction() {
        let (mut state, catalog, mut rng) = setup();
        let order = emissary_order(&mut state, ActionKind::Summit, "Blackstone & Rowthorn");
        // Success exactly at the DC: +8 each, base reduction unchanged.
        let mut roller = ScriptedRoller::new(vec![ScriptedRoller::roll(12, 14)]);

        resolve_order(&mut state, &catalog, &mut rng, &mut roller, order);
        assert_eq!(state.ledger.get("Blackstone"), 8);
        assert_eq!(state.ledger.get("Rowthorn"), 8);
        assert_eq!(state.records.summits.len(), 1);
        assert_eq!(
            state.records.summits[0].payload,
            RecordPayload::Summit {
                cost_reduction_pct: SUMMIT_BASE_REDUCTION_PCT
            }
        );
    }

    #[test]
    fn summit_bad_failure_is_narrative_only() {
        let (mut state, catalog, mut rng) = setup();
        let order = emissary_order(&mut state, ActionKind::Summit, "Blackstone & Rowthorn");
        let mut roller = ScriptedRoller::new(vec![ScriptedRoller::roll(2, 4)]);

        resolve_order(&mut state, &catalog, &mut rng, &mut roller, order);
        assert!(state.records.summits.is_empty());
        assert_eq!(state.ledger.get("Blackstone"), -20);
        assert_eq!(state.ledger.get("Rowthorn"), -20);
        assert_eq!(state.cooldowns.turns_left(ActionKind::Summit), 2);
    }

    #[test]
    fn consortium_opens_one_route_per_faction_idempotently() {
        let (mut state, catalog, mut rng) = setup();
        let order = emissary_order(&mut state, ActionKind::Consortium, "Blackstone & Rowthorn");
        let mut roller = ScriptedRoller::new(vec![ScriptedRoller::roll(18, 22)]);

        resolve_order(&mut state, &catalog, &mut rng, &mut roller, order);
        assert!(state.trade_network.active);
        assert_eq!(state.trade_network.routes.len(), 2);

        // A second consortium with an overlapping target must not
        // duplicate the route.
        let order = emissary_order(&mut state, ActionKind::Consortium, "Blackstone");
        let mut roller = ScriptedRoller::new(vec![ScriptedRoller::roll(18, 22)]);
        resolve_order(&mut state, &catalog, &mut rng, &mut roller, order);
        assert_eq!(state.trade_network.routes.len(), 2);
    }

    #[test]
    fn route_yield_is_seeded_from_contract_income() {
        let (mut state, catalog, mut rng) = setup();
        let order = emissary_order(&mut state, ActionKind::Consortium, "Blackstone");
        let mut roller = ScriptedRoller::new(vec![ScriptedRoller::roll(18, 22)]);
        resolve_order(&mut state, &catalog, &mut rng, &mut roller, order);

        let contract_income = state.records.consortiums[0].payload.income_per_turn();
        assert_eq!(
            state.trade_network.routes[0].yield_per_turn,
            contract_income
        );
    }

    #[test]
    fn delegation_clear_failure_charges_penalty() {
        let (mut state, catalog, mut rng) = setup();
        let mut order =
            emissary_order(&mut state, ActionKind::HostDelegation, "Blackstone");
        order.meta.tone = Some(Tone::Opportunistic);
        // Both totals far below their DCs: clear failure.
        let mut roller = ScriptedRoller::new(vec![
            ScriptedRoller::roll(2, 2),
            ScriptedRoller::roll(3, 3),
        ]);

        let before = state.treasury_gp;
        resolve_order(&mut state, &catalog, &mut rng, &mut roller, order);
        assert_eq!(state.ledger.get("Blackstone"), -12);
        // Penalty = ceil(avg(80,140) / 6) = ceil(110/6) = 19.
        assert_eq!(state.treasury_gp, before - 19);
        // Record is created regardless of outcome.
        assert_eq!(state.records.delegations.len(), 1);
    }

    #[test]
    fn delegation_weak_miss_changes_no_capital_but_pays() {
        let (mut state, catalog, mut rng) = setup();
        let order = emissary_order(&mut state, ActionKind::HostDelegation, "Blackstone");
        // Both one short of their DC: weak, not a failure.
        let mut roller = ScriptedRoller::new(vec![
            ScriptedRoller::roll(8, 12),
            ScriptedRoller::roll(7, 11),
        ]);

        let before = state.treasury_gp;
        resolve_order(&mut state, &catalog, &mut rng, &mut roller, order);
        assert_eq!(state.ledger.get("Blackstone"), 0);
        assert!(state.treasury_gp > before, "weak visits still pay gifts");
        assert_eq!(state.records.delegations.len(), 1);
    }

    #[test]
    fn cancelling_either_delegation_roll_aborts_cleanly() {
        let (mut state, catalog, mut rng) = setup();
        state.ledger.add("Blackstone", 5);
        let snapshot = serde_json::to_string(&state).unwrap();

        let order = emissary_order(&mut state, ActionKind::HostDelegation, "Blackstone");
        let mut roller =
            ScriptedRoller::new(vec![ScriptedRoller::roll(15, 18), None]);
        let resolution = resolve_order(&mut state, &catalog, &mut rng, &mut roller, order);
        assert!(matches!(resolution, Resolution::Cancelled { .. }));

        // Ledger, cooldowns, records: byte-for-byte unchanged apart from
        // the id counter consumed by the order itself and the log line.
        let mut reloaded: BastionState = serde_json::from_str(&snapshot).unwrap();
        reloaded.id_gen = state.id_gen.clone();
        reloaded.log = state.log.clone();
        assert_eq!(
            serde_json::to_string(&reloaded).unwrap(),
            serde_json::to_string(&state).unwrap()
        );
    }

    #[test]
    fn unknown_function_is_a_noop_not_a_crash() {
        let (mut state, catalog, mut rng) = setup();
        let mut order = emissary_order(&mut state, ActionKind::TradeAgreement, "Blackstone");
        order.facility = "ruined_wing".to_string();
        let mut roller = ScriptedRoller::new(vec![]);
        let resolution = resolve_order(&mut state, &catalog, &mut rng, &mut roller, order);
        assert!(matches!(resolution, Resolution::NoOp { .. }));
        assert_eq!(state.ledger.get("Blackstone"), 0);
    }

    #[test]
    fn upgrade_increments_until_max() {
        let (mut state, catalog, mut rng) = setup();
        let mut roller = ScriptedRoller::new(vec![]);
        for expected in [2, 3] {
            let order = Order {
                id: state.id_gen.next_id(),
                facility: "envoys_hall".to_string(),
                function: "upgrade".to_string(),
                option_index: None,
                option_label: None,
                label: "Envoy's Hall: Upgrade Facility".to_string(),
                cost_gp: 500,
                issued_turn: 1,
                matures_turn: 3,
                meta: OrderMeta {
                    kind: Some(ActionKind::UpgradeFacility),
                    tone: None,
                    target: None,
                },
            };
            resolve_order(&mut state, &catalog, &mut rng, &mut roller, order);
            assert_eq!(state.facility_level("envoys_hall"), expected);
        }

        // At max: logged no-op.
        let order = Order {
            id: state.id_gen.next_id(),
            facility: "envoys_hall".to_string(),
            function: "upgrade".to_string(),
            option_index: None,
            option_label: None,
            label: "Envoy's Hall: Upgrade Facility".to_string(),
            cost_gp: 0,
            issued_turn: 1,
            matures_turn: 3,
            meta: OrderMeta {
                kind: Some(ActionKind::UpgradeFacility),
                tone: None,
                target: None,
            },
        };
        resolve_order(&mut state, &catalog, &mut rng, &mut roller, order);
        assert_eq!(state.facility_level("envoys_hall"), 3);
    }

    #[test]
    fn network_upgrade_frees_singleton_channel() {
        let (mut state, catalog, mut rng) = setup();
        state.trade_network.active = true;
        state.network_upgrade_pending = true;
        let order = Order {
            id: state.id_gen.next_id(),
            facility: "trade_hall".to_string(),
            function: "network_stability".to_string(),
            option_index: None,
            option_label: None,
            label: "Trade Hall: Invest in Route Stability".to_string(),
            cost_gp: 250,
            issued_turn: 1,
            matures_turn: 2,
            meta: OrderMeta {
                kind: Some(ActionKind::NetworkUpgrade(NetworkUpgradeKind::Stability)),
                tone: None,
                target: None,
            },
        };
        let mut roller = ScriptedRoller::new(vec![]);
        resolve_order(&mut state, &catalog, &mut rng, &mut roller, order);
        assert!(!state.network_upgrade_pending);
        assert_eq!(state.trade_network.stability, 60);
    }

    #[test]
    fn auto_roller_fills_in_totals() {
        let mut roller = AutoRoller::new(SmallRng::seed_from_u64(9));
        let request = RollRequest {
            label: "test".to_string(),
            modifier: 3,
            dc: 10,
        };
        for _ in 0..50 {
            let roll = roller.prompt(&request).unwrap();
            assert!((1..=20).contains(&roll.natural));
            assert_eq!(roll.total, roll.natural + 3);
        }
    }
}
