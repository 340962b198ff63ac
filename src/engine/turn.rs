//! The turn driver: everything that happens when the bastion clock
//! advances by one.

use rand::RngCore;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::engine::dice::roll_die;
use crate::engine::resolve::{Resolution, RollPrompt, resolve_order};
use crate::model::state::BastionState;
use crate::model::trade::RouteStatus;

#[derive(Debug, Clone, Serialize)]
pub struct TurnReport {
    pub turn: u32,
    /// Recurring income from active diplomatic contracts.
    pub contract_income_gp: i64,
    /// Income from trade routes that held this turn.
    pub route_income_gp: i64,
    pub resolutions: Vec<Resolution>,
}

/// Advance one turn. Sequence is fixed: clock, upkeep, income, then
/// matured orders oldest-first. Bastion events are a separate
/// player-triggered roll, never part of the turn advance.
pub fn advance_turn(
    state: &mut BastionState,
    catalog: &Catalog,
    rng: &mut dyn RngCore,
    roller: &mut dyn RollPrompt,
) -> TurnReport {
    state.turn += 1;
    let turn = state.turn;
    state.log("Turn", format!("Turn {turn} begins."));

    // One-turn buffs expire; cooldowns count down.
    state.defenders.patrol_advantage = false;
    state.cooldowns.tick();

    let contract_income = state.records.tick();
    if contract_income > 0 {
        state.credit_gp(contract_income);
        state.log("Income", format!("Contracts pay {contract_income}gp."));
    }

    let route_income = resolve_routes(state, rng);

    // Orders that matured this exact turn, in issuance order. Resolutions
    // are strictly sequential so each sees the previous one's effects.
    let matured = state.drain_matured(turn);
    let mut resolutions = Vec::with_capacity(matured.len());
    for order in matured {
        resolutions.push(resolve_order(state, catalog, rng, roller, order));
    }

    TurnReport {
        turn,
        contract_income_gp: contract_income,
        route_income_gp: route_income,
        resolutions,
    }
}

/// Per-route upkeep. Active routes must hold against their stability DC
/// to pay out; a miss disrupts them. Disrupted routes roll the same check
/// to reopen and pay nothing the turn they recover. High-risk routing
/// raises every DC by 2 and route income by half.
fn resolve_routes(state: &mut BastionState, rng: &mut dyn RngCore) -> i64 {
    if !state.trade_network.active {
        return 0;
    }

    let mut income = 0;
    let mut lines = Vec::new();
    {
        let net = &mut state.trade_network;
        let check_bonus = net.stability / 10;
        let dc_penalty = if net.high_risk_routing { 2 } else { 0 };
        let yield_bonus = net.yield_bonus;
        let high_risk = net.high_risk_routing;

        for route in &mut net.routes {
            let check = roll_die(rng, 20) + check_bonus;
            let dc = route.stability_dc + dc_penalty;
            match route.status {
                RouteStatus::Active => {
                    if check >= dc {
                        let mut payout = route.yield_per_turn * (100 + yield_bonus) / 100;
                        if high_risk {
                            payout = payout * 3 / 2;
                        }
                        income += payout;
                    } else {
                        route.status = RouteStatus::Disrupted;
                        lines.push(format!(
                            "Route to {} disrupted ({check} vs {dc}).",
                            route.faction
                        ));
                    }
                }
                RouteStatus::Disrupted => {
                    if check >= dc {
                        route.status = RouteStatus::Active;
                        lines.push(format!("Route to {} reopens.", route.faction));
                    }
                }
            }
        }
        net.last_resolved_turn = state.turn;
    }

    for line in lines {
        state.log("Trade", line);
    }
    if income > 0 {
        state.credit_gp(income);
        state.log("Income", format!("Trade routes pay {income}gp."));
    }
    income
}
