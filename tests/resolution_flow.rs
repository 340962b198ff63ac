//! End-to-end flows: issue an order, advance turns, watch it resolve.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use bastion_sim::catalog::Catalog;
use bastion_sim::engine::queue::{IssueRequest, issue_order};
use bastion_sim::engine::resolve::{DieRoll, Resolution, RollPrompt, RollRequest};
use bastion_sim::engine::turn::advance_turn;
use bastion_sim::model::order::ActionKind;
use bastion_sim::model::state::BastionState;
use bastion_sim::save;

/// Replays a fixed script of prompt answers; `None` dismisses the prompt.
struct ScriptedRoller {
    answers: VecDeque<Option<DieRoll>>,
}

impl ScriptedRoller {
    fn new(answers: Vec<Option<DieRoll>>) -> Self {
        Self {
            answers: answers.into(),
        }
    }
}

impl RollPrompt for ScriptedRoller {
    fn prompt(&mut self, _request: &RollRequest) -> Option<DieRoll> {
        self.answers
            .pop_front()
            .expect("script ran out of answers")
    }
}

fn setup() -> (BastionState, Catalog, SmallRng) {
    let mut state = BastionState::new();
    state.party_level = 10;
    state.treasury_gp = 5000;
    (state, Catalog::builtin(), SmallRng::seed_from_u64(42))
}

fn issue(state: &mut BastionState, catalog: &Catalog, function: &str, target: &str) -> u64 {
    issue_order(
        state,
        catalog,
        IssueRequest {
            facility: "envoys_hall".to_string(),
            function: function.to_string(),
            option_index: None,
            target: Some(target.to_string()),
            tone: None,
        },
    )
    .expect("issue should succeed")
}

#[test]
fn trade_agreement_matures_and_pays_out() {
    let (mut state, catalog, mut rng) = setup();
    issue(&mut state, &catalog, "trade_agreement", "Blackstone");
    assert_eq!(state.orders.len(), 1);

    // Turn 2: order still pending, no prompt consumed.
    let mut roller = ScriptedRoller::new(vec![]);
    let report = advance_turn(&mut state, &catalog, &mut rng, &mut roller);
    assert!(report.resolutions.is_empty());

    // Turn 3: matures, resolves on a plain success.
    let mut roller = ScriptedRoller::new(vec![Some(DieRoll {
        natural: 13,
        total: 16,
    })]);
    let report = advance_turn(&mut state, &catalog, &mut rng, &mut roller);
    assert_eq!(report.resolutions.len(), 1);
    assert!(matches!(report.resolutions[0], Resolution::Completed(_)));
    assert!(state.orders.is_empty());
    assert_eq!(state.ledger.get("Blackstone"), 8);
    assert_eq!(state.records.agreements.len(), 1);

    // The new contract pays on the following turn.
    let income = state.records.agreements[0].payload.income_per_turn();
    assert!(income > 0);
    let mut roller = ScriptedRoller::new(vec![]);
    let report = advance_turn(&mut state, &catalog, &mut rng, &mut roller);
    assert_eq!(report.contract_income_gp, income);
}

#[test]
fn bad_failure_blocks_the_next_attempt_of_that_kind() {
    let (mut state, catalog, mut rng) = setup();
    // Level 3 hall: one-turn maturation, so the cooldown is still live
    // when the follow-up order matures.
    state.facility_levels.insert("envoys_hall".to_string(), 3);
    issue(&mut state, &catalog, "arbitration", "Rowthorn");

    let mut roller = ScriptedRoller::new(vec![Some(DieRoll { natural: 2, total: 2 })]);
    advance_turn(&mut state, &catalog, &mut rng, &mut roller);
    assert_eq!(state.cooldowns.turns_left(ActionKind::Arbitration), 2);
    assert_eq!(state.ledger.get("Rowthorn"), -20);

    // Issuing is still allowed; the gate sits at resolution time.
    issue(&mut state, &catalog, "arbitration", "Rowthorn");
    let treasury_before = state.treasury_gp;
    let mut roller = ScriptedRoller::new(vec![]);
    let report = advance_turn(&mut state, &catalog, &mut rng, &mut roller);
    assert!(matches!(
        report.resolutions[0],
        Resolution::Blocked {
            kind: ActionKind::Arbitration,
            ..
        }
    ));
    // Voided, not refunded: the blocked resolution moves nothing.
    assert_eq!(state.treasury_gp, treasury_before);
    assert_eq!(state.ledger.get("Rowthorn"), -20);
    assert!(state.orders.is_empty());
}

#[test]
fn cancelled_roll_drops_the_order_without_side_effects() {
    let (mut state, catalog, mut rng) = setup();
    issue(&mut state, &catalog, "summit", "Blackstone & Rowthorn");

    let mut roller = ScriptedRoller::new(vec![]);
    advance_turn(&mut state, &catalog, &mut rng, &mut roller);

    let mut roller = ScriptedRoller::new(vec![None]);
    let report = advance_turn(&mut state, &catalog, &mut rng, &mut roller);
    assert!(matches!(report.resolutions[0], Resolution::Cancelled { .. }));
    assert!(state.orders.is_empty());
    assert!(state.records.summits.is_empty());
    assert_eq!(state.ledger.get("Blackstone"), 0);
    assert_eq!(state.ledger.get("Rowthorn"), 0);
}

#[test]
fn consortium_success_stands_up_the_trade_network() {
    let (mut state, catalog, mut rng) = setup();
    issue(&mut state, &catalog, "consortium", "Blackstone & Rowthorn");

    // Consortium takes three turns to mature.
    let mut roller = ScriptedRoller::new(vec![]);
    advance_turn(&mut state, &catalog, &mut rng, &mut roller);
    advance_turn(&mut state, &catalog, &mut rng, &mut roller);

    let mut roller = ScriptedRoller::new(vec![Some(DieRoll {
        natural: 19,
        total: 23,
    })]);
    advance_turn(&mut state, &catalog, &mut rng, &mut roller);

    assert!(state.trade_network.active);
    assert_eq!(state.trade_network.routes.len(), 2);
    assert!(state.trade_network.route_for("blackstone").is_some());
    assert!(state.trade_network.route_for("rowthorn").is_some());
    assert_eq!(state.records.consortiums.len(), 1);
}

#[test]
fn summit_discount_applies_while_the_accord_lasts() {
    let (mut state, catalog, _rng) = setup();
    state.records.insert(bastion_sim::model::DiplomaticRecord {
        id: 1,
        title: "Summit of Two Banners".to_string(),
        targets: vec!["blackstone".to_string(), "rowthorn".to_string()],
        remaining_turns: 2,
        payload: bastion_sim::model::RecordPayload::Summit {
            cost_reduction_pct: 25,
        },
    });

    let before = state.treasury_gp;
    issue(&mut state, &catalog, "trade_agreement", "Blackstone");
    // 150gp base, 25% off.
    assert_eq!(state.treasury_gp, before - 112);

    // Expire the accord: full price again.
    state.records.summits[0].remaining_turns = 0;
    let before = state.treasury_gp;
    issue(&mut state, &catalog, "trade_agreement", "Rowthorn");
    assert_eq!(state.treasury_gp, before - 150);
}

#[test]
fn save_round_trip_preserves_a_mid_campaign_state() {
    let (mut state, catalog, mut rng) = setup();
    issue(&mut state, &catalog, "trade_agreement", "Blackstone");
    issue(&mut state, &catalog, "host_delegation", "Rowthorn");
    state.cooldowns.set_cooldown(ActionKind::Summit, 2);
    state.defenders.add(3);
    // The delegation matures after one turn and needs both its checks.
    let mut roller = ScriptedRoller::new(vec![
        Some(DieRoll {
            natural: 15,
            total: 18,
        }),
        Some(DieRoll {
            natural: 14,
            total: 17,
        }),
    ]);
    advance_turn(&mut state, &catalog, &mut rng, &mut roller);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("campaign.json");
    save::save_to_path(&path, &state).unwrap();
    let loaded = save::load_from_path(&path).unwrap();

    let original = serde_json::to_value(&state).unwrap();
    let restored = serde_json::to_value(&loaded).unwrap();
    assert_eq!(original, restored);
}
