//! Bastion events, rolled on a d100 range table when the player asks.
//! The turn driver never rolls these on its own.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::engine::dice::{random_int_in_range, roll_die};
use crate::model::inventory::append_item;
use crate::model::state::{BastionState, LastEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BastionEvent {
    AllIsPeaceful,
    Attack,
    FriendlyVisitors,
    MarketBoon,
    LostShipment,
    Omen,
}

impl BastionEvent {
    pub fn name(self) -> &'static str {
        match self {
            BastionEvent::AllIsPeaceful => "All Is Peaceful",
            BastionEvent::Attack => "Attack",
            BastionEvent::FriendlyVisitors => "Friendly Visitors",
            BastionEvent::MarketBoon => "Market Boon",
            BastionEvent::LostShipment => "Lost Shipment",
            BastionEvent::Omen => "Omen",
        }
    }
}

/// One d100 band, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRow {
    pub lo: i64,
    pub hi: i64,
    pub event: BastionEvent,
}

/// The event table is data, like the catalog: the crate ships a built-in
/// one and the rows deserialize so a data file can replace it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTable {
    pub rows: Vec<EventRow>,
}

impl EventTable {
    /// The shipped bands. Low rolls are trouble.
    pub fn builtin() -> Self {
        EventTable {
            rows: vec![
                EventRow { lo: 1, hi: 10, event: BastionEvent::Attack },
                EventRow { lo: 11, hi: 20, event: BastionEvent::LostShipment },
                EventRow { lo: 21, hi: 30, event: BastionEvent::Omen },
                EventRow { lo: 31, hi: 45, event: BastionEvent::FriendlyVisitors },
                EventRow { lo: 46, hi: 55, event: BastionEvent::MarketBoon },
                EventRow { lo: 56, hi: 100, event: BastionEvent::AllIsPeaceful },
            ],
        }
    }

    /// First matching band wins; a roll outside every band falls through
    /// to a quiet turn rather than erroring.
    pub fn event_for_roll(&self, roll: i64) -> BastionEvent {
        self.rows
            .iter()
            .find(|row| roll >= row.lo && roll <= row.hi)
            .map(|row| row.event)
            .unwrap_or(BastionEvent::AllIsPeaceful)
    }
}

impl Default for EventTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Roll the table, apply the event, and remember it for display.
pub fn roll_bastion_event(
    state: &mut BastionState,
    rng: &mut dyn RngCore,
    table: &EventTable,
) -> LastEvent {
    let roll = roll_die(rng, 100);
    let event = table.event_for_roll(roll);
    let lines = apply_event(state, rng, event);

    let last = LastEvent {
        roll,
        name: event.name().to_string(),
        lines: lines.clone(),
    };
    for line in &lines {
        state.log("Event", line.clone());
    }
    state.last_event = Some(last.clone());
    last
}

fn apply_event(
    state: &mut BastionState,
    rng: &mut dyn RngCore,
    event: BastionEvent,
) -> Vec<String> {
    match event {
        BastionEvent::AllIsPeaceful => vec!["All is peaceful this turn.".to_string()],
        BastionEvent::Attack => resolve_attack(state, rng),
        BastionEvent::FriendlyVisitors => {
            let gift = random_int_in_range(rng, 20, 60);
            state.credit_gp(gift);
            vec![format!(
                "Friendly visitors lodge at the bastion and leave {gift}gp in thanks."
            )]
        }
        BastionEvent::MarketBoon => {
            let windfall = random_int_in_range(rng, 50, 150);
            state.credit_gp(windfall);
            vec![format!("A passing caravan pays {windfall}gp over the odds.")]
        }
        BastionEvent::LostShipment => {
            let loss = random_int_in_range(rng, 30, 80);
            state.debit_gp(loss);
            vec![format!("A shipment goes missing on the road: -{loss}gp.")]
        }
        BastionEvent::Omen => {
            append_item(
                &mut state.warehouse,
                "Strange token",
                1,
                None,
                Some("left at the gate overnight"),
                "event",
            );
            vec!["A strange token is left at the gate overnight.".to_string()]
        }
    }
}

/// Raiders test the walls. Armed defenders and fresh patrols both help;
/// a lost defense costs defenders and gold.
fn resolve_attack(state: &mut BastionState, rng: &mut dyn RngCore) -> Vec<String> {
    let mut bonus = i64::from(state.defenders.count.min(5));
    if state.defenders.armed {
        bonus += 2;
    }
    if state.defenders.patrol_advantage {
        bonus += 2;
    }
    let roll = roll_die(rng, 20) + bonus;
    if roll >= 12 {
        vec![format!(
            "Raiders probe the walls and are driven off ({roll} vs 12)."
        )]
    } else {
        let lost = (roll_die(rng, 4) as u32).min(state.defenders.count);
        let plunder = random_int_in_range(rng, 40, 100);
        state.defenders.remove(lost);
        state.debit_gp(plunder);
        vec![format!(
            "Raiders breach the outer yard ({roll} vs 12): {lost} defender(s) lost, {plunder}gp plundered."
        )]
    }
}
