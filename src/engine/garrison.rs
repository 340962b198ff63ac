//! Immediate garrison operations. Unlike facility orders these resolve on
//! the spot: no queue, no maturation, no check.

use rand::RngCore;

use crate::engine::dice::roll_die;
use crate::engine::queue::IssueError;
use crate::model::inventory::append_item;
use crate::model::state::BastionState;

pub const RECRUIT_COST_GP: i64 = 50;
pub const PATROL_COST_GP: i64 = 25;

/// Hire 1d4 defenders. Returns how many signed on.
pub fn recruit_defenders(
    state: &mut BastionState,
    rng: &mut dyn RngCore,
) -> Result<u32, IssueError> {
    if !state.can_afford(RECRUIT_COST_GP) {
        return Err(IssueError::InsufficientFunds {
            need_gp: RECRUIT_COST_GP,
            have_gp: state.treasury_gp,
        });
    }
    state.debit_gp(RECRUIT_COST_GP);
    let hired = roll_die(rng, 4) as u32;
    state.defenders.add(hired);
    state.log(
        "Garrison",
        format!("Recruited {hired} defender(s), {} total.", state.defenders.count),
    );
    Ok(hired)
}

/// Outfit the whole garrison. Cost scales with headcount; there must be
/// someone to arm.
pub fn arm_defenders(state: &mut BastionState) -> Result<(), IssueError> {
    if state.defenders.count == 0 {
        state.log("Garrison", "No defenders to arm.");
        return Ok(());
    }
    let cost = state.defenders.arming_cost_gp();
    if !state.can_afford(cost) {
        return Err(IssueError::InsufficientFunds {
            need_gp: cost,
            have_gp: state.treasury_gp,
        });
    }
    state.debit_gp(cost);
    state.defenders.armed = true;
    append_item(
        &mut state.military,
        "Arms and armour",
        state.defenders.count.max(1),
        Some(cost),
        None,
        "garrison",
    );
    state.log("Garrison", format!("Armed the garrison for {cost}gp."));
    Ok(())
}

/// Send out patrols. The advantage lasts until the next turn advance.
pub fn run_patrols(state: &mut BastionState) -> Result<(), IssueError> {
    if !state.can_afford(PATROL_COST_GP) {
        return Err(IssueError::InsufficientFunds {
            need_gp: PATROL_COST_GP,
            have_gp: state.treasury_gp,
        });
    }
    state.debit_gp(PATROL_COST_GP);
    state.defenders.patrol_advantage = true;
    state.log("Garrison", "Patrols sweep the surrounding roads.");
    Ok(())
}
