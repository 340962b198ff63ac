//! The action resolution engine and its supporting machinery.

pub mod dice;
pub mod events;
pub mod garrison;
pub mod queue;
pub mod resolve;
pub mod tier;
pub mod turn;

pub use dice::{clamp_int, random_int_in_range, roll_die};
pub use events::{BastionEvent, EventRow, EventTable, roll_bastion_event};
pub use queue::{IssueError, IssueRequest, issue_order};
pub use resolve::{
    AutoRoller, CheckDetail, DieRoll, Resolution, ResolutionOutcome, RollPrompt, RollRequest,
    resolve_order,
};
pub use tier::{OutcomeTier, TierEffects, resolve_tier, tier_effects};
pub use turn::{TurnReport, advance_turn};
