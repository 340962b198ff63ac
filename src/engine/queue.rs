//! Issue-time validation and order construction.
//!
//! Everything that can reject an action before gold changes hands lives
//! here. Once `issue_order` returns `Ok`, the cost is paid and the order
//! is committed to the queue.

use serde::Serialize;

use crate::catalog::{Catalog, SpecialDef};
use crate::model::order::{ActionKind, Order, OrderMeta, Tone};
use crate::model::state::BastionState;

/// What the player asked for.
#[derive(Debug, Clone, Default)]
pub struct IssueRequest {
    pub facility: String,
    pub function: String,
    pub option_index: Option<usize>,
    /// Faction name, or "A & B" for summits.
    pub target: Option<String>,
    pub tone: Option<Tone>,
}

/// Issue-time rejections: user-facing, no state change, action not
/// consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum IssueError {
    UnknownFunction,
    FacilityLocked { required_level: u32 },
    InsufficientFunds { need_gp: i64, have_gp: i64 },
    /// Only one trade-network upgrade order may be pending system-wide.
    UpgradePending,
    NetworkInactive,
    AtMaxLevel,
    MissingTarget,
}

impl std::fmt::Display for IssueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueError::UnknownFunction => write!(f, "no such facility function"),
            IssueError::FacilityLocked { required_level } => {
                write!(f, "facility unlocks at party level {required_level}")
            }
            IssueError::InsufficientFunds { need_gp, have_gp } => {
                write!(f, "not enough gp: need {need_gp}, have {have_gp}")
            }
            IssueError::UpgradePending => {
                write!(f, "a trade network upgrade is already underway")
            }
            IssueError::NetworkInactive => {
                write!(f, "the trade network has not been established")
            }
            IssueError::AtMaxLevel => write!(f, "facility is already at maximum level"),
            IssueError::MissingTarget => write!(f, "this action needs a target faction"),
        }
    }
}

/// Validate and enqueue an order. Deducts the cost immediately and assigns
/// the maturation turn from the kind and facility level.
pub fn issue_order(
    state: &mut BastionState,
    catalog: &Catalog,
    request: IssueRequest,
) -> Result<u64, IssueError> {
    let facility = catalog
        .facility(&request.facility)
        .ok_or(IssueError::UnknownFunction)?;
    let function = facility
        .functions
        .iter()
        .find(|f| f.id == request.function)
        .ok_or(IssueError::UnknownFunction)?;

    if state.party_level < facility.required_level {
        return Err(IssueError::FacilityLocked {
            required_level: facility.required_level,
        });
    }

    let level = state.facility_level(&facility.id);
    let kind = match &function.special {
        Some(SpecialDef::EmissaryAction { kind, .. }) => Some(*kind),
        Some(SpecialDef::UpgradeFacility { .. }) => Some(ActionKind::UpgradeFacility),
        _ => None,
    };

    // Singleton gate for the trade-network upgrade channel, checked on the
    // indexed flag before anything is spent.
    if matches!(kind, Some(ActionKind::NetworkUpgrade(_))) {
        if !state.trade_network.active {
            return Err(IssueError::NetworkInactive);
        }
        if state.network_upgrade_pending {
            return Err(IssueError::UpgradePending);
        }
    }

    if matches!(kind, Some(k) if k.is_diplomatic() || k == ActionKind::HostDelegation)
        && request
            .target
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .is_empty()
    {
        return Err(IssueError::MissingTarget);
    }

    let mut cost = match &function.special {
        Some(SpecialDef::UpgradeFacility { cost_by_level }) => {
            if level >= facility.max_level {
                return Err(IssueError::AtMaxLevel);
            }
            cost_by_level
                .get((level - 1) as usize)
                .copied()
                .unwrap_or_else(|| {
                    tracing::warn!(
                        facility = facility.id,
                        level,
                        "upgrade cost table shorter than max level"
                    );
                    0
                })
        }
        _ => function.cost_for(request.option_index),
    };

    // Active summit accords reduce the price of diplomatic outreach.
    if matches!(kind, Some(k) if k.is_diplomatic() || k == ActionKind::HostDelegation) {
        let discount = state.records.summit_discount_pct().clamp(0, 90);
        cost = cost * (100 - discount) / 100;
    }

    if !state.can_afford(cost) {
        return Err(IssueError::InsufficientFunds {
            need_gp: cost,
            have_gp: state.treasury_gp,
        });
    }

    state.debit_gp(cost);

    let duration = kind
        .map(|k| catalog.order_duration(k, level))
        .unwrap_or(1);
    let option_label = request
        .option_index
        .and_then(|idx| function.options.get(idx))
        .map(|opt| opt.label.clone());
    let id = state.id_gen.next_id();
    let label = format!("{}: {}", facility.name, function.label);

    let order = Order {
        id,
        facility: facility.id.clone(),
        function: function.id.clone(),
        option_index: request.option_index,
        option_label,
        label: label.clone(),
        cost_gp: cost,
        issued_turn: state.turn,
        matures_turn: state.turn + duration,
        meta: OrderMeta {
            kind,
            tone: request.tone,
            target: request.target,
        },
    };

    if matches!(kind, Some(ActionKind::NetworkUpgrade(_))) {
        state.network_upgrade_pending = true;
    }

    state.log(
        "Order",
        format!(
            "{label} underway ({cost}gp, completes turn {})",
            order.matures_turn
        ),
    );
    state.orders.push(order);
    Ok(id)
}
