pub mod cooldown;
pub mod garrison;
pub mod inventory;
pub mod ledger;
pub mod log;
pub mod order;
pub mod records;
pub mod state;
pub mod trade;

pub use cooldown::{BAD_FAILURE_COOLDOWN, CooldownRegistry};
pub use garrison::Defenders;
pub use inventory::{StoredItem, append_item};
pub use ledger::{CAPITAL_BOUND, PoliticalLedger, split_targets};
pub use log::{ActivityLog, LogEntry};
pub use order::{ActionKind, NetworkUpgradeKind, Order, OrderMeta, Tone};
pub use records::{DiplomaticRecord, RecordBook, RecordPayload};
pub use state::{BastionState, LastEvent, MAX_FACILITY_LEVEL};
pub use trade::{RiskTier, RouteStatus, TradeNetwork, TradeRoute};
