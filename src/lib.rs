pub mod catalog;
pub mod engine;
pub mod id;
pub mod model;
pub mod save;

pub use catalog::{Catalog, FacilityDef, FunctionDef, SpecialDef};
pub use id::IdGenerator;
pub use model::{
    ActionKind, BastionState, DiplomaticRecord, LogEntry, Order, OrderMeta, RecordPayload,
    StoredItem, Tone, TradeNetwork, TradeRoute,
};
