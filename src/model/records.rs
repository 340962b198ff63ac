//! Diplomatic records: the lasting paperwork a resolved action leaves behind.

use serde::{Deserialize, Serialize};

use super::order::Tone;

/// Subtype-specific payload. Agreement-family records carry recurring
/// income; summits carry a cost-reduction percentage; delegations only
/// track their active duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum RecordPayload {
    Agreement { income_per_turn: i64 },
    Arbitration { income_per_turn: i64 },
    Consortium { income_per_turn: i64 },
    Summit { cost_reduction_pct: i64 },
    Delegation { tone: Tone },
}

impl RecordPayload {
    pub fn income_per_turn(&self) -> i64 {
        match self {
            RecordPayload::Agreement { income_per_turn }
            | RecordPayload::Arbitration { income_per_turn }
            | RecordPayload::Consortium { income_per_turn } => *income_per_turn,
            RecordPayload::Summit { .. } | RecordPayload::Delegation { .. } => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiplomaticRecord {
    pub id: u64,
    pub title: String,
    /// One entry per named faction; summits carry both parties.
    pub targets: Vec<String>,
    /// Only ever decreases; the record is logically expired at 0 but is
    /// kept on the books for display until pruned.
    pub remaining_turns: u32,
    pub payload: RecordPayload,
}

impl DiplomaticRecord {
    pub fn is_expired(&self) -> bool {
        self.remaining_turns == 0
    }
}

/// The five record buckets, one per action kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordBook {
    #[serde(default)]
    pub agreements: Vec<DiplomaticRecord>,
    #[serde(default)]
    pub arbitrations: Vec<DiplomaticRecord>,
    #[serde(default)]
    pub consortiums: Vec<DiplomaticRecord>,
    #[serde(default)]
    pub summits: Vec<DiplomaticRecord>,
    #[serde(default)]
    pub delegations: Vec<DiplomaticRecord>,
}

impl RecordBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a record into the bucket matching its payload.
    pub fn insert(&mut self, record: DiplomaticRecord) {
        match record.payload {
            RecordPayload::Agreement { .. } => self.agreements.push(record),
            RecordPayload::Arbitration { .. } => self.arbitrations.push(record),
            RecordPayload::Consortium { .. } => self.consortiums.push(record),
            RecordPayload::Summit { .. } => self.summits.push(record),
            RecordPayload::Delegation { .. } => self.delegations.push(record),
        }
    }

    /// Collect this turn's recurring income and decrement every live
    /// record's counter. Returns the total income due.
    pub fn tick(&mut self) -> i64 {
        let mut income = 0;
        for record in self.iter_mut() {
            if record.remaining_turns > 0 {
                income += record.payload.income_per_turn();
                record.remaining_turns -= 1;
            }
        }
        income
    }

    /// Best active summit discount, as a percentage of cost.
    pub fn summit_discount_pct(&self) -> i64 {
        self.summits
            .iter()
            .filter(|r| !r.is_expired())
            .map(|r| match r.payload {
                RecordPayload::Summit { cost_reduction_pct } => cost_reduction_pct,
                _ => 0,
            })
            .max()
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiplomaticRecord> {
        self.agreements
            .iter()
            .chain(&self.arbitrations)
            .chain(&self.consortiums)
            .chain(&self.summits)
            .chain(&self.delegations)
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut DiplomaticRecord> {
        self.agreements
            .iter_mut()
            .chain(&mut self.arbitrations)
            .chain(&mut self.consortiums)
            .chain(&mut self.summits)
            .chain(&mut self.delegations)
    }
}
