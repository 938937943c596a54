use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub type AccountId = usize;

/// Alert id written for ordinary transfers.
pub const NO_ALERT: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub initial_balance: f64,
    pub balance: f64,
}

impl Account {
    pub fn new(id: AccountId, initial_balance: f64) -> Self {
        Self {
            id,
            initial_balance,
            balance: initial_balance,
        }
    }
}

/// One row of `tx_log.csv`. Column names follow the PaySim log layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub step: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    #[serde(rename = "nameOrig")]
    pub orig: AccountId,
    #[serde(rename = "oldbalanceOrig")]
    pub old_balance_orig: f64,
    #[serde(rename = "newbalanceOrig")]
    pub new_balance_orig: f64,
    #[serde(rename = "nameDest")]
    pub dest: AccountId,
    #[serde(rename = "oldbalanceDest")]
    pub old_balance_dest: f64,
    #[serde(rename = "newbalanceDest")]
    pub new_balance_dest: f64,
    #[serde(rename = "isFraud", with = "flag")]
    pub is_fraud: bool,
    #[serde(rename = "alertID")]
    pub alert_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    FanIn,
    FanOut,
    Cycle,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlertKind::FanIn => "fan_in",
            AlertKind::FanOut => "fan_out",
            AlertKind::Cycle => "cycle",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTransfer {
    pub step: u64,
    pub orig: AccountId,
    pub dest: AccountId,
    pub amount: f64,
}

/// An injected suspicious pattern and the transfers that realise it.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPattern {
    pub id: i64,
    pub kind: AlertKind,
    pub accounts: Vec<AccountId>,
    pub start_step: u64,
    pub end_step: u64,
    pub transfers: Vec<ScheduledTransfer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub name: String,
    pub current_loop: usize,
    pub seed: u64,
    pub steps: u64,
    pub accounts: usize,
    pub transactions: usize,
    pub fraud_transactions: usize,
    pub alerts: usize,
    pub output_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// `isFraud` is written as `0`/`1` so downstream tools can `int()` it.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(raw > 0)
    }
}
