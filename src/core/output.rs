use crate::core::simulator::SimulationOutcome;
use crate::domain::model::{AlertPattern, RunSummary};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, SimError};
use serde::Serialize;
use std::path::Path;

pub const TX_LOG: &str = "tx_log.csv";
pub const ACCOUNTS: &str = "accounts.csv";
pub const ALERTS: &str = "alerts.csv";
pub const SUMMARY: &str = "summary.json";

#[derive(Debug, Serialize)]
struct AccountRow {
    id: usize,
    initial_balance: f64,
    final_balance: f64,
}

#[derive(Debug, Serialize)]
struct AlertRow {
    alert_id: i64,
    pattern: String,
    start_step: u64,
    end_step: u64,
    accounts: String,
}

impl From<&AlertPattern> for AlertRow {
    fn from(alert: &AlertPattern) -> Self {
        Self {
            alert_id: alert.id,
            pattern: alert.kind.to_string(),
            start_step: alert.start_step,
            end_step: alert.end_step,
            accounts: join_accounts(alert.accounts.iter()),
        }
    }
}

/// Accounts column format shared by `alerts.csv` and the timeline report.
pub fn join_accounts<T: ToString>(accounts: impl Iterator<Item = T>) -> String {
    accounts.map(|a| a.to_string()).collect::<Vec<_>>().join(";")
}

/// 寫出一次模擬的所有檔案
pub fn write_run<S: Storage>(
    storage: &S,
    run_dir: &Path,
    outcome: &SimulationOutcome,
    summary: &RunSummary,
) -> Result<()> {
    let tx_log = to_csv(outcome.transactions.iter())?;
    tracing::debug!("Writing {} ({} bytes)", TX_LOG, tx_log.len());
    storage.write_file(&run_dir.join(TX_LOG), &tx_log)?;

    let accounts = to_csv(outcome.accounts.iter().map(|a| AccountRow {
        id: a.id,
        initial_balance: a.initial_balance,
        final_balance: a.balance,
    }))?;
    storage.write_file(&run_dir.join(ACCOUNTS), &accounts)?;

    let alerts = to_csv(outcome.alerts.iter().map(AlertRow::from))?;
    storage.write_file(&run_dir.join(ALERTS), &alerts)?;

    let json = serde_json::to_vec_pretty(summary)?;
    storage.write_file(&run_dir.join(SUMMARY), &json)?;

    tracing::debug!("Run files saved under {}", storage.resolve(run_dir).display());
    Ok(())
}

fn to_csv<T: Serialize>(rows: impl Iterator<Item = T>) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.into_inner().map_err(|e| SimError::IoError(e.into_error()))
}
