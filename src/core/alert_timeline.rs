//! Reconstructs when each alert was active from a transaction log.

use crate::core::output::join_accounts;
use crate::utils::error::{Result, SimError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{Read, Write};

const COL_STEP: usize = 0;
const COL_ORIG: usize = 3;
const COL_DEST: usize = 6;
const COL_FRAUD: usize = 9;
const COL_ALERT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertWindow {
    pub start_step: u64,
    pub end_step: u64,
}

impl AlertWindow {
    pub fn contains(&self, step: u64) -> bool {
        self.start_step <= step && step <= self.end_step
    }
}

#[derive(Debug, Serialize)]
struct TimelineRow {
    alert_id: i64,
    start_step: u64,
    end_step: u64,
    accounts: String,
}

#[derive(Debug, Clone, Default)]
pub struct AlertTimeline {
    windows: BTreeMap<i64, AlertWindow>,
    alert_accounts: BTreeMap<i64, BTreeSet<String>>,
    account_alerts: HashMap<String, BTreeSet<i64>>,
    suspicious: BTreeMap<u64, BTreeSet<(String, String)>>,
    edges: Vec<(u64, String, String)>,
}

impl AlertTimeline {
    /// Reads a `tx_log.csv` (header row included).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let mut timeline = Self::default();

        for record in rdr.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let field = |index: usize| {
                record.get(index).ok_or_else(|| SimError::InvalidRecordError {
                    line,
                    message: format!("missing column {}", index),
                })
            };
            let number = |index: usize| -> Result<i64> {
                let raw = field(index)?;
                raw.trim().parse::<i64>().map_err(|e| SimError::InvalidRecordError {
                    line,
                    message: format!("column {} '{}': {}", index, raw, e),
                })
            };

            let step = number(COL_STEP)?;
            let step = u64::try_from(step).map_err(|_| SimError::InvalidRecordError {
                line,
                message: format!("negative step {}", step),
            })?;
            let orig = field(COL_ORIG)?.to_string();
            let dest = field(COL_DEST)?.to_string();
            let is_fraud = number(COL_FRAUD)? > 0;
            let alert_id = number(COL_ALERT)?;

            timeline.record(step, orig, dest, is_fraud, alert_id);
        }

        tracing::debug!(
            "Timeline built from {} transactions, {} alerts",
            timeline.edges.len(),
            timeline.windows.len()
        );
        Ok(timeline)
    }

    fn record(&mut self, step: u64, orig: String, dest: String, is_fraud: bool, alert_id: i64) {
        self.account_alerts.entry(orig.clone()).or_default().insert(alert_id);
        self.account_alerts.entry(dest.clone()).or_default().insert(alert_id);

        if is_fraud {
            self.windows
                .entry(alert_id)
                .and_modify(|w| {
                    w.start_step = w.start_step.min(step);
                    w.end_step = w.end_step.max(step);
                })
                .or_insert(AlertWindow {
                    start_step: step,
                    end_step: step,
                });

            let members = self.alert_accounts.entry(alert_id).or_default();
            members.insert(orig.clone());
            members.insert(dest.clone());

            let edges = self.suspicious.entry(step).or_default();
            edges.insert((orig.clone(), dest.clone()));
            edges.insert((dest.clone(), orig.clone()));
        }

        self.edges.push((step, orig, dest));
    }

    pub fn alert_window(&self, alert_id: i64) -> Option<AlertWindow> {
        self.windows.get(&alert_id).copied()
    }

    pub fn windows(&self) -> impl Iterator<Item = (i64, AlertWindow)> + '_ {
        self.windows.iter().map(|(&id, &w)| (id, w))
    }

    /// True when any alert the account took part in is active at `step`.
    pub fn account_active_at(&self, account: &str, step: u64) -> bool {
        self.account_alerts
            .get(account)
            .map(|alerts| {
                alerts
                    .iter()
                    .filter_map(|id| self.windows.get(id))
                    .any(|w| w.contains(step))
            })
            .unwrap_or(false)
    }

    /// Fraud edges seen at `step`, in both directions.
    pub fn suspicious_edges(&self, step: u64) -> Option<&BTreeSet<(String, String)>> {
        self.suspicious.get(&step)
    }

    /// Every transaction edge logged at `step`, one item per transaction.
    pub fn edges_at(&self, step: u64) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.edges
            .iter()
            .filter(move |(s, _, _)| *s == step)
            .map(|(_, orig, dest)| (orig.as_str(), dest.as_str()))
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for (alert_id, window) in self.windows() {
            let accounts = self
                .alert_accounts
                .get(&alert_id)
                .map(|members| join_accounts(members.iter()))
                .unwrap_or_default();
            wtr.serialize(TimelineRow {
                alert_id,
                start_step: window.start_step,
                end_step: window.end_step,
                accounts,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}
