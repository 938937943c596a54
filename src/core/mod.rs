pub mod alert_timeline;
pub mod alerts;
pub mod graph;
pub mod launcher;
pub mod output;
pub mod simulator;

pub use crate::domain::model::{Account, AlertPattern, RunSummary, Transaction};
pub use crate::domain::ports::{ConfigProvider, Simulation, Storage};
pub use crate::utils::error::Result;
