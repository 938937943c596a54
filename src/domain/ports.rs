use crate::domain::model::RunSummary;
use crate::utils::error::Result;
use std::path::Path;

pub trait Storage {
    fn write_file(&self, path: &Path, data: &[u8]) -> Result<()>;
    /// Location a relative path resolves to, for reporting.
    fn resolve(&self, path: &Path) -> std::path::PathBuf;
}

/// What a single simulation run needs to know, however it was configured.
pub trait ConfigProvider {
    fn simulator_name(&self) -> &str;
    fn steps(&self) -> u64;
    fn output_path(&self) -> &str;
    fn monitoring_enabled(&self) -> bool;
}

/// The object the launcher drives once per repetition.
pub trait Simulation {
    fn set_current_loop(&mut self, index: usize);
    fn run_simulation(&mut self, args: &[String]) -> Result<RunSummary>;
}
