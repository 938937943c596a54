use crate::domain::model::RunSummary;
use crate::domain::ports::Simulation;
use crate::utils::error::{Result, SimError};

/// Fewest tokens the launcher accepts (`-file F -for S -r R`).
pub const MIN_ARGS: usize = 6;
/// The repeat count is read from this fixed position.
pub const REPEAT_ARG_INDEX: usize = 5;
/// Every simulation instance is constructed with this parameter.
pub const SIMULATION_SEED: u64 = 1;

#[derive(Debug, Clone)]
pub struct LaunchReport {
    pub repeats: i64,
    pub runs: Vec<RunSummary>,
}

/// Builds and runs one simulation per repetition, sequentially.
pub struct Launcher<F> {
    factory: F,
}

impl<F> Launcher<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    /// Runs the repetitions named by `args[5]`. Each repetition gets a fresh
    /// simulation with its loop index set before `run_simulation` is called.
    /// The first failing run stops the loop.
    pub fn run<S>(&mut self, args: &[String]) -> Result<LaunchReport>
    where
        F: FnMut(u64) -> S,
        S: Simulation,
    {
        let repeats = parse_repeat_count(args)?;
        println!("----------------------- nrOfTimesRepeat {}", repeats);

        let iterations = usize::try_from(repeats).unwrap_or_else(|_| {
            tracing::warn!("Repeat count {} is negative, nothing to run", repeats);
            0
        });

        let mut runs = Vec::with_capacity(iterations);
        for i in 0..iterations {
            let mut simulation = (self.factory)(SIMULATION_SEED);
            simulation.set_current_loop(i);

            tracing::info!("🔁 Starting repetition {}/{}", i + 1, iterations);
            let summary = simulation.run_simulation(args).map_err(|e| {
                tracing::error!("❌ Repetition {} failed: {}", i, e);
                e
            })?;
            runs.push(summary);
        }

        Ok(LaunchReport { repeats, runs })
    }
}

/// Reads the repeat count from its fixed position.
pub fn parse_repeat_count(args: &[String]) -> Result<i64> {
    if args.len() < MIN_ARGS {
        return Err(SimError::Usage);
    }

    let raw = &args[REPEAT_ARG_INDEX];
    raw.parse::<i64>()
        .map_err(|e| SimError::InvalidRepeatCount {
            value: raw.clone(),
            reason: e.to_string(),
        })
}
