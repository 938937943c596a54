use crate::adapters::storage::LocalStorage;
use crate::config::toml_config::SimConfig;
use crate::config::SimArgs;
use crate::core::alerts::{self, round_cents};
use crate::core::graph;
use crate::core::output;
use crate::domain::model::{Account, AccountId, AlertPattern, RunSummary, Transaction, NO_ALERT};
use crate::domain::ports::{ConfigProvider, Simulation, Storage};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use crate::utils::validation::Validate;
use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const TRANSFER: &str = "TRANSFER";

/// Account balances plus the log of every transfer applied to them.
#[derive(Debug, Clone)]
pub struct Ledger {
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts,
            transactions: Vec::new(),
        }
    }

    /// Moves up to `amount` from `orig` to `dest`. The amount is capped at the
    /// origin balance; nothing is recorded when the origin is empty.
    pub fn transfer(
        &mut self,
        step: u64,
        orig: AccountId,
        dest: AccountId,
        amount: f64,
        alert_id: i64,
    ) -> Option<&Transaction> {
        if orig == dest || orig >= self.accounts.len() || dest >= self.accounts.len() {
            return None;
        }

        let old_balance_orig = self.accounts[orig].balance;
        let old_balance_dest = self.accounts[dest].balance;
        let amount = round_cents(amount).min(old_balance_orig);
        if amount <= 0.0 {
            return None;
        }

        let new_balance_orig = old_balance_orig - amount;
        let new_balance_dest = old_balance_dest + amount;
        self.accounts[orig].balance = new_balance_orig;
        self.accounts[dest].balance = new_balance_dest;

        self.transactions.push(Transaction {
            step,
            kind: TRANSFER.to_string(),
            amount,
            orig,
            old_balance_orig,
            new_balance_orig,
            dest,
            old_balance_dest,
            new_balance_dest,
            is_fraud: alert_id != NO_ALERT,
            alert_id,
        });
        self.transactions.last()
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn into_parts(self) -> (Vec<Account>, Vec<Transaction>) {
        (self.accounts, self.transactions)
    }
}

#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub alerts: Vec<AlertPattern>,
}

impl SimulationOutcome {
    pub fn fraud_transactions(&self) -> usize {
        self.transactions.iter().filter(|t| t.is_fraud).count()
    }
}

/// Runs the step loop for a validated configuration.
pub fn simulate<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> Result<SimulationOutcome> {
    let steps = config.steps();
    let account_count = config.accounts.count;

    let graph = graph::powerlaw_cluster(account_count, config.accounts.edge_factor, rng)?;
    tracing::debug!(
        "🕸️ account graph: {} accounts, {} edges",
        graph.number_of_nodes(),
        graph.number_of_edges()
    );

    let balances = Uniform::new_inclusive(config.accounts.min_balance, config.accounts.max_balance);
    let accounts = (0..account_count)
        .map(|id| Account::new(id, round_cents(balances.sample(rng))))
        .collect();
    let mut ledger = Ledger::new(accounts);

    let alerts = alerts::plan_alerts(&config.alerts, account_count, steps, rng)?;
    let mut schedule: BTreeMap<u64, Vec<(i64, AccountId, AccountId, f64)>> = BTreeMap::new();
    for alert in &alerts {
        for t in &alert.transfers {
            schedule
                .entry(t.step)
                .or_default()
                .push((alert.id, t.orig, t.dest, t.amount));
        }
    }

    let probability = config.transactions.probability;
    let amounts = Uniform::new_inclusive(config.transactions.min_amount, config.transactions.max_amount);

    for step in 0..steps {
        let before = ledger.transactions().len();

        for &(orig, dest) in graph.edges() {
            if rng.gen_bool(probability) {
                ledger.transfer(step, orig, dest, amounts.sample(rng), NO_ALERT);
            }
        }

        if let Some(due) = schedule.get(&step) {
            for &(alert_id, orig, dest, amount) in due {
                if ledger.transfer(step, orig, dest, amount, alert_id).is_none() {
                    tracing::warn!(
                        "Alert {} transfer {} -> {} dropped at step {}: empty origin account",
                        alert_id,
                        orig,
                        dest,
                        step
                    );
                }
            }
        }

        tracing::debug!("step {}: {} transactions", step, ledger.transactions().len() - before);
    }

    let (accounts, transactions) = ledger.into_parts();
    Ok(SimulationOutcome {
        accounts,
        transactions,
        alerts,
    })
}

/// Directory of one run, relative to the configured output path.
pub fn run_directory(config: &impl ConfigProvider, current_loop: usize) -> PathBuf {
    PathBuf::from(config.simulator_name()).join(format!("run_{}", current_loop))
}

/// One simulation instance. The launcher builds a fresh one per repetition.
#[derive(Debug, Clone)]
pub struct AmlSim {
    seed: u64,
    current_loop: usize,
}

impl AmlSim {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            current_loop: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn current_loop(&self) -> usize {
        self.current_loop
    }

    /// The configured seed, or the constructor's, offset by the loop index so
    /// repetitions differ but stay reproducible.
    pub fn effective_seed(&self, config: &SimConfig) -> u64 {
        config
            .seed()
            .unwrap_or(self.seed)
            .wrapping_add(self.current_loop as u64)
    }
}

impl Simulation for AmlSim {
    fn set_current_loop(&mut self, index: usize) {
        self.current_loop = index;
    }

    fn run_simulation(&mut self, args: &[String]) -> Result<RunSummary> {
        let started_at = Utc::now();
        let args = SimArgs::from_raw(args)?;

        tracing::info!("📁 Loading property file: {}", args.property_file.display());
        let mut config = SimConfig::from_file(&args.property_file)?;
        config.apply_overrides(&args);
        config.validate()?;

        let monitor = SystemMonitor::new(config.monitoring_enabled());
        let seed = self.effective_seed(&config);
        tracing::info!(
            "🚀 Simulation '{}' loop {}: {} steps, {} accounts, seed {}",
            config.simulator_name(),
            self.current_loop,
            config.steps(),
            config.accounts.count,
            seed
        );

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let outcome = simulate(&config, &mut rng)?;
        monitor.log_stats("Simulation");

        let storage = LocalStorage::new(config.output_path());
        let run_dir = run_directory(&config, self.current_loop);

        let summary = RunSummary {
            name: config.simulator_name().to_string(),
            current_loop: self.current_loop,
            seed,
            steps: config.steps(),
            accounts: outcome.accounts.len(),
            transactions: outcome.transactions.len(),
            fraud_transactions: outcome.fraud_transactions(),
            alerts: outcome.alerts.len(),
            output_dir: storage.resolve(&run_dir),
            started_at,
            finished_at: Utc::now(),
        };
        output::write_run(&storage, &run_dir, &outcome, &summary)?;

        tracing::info!(
            "✅ Loop {} finished: {} transactions ({} suspicious) in {} alerts",
            self.current_loop,
            summary.transactions,
            summary.fraud_transactions,
            summary.alerts
        );
        monitor.log_final_stats();

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::AlertKind;

    fn config(steps: u64) -> SimConfig {
        SimConfig::from_toml_str(&format!(
            r#"
[simulation]
name = "unit"
seed = 42
steps = {}

[accounts]
count = 30
edge_factor = 2
min_balance = 1000.0
max_balance = 2000.0

[transactions]
probability = 0.3
min_amount = 10.0
max_amount = 500.0

[[alerts]]
pattern = "fan_out"
count = 2
accounts = 4
min_amount = 100.0
max_amount = 200.0
period = 4

[[alerts]]
pattern = "cycle"
count = 1
accounts = 5
min_amount = 300.0
max_amount = 300.0
period = 5
"#,
            steps
        ))
        .unwrap()
    }

    #[test]
    fn test_ledger_caps_at_balance() {
        let mut ledger = Ledger::new(vec![Account::new(0, 50.0), Account::new(1, 0.0)]);

        let tx = ledger.transfer(0, 0, 1, 80.0, NO_ALERT).unwrap().clone();
        assert_eq!(tx.amount, 50.0);
        assert_eq!(tx.new_balance_orig, 0.0);
        assert_eq!(tx.new_balance_dest, 50.0);
        assert!(!tx.is_fraud);

        assert!(ledger.transfer(1, 0, 1, 10.0, NO_ALERT).is_none());
        assert!(ledger.transfer(1, 1, 1, 10.0, NO_ALERT).is_none());
        assert_eq!(ledger.transactions().len(), 1);
    }

    #[test]
    fn test_ledger_marks_alert_transfers() {
        let mut ledger = Ledger::new(vec![Account::new(0, 100.0), Account::new(1, 0.0)]);
        let tx = ledger.transfer(3, 0, 1, 25.0, 7).unwrap();
        assert!(tx.is_fraud);
        assert_eq!(tx.alert_id, 7);
        assert_eq!(ledger.accounts()[1].balance, 25.0);
    }

    #[test]
    fn test_balance_invariants_hold() {
        let config = config(15);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let outcome = simulate(&config, &mut rng).unwrap();

        assert!(!outcome.transactions.is_empty());
        for tx in &outcome.transactions {
            assert!(tx.amount > 0.0);
            assert!(tx.new_balance_orig >= 0.0);
            assert!((tx.old_balance_orig - tx.amount - tx.new_balance_orig).abs() < 1e-6);
            assert!((tx.old_balance_dest + tx.amount - tx.new_balance_dest).abs() < 1e-6);
            assert!(tx.step < 15);
        }
        for account in &outcome.accounts {
            assert!(account.balance >= 0.0);
        }
    }

    #[test]
    fn test_total_money_is_conserved() {
        let config = config(10);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let outcome = simulate(&config, &mut rng).unwrap();

        let initial: f64 = outcome.accounts.iter().map(|a| a.initial_balance).sum();
        let final_: f64 = outcome.accounts.iter().map(|a| a.balance).sum();
        assert!((initial - final_).abs() < 1e-4);
    }

    #[test]
    fn test_fraud_rows_sit_inside_alert_windows() {
        let config = config(20);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let outcome = simulate(&config, &mut rng).unwrap();

        assert_eq!(outcome.alerts.len(), 3);
        assert_eq!(outcome.alerts[2].kind, AlertKind::Cycle);
        assert!(outcome.fraud_transactions() > 0);
        for tx in outcome.transactions.iter().filter(|t| t.is_fraud) {
            let alert = &outcome.alerts[tx.alert_id as usize];
            assert!(tx.step >= alert.start_step && tx.step <= alert.end_step);
            assert!(alert.accounts.contains(&tx.orig));
            assert!(alert.accounts.contains(&tx.dest));
        }
    }

    #[test]
    fn test_same_seed_same_log() {
        let config = config(8);
        let a = simulate(&config, &mut Xoshiro256PlusPlus::seed_from_u64(5)).unwrap();
        let b = simulate(&config, &mut Xoshiro256PlusPlus::seed_from_u64(5)).unwrap();
        assert_eq!(a.transactions, b.transactions);
    }

    #[test]
    fn test_effective_seed_follows_loop() {
        let config = config(5);
        let mut sim = AmlSim::new(1);
        assert_eq!(sim.effective_seed(&config), 42);
        sim.set_current_loop(3);
        assert_eq!(sim.current_loop(), 3);
        assert_eq!(sim.effective_seed(&config), 45);

        let mut unseeded = config.clone();
        unseeded.simulation.seed = None;
        assert_eq!(sim.effective_seed(&unseeded), 4);
    }

    #[test]
    fn test_run_directory_layout() {
        let config = config(5);
        assert_eq!(run_directory(&config, 2), PathBuf::from("unit").join("run_2"));
    }
}
