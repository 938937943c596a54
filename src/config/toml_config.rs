use crate::config::SimArgs;
use crate::domain::model::AlertKind;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SimError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// The property file passed with `-file`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub simulation: SimulationConfig,
    pub accounts: AccountsConfig,
    #[serde(default)]
    pub transactions: TransactionsConfig,
    #[serde(default)]
    pub alerts: Vec<AlertConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub seed: Option<u64>,
    pub steps: Option<u64>,
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsConfig {
    pub count: usize,
    pub edge_factor: usize,
    #[serde(default = "default_min_balance")]
    pub min_balance: f64,
    #[serde(default = "default_max_balance")]
    pub max_balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionsConfig {
    #[serde(default = "default_probability")]
    pub probability: f64,
    #[serde(default = "default_min_amount")]
    pub min_amount: f64,
    #[serde(default = "default_max_amount")]
    pub max_amount: f64,
}

impl Default for TransactionsConfig {
    fn default() -> Self {
        Self {
            probability: default_probability(),
            min_amount: default_min_amount(),
            max_amount: default_max_amount(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    pub pattern: AlertKind,
    pub count: usize,
    pub accounts: usize,
    pub min_amount: f64,
    pub max_amount: f64,
    pub period: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

fn default_name() -> String {
    "amlsim".to_string()
}

fn default_output_path() -> String {
    "./outputs".to_string()
}

fn default_min_balance() -> f64 {
    50_000.0
}

fn default_max_balance() -> f64 {
    100_000.0
}

fn default_probability() -> f64 {
    0.1
}

fn default_min_amount() -> f64 {
    100.0
}

fn default_max_amount() -> f64 {
    1_000.0
}

impl SimConfig {
    /// 從 property file 載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SimError::ConfigError {
            message: format!("cannot read property file {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// Command-line flags win over the file.
    pub fn apply_overrides(&mut self, args: &SimArgs) {
        if let Some(steps) = args.steps {
            tracing::debug!("🔧 steps overridden to {} by -for", steps);
            self.simulation.steps = Some(steps);
        }
        if let Some(name) = &args.name {
            tracing::debug!("🔧 simulator name overridden to '{}' by -name", name);
            self.simulation.name = name.clone();
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_file_name("simulation.name", &self.simulation.name)?;
        validation::validate_path("simulation.output_path", &self.simulation.output_path)?;
        let steps = *validation::validate_required_field("simulation.steps", &self.simulation.steps)?;
        validation::validate_positive_number("simulation.steps", steps as usize, 1)?;

        validation::validate_positive_number("accounts.count", self.accounts.count, 2)?;
        validation::validate_range(
            "accounts.edge_factor",
            self.accounts.edge_factor,
            1,
            self.accounts.count - 1,
        )?;
        validation::validate_amount_bounds(
            "accounts.balance",
            self.accounts.min_balance,
            self.accounts.max_balance,
        )?;

        validation::validate_range("transactions.probability", self.transactions.probability, 0.0, 1.0)?;
        validation::validate_amount_bounds(
            "transactions.amount",
            self.transactions.min_amount,
            self.transactions.max_amount,
        )?;

        for (i, alert) in self.alerts.iter().enumerate() {
            let field = |name: &str| format!("alerts[{}].{}", i, name);
            validation::validate_range(&field("accounts"), alert.accounts, 2, self.accounts.count)?;
            validation::validate_range(&field("period"), alert.period, 1, steps)?;
            validation::validate_amount_bounds(&field("amount"), alert.min_amount, alert.max_amount)?;
            if alert.min_amount <= 0.0 {
                return Err(SimError::InvalidConfigValueError {
                    field: field("min_amount"),
                    value: alert.min_amount.to_string(),
                    reason: "Alert transfers must move a positive amount".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn seed(&self) -> Option<u64> {
        self.simulation.seed
    }
}

impl ConfigProvider for SimConfig {
    fn simulator_name(&self) -> &str {
        &self.simulation.name
    }

    fn steps(&self) -> u64 {
        self.simulation.steps.unwrap_or(0)
    }

    fn output_path(&self) -> &str {
        &self.simulation.output_path
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for SimConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
