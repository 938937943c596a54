pub mod toml_config;

use crate::utils::error::{Result, SimError};
use clap::Parser;
use std::path::PathBuf;

/// Flags understood by a simulation run.
///
/// The launcher hands every run the raw argument list, so the flags keep
/// their historical single-dash spelling (`-file`, `-for`, `-name`);
/// [`SimArgs::from_raw`] rewrites them before clap sees them.
#[derive(Debug, Clone, Parser)]
#[command(name = "amlsim", no_binary_name = true)]
#[command(about = "Anti-money-laundering transaction simulator")]
pub struct SimArgs {
    #[arg(long = "file", value_name = "PropertyFile")]
    pub property_file: PathBuf,

    #[arg(long = "for", value_name = "Steps")]
    pub steps: Option<u64>,

    #[arg(short = 'r', long = "repeats", value_name = "Repeats", allow_negative_numbers = true)]
    pub repeats: Option<i64>,

    #[arg(long = "name", value_name = "SimulatorName")]
    pub name: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl SimArgs {
    /// Parses the argument list as given to the process, program name excluded.
    pub fn from_raw(args: &[String]) -> Result<Self> {
        let normalized = args.iter().map(|token| normalize_flag(token));
        Self::try_parse_from(normalized).map_err(|e| SimError::Argument {
            message: e.to_string().trim_end().to_string(),
        })
    }
}

/// `-file` -> `--file`. Short flags (`-r`) and negative numbers pass through.
pub fn normalize_flag(token: &str) -> String {
    match token.strip_prefix('-') {
        Some(rest)
            if rest.len() > 1
                && rest.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) =>
        {
            format!("--{}", rest)
        }
        _ => token.to_string(),
    }
}

/// Whether `-verbose` appears anywhere, before the arguments are validated.
pub fn wants_verbose(args: &[String]) -> bool {
    args.iter().any(|a| a == "-verbose" || a == "--verbose")
}
