use thiserror::Error;

pub const USAGE: &str =
    "Usage: amlsim -file [PropertyFile] -for [Steps] -r [Repeats] [-name [SimulatorName]]";

#[derive(Error, Debug)]
pub enum SimError {
    #[error("{}", USAGE)]
    Usage,

    #[error("Invalid repeat count '{value}': {reason}")]
    InvalidRepeatCount { value: String, reason: String },

    #[error("Argument error: {message}")]
    Argument { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Simulation error: {message}")]
    SimulationError { message: String },

    #[error("Invalid record at line {line}: {message}")]
    InvalidRecordError { line: u64, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Usage,
    Configuration,
    Simulation,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SimError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SimError::Usage | SimError::InvalidRepeatCount { .. } | SimError::Argument { .. } => {
                ErrorCategory::Usage
            }
            SimError::ConfigError { .. }
            | SimError::InvalidConfigValueError { .. }
            | SimError::MissingConfigError { .. }
            | SimError::TomlError(_) => ErrorCategory::Configuration,
            SimError::SimulationError { .. } => ErrorCategory::Simulation,
            SimError::InvalidRecordError { .. }
            | SimError::CsvError(_)
            | SimError::SerializationError(_) => ErrorCategory::Data,
            SimError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Usage | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Simulation | ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for this error, keyed on severity.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SimError::Usage => "Pass the property file, step count and repeat count flags".to_string(),
            SimError::InvalidRepeatCount { .. } => {
                "The sixth argument must be an integer, e.g. `-r 3`".to_string()
            }
            SimError::Argument { .. } => format!("Check the command line. {USAGE}"),
            SimError::ConfigError { .. } | SimError::TomlError(_) => {
                "Make sure the property file exists and is valid TOML".to_string()
            }
            SimError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of `{field}` in the property file")
            }
            SimError::MissingConfigError { field } => {
                format!("Add `{field}` to the property file or pass it on the command line")
            }
            SimError::SimulationError { .. } => {
                "Adjust account and alert sizes so the patterns fit the account graph".to_string()
            }
            SimError::InvalidRecordError { .. }
            | SimError::CsvError(_)
            | SimError::SerializationError(_) => {
                "Check that the input file is a transaction log written by amlsim".to_string()
            }
            SimError::IoError(_) => "Check file permissions and free disk space".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SimError::Usage => USAGE.to_string(),
            SimError::IoError(e) => format!("File system problem: {e}"),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
