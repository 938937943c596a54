pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::storage::LocalStorage;
pub use config::{toml_config::SimConfig, SimArgs};
pub use core::{
    alert_timeline::AlertTimeline,
    launcher::{LaunchReport, Launcher},
    simulator::AmlSim,
};
pub use utils::error::{Result, SimError};
