use amlsim::config::wants_verbose;
use amlsim::utils::error::USAGE;
use amlsim::utils::logger;
use amlsim::{AmlSim, Launcher, SimError};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // 初始化日誌
    if std::env::var("AMLSIM_LOG_FORMAT").as_deref() == Ok("json") {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(wants_verbose(&args));
    }

    tracing::info!("Starting amlsim launcher");
    tracing::debug!("Arguments: {:?}", args);

    let mut launcher = Launcher::new(AmlSim::new);

    match launcher.run(&args) {
        Ok(report) => {
            tracing::info!("✅ {} simulation run(s) completed", report.runs.len());
            for run in &report.runs {
                println!("📁 Output saved to: {}", run.output_dir.display());
            }
        }
        Err(SimError::Usage) => {
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!(
                "❌ Simulation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.exit_code());
        }
    }
}
