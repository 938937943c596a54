use amlsim::utils::logger;
use amlsim::AlertTimeline;
use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "alert-timeline")]
#[command(about = "Summarise when each alert is active in a transaction log")]
struct Args {
    /// Transaction log written by amlsim (tx_log.csv)
    tx_csv: PathBuf,

    /// Write the timeline here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let file = File::open(&args.tx_csv)
        .with_context(|| format!("cannot open {}", args.tx_csv.display()))?;
    let timeline = AlertTimeline::from_reader(BufReader::new(file))?;
    tracing::info!("🚨 {} alerts found", timeline.windows().count());

    match &args.out {
        Some(path) => {
            let out = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
            timeline.write_csv(BufWriter::new(out))?;
            println!("📁 Timeline saved to: {}", path.display());
        }
        None => timeline.write_csv(std::io::stdout().lock())?,
    }

    Ok(())
}
