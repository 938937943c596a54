use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn amlsim() -> Command {
    Command::new(env!("CARGO_BIN_EXE_amlsim"))
}

fn generate_scalefree() -> Command {
    Command::new(env!("CARGO_BIN_EXE_generate-scalefree"))
}

fn alert_timeline() -> Command {
    Command::new(env!("CARGO_BIN_EXE_alert-timeline"))
}

#[test]
fn test_too_few_arguments_prints_usage_and_exits_one() {
    let output = amlsim()
        .args(["-file", "sim.toml", "-for", "10"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage: amlsim -file [PropertyFile] -for [Steps] -r [Repeats]"));
}

#[test]
fn test_no_arguments_exits_one() {
    let output = amlsim().output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_non_integer_repeat_count_fails() {
    let output = amlsim()
        .args(["-file", "sim.toml", "-for", "10", "-r", "many"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("many"));
}

#[test]
fn test_zero_repeats_succeeds_without_reading_config() {
    let output = amlsim()
        .args(["-file", "does-not-exist.toml", "-for", "10", "-r", "0"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("----------------------- nrOfTimesRepeat 0"));
}

fn write_property_file(dir: &Path) -> PathBuf {
    let out = dir.join("out");
    let property_file = dir.join("sim.toml");
    std::fs::write(
        &property_file,
        format!(
            r#"
[simulation]
output_path = "{}"

[accounts]
count = 20
edge_factor = 1

[[alerts]]
pattern = "fan_out"
count = 1
accounts = 3
min_amount = 100.0
max_amount = 200.0
period = 2
"#,
            out.to_str().unwrap().replace('\\', "/")
        ),
    )
    .unwrap();
    property_file
}

fn run_once(property_file: &Path, name: &str) -> std::process::Output {
    amlsim()
        .args([
            "-file",
            property_file.to_str().unwrap(),
            "-for",
            "5",
            "-r",
            "1",
            "-name",
            name,
        ])
        .output()
        .unwrap()
}

#[test]
fn test_run_writes_transaction_log() {
    let temp_dir = TempDir::new().unwrap();
    let property_file = write_property_file(temp_dir.path());

    let output = run_once(&property_file, "cli");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let tx_log = temp_dir.path().join("out").join("cli").join("run_0").join("tx_log.csv");
    let content = std::fs::read_to_string(tx_log).unwrap();
    assert!(content.starts_with("step,type,amount,nameOrig"));
}

#[test]
fn test_generate_scalefree_missing_csv_path_prints_usage() {
    let output = generate_scalefree().args(["10", "2"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage: generate-scalefree [NumVertices] [EdgeFactor] [DegCSV]"));
}

#[test]
fn test_generate_scalefree_writes_degree_distribution() {
    let temp_dir = TempDir::new().unwrap();
    let deg_csv = temp_dir.path().join("deg.csv");

    let output = generate_scalefree()
        .args(["50", "2", deg_csv.to_str().unwrap(), "--seed", "1"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Number of vertices: 50"));
    assert!(stdout.contains("Number of edges: 96"));

    let content = std::fs::read_to_string(deg_csv).unwrap();
    assert!(content.starts_with("Count,In-degree,Out-degree\n"));
}

#[test]
fn test_alert_timeline_reads_generated_log() {
    let temp_dir = TempDir::new().unwrap();
    let property_file = write_property_file(temp_dir.path());
    let output = run_once(&property_file, "timeline");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let tx_log = temp_dir.path().join("out").join("timeline").join("run_0").join("tx_log.csv");
    let timeline_csv = temp_dir.path().join("t.csv");
    let output = alert_timeline()
        .arg(&tx_log)
        .arg("--out")
        .arg(&timeline_csv)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let content = std::fs::read_to_string(timeline_csv).unwrap();
    assert!(content.starts_with("alert_id,start_step,end_step,accounts\n"));
}

#[test]
fn test_alert_timeline_missing_log_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = alert_timeline()
        .arg(temp_dir.path().join("nope.csv"))
        .output()
        .unwrap();

    assert!(!output.status.success());
}
