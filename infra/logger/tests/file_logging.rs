use settle_kernel::Input;
use settle_logger::{LoggerBuilder, LoggerConfig};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn json_file_logging_from_settings_input() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let input = Input::new()
        .with("name", "integration-file-logging")
        .with("console", false)
        .with("path", log_dir.display().to_string())
        .with("json", true)
        .with("rotation", "never");
    let logger = LoggerBuilder::from(LoggerConfig::from_input(input)?).init()?;

    tracing::info!(model = "Github", "settings built");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(&log_file)?;
    let line =
        contents.lines().find(|l| l.contains("settings built")).expect("event should be logged");
    let event: serde_json::Value = serde_json::from_str(line)?;
    assert_eq!(event["fields"]["model"], "Github");

    Ok(())
}
