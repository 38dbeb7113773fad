use std::fs;
use std::time::Duration;
use tempfile::tempdir;
use trellis_logger::{LevelFilter, LogFormat, Logger};

#[test]
fn json_file_receives_events() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder("trellis-file-test")
        .console(false)
        .format(LogFormat::Json)
        .level(LevelFilter::INFO)
        .env_filter("info")
        .file(&log_dir)
        .max_files(1)
        .init()?;

    assert!(logger.has_file_output());
    assert_eq!(logger.log_dir(), Some(log_dir.as_path()));

    tracing::info!(modules = 5, "Settings finalized");
    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(log_file)?;
    let line = contents.lines().next().expect("log file should not be empty");
    let event: serde_json::Value = serde_json::from_str(line)?;
    assert_eq!(event["fields"]["message"], "Settings finalized");
    assert_eq!(event["fields"]["modules"], 5);

    Ok(())
}
