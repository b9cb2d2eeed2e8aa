use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use thiserror::Error;

use super::model::{TemperatureDataset, month_name};

pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/freeCodeCamp/ProjectReferenceData/master/global-temperature.json";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Error {status}: {status_text}")]
    Http { status: u16, status_text: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed dataset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid dataset: {0}")]
    Invalid(String),
    #[error("reading dataset file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

pub type FetchResult = Result<TemperatureDataset, LoadError>;

// ---------------------------------------------------------------------------
// HTTP retrieval
// ---------------------------------------------------------------------------

/// Download and validate the dataset. Blocks the calling thread.
pub fn fetch_dataset(url: &str, timeout: Duration) -> FetchResult {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()?;
    let response = client.get(url).send()?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Http {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }

    let body = response.text()?;
    parse_dataset(&body)
}

/// Run [`fetch_dataset`] on a worker thread. The receiver yields exactly one
/// result; `notify` is called right after it is sent.
pub fn spawn_fetch<F>(url: String, timeout: Duration, notify: F) -> Receiver<FetchResult>
where
    F: FnOnce() + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        log::info!("Fetching dataset from {url}");
        let result = fetch_dataset(&url, timeout);
        // The receiver is gone if the app closed while we were downloading.
        if tx.send(result).is_err() {
            log::debug!("Dataset fetch finished after the receiver was dropped");
        }
        notify();
    });
    rx
}

// ---------------------------------------------------------------------------
// Local files
// ---------------------------------------------------------------------------

pub fn parse_dataset(text: &str) -> FetchResult {
    let dataset: TemperatureDataset = serde_json::from_str(text)?;
    dataset.validate().map_err(LoadError::Invalid)?;
    Ok(dataset)
}

/// Load a previously downloaded copy of the dataset.
pub fn load_file(path: &Path) -> FetchResult {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => {
            let text = std::fs::read_to_string(path)?;
            parse_dataset(&text)
        }
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CsvRow<'a> {
    year: i32,
    month: u8,
    month_name: &'a str,
    variance: f64,
    temperature: f64,
}

pub fn export_csv(dataset: &TemperatureDataset, path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for obs in &dataset.observations {
        writer
            .serialize(CsvRow {
                year: obs.year,
                month: obs.month,
                month_name: month_name(obs.month).unwrap_or_default(),
                variance: obs.variance,
                temperature: obs.temperature(dataset.base_temperature),
            })
            .context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}
