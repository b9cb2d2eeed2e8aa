use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use crate::color::{DEFAULT_PALETTE_HEX, Palette};
use crate::data::loader::{self, DEFAULT_DATASET_URL, DEFAULT_TIMEOUT, FetchResult};
use crate::data::model::TemperatureDataset;
use crate::render::{ChartConfig, HeatmapScene};

// ---------------------------------------------------------------------------
// User-adjustable settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub dataset_url: String,
    pub timeout: Duration,
    /// Comma-separated `#RRGGBB` colours, coldest first.
    pub palette: String,
    /// Number of colour buckets the palette is resampled to.
    pub buckets: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            palette: DEFAULT_PALETTE_HEX.join(", "),
            buckets: DEFAULT_PALETTE_HEX.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    pub settings: Settings,
    pub chart: ChartConfig,

    /// Loaded dataset (None until a fetch or file load succeeds).
    pub dataset: Option<TemperatureDataset>,

    /// Scene built from `dataset`; the only thing the views draw.
    pub scene: Option<HeatmapScene>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,

    /// Error that must be acknowledged in a modal window.
    pub error_dialog: Option<String>,

    /// In-flight download, if any.
    pending: Option<Receiver<FetchResult>>,
}

impl AppState {
    pub fn loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Start downloading the dataset unless a download is already running.
    /// `notify` runs on the worker once the result is ready.
    pub fn start_fetch<F>(&mut self, notify: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.loading() {
            log::debug!("Fetch already in progress");
            return;
        }
        self.status_message = Some("Downloading dataset…".to_string());
        self.pending = Some(loader::spawn_fetch(
            self.settings.dataset_url.clone(),
            self.settings.timeout,
            notify,
        ));
    }

    /// Pick up the download result if it has arrived. Never blocks.
    pub fn poll_fetch(&mut self) {
        let Some(rx) = &self.pending else {
            return;
        };
        match rx.try_recv() {
            Ok(result) => {
                self.pending = None;
                self.finish_load(result);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                self.report_error("dataset download stopped without a result".to_string());
            }
        }
    }

    /// Consume the outcome of a fetch or file load.
    pub fn finish_load(&mut self, result: FetchResult) {
        match result {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} observations (base temperature {} °C)",
                    dataset.len(),
                    dataset.base_temperature
                );
                self.set_dataset(dataset);
            }
            Err(e) => self.report_error(e.to_string()),
        }
    }

    /// Ingest a newly loaded dataset and build its scene.
    pub fn set_dataset(&mut self, dataset: TemperatureDataset) {
        self.dataset = Some(dataset);
        self.status_message = None;
        self.rebuild_scene();
    }

    /// Rebuild the scene after the dataset or the bucket count changed.
    pub fn rebuild_scene(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let colors: Vec<&str> = palette_tokens(&self.settings.palette).collect();
        let built = Palette::from_hex(&colors)
            .and_then(|base| base.resample(self.settings.buckets))
            .map_err(|e| e.to_string())
            .and_then(|palette| {
                HeatmapScene::build(dataset, &palette, &self.chart).map_err(|e| e.to_string())
            });
        match built {
            Ok(scene) => self.scene = Some(scene),
            Err(msg) => {
                // A stale scene would disagree with `dataset`.
                self.scene = None;
                self.report_error(msg);
            }
        }
    }

    pub fn set_buckets(&mut self, buckets: usize) {
        if buckets == self.settings.buckets {
            return;
        }
        self.settings.buckets = buckets;
        self.rebuild_scene();
    }

    /// Apply edited palette text; keeps the bucket count in step with it.
    pub fn set_palette(&mut self, palette: String) {
        self.settings.buckets = palette_tokens(&palette).count().max(1);
        self.settings.palette = palette;
        self.rebuild_scene();
    }

    /// Log an error and surface it in the top bar and a modal window.
    pub fn report_error(&mut self, message: String) {
        log::error!("{message}");
        self.status_message = Some(format!("Error: {message}"));
        self.error_dialog = Some(message);
    }

    pub fn dismiss_error(&mut self) {
        self.error_dialog = None;
    }
}

/// Non-empty, trimmed entries of a comma-separated palette.
fn palette_tokens(palette: &str) -> impl Iterator<Item = &str> {
    palette.split(',').map(str::trim).filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::data::loader::LoadError;
    use crate::data::model::Observation;

    fn dataset() -> TemperatureDataset {
        TemperatureDataset {
            base_temperature: 8.0,
            observations: vec![
                Observation { year: 1900, month: 1, variance: -2.0 },
                Observation { year: 1900, month: 2, variance: 0.0 },
                Observation { year: 1901, month: 1, variance: 3.0 },
            ],
        }
    }

    #[test]
    fn http_failure_leaves_view_empty() {
        let mut state = AppState::default();
        state.finish_load(Err(LoadError::Http {
            status: 404,
            status_text: "Not Found".to_string(),
        }));
        assert!(state.scene.is_none());
        assert!(state.dataset.is_none());
        assert!(state.error_dialog.as_deref().unwrap().contains("404"));
        assert!(state.status_message.as_deref().unwrap().contains("404"));

        state.dismiss_error();
        assert!(state.error_dialog.is_none());
    }

    #[test]
    fn successful_load_builds_scene() {
        let mut state = AppState::default();
        state.finish_load(Ok(dataset()));
        let scene = state.scene.as_ref().unwrap();
        assert_eq!(scene.cells.len(), 3);
        assert_eq!(scene.legend.swatches.len(), 9);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn bucket_count_changes_legend() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.set_buckets(4);
        assert_eq!(state.scene.as_ref().unwrap().legend.swatches.len(), 4);
    }

    #[test]
    fn custom_palette() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.set_palette("#0000FF, #FF0000".to_string());
        let scene = state.scene.as_ref().unwrap();
        assert_eq!(scene.legend.swatches.len(), 2);
        assert_eq!(crate::color::to_hex(scene.cells[2].fill), "#FF0000");

        state.set_palette("#0000FF, bogus".to_string());
        assert!(state.error_dialog.as_deref().unwrap().contains("bogus"));
    }

    #[test]
    fn failed_rebuild_drops_stale_scene() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.set_palette("#000000, bogus".to_string());
        state.dismiss_error();

        let newer = TemperatureDataset {
            base_temperature: 9.0,
            observations: vec![
                Observation { year: 2000, month: 1, variance: 0.5 },
                Observation { year: 2001, month: 1, variance: 1.5 },
            ],
        };
        state.finish_load(Ok(newer));
        assert_eq!(state.dataset.as_ref().unwrap().year_range(), Some((2000, 2001)));
        assert!(state.scene.is_none());
        assert!(state.error_dialog.is_some());

        state.set_palette("#000000, #FFFFFF".to_string());
        assert_eq!(state.scene.as_ref().unwrap().years, (2000, 2001));
    }

    #[test]
    fn trailing_comma_in_palette_is_ignored() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.set_palette("#0000FF, #FF0000,".to_string());
        assert!(state.error_dialog.is_none());
        assert_eq!(state.settings.buckets, 2);
        assert_eq!(state.scene.as_ref().unwrap().legend.swatches.len(), 2);
    }

    #[test]
    fn poll_picks_up_channel_result() {
        let mut state = AppState::default();
        let (tx, rx) = mpsc::channel();
        state.pending = Some(rx);
        assert!(state.loading());

        state.poll_fetch();
        assert!(state.loading());

        tx.send(Ok(dataset())).unwrap();
        state.poll_fetch();
        assert!(!state.loading());
        assert!(state.scene.is_some());
    }

    #[test]
    fn dropped_worker_is_reported() {
        let mut state = AppState::default();
        let (tx, rx) = mpsc::channel::<FetchResult>();
        state.pending = Some(rx);
        drop(tx);
        state.poll_fetch();
        assert!(!state.loading());
        assert!(state.error_dialog.is_some());
    }
}
