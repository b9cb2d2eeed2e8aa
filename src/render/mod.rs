//! Rendering stage: turns a dataset into a positioned scene.
//!
//! Everything here is synchronous and free of I/O so a scene can be built
//! and checked without a network or a window. The scene is consumed by the
//! egui viewer (`ui::heatmap`), the HTML writer and the PNG writer.

pub mod html;
pub mod raster;
pub mod scale;

use std::collections::HashMap;

use palette::Srgb;
use thiserror::Error;

use crate::color::{AllocateError, Palette, allocate, legend_boundaries};
use crate::data::model::{MONTH_NAMES, TemperatureDataset};
use scale::LinearScale;

pub const TITLE: &str = "Monthly Global Land-Surface Temperature";

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("dataset has no observations")]
    EmptyDataset,
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
    #[error(transparent)]
    Allocate(#[from] AllocateError),
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Pixel geometry of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub legend_width: f64,
    /// Approximate number of year ticks.
    pub year_ticks: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 500.0,
            padding: 75.0,
            legend_width: 300.0,
            year_ticks: 20,
        }
    }
}

impl ChartConfig {
    /// Top edge of the January row.
    pub fn plot_top(&self) -> f64 {
        self.padding / 2.0
    }

    /// Where the year axis sits.
    pub fn plot_bottom(&self) -> f64 {
        self.height - self.padding
    }

    pub fn row_height(&self) -> f64 {
        (self.plot_bottom() - self.plot_top()) / 12.0
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Srgb<u8>,
    pub year: i32,
    /// 1 = January.
    pub month: u8,
    pub variance: f64,
    pub temperature: f64,
}

impl Cell {
    /// 0-based month, as exposed in `data-month`.
    pub fn month_index(&self) -> u8 {
        self.month.saturating_sub(1)
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[usize::from(self.month_index())]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Swatch {
    pub x: f64,
    pub size: f64,
    pub fill: Srgb<u8>,
    /// Absolute temperature at the bucket's lower edge.
    pub lower: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub width: f64,
    pub swatches: Vec<Swatch>,
    pub ticks: Vec<Tick>,
}

impl Legend {
    pub fn swatch_size(&self) -> f64 {
        self.swatches.first().map_or(0.0, |s| s.size)
    }
}

/// Everything needed to draw one heat map.
#[derive(Debug, Clone)]
pub struct HeatmapScene {
    pub config: ChartConfig,
    pub title: String,
    pub description: String,
    pub base_temperature: f64,
    pub years: (i32, i32),
    pub variance_range: (f64, f64),
    pub cells: Vec<Cell>,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    pub legend: Legend,
    index: HashMap<(i32, u8), usize>,
}

impl HeatmapScene {
    pub fn build(
        dataset: &TemperatureDataset,
        palette: &Palette,
        config: &ChartConfig,
    ) -> Result<Self, RenderError> {
        let (min_year, max_year) = dataset.year_range().ok_or(RenderError::EmptyDataset)?;
        dataset.validate().map_err(RenderError::InvalidDataset)?;
        let (min_var, max_var) = dataset.variance_range().ok_or(RenderError::EmptyDataset)?;
        let base = dataset.base_temperature;

        let columns = f64::from(max_year - min_year + 1);
        let x_scale = LinearScale::new(
            (f64::from(min_year), f64::from(max_year) + 1.0),
            (config.padding, config.width - config.padding),
        );
        let cell_width = (config.width - 2.0 * config.padding) / columns;
        let row_height = config.row_height();

        let mut cells = Vec::with_capacity(dataset.len());
        let mut index = HashMap::with_capacity(dataset.len());
        for obs in &dataset.observations {
            let fill = allocate(obs.variance, palette, min_var, max_var)?;
            index.insert((obs.year, obs.month), cells.len());
            cells.push(Cell {
                x: x_scale.apply(f64::from(obs.year)),
                y: config.plot_top() + f64::from(obs.month.saturating_sub(1)) * row_height,
                width: cell_width,
                height: row_height,
                fill,
                year: obs.year,
                month: obs.month,
                variance: obs.variance,
                temperature: obs.temperature(base),
            });
        }

        let x_ticks = year_ticks(min_year, max_year, config.year_ticks)
            .into_iter()
            .map(|year| Tick {
                position: x_scale.apply(f64::from(year) + 0.5),
                label: year.to_string(),
            })
            .collect();

        let y_ticks = MONTH_NAMES
            .iter()
            .enumerate()
            .map(|(m, name)| Tick {
                position: config.plot_top() + (m as f64 + 0.5) * row_height,
                label: (*name).to_string(),
            })
            .collect();

        let legend = build_legend(palette, base, min_var, max_var, config.legend_width);

        Ok(HeatmapScene {
            config: config.clone(),
            title: TITLE.to_string(),
            description: format!(
                "Monthly heat map from {min_year} to {max_year} ; Base Temperature : {base} °C"
            ),
            base_temperature: base,
            years: (min_year, max_year),
            variance_range: (min_var, max_var),
            cells,
            x_ticks,
            y_ticks,
            legend,
            index,
        })
    }

    /// Cell for a given year and 1-based month.
    pub fn cell(&self, year: i32, month: u8) -> Option<&Cell> {
        self.index.get(&(year, month)).map(|&i| &self.cells[i])
    }
}

/// Whole years between `min` and `max`, roughly `count` of them.
fn year_ticks(min: i32, max: i32, count: usize) -> Vec<i32> {
    if min == max {
        return vec![min];
    }
    // 1, 2 or 5 × 10^k, never finer than one year.
    let step = scale::tick_step(f64::from(min), f64::from(max), count).max(1.0).round() as i32;
    (min..=max).filter(|year| year.rem_euclid(step) == 0).collect()
}

fn build_legend(palette: &Palette, base: f64, min: f64, max: f64, width: f64) -> Legend {
    let n = palette.len();
    let size = width / n as f64;
    let boundaries = legend_boundaries(base, min, max, n);
    let scale = LinearScale::new((min + base, max + base), (0.0, width));

    let swatches = palette
        .colors()
        .iter()
        .zip(&boundaries)
        .enumerate()
        .map(|(i, (&fill, &lower))| Swatch {
            x: i as f64 * size,
            size,
            fill,
            lower,
        })
        .collect();

    let ticks = boundaries
        .iter()
        .map(|&t| Tick {
            position: scale.apply(t),
            label: format!("{t:.1}"),
        })
        .collect();

    Legend { width, swatches, ticks }
}
