/// Data layer: core types, retrieval, and export.
///
/// Architecture:
/// ```text
///  HTTPS (global-temperature.json) / local .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch on a worker thread → Result<TemperatureDataset>
///   └──────────┘
///        │
///        ▼
///   ┌────────────────────┐
///   │ TemperatureDataset  │  base temperature + Vec<Observation>
///   └────────────────────┘
///        │
///        ▼
///   render::HeatmapScene (pure, synchronous)
/// ```

pub mod loader;
pub mod model;
