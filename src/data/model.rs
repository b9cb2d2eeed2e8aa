use serde::{Deserialize, Serialize};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Name of a 1-based month, `None` outside 1..=12.
pub fn month_name(month: u8) -> Option<&'static str> {
    MONTH_NAMES.get(usize::from(month).checked_sub(1)?).copied()
}

// ---------------------------------------------------------------------------
// Observation – one monthly anomaly reading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Observation {
    pub year: i32,
    /// 1 = January.
    pub month: u8,
    /// Deviation from the dataset's base temperature, in °C.
    pub variance: f64,
}

impl Observation {
    pub fn temperature(&self, base_temperature: f64) -> f64 {
        self.variance + base_temperature
    }
}

// ---------------------------------------------------------------------------
// TemperatureDataset – the complete downloaded document
// ---------------------------------------------------------------------------

/// Wire shape: `{ "baseTemperature": 8.66, "monthlyVariance": [...] }`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TemperatureDataset {
    #[serde(rename = "baseTemperature")]
    pub base_temperature: f64,
    #[serde(rename = "monthlyVariance")]
    pub observations: Vec<Observation>,
}

impl TemperatureDataset {
    /// Check the invariants the renderer relies on. Returns a description of
    /// the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if !self.base_temperature.is_finite() {
            return Err(format!(
                "base temperature {} is not finite",
                self.base_temperature
            ));
        }
        if self.observations.is_empty() {
            return Err("dataset has no observations".to_string());
        }
        for (i, obs) in self.observations.iter().enumerate() {
            if !(1..=12).contains(&obs.month) {
                return Err(format!("observation {i}: month {} is not in 1..=12", obs.month));
            }
            if !obs.variance.is_finite() {
                return Err(format!("observation {i}: variance is not finite"));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// `(min, max)` variance over all observations.
    pub fn variance_range(&self) -> Option<(f64, f64)> {
        min_max(self.observations.iter().map(|o| o.variance))
    }

    /// `(first, last)` year over all observations.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let min = self.observations.iter().map(|o| o.year).min()?;
        let max = self.observations.iter().map(|o| o.year).max()?;
        Some((min, max))
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
