use std::str::FromStr;

use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};
use thiserror::Error;

/// Reference palette: cold (purple) to hot (red).
pub const DEFAULT_PALETTE_HEX: [&str; 9] = [
    "#463A94", "#563A8C", "#6C3A83", "#8B3A75", "#AC3A66", "#B83B62", "#CE3B57", "#DE3B51",
    "#F3313E",
];

#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    #[error("palette must contain at least one color")]
    EmptyPalette,
    #[error("invalid hex color '{0}'")]
    InvalidHex(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum AllocateError {
    #[error("value {value} is outside the range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },
    #[error("invalid range [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Ordered, non-empty list of bucket colours.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Srgb<u8>>,
}

impl Default for Palette {
    fn default() -> Self {
        let colors = DEFAULT_PALETTE_HEX
            .iter()
            .filter_map(|hex| Srgb::<u8>::from_str(hex).ok())
            .collect();
        Palette { colors }
    }
}

impl Palette {
    pub fn new(colors: Vec<Srgb<u8>>) -> Result<Self, ColorError> {
        if colors.is_empty() {
            return Err(ColorError::EmptyPalette);
        }
        Ok(Palette { colors })
    }

    /// Parse `#RRGGBB` strings (the leading `#` is optional).
    pub fn from_hex<S: AsRef<str>>(hex: &[S]) -> Result<Self, ColorError> {
        let colors = hex
            .iter()
            .map(|h| {
                let h = h.as_ref();
                Srgb::<u8>::from_str(h).map_err(|_| ColorError::InvalidHex(h.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    /// Stretch or shrink the palette to `n` colours by interpolating in linear RGB.
    /// The first and last colours are preserved.
    pub fn resample(&self, n: usize) -> Result<Self, ColorError> {
        if n == 0 {
            return Err(ColorError::EmptyPalette);
        }
        if n == self.len() {
            return Ok(self.clone());
        }
        let linear: Vec<LinSrgb> = self
            .colors
            .iter()
            .map(|c| c.into_format::<f32>().into_linear())
            .collect();
        let last = (linear.len() - 1) as f32;

        let colors = (0..n)
            .map(|i| {
                let pos = if n == 1 {
                    0.0
                } else {
                    i as f32 / (n - 1) as f32 * last
                };
                let lo = pos.floor() as usize;
                let hi = (lo + 1).min(linear.len() - 1);
                let mixed = linear[lo].mix(linear[hi], pos - lo as f32);
                Srgb::<f32>::from_linear(mixed).into_format::<u8>()
            })
            .collect();
        Self::new(colors)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn colors(&self) -> &[Srgb<u8>] {
        &self.colors
    }

    pub fn get(&self, index: usize) -> Option<Srgb<u8>> {
        self.colors.get(index).copied()
    }

    fn last(&self) -> Srgb<u8> {
        // Non-empty by construction.
        self.colors[self.colors.len() - 1]
    }
}

pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}

pub fn to_color32(color: Srgb<u8>) -> Color32 {
    Color32::from_rgb(color.red, color.green, color.blue)
}

// ---------------------------------------------------------------------------
// Value → bucket allocation
// ---------------------------------------------------------------------------

/// Index of the equal-width bucket of `[min, max]` that contains `value`.
///
/// The buckets are half-open `[min + i*w, min + (i+1)*w)` except that `max`
/// itself always lands in the last bucket. A flat range (`min == max`) maps
/// everything to bucket 0.
pub fn bucket_index(value: f64, buckets: usize, min: f64, max: f64) -> Result<usize, AllocateError> {
    if !(min.is_finite() && max.is_finite()) || min > max {
        return Err(AllocateError::InvalidRange { min, max });
    }
    if !(min..=max).contains(&value) {
        return Err(AllocateError::OutOfRange { value, min, max });
    }
    let last = buckets.saturating_sub(1);
    if value == max {
        return Ok(if min == max { 0 } else { last });
    }

    let width = (max - min) / buckets as f64;
    let offset = value - min;
    let found = (0..buckets).find(|&i| {
        offset >= i as f64 * width && offset < (i + 1) as f64 * width
    });
    // Rounding can leave a value just below `max` past the last scanned bound.
    Ok(found.unwrap_or(last))
}

/// Pick the palette colour for `value` within `[min, max]`.
pub fn allocate(value: f64, palette: &Palette, min: f64, max: f64) -> Result<Srgb<u8>, AllocateError> {
    let index = bucket_index(value, palette.len(), min, max)?;
    Ok(palette.get(index).unwrap_or_else(|| palette.last()))
}

/// Absolute temperature at the lower edge of each bucket.
pub fn legend_boundaries(base: f64, min: f64, max: f64, buckets: usize) -> Vec<f64> {
    let width = (max - min) / buckets as f64;
    (0..buckets).map(|i| base + min + i as f64 * width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_of(value: f64, palette: &Palette, min: f64, max: f64) -> String {
        to_hex(allocate(value, palette, min, max).unwrap())
    }

    #[test]
    fn default_palette_has_nine_colors() {
        let palette = Palette::default();
        assert_eq!(palette.len(), 9);
        assert_eq!(to_hex(palette.colors()[0]), "#463A94");
        assert_eq!(to_hex(palette.colors()[8]), "#F3313E");
    }

    #[test]
    fn reference_example() {
        let palette = Palette::default();
        assert_eq!(hex_of(-6.0, &palette, -6.0, 4.0), "#463A94");
        assert_eq!(hex_of(4.0, &palette, -6.0, 4.0), "#F3313E");
        assert_eq!(hex_of(-1.0, &palette, -6.0, 4.0), to_hex(palette.colors()[4]));
    }

    #[test]
    fn endpoints_map_to_first_and_last() {
        let palette = Palette::default();
        for (min, max) in [(-6.0, 4.0), (0.0, 1.0), (-6.976, 5.228), (10.0, 10.5)] {
            assert_eq!(allocate(min, &palette, min, max).unwrap(), palette.colors()[0]);
            assert_eq!(allocate(max, &palette, min, max).unwrap(), palette.colors()[8]);
            assert_eq!(bucket_index(max, palette.len(), min, max).unwrap(), 8);
        }
    }

    #[test]
    fn every_in_range_value_gets_a_color() {
        let palette = Palette::default();
        let (min, max) = (-6.976, 5.228);
        for step in 0..=1000 {
            let value = min + (max - min) * step as f64 / 1000.0;
            let value = value.min(max);
            assert!(allocate(value, &palette, min, max).is_ok(), "no color for {value}");
        }
    }

    #[test]
    fn buckets_partition_the_range() {
        let n = 9;
        let (min, max) = (-6.0, 4.0);
        let width = (max - min) / n as f64;
        for i in 0..n {
            let lower = min + i as f64 * width;
            let samples = [lower + width * 0.01, lower + width * 0.5, lower + width * 0.99];
            for value in samples {
                assert_eq!(bucket_index(value, n, min, max).unwrap(), i, "value {value}");
            }
        }
        let mut previous = 0;
        for step in 0..=900 {
            let value = (min + (max - min) * step as f64 / 900.0).min(max);
            let index = bucket_index(value, n, min, max).unwrap();
            assert!(index >= previous, "bucket decreased at {value}");
            previous = index;
        }
        assert_eq!(previous, n - 1);
    }

    #[test]
    fn single_color_palette() {
        let palette = Palette::from_hex(&["#112233"]).unwrap();
        assert_eq!(hex_of(0.5, &palette, 0.0, 1.0), "#112233");
        assert_eq!(hex_of(1.0, &palette, 0.0, 1.0), "#112233");
    }

    #[test]
    fn flat_range_uses_first_bucket() {
        let palette = Palette::default();
        assert_eq!(hex_of(2.0, &palette, 2.0, 2.0), "#463A94");
    }

    #[test]
    fn rejects_out_of_contract_inputs() {
        let palette = Palette::default();
        assert_eq!(
            allocate(5.0, &palette, -6.0, 4.0),
            Err(AllocateError::OutOfRange { value: 5.0, min: -6.0, max: 4.0 })
        );
        assert!(matches!(
            allocate(f64::NAN, &palette, -6.0, 4.0),
            Err(AllocateError::OutOfRange { .. })
        ));
        assert!(matches!(
            allocate(0.0, &palette, 4.0, -6.0),
            Err(AllocateError::InvalidRange { .. })
        ));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            Palette::from_hex::<&str>(&[]),
            Err(ColorError::EmptyPalette)
        );
        assert_eq!(
            Palette::from_hex(&["#463A94", "nope"]),
            Err(ColorError::InvalidHex("nope".to_string()))
        );
    }

    #[test]
    fn resample_keeps_endpoints() {
        let palette = Palette::default();
        let five = palette.resample(5).unwrap();
        assert_eq!(five.len(), 5);
        assert_eq!(five.colors()[0], palette.colors()[0]);
        assert_eq!(five.colors()[4], palette.colors()[8]);
        assert_eq!(palette.resample(9).unwrap(), palette);
        assert_eq!(palette.resample(0), Err(ColorError::EmptyPalette));
    }

    #[test]
    fn legend_boundaries_start_at_base_plus_min() {
        let labels = legend_boundaries(8.0, -2.0, 3.0, 5);
        assert_eq!(labels, vec![6.0, 7.0, 8.0, 9.0, 10.0]);
    }
}
