use std::ops::RangeInclusive;

use eframe::egui::{self, Stroke, Ui};
use egui_plot::{GridInput, GridMark, Plot, PlotPoints, Polygon};

use crate::color::to_color32;
use crate::data::model::month_name;
use crate::render::Cell;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Heat map (central panel)
// ---------------------------------------------------------------------------
//
// Plot coordinates: a cell spans x ∈ [year, year + 1] and
// y ∈ [12 - month, 13 - month], so January is the top row.

const HOVER_OPACITY: f32 = 0.8;

/// Render the year × month heat map with a hover tooltip.
pub fn heatmap_plot(ui: &mut Ui, state: &AppState) {
    let scene = match &state.scene {
        Some(scene) => scene,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                if state.loading() {
                    ui.spinner();
                } else {
                    ui.heading("No data  (File → Fetch dataset)");
                }
            });
            return;
        }
    };

    let (min_year, max_year) = scene.years;

    let response = Plot::new("heatmap_plot")
        .x_axis_label("Year")
        .y_axis_label("Month")
        .include_x(f64::from(min_year))
        .include_x(f64::from(max_year) + 1.0)
        .include_y(0.0)
        .include_y(12.0)
        .show_x(false)
        .show_y(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            format!("{:.0}", mark.value)
        })
        .y_grid_spacer(month_marks)
        .y_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            month_at(mark.value)
                .and_then(month_name)
                .unwrap_or_default()
                .to_string()
        })
        .show(ui, |plot_ui| {
            let hovered = plot_ui.pointer_coordinate().and_then(|p| {
                let month = month_at(p.y)?;
                scene.cell(p.x.floor() as i32, month)
            });

            for cell in &scene.cells {
                let mut fill = to_color32(cell.fill);
                if hovered.is_some_and(|h| std::ptr::eq(h, cell)) {
                    fill = fill.gamma_multiply(HOVER_OPACITY);
                }
                plot_ui.polygon(
                    Polygon::new(cell_outline(cell))
                        .fill_color(fill)
                        .stroke(Stroke::NONE),
                );
            }

            hovered.cloned()
        });

    if let Some(cell) = response.inner {
        response.response.on_hover_ui_at_pointer(|ui: &mut Ui| {
            tooltip(ui, &cell, scene.base_temperature);
        });
    }
}

fn tooltip(ui: &mut Ui, cell: &Cell, base_temperature: f64) {
    ui.strong(format!("{} {}", cell.month_name(), cell.year));
    ui.label(format!("{:.2} °C", cell.variance + base_temperature));
    ui.label(egui::RichText::new(format!("{} °C", cell.variance)).weak());
}

/// 1-based month of the row containing plot y-coordinate `y`.
fn month_at(y: f64) -> Option<u8> {
    let month = 12 - y.floor() as i64;
    u8::try_from(month).ok().filter(|m| (1..=12).contains(m))
}

/// One grid mark per row, centred on the row.
fn month_marks(_input: GridInput) -> Vec<GridMark> {
    (0..12)
        .map(|row| GridMark {
            value: f64::from(row) + 0.5,
            step_size: 1.0,
        })
        .collect()
}

fn cell_outline(cell: &Cell) -> PlotPoints<'static> {
    let x0 = f64::from(cell.year);
    let y0 = f64::from(12 - cell.month);
    vec![[x0, y0], [x0 + 1.0, y0], [x0 + 1.0, y0 + 1.0], [x0, y0 + 1.0]].into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_map_to_months() {
        assert_eq!(month_at(11.5), Some(1));
        assert_eq!(month_at(0.2), Some(12));
        assert_eq!(month_at(12.0), None);
        assert_eq!(month_at(-0.5), None);
    }

    #[test]
    fn twelve_month_marks() {
        let marks = month_marks(GridInput {
            bounds: (0.0, 12.0),
            base_step_size: 1.0,
        });
        assert_eq!(marks.len(), 12);
        assert_eq!(month_at(marks[11].value), Some(1));
    }
}
