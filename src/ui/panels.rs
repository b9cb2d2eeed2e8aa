use std::path::Path;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::to_color32;
use crate::data::loader;
use crate::render::{html, raster};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – source, buckets, summary, legend
// ---------------------------------------------------------------------------

/// Render the left settings / legend panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Dataset");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Source URL");
            ui.add(
                egui::TextEdit::singleline(&mut state.settings.dataset_url)
                    .desired_width(f32::INFINITY),
            );
            ui.horizontal(|ui: &mut Ui| {
                if ui
                    .add_enabled(!state.loading(), egui::Button::new("Fetch"))
                    .clicked()
                {
                    start_fetch(ui, state);
                }
                if state.loading() {
                    ui.spinner();
                }
            });
            ui.separator();

            ui.strong("Palette");
            let mut palette = state.settings.palette.clone();
            let edit = ui.add(
                egui::TextEdit::multiline(&mut palette)
                    .desired_rows(2)
                    .desired_width(f32::INFINITY),
            );
            if edit.lost_focus() && palette != state.settings.palette {
                state.set_palette(palette);
            }

            let mut buckets = state.settings.buckets;
            if ui
                .add(egui::Slider::new(&mut buckets, 1..=15).text("Color buckets"))
                .changed()
            {
                state.set_buckets(buckets);
            }
            ui.separator();

            let Some(scene) = &state.scene else {
                ui.label("No dataset loaded.");
                return;
            };

            egui::Grid::new("summary")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    ui.label("Years");
                    ui.label(format!("{} – {}", scene.years.0, scene.years.1));
                    ui.end_row();

                    ui.label("Observations");
                    ui.label(scene.cells.len().to_string());
                    ui.end_row();

                    ui.label("Base temperature");
                    ui.label(format!("{} °C", scene.base_temperature));
                    ui.end_row();

                    ui.label("Variance");
                    ui.label(format!(
                        "{:.3} … {:.3} °C",
                        scene.variance_range.0, scene.variance_range.1
                    ));
                    ui.end_row();
                });
            ui.separator();

            ui.strong("Temperature Range (°C)");
            for swatch in &scene.legend.swatches {
                ui.horizontal(|ui: &mut Ui| {
                    let (rect, _) =
                        ui.allocate_exact_size(egui::vec2(18.0, 14.0), egui::Sense::hover());
                    ui.painter().rect_filled(rect, 2.0, to_color32(swatch.fill));
                    ui.label(format!("≥ {:.1}", swatch.lower));
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui
                .add_enabled(!state.loading(), egui::Button::new("Fetch dataset"))
                .clicked()
            {
                start_fetch(ui, state);
                ui.close_menu();
            }
            if ui.button("Open JSON…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            let has_scene = state.scene.is_some();
            for export in [Export::Html, Export::Png, Export::Csv] {
                if ui
                    .add_enabled(has_scene, egui::Button::new(export.menu_label()))
                    .clicked()
                {
                    save_file_dialog(state, export);
                    ui.close_menu();
                }
            }
            ui.separator();
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        if let Some(scene) = &state.scene {
            ui.label(RichText::new(&scene.title).strong());
            ui.label(&scene.description);
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Error notification
// ---------------------------------------------------------------------------

/// Modal error window; stays until the user dismisses it.
pub fn error_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(message) = state.error_dialog.clone() else {
        return;
    };
    egui::Window::new("Error")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui: &mut Ui| {
            ui.label(message);
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                state.dismiss_error();
            }
        });
}

fn start_fetch(ui: &Ui, state: &mut AppState) {
    let ctx = ui.ctx().clone();
    state.start_fetch(move || ctx.request_repaint());
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open temperature dataset")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.finish_load(loader::load_file(&path));
    }
}

#[derive(Debug, Clone, Copy)]
enum Export {
    Html,
    Png,
    Csv,
}

impl Export {
    fn menu_label(self) -> &'static str {
        match self {
            Export::Html => "Export HTML…",
            Export::Png => "Export PNG…",
            Export::Csv => "Export CSV…",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Export::Html => "html",
            Export::Png => "png",
            Export::Csv => "csv",
        }
    }

    fn write(self, state: &AppState, path: &Path) -> anyhow::Result<()> {
        match (self, &state.scene, &state.dataset) {
            (Export::Html, Some(scene), _) => html::write_document(scene, path),
            (Export::Png, Some(scene), _) => raster::write_png(scene, path),
            (Export::Csv, _, Some(dataset)) => loader::export_csv(dataset, path),
            _ => anyhow::bail!("nothing to export yet"),
        }
    }
}

fn save_file_dialog(state: &mut AppState, export: Export) {
    let ext = export.extension();
    let file = rfd::FileDialog::new()
        .set_title(export.menu_label().trim_end_matches('…'))
        .set_file_name(format!("global-temperature.{ext}"))
        .add_filter(ext.to_ascii_uppercase(), &[ext])
        .save_file();

    if let Some(path) = file {
        match export.write(state, &path) {
            Ok(()) => log::info!("Exported {}", path.display()),
            Err(e) => state.report_error(format!("{e:#}")),
        }
    }
}
