use eframe::egui;

use crate::state::AppState;
use crate::ui::{heatmap, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct HeatmapApp {
    pub state: AppState,
}

impl HeatmapApp {
    /// Create the app and kick off the initial download.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut state = AppState::default();
        let ctx = cc.egui_ctx.clone();
        state.start_fetch(move || ctx.request_repaint());
        Self { state }
    }
}

impl eframe::App for HeatmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_fetch();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: source, buckets, legend ----
        egui::SidePanel::left("settings_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: heat map ----
        egui::CentralPanel::default().show(ctx, |ui| {
            heatmap::heatmap_plot(ui, &self.state);
        });

        panels::error_window(ctx, &mut self.state);
    }
}
