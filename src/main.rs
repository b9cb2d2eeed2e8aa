mod app;
mod color;
mod data;
mod render;
mod state;
mod ui;

use app::HeatmapApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 700.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Heatmap Panda – Global Land-Surface Temperature",
        options,
        Box::new(|cc| Ok(Box::new(HeatmapApp::new(cc)))),
    )
}
