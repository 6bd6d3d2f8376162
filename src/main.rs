mod app;
mod color;
mod config;
mod data;
mod export;
mod insight;
mod report;
mod state;
mod ui;

use app::MediaReportApp;
use eframe::egui;
use insight::InsightAssistant;

fn main() -> eframe::Result {
    env_logger::init();

    let config = config::resolve_from_env();
    let assistant = InsightAssistant::from_config(&config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Paid Media Report Processor",
        options,
        Box::new(move |_cc| Ok(Box::new(MediaReportApp::new(assistant)))),
    )
}
