use eframe::egui;

use crate::insight::InsightAssistant;
use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MediaReportApp {
    pub state: AppState,
}

impl MediaReportApp {
    pub fn new(assistant: InsightAssistant) -> Self {
        Self {
            state: AppState::new(assistant),
        }
    }

    /// Lay out all panels for one frame.
    fn show(&mut self, ctx: &egui::Context) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: overview + metric ----
        egui::SidePanel::left("overview_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: assistant, always on screen ----
        egui::TopBottomPanel::bottom("assistant_panel")
            .resizable(true)
            .default_height(200.0)
            .height_range(120.0..=480.0)
            .show(ctx, |ui| {
                panels::assistant_section(ui, &mut self.state);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::dashboard(ui, &mut self.state);
        });
    }
}

impl eframe::App for MediaReportApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }
}
