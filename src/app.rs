use eframe::egui;

use crate::state::{AppState, View};
use crate::ui::{panels, plot, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyRealtyApp {
    pub state: AppState,
}

impl RustyRealtyApp {
    /// Wrap a state whose sources were loaded at startup.
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for RustyRealtyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar and tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters of the active view ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: the active view ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match self.state.view {
                View::Overview => tables::overview(ui, &self.state),
                View::Region => plot::region(ui, &self.state),
                View::Attributes => plot::trends(ui, &self.state),
                View::Distribution => plot::distribution(ui, &self.state),
            });
        });
    }
}
