use eframe::egui::{self, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, summary, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PenguinDashApp {
    pub state: AppState,
}

impl PenguinDashApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for PenguinDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: value boxes, then plot | table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            summary::value_boxes(ui, &self.state);
            ui.add_space(8.0);
            ui.columns(2, |cols: &mut [Ui]| {
                plot::scatter_plot(&mut cols[0], &self.state);
                table::data_grid(&mut cols[1], &mut self.state);
            });
        });
    }
}
