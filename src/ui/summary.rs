use eframe::egui::{self, RichText, Ui};

use crate::state::{AppState, format_mm};

/// The three value boxes above the plot and table.
pub fn value_boxes(ui: &mut Ui, state: &AppState) {
    let summary = state.summary();
    let boxes = [
        ("Number of penguins", summary.count.to_string()),
        ("Average bill length", format_mm(&summary.mean_bill_length)),
        ("Average bill depth", format_mm(&summary.mean_bill_depth)),
    ];

    ui.columns(boxes.len(), |cols: &mut [Ui]| {
        for (ui, (title, value)) in cols.iter_mut().zip(boxes) {
            egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
                ui.set_width(ui.available_width());
                ui.label(title);
                ui.label(RichText::new(value).size(28.0).strong());
            });
        }
    });
}
