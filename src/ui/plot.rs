use eframe::egui::Ui;
use egui_plot::{Legend, MarkerShape, Plot, PlotPoints, Points};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Bill length vs depth scatter plot
// ---------------------------------------------------------------------------

/// Render the scatter plot of the current view, one series per species.
pub fn scatter_plot(ui: &mut Ui, state: &AppState) {
    ui.strong("Bill length and depth");

    if state.table.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No penguins loaded. Use File → Open… to pick a dataset.");
        });
        return;
    }

    let view = state.view();
    if view.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No penguins match the current filters.");
        });
        return;
    }

    Plot::new("length_depth")
        .legend(Legend::default())
        .x_axis_label("bill_length_mm")
        .y_axis_label("bill_depth_mm")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (species, points) in view.scatter_series() {
                let color = state.color_map.color_for(species).gamma_multiply(0.8);
                let markers = Points::new(PlotPoints::from(points))
                    .name(species.as_str())
                    .color(color)
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(4.0);
                plot_ui.points(markers);
            }
        });
}
