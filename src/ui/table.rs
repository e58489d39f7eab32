use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::grid::{GridColumn, GridSort, visible_rows};
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;
const HEADER_HEIGHT: f32 = 46.0;

// ---------------------------------------------------------------------------
// Penguin data grid
// ---------------------------------------------------------------------------

/// Render the filtered view as a sortable table with per-column filters.
pub fn data_grid(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Penguin Data");
        if state.grid_filters.is_active() && ui.small_button("Clear filters").clicked() {
            state.grid_filters.clear();
        }
    });

    let rows = state.view().table_rows();
    let shown = visible_rows(&rows, &state.grid_filters, state.grid_sort);
    ui.label(format!("{} of {} rows", shown.len(), rows.len()));

    let mut clicked_column = None;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .columns(Column::auto().at_least(90.0), GridColumn::ALL.len())
        .header(HEADER_HEIGHT, |mut header| {
            for column in GridColumn::ALL {
                header.col(|ui: &mut Ui| {
                    ui.vertical(|ui: &mut Ui| {
                        let arrow = match state.grid_sort {
                            Some(GridSort { column: c, ascending: true }) if c == column => " ⬆",
                            Some(GridSort { column: c, ascending: false }) if c == column => " ⬇",
                            _ => "",
                        };
                        let title = format!("{}{arrow}", column.title());
                        if ui.button(RichText::new(title).strong()).clicked() {
                            clicked_column = Some(column);
                        }

                        let invalid = state.grid_filters.is_invalid(column);
                        let hint = if column.is_numeric() { "min..max" } else { "contains" };
                        let mut edit = egui::TextEdit::singleline(state.grid_filters.get_mut(column))
                            .hint_text(hint)
                            .desired_width(80.0);
                        if invalid {
                            edit = edit.text_color(Color32::RED);
                        }
                        ui.add(edit);
                    });
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, shown.len(), |mut row| {
                let record = &rows[shown[row.index()]];
                for column in GridColumn::ALL {
                    row.col(|ui: &mut Ui| {
                        ui.label(column.display(record));
                    });
                }
            });
        });

    if let Some(column) = clicked_column {
        state.grid_sort = GridSort::cycle(state.grid_sort, column);
    }
}
