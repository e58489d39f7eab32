use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::DatasetSource;
use crate::state::AppState;

const LINKS: [(&str, &str); 6] = [
    ("GitHub Source", "https://github.com/denisecase/cintel-07-tdash"),
    ("GitHub App", "https://github.com/don4ye/cintel-07-tdash/"),
    ("GitHub Issues", "https://github.com/don4ye/cintel-07-tdash/issues"),
    ("PyShiny", "https://shiny.posit.co/py/"),
    ("Template: Basic Dashboard", "https://shiny.posit.co/py/templates/dashboard/"),
    ("See also", "https://github.com/don4ye/cintel-04-local"),
];

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter controls");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Mass ceiling ----
            ui.strong("Mass");
            let (lo, hi) = state.mass_range;
            let mut ceiling = state.filters.mass_ceiling;
            let slider = egui::Slider::new(&mut ceiling, lo..=hi)
                .step_by(1.0)
                .suffix(" g");
            if ui.add(slider).changed() {
                state.set_mass_ceiling(ceiling);
            }
            ui.add_space(8.0);

            // ---- Species ----
            ui.horizontal(|ui: &mut Ui| {
                ui.strong("Species");
                if ui.small_button("All").clicked() {
                    state.select_all_species();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_species();
                }
            });

            for (species, total) in state.table.species_counts() {
                let mut checked = state.filters.selected_species.contains(&species);
                let text = RichText::new(format!("{species}  ({total})"))
                    .color(state.color_map.color_for(species));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_species(species);
                }
            }

            ui.separator();
            ui.heading("Links");
            for (label, url) in LINKS {
                ui.hyperlink_to(label, url);
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
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload bundled data").clicked() {
                reload_bundled(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} penguins from {}, {} visible",
            state.table.len(),
            state.source,
            state.visible_indices.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open penguin data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        load_into(state, DatasetSource::File(path));
    }
}

fn reload_bundled(state: &mut AppState) {
    load_into(state, DatasetSource::Bundled);
}

/// Replace the table; on failure keep the current one and show the error.
fn load_into(state: &mut AppState, source: DatasetSource) {
    match crate::data::loader::load_source(&source) {
        Ok(table) => {
            log::info!("Loaded {} penguins from {source}", table.len());
            state.set_table(table, source);
        }
        Err(e) => {
            log::error!("Failed to load {source}: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_point_at_dashboard_resources() {
        let labels: Vec<&str> = LINKS.iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            [
                "GitHub Source",
                "GitHub App",
                "GitHub Issues",
                "PyShiny",
                "Template: Basic Dashboard",
                "See also"
            ]
        );
        assert!(LINKS.iter().all(|(_, url)| url.starts_with("https://")));
        assert_eq!(LINKS[2].1, "https://github.com/don4ye/cintel-07-tdash/issues");
    }
}
