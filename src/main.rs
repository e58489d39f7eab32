mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use anyhow::Context;
use app::PenguinDashApp;
use config::DashConfig;
use eframe::egui;
use error::DashError;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashConfig::from_env().context("resolving configuration")?;
    let source = config.source();

    let table = match data::loader::load_source(&source) {
        Ok(table) => table,
        Err(e) => {
            let err = DashError::configuration(source.to_string(), &e);
            log::error!("{err}");
            return Err(err.into());
        }
    };
    log::info!("Loaded {} penguins from {source}", table.len());

    let state = AppState::new(table, source, &config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Penguins Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(PenguinDashApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running UI: {e}"))
}
