mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::{Context, Result};
use app::RustyRealtyApp;
use config::Config;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_env()?.with_args(std::env::args().skip(1));
    log::info!(
        "Sales source {}, boundary source {}",
        config.sales_path.display(),
        config.geo_source
    );
    let sales_path = config.sales_path.display().to_string();
    let geo_source = config.geo_source.clone();
    let state = AppState::startup(config).with_context(|| {
        format!("loading sales from {sales_path} and boundaries from {geo_source}")
    })?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Realty – Sales Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(RustyRealtyApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard: {e}"))
}
