//! Visual designer for application window schemes, built on `egui`.

mod app;
mod highlight;

use crate::app::DesignerApp;

use clap::Parser;
use eframe::egui;
use tracing_subscriber::EnvFilter;
use window_designer::config::Config;

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log));
    // a subscriber may already be installed by the host
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

fn main() -> eframe::Result<()> {
    let config = Config::parse();
    init_tracing(&config);

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = egui::ViewportBuilder::default()
        .with_inner_size(egui::vec2(1280.0, 800.0))
        .with_min_inner_size(egui::vec2(800.0, 500.0))
        .with_resizable(true);

    eframe::run_native(
        "Window Designer",
        native_options,
        Box::new(|_cc| Ok(Box::new(DesignerApp::new(config)))),
    )
}
