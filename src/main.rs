#![allow(dead_code)] // API surface kept for upcoming tools and scripting hooks

mod app;
mod canvas;
mod cli;
mod components;
mod engine;
mod io;
pub mod logger;
mod ops;
mod pipeline;
mod presets;
mod project;

use app::PhotoFEApp;
use eframe::egui;

fn main() -> Result<(), eframe::Error> {
    // -- CLI / headless mode ---------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        use clap::Parser;
        let args = cli::CliArgs::parse();
        let ok = cli::run(args);
        std::process::exit(if ok { 0 } else { 1 });
    }

    // -- GUI mode -----------------------------------------------------

    // Initialize session log (overwrites previous session log)
    logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_maximized(true)
            .with_title("PhotoFE"),
        ..Default::default()
    };

    eframe::run_native(
        "PhotoFE",
        options,
        Box::new(|cc| Box::new(PhotoFEApp::new(cc))),
    )
}
