//! Glik: glucose readings from Nightscout or Dexcom Share in the tray.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod autostart;
mod config;
mod cycle;
mod forms;
mod icon;
mod logo;
mod present;
mod reading;
mod source;
mod theme;
mod tray;
mod worker;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "glik", version, about = "Glucose viewer for Nightscout and Dexcom Share")]
struct Cli {
    /// Start hidden in the notification area.
    #[arg(long)]
    minimized: bool,
}

const WINDOW_SIZE: [f32; 2] = [420.0, 320.0];
const WINDOW_ICON_SIZE: u32 = 64;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    log::info!("Glik {} starting (minimized: {})", env!("CARGO_PKG_VERSION"), cli.minimized);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_min_inner_size(WINDOW_SIZE)
            .with_title("Glik")
            .with_visible(!cli.minimized)
            .with_icon(egui::IconData {
                rgba: logo::logo_rgba(WINDOW_ICON_SIZE),
                width: WINDOW_ICON_SIZE,
                height: WINDOW_ICON_SIZE,
            }),
        ..Default::default()
    };
    eframe::run_native(
        "Glik",
        options,
        Box::new(|cc| Ok(Box::new(app::GlikApp::new(cc)?))),
    )
}
