use anyhow::Result;
use eframe::egui;
use log::info;

mod app;
mod ui;

fn main() -> Result<()> {
    env_logger::init();
    info!("Starting blocktone");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 560.0])
            .with_title("blocktone"),
        ..Default::default()
    };

    eframe::run_native(
        "blocktone",
        options,
        Box::new(|cc| Ok(Box::new(app::SonifierApp::new(cc)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))
}
