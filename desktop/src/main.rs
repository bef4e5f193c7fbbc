mod app;
mod settings;

use app::MathChampionApp;
use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let profile = std::env::args().nth(1).unwrap_or_else(|| "player".to_string());
    let config = settings::load_or_default();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 480.0])
            .with_min_inner_size([360.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Math Champion",
        options,
        Box::new(move |cc| Ok(Box::new(MathChampionApp::new(cc, profile, config)))),
    )
}
