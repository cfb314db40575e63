mod app;
mod color;
mod ui;

use app::VisitorsApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Visitantes no Parque Nacional da Tijuca",
        options,
        Box::new(|_cc| Ok(Box::new(VisitorsApp::default()))),
    )
}
