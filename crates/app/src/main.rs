mod app;
mod config;
mod logging;
mod theme;
mod ui;

use eframe::egui;
use star_core::{AudioConfig, AudioSession, FileStore, Sky, StarLedger, SystemClock};

use crate::app::StarReleaseApp;
use crate::config::Config;

const TITLE: &str = "Star Release - Let Go, Find Peace";

fn main() -> anyhow::Result<()> {
    let config = Config::load();

    let _logger = match logging::init(&config.log_level) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("logging disabled: {e}");
            None
        }
    };

    let sky_dir = config.sky_dir();
    log::info!("keeping stars in {}", sky_dir.display());
    let ledger = StarLedger::load(FileStore::new(sky_dir), SystemClock::new());
    log::info!("{} stars already released on {}", ledger.count(), ledger.day());

    // The device opens on the first toggle, not here
    let audio = AudioSession::with_engine(AudioConfig {
        background_track: config.background_track.clone(),
        start_muted: config.start_muted,
    });
    let sky = Sky::new(ledger, audio);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([480.0, 520.0])
            .with_title(TITLE),
        ..Default::default()
    };

    eframe::run_native(
        TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(StarReleaseApp::new(cc, sky, config)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
