// Prevents console window in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
// The window layer is Windows-only; elsewhere only the tests use the model
#![cfg_attr(not(windows), allow(dead_code))]

mod config;
mod geometry;
mod keys;
mod logging;
#[cfg(windows)]
mod overlay;
mod sheet;

fn main() -> anyhow::Result<()> {
    let loaded = config::load_config();
    let cfg = loaded.as_ref().cloned().unwrap_or_default();

    logging::init(cfg.debug_logging);
    match &loaded {
        Ok(_) => tracing::debug!(path = %config::config_path().display(), "config loaded"),
        Err(err) => tracing::warn!("{err:#}; using default settings"),
    }

    run(&cfg)
}

#[cfg(windows)]
fn run(cfg: &config::AppConfig) -> anyhow::Result<()> {
    let screen = overlay::screen_size();
    let sheet = sheet::Sheet::new(screen, cfg.behavior(), cfg.color(), cfg.alpha_level);
    tracing::info!(?screen, geometry = ?sheet.geometry(), "starting RedSheet");
    overlay::run(sheet)
}

#[cfg(not(windows))]
fn run(_cfg: &config::AppConfig) -> anyhow::Result<()> {
    tracing::error!("RedSheet needs a Windows desktop");
    anyhow::bail!("unsupported platform: the overlay window is implemented for Windows only")
}
