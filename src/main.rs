use std::path::PathBuf;

use log::{error, info};

use pixel_zoom::{AppConfig, LabelConfig};

/// Pick a preset from `PIXEL_ZOOM_VARIANT` (`still` or `frames`), with assets
/// under `PIXEL_ZOOM_ASSETS`.
fn config_from_env() -> AppConfig {
    let assets = std::env::var_os("PIXEL_ZOOM_ASSETS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets"));
    let variant = std::env::var("PIXEL_ZOOM_VARIANT").unwrap_or_else(|_| "still".into());

    match variant.as_str() {
        "frames" => AppConfig::flip_book(assets.join("frames")).title("Pixel Zoom (frames)"),
        other => {
            if other != "still" {
                log::warn!("unknown variant '{other}', using 'still'");
            }
            AppConfig::still(assets.join("full.png"))
                .title("Pixel Zoom")
                .label(LabelConfig::new(
                    LabelConfig::DEFAULT_TEXT,
                    assets.join("fonts").join("label.ttf"),
                ))
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config_from_env();
    info!("starting with {:?}", config.source);

    if let Err(e) = pixel_zoom::run(config) {
        error!("{e}");
        std::process::exit(1);
    }
}
