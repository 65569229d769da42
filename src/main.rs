use pixelfield::{EffectConfig, EffectError, Viewer};

fn main() {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "scenes.json".to_string());

    let result = EffectConfig::load(&path)
        .map_err(EffectError::from)
        .and_then(|config| Viewer::new(config).with_title("pixelfield").run());

    if let Err(e) = result {
        eprintln!("pixelfield: {}", e);
        std::process::exit(1);
    }
}
