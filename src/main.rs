//! rigview binary
//!
//! Usage: `rigview [MODEL.obj [KEYFRAMES.dat]]`
//!
//! Without a model the viewer shows a sphere; the keyframe file defaults to
//! `key_frame.dat` in the working directory.

use rigview::ViewerConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let mut config = ViewerConfig::default();
    if let Some(model) = args.next() {
        config = config.with_model(model);
    }
    if let Some(keyframes) = args.next() {
        config = config.with_keyframe_file(keyframes);
    }

    log::info!("press h for the key bindings");
    rigview::run(config)
}
