//! Replays a configurator session headlessly.
//!
//! `configurator <session.json>` loads the model, textures and environment the
//! session names, feeds its recorded input events through the configurator
//! and logs the resulting configuration.

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("Shoe configurator {}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().collect();
    if let Err(err) = configurator::app::run(&args) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
