use mystery_gift::{config, logging, refresh, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("mg-refresh error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let loaded = config::load()?;
    logging::init();
    if let Some(path) = &loaded.config_path {
        tracing::info!("Loaded config from {}", path.display());
    }
    if let Some(path) = &loaded.env_path {
        tracing::debug!("Environment loaded from {}", path.display());
    }

    let cfg = &loaded.config.refresh;
    tracing::info!(
        path = %cfg.path.display(),
        collection = %cfg.collection,
        days = cfg.validity_days,
        "refreshing gift windows"
    );
    refresh::run(cfg)?;
    Ok(())
}
