use mystery_gift::{config, logging, probe, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("mg-probe error: {}", e);
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

    probe::run(&loaded.config.probe)?;
    Ok(())
}
