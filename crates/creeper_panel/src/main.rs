mod app;
mod config;
mod effects;
mod render;

use std::path::PathBuf;

use anyhow::Result;

use crate::app::SettingRequest;
use crate::config::{PanelConfig, DEFAULT_CONFIG_FILE};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let config_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let requests = args
        .map(|arg| SettingRequest::parse(&arg))
        .collect::<Result<Vec<_>>>()?;

    let config = PanelConfig::load(&config_path)?;
    creeper_logging::initialize(config.log_destination, config.log_level);

    app::run(&config, requests)
}
