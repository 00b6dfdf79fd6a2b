//! Layered configuration: a TOML file overridden by `CITYWASTE_*` variables.

use std::path::Path;

use anyhow::{Context, Result};
use citywaste_core::CityWasteConfig;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};

const ENV_PREFIX: &str = "CITYWASTE_";

/// Load and validate the configuration rooted at `path`.
pub(crate) fn load(path: &Path) -> Result<CityWasteConfig> {
    let figment = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX));

    extract(&figment).with_context(|| format!("invalid configuration in {}", path.display()))
}

fn extract(figment: &Figment) -> Result<CityWasteConfig> {
    let config: CityWasteConfig = figment.extract()?;
    config.validate()?;
    Ok(config)
}
