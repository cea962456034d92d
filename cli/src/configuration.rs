use anyhow::{Context, Result};
use serde::Deserialize;

use conflation::ConflationOptions;
use map_align::AlignOptions;

/// Settings read from a TOML file. Anything missing takes the same default as the command-line
/// flag.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub conflation: ConflationOptions,
    pub align: AlignOptions,
}

pub fn load_configuration(path: &str) -> Result<Configuration> {
    let text = fs_err::read_to_string(path)?;
    let config = parse(&text).with_context(|| format!("parsing {}", path))?;
    info!("Using settings from {}", path);
    Ok(config)
}

fn parse(text: &str) -> Result<Configuration> {
    Ok(toml::from_str(text)?)
}
