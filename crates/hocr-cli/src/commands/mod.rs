//! Subcommands.

pub mod batch;
pub mod config;
pub mod detect;
pub mod parse;
pub mod score;

use std::fs;
use std::path::{Path, PathBuf};

use console::style;

use hocr_core::models::config::HocrConfig;

/// Load configuration from an explicit path, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<HocrConfig> {
    if let Some(path) = config_path {
        return Ok(HocrConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        Ok(HocrConfig::from_file(&default_path)?)
    } else {
        Ok(HocrConfig::default())
    }
}

/// Write command output to a file, or to stdout when no path is given.
pub fn write_output(output: Option<&PathBuf>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            println!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", content),
    }
    Ok(())
}
