use crate::args::OutputFormat;
use crate::presentation::console;
use anyhow::{Context, Result};
use buildscan_runtime::Config;
use std::path::{Path, PathBuf};

fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(Config::default_path()?),
    }
}

pub fn show(explicit: Option<&Path>, format: OutputFormat) -> Result<()> {
    let path = config_path(explicit)?;
    let config = Config::load(explicit)?;

    match format {
        OutputFormat::Plain => {
            let source = if path.exists() {
                path.display().to_string()
            } else {
                format!("{} (not found, using defaults)", path.display())
            };
            println!("# {}", source);
            print!("{}", toml::to_string_pretty(&config)?);
        }
        OutputFormat::Json => console::print_json(&config)?,
    }
    Ok(())
}

pub fn init(explicit: Option<&Path>, force: bool) -> Result<()> {
    let path = config_path(explicit)?;
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    Config::default()
        .save_to(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
