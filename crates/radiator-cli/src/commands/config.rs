//! Config command implementation.

use std::io::Write;

use anyhow::{Context, Result};

use crate::cli::ConfigAction;
use crate::config::Config;

pub fn cmd_config(action: ConfigAction, config: &Config, out: &mut impl Write) -> Result<()> {
    match action {
        ConfigAction::Path => {
            writeln!(out, "{}", Config::path().display())?;
        }
        ConfigAction::Show => {
            let content = config
                .to_display_toml()
                .context("Failed to render config")?;
            write!(out, "{}", content)?;
        }
    }
    Ok(())
}
