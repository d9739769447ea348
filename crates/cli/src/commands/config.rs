//! `tsundoku config` handlers.

use eyre::Result;

use crate::cli::ConfigCommands;
use crate::config::Config;
use crate::utils::confirm;

pub async fn handle_config_command(cmd: ConfigCommands, dry_run: bool) -> Result<()> {
    match cmd {
        ConfigCommands::Set { key, value } => handle_set_config(&key, &value, dry_run).await,
        ConfigCommands::Get { key } => {
            let config = Config::load().await?;
            println!("{}: {}", key, config.get_value(&key)?);
            Ok(())
        }
        ConfigCommands::Show => {
            let config = Config::load().await?;
            println!("{}", config.show_all());
            println!("File: {}", Config::get_config_path().display());
            Ok(())
        }
        ConfigCommands::Reset { force } => handle_reset_config(force, dry_run).await,
    }
}

async fn handle_set_config(key: &str, value: &str, dry_run: bool) -> Result<()> {
    let mut config = Config::load().await?;
    let previous = config.get_value(key)?;

    // Validate even on a dry run.
    if let Err(e) = config.set_value(key, value) {
        println!("❌ Failed to set configuration: {}", e);
        return Err(e);
    }
    let current = config.get_value(key)?;

    if dry_run {
        println!("Would set config: {} = {} (was {})", key, current, previous);
        return Ok(());
    }

    config.save().await?;
    println!("✅ Configuration updated: {} = {}", key, current);
    if key.starts_with("library.") {
        println!("💡 Applies from the next command; existing books are not reordered");
    }
    Ok(())
}

async fn handle_reset_config(force: bool, dry_run: bool) -> Result<()> {
    if dry_run {
        println!("Would reset configuration to defaults");
        return Ok(());
    }

    if !force && !confirm("Reset all configuration to defaults? (y/N): ")? {
        println!("❌ Cancelled");
        return Ok(());
    }

    Config::reset().await?;
    println!("✅ Configuration reset to defaults");
    Ok(())
}
