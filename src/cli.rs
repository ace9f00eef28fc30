// CLI module - command-line argument parsing and handlers
//
// Provides subcommands for configuration management:
// - config --show: Display effective configuration
// - config --path: Print the config file location
// - config --reset: Regenerate config file with defaults
// - config --update: Rewrite config with the current layout, keeping values

use crate::config::{self, Config, VERSION};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;

/// AfriLearn - multilingual AI tutor and mentorship intake
#[derive(Parser)]
#[command(name = "afrilearn")]
#[command(version = VERSION)]
#[command(about = "Multilingual AI tutor and mentorship intake server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Rewrite config with the current layout (preserves user values)
        #[arg(long)]
        update: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Handle CLI commands. Returns true if a command was handled (exit after).
pub fn handle_cli() -> anyhow::Result<bool> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config {
            show,
            reset,
            update,
            path,
        }) => {
            if path {
                handle_config_path()?;
            } else if show {
                handle_config_show()?;
            } else if reset {
                handle_config_reset()?;
            } else if update {
                handle_config_update()?;
            } else {
                println!("Usage: afrilearn config [--show|--reset|--update|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --reset   Reset config file to defaults");
                println!("  --update  Rewrite config with the current layout (preserves user values)");
                println!("  --path    Show config file path");
            }
            Ok(true)
        }
        None => Ok(false),
    }
}

fn require_config_path() -> anyhow::Result<std::path::PathBuf> {
    Config::config_path().context("Could not determine config path")
}

fn handle_config_path() -> anyhow::Result<()> {
    println!("{}", require_config_path()?.display());
    Ok(())
}

fn secret_status(set: bool) -> &'static str {
    if set {
        "set"
    } else {
        "unset"
    }
}

fn handle_config_show() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());
    println!();
    println!("# Secrets (environment only)");
    println!(
        "#   {} = {}",
        config::env::CHAT_API_KEY,
        secret_status(config.chat.is_configured())
    );
    println!(
        "#   {} = {}",
        config::env::SPEECH_API_KEY,
        secret_status(config.speech.is_configured())
    );
    println!(
        "#   {} = {}",
        config::env::ADMIN_PASS,
        secret_status(config.admin_pass.is_some())
    );

    println!();
    let path = require_config_path()?;
    if path.exists() {
        println!("# Source: {}", path.display());
    } else {
        println!("# Source: defaults (no config file)");
    }
    Ok(())
}

fn handle_config_reset() -> anyhow::Result<()> {
    let path = require_config_path()?;

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let written = Config::default().save()?;
    println!("Config reset to defaults: {}", written.display());
    Ok(())
}

fn handle_config_update() -> anyhow::Result<()> {
    let path = require_config_path()?;

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
        return Ok(());
    }

    let existing = Config::from_env()?;

    let backup_path = path.with_extension("toml.bak");
    match std::fs::copy(&path, &backup_path) {
        Ok(_) => println!("Backup created: {}", backup_path.display()),
        Err(e) => eprintln!("Warning: Could not create backup: {}", e),
    }

    let written = existing.save()?;
    println!("Config updated with latest structure: {}", written.display());
    println!("Your values have been preserved.");
    Ok(())
}
