//! varconf-demo - inspect and edit a typed JSON configuration file.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{info, warn};
use serde_json::Value;
use varconf::{Config, variable::Container};

mod example;

use example::Example;

/// Inspect and edit a typed JSON configuration file
#[derive(Parser, Debug)]
#[command(name = "varconf-demo")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file, created with defaults if missing
    #[arg(short, long, default_value = "config.json", value_name = "FILE")]
    config: PathBuf,

    /// Keep a timestamped copy of the previous file on save
    #[arg(long)]
    backup: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the whole document
    Show,
    /// Print one value, e.g. `map.quality`
    Get {
        key: String,
    },
    /// Change one value; VALUE is JSON, bare words are taken as strings
    Set {
        key: String,
        value: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let example = Example::new().context("invalid example schema")?;
    let mut config = Config::new(&cli.config, example)?.with_backup(cli.backup);
    config
        .load()
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    match cli.command.unwrap_or(Command::Show) {
        Command::Show => show(&config),
        Command::Get { key } => println!("{}", get(&config, &key)?),
        Command::Set { key, value } => {
            set(&mut config, &key, &value)?;
            config
                .save()
                .with_context(|| format!("Failed to write {}", cli.config.display()))?;
            info!("saved {}", cli.config.display());
        }
    }
    Ok(())
}

fn show<C: Container>(config: &Config<C>) {
    println!("{}", config.path().display().to_string().bold());
    println!("{config}");
    for key in config.unaccepted().keys() {
        println!("{} {}", "retained:".yellow(), key);
    }
}

fn get<C: Container>(config: &Config<C>, key: &str) -> Result<String> {
    let variable = config
        .get_by_key(key)
        .ok_or_else(|| anyhow!("unknown key `{key}`"))?;
    let rendered = match variable.save() {
        Some(node) => node.to_string().green(),
        None => "<omitted>".dimmed(),
    };
    Ok(format!("{} = {}", key.cyan(), rendered))
}

fn set<C: Container>(config: &mut Config<C>, key: &str, raw: &str) -> Result<()> {
    let node = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    let variable = config
        .get_mut_by_key(key)
        .ok_or_else(|| anyhow!("unknown key `{key}`"))?;
    variable.load(&node);
    if !variable.is_dirty() {
        warn!("`{key}` rejected {node}");
    }
    println!("{}", get(config, key)?);
    Ok(())
}
