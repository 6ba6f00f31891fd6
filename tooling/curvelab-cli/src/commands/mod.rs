use anyhow::Context;
use clap::ValueEnum;
use colored::*;
use curvelab_core::CurveLabConfig;
use serde::Serialize;
use std::env;
use std::path::Path;

pub mod convert;
pub mod fit;
pub mod graduation;
pub mod init;
pub mod liquidity;
pub mod pool;
pub mod supply;
pub mod transition;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        self == OutputFormat::Json
    }
}

/// Explicit `--config` path, else `.curvelab.toml` in the working directory,
/// else built-in defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<CurveLabConfig> {
    match path {
        Some(path) => CurveLabConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(CurveLabConfig::discover(&env::current_dir()?)?),
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_heading(title: &str) {
    println!("{}", title.cyan().bold());
    println!("{}", "-".repeat(title.len()).dimmed());
}
