use clap::Args;
use colored::Colorize;
use curvelab_core::{CurveLabConfig, CONFIG_FILE_NAME};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force overwrite existing configuration file
    #[arg(short, long)]
    pub force: bool,
}

/// Writes `config` to `dir/.curvelab.toml`, refusing to replace an existing
/// file unless `force` is set.
fn write_config(config: &CurveLabConfig, dir: &Path, force: bool) -> anyhow::Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() && !force {
        eprintln!(
            "{} {} already exists in {}",
            "⚠".yellow(),
            CONFIG_FILE_NAME,
            dir.display()
        );
        eprintln!("   Use --force to overwrite the existing configuration");
        anyhow::bail!("{} already exists", CONFIG_FILE_NAME);
    }
    fs::write(&config_path, config.to_toml_string()?)?;
    Ok(config_path)
}

fn print_summary(config: &CurveLabConfig, config_path: &Path) {
    println!("{} Configuration file created successfully!", "✓".green());
    println!("   Location: {}", config_path.display());
    println!(
        "   Launch: {} tokens, graduation at {} ETH with {} tokens left",
        config.launch.total_supply, config.launch.graduation_eth, config.launch.graduation_tokens
    );
    println!(
        "   Pool: tick spacing {}, range [{}, {}]",
        config.pool.tick_spacing, config.pool.tick_lower, config.pool.tick_upper
    );
    println!(
        "   Plots: {} ({})",
        config.plot_dir.display(),
        config.plot_format.extension()
    );
}

pub fn exec(args: InitArgs) -> anyhow::Result<()> {
    let current_dir = std::env::current_dir()?;
    exec_in(args, &current_dir)
}

pub fn exec_in(args: InitArgs, dir: &Path) -> anyhow::Result<()> {
    let config = CurveLabConfig::default();
    match write_config(&config, dir, args.force) {
        Ok(config_path) => {
            print_summary(&config, &config_path);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} Failed to create configuration file", "✗".red());
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_config_creates_parseable_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config = CurveLabConfig::default();

        let config_path = write_config(&config, temp_dir.path(), false).unwrap();
        assert_eq!(config_path, temp_dir.path().join(CONFIG_FILE_NAME));

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("plot_format = \"png\""));
        let parsed = CurveLabConfig::from_toml_str(&content).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_exec_creates_config_in_temp_dir() {
        let temp_dir = TempDir::new().unwrap();

        let result = exec_in(InitArgs { force: false }, temp_dir.path());

        assert!(result.is_ok(), "exec should succeed in empty directory");
        assert!(temp_dir.path().join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_exec_with_existing_file_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "existing content").unwrap();

        let result = exec_in(InitArgs { force: false }, temp_dir.path());

        assert!(result.is_err());
        let content = fs::read_to_string(&config_path).unwrap();
        assert_eq!(content, "existing content", "File should not be modified");
    }

    #[test]
    fn test_exec_with_force_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "existing content").unwrap();

        let result = exec_in(InitArgs { force: true }, temp_dir.path());

        assert!(result.is_ok(), "exec should succeed with force flag");
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[launch]"), "Should contain default config");
        assert!(content.contains("[pool]"));
    }
}
