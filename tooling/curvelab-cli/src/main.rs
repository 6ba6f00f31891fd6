use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
mod branding;
mod commands;

#[derive(Parser)]
#[command(name = "curvelab")]
#[command(about = "Bonding-curve fitting and concentrated-liquidity price toolkit", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (defaults to ./.curvelab.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fit K, T0, E0 against the graduation token target
    Fit(commands::fit::FitArgs),
    /// Fit K, T0, E0 against tokens, graduation fee and AMM price match
    FitGraduation(commands::graduation::GraduationArgs),
    /// Convert between price, sqrtPriceX96 and tick
    Convert(commands::convert::ConvertArgs),
    /// Derive the graduation pool tick and price constants
    PoolSettings(commands::pool::PoolArgs),
    /// Liquidity of a single-sided concentrated position
    Liquidity(commands::liquidity::LiquidityArgs),
    /// Evaluate, fit or plot a hyperbolic supply curve
    Supply(commands::supply::SupplyArgs),
    /// Tabulate bonding-curve vs AMM prices around graduation
    Transition(commands::transition::TransitionArgs),
    /// Initialize curvelab in the current directory
    Init(commands::init::InitArgs),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = || commands::load_config(cli.config.as_deref());

    match cli.command {
        Commands::Fit(args) => {
            if !args.format.is_json() {
                branding::print_logo();
            }
            commands::fit::exec(args, &config()?)?;
        }
        Commands::FitGraduation(args) => {
            if !args.format.is_json() {
                branding::print_logo();
            }
            commands::graduation::exec(args, &config()?)?;
        }
        Commands::Convert(args) => commands::convert::exec(args, &config()?)?,
        Commands::PoolSettings(args) => commands::pool::exec(args, &config()?)?,
        Commands::Liquidity(args) => commands::liquidity::exec(args)?,
        Commands::Supply(args) => commands::supply::exec(args, &config()?)?,
        Commands::Transition(args) => commands::transition::exec(args, &config()?)?,
        Commands::Init(args) => commands::init::exec(args)?,
    }

    Ok(())
}
