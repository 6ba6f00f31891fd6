use clap::Args;
use colored::*;
use curvelab_core::units::format_eth;
use curvelab_core::{search, Candidate, CurveLabConfig, LaunchTargets, SearchRange};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{print_heading, print_json, OutputFormat};

#[derive(Args, Debug)]
pub struct FitArgs {
    /// Minimum E0 to scan, in ETH
    #[arg(long, default_value = "0.5")]
    pub min_e0_eth: Decimal,

    /// Maximum E0 to scan, in ETH
    #[arg(long, default_value = "6")]
    pub max_e0_eth: Decimal,

    /// Step for the E0 scan, in ETH
    #[arg(long, default_value = "0.0001")]
    pub step_e0_eth: Decimal,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct FitReport<'a> {
    #[serde(flatten)]
    candidate: &'a Candidate,
    e0_eth: String,
}

pub fn exec(args: FitArgs, config: &CurveLabConfig) -> anyhow::Result<()> {
    let targets = config.launch.targets()?;
    let range = SearchRange::from_eth(args.min_e0_eth, args.max_e0_eth, args.step_e0_eth);
    let best = search(&targets, &range)?;

    if args.format.is_json() {
        return print_json(&FitReport {
            candidate: &best,
            e0_eth: format_eth(&best.curve.e0),
        });
    }
    print_result(&best, &targets);
    Ok(())
}

fn print_result(best: &Candidate, targets: &LaunchTargets) {
    print_heading("Best parameters found");
    println!("K  = {}", best.curve.k);
    println!("T0 = {}", best.curve.t0);
    println!("E0 = {}  ({} ETH)", best.curve.e0, format_eth(&best.curve.e0));
    println!();

    print_heading("Constraint checks");
    let zero_error: BigInt = &best.t_at_zero - &targets.total_supply;
    println!("at e = 0 ETH: t = {} (error = {})", best.t_at_zero, zero_error);
    println!(
        "at e = {} ETH: t = {} (error = {})",
        targets.graduation_eth_display(),
        best.t_at_target,
        &best.t_at_target - &targets.graduation_tokens
    );
    println!(
        "absolute target error: {} token-wei",
        best.target_error.to_string().bold()
    );
}
