use clap::Args;
use colored::*;
use curvelab_core::plot::{plot_price_comparison, plot_token_reserves};
use curvelab_core::transition::{transition_table, EthScan, TransitionTable};
use curvelab_core::units::{format_eth, to_wei};
use curvelab_core::{
    search_with_fee, CurveLabConfig, Fixed, GraduationSearch, LaunchTargets, ReservesCurve,
    ScoreWeights, SearchRange,
};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;

use super::{print_heading, print_json, OutputFormat};

#[derive(Args, Debug)]
pub struct TransitionArgs {
    /// Curve constant K (token-wei * wei); fitted when omitted
    #[arg(long, requires_all = ["t0", "e0"])]
    pub k: Option<BigInt>,

    /// Virtual token offset T0, in token-wei
    #[arg(long, requires_all = ["k", "e0"])]
    pub t0: Option<BigInt>,

    /// Virtual ETH offset E0, in wei
    #[arg(long, requires_all = ["k", "t0"])]
    pub e0: Option<BigInt>,

    /// First ETH reserve to tabulate (defaults to graduation ETH - 0.2)
    #[arg(long)]
    pub from_eth: Option<Decimal>,

    /// Last ETH reserve to tabulate (defaults to graduation ETH + 0.1)
    #[arg(long)]
    pub to_eth: Option<Decimal>,

    /// ETH reserve increment
    #[arg(long, default_value = "0.001")]
    pub step_eth: Decimal,

    /// Graduation fee in ETH (defaults to the configured fee)
    #[arg(long)]
    pub fee_eth: Option<Decimal>,

    /// Write charts to the configured plot directory
    #[arg(long)]
    pub plot: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Coarse fee-aware fit used when no curve is given on the command line.
fn default_curve(targets: &LaunchTargets, fee: &BigInt) -> anyhow::Result<ReservesCurve> {
    let params = GraduationSearch {
        range: SearchRange::from_eth(Decimal::new(15, 1), Decimal::new(5, 0), Decimal::new(1, 3)),
        t0_window: 5,
        target_fee: fee.clone(),
        weights: ScoreWeights::default(),
    };
    tracing::info!("no curve given, fitting one against the configured launch targets");
    Ok(search_with_fee(targets, &params)?.curve)
}

#[derive(Serialize)]
struct TransitionReport<'a> {
    curve: &'a ReservesCurve,
    #[serde(flatten)]
    table: &'a TransitionTable,
    plots: Vec<PathBuf>,
}

pub fn exec(args: TransitionArgs, config: &CurveLabConfig) -> anyhow::Result<()> {
    let targets = config.launch.targets()?;
    let fee = args.fee_eth.map(to_wei).unwrap_or_else(|| targets.graduation_fee.clone());

    let curve = match (args.k, args.t0, args.e0) {
        (Some(k), Some(t0), Some(e0)) => ReservesCurve::new(k, t0, e0)?,
        _ => default_curve(&targets, &fee)?,
    };

    let graduation_eth = config.launch.graduation_eth;
    let scan = EthScan {
        from: to_wei(args.from_eth.unwrap_or(graduation_eth - Decimal::new(2, 1))),
        to: to_wei(args.to_eth.unwrap_or(graduation_eth + Decimal::new(1, 1))),
        step: to_wei(args.step_eth),
    };
    let table = transition_table(&curve, &fee, &targets.creator_supply, &scan)?;

    let mut plots = Vec::new();
    if args.plot {
        let max_eth = &scan.to * BigInt::from(2);
        let (out_dir, format) = (&config.plot_dir, config.plot_format);
        plots.push(plot_token_reserves(&curve, &targets, &max_eth, out_dir, "transition", format)?);
        plots.push(plot_price_comparison(&table, out_dir, "transition", format)?);
    }

    if args.format.is_json() {
        return print_json(&TransitionReport {
            curve: &curve,
            table: &table,
            plots,
        });
    }

    print_heading("Graduation transition");
    println!("K = {}, T0 = {}, E0 = {}", curve.k, curve.t0, curve.e0);
    println!(
        "fee = {} ETH, creator supply = {} tokens",
        format_eth(&fee),
        format_eth(&targets.creator_supply)
    );
    println!();
    let hundred = Fixed::from_int(&BigInt::from(100));
    for (index, row) in table.rows.iter().enumerate() {
        let line = format!(
            "{} ETH, {} tokens, {:.16} ETH/token, {:.16} ETH/token, {:.2}%",
            format_eth(&row.eth),
            row.tokens,
            row.curve_price,
            row.amm_price,
            row.relative_step.clone() * hundred.clone()
        );
        if index == table.best {
            println!("{}", line.green().bold());
        } else {
            println!("{line}");
        }
    }
    if let Some(best) = table.best_row() {
        println!();
        println!(
            "closest price match at {} ETH ({} tokens in reserves)",
            format_eth(&best.eth).bold(),
            best.tokens
        );
    }
    for path in &plots {
        println!("plot written to {}", path.display());
    }
    Ok(())
}
