use clap::Args;
use colored::*;
use curvelab_core::units::{format_eth, to_wei};
use curvelab_core::{
    search_with_fee, CurveLabConfig, Fixed, GraduationCandidate, GraduationSearch, LaunchTargets,
    ScoreWeights, SearchRange,
};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{print_heading, print_json, OutputFormat};

#[derive(Args, Debug)]
pub struct GraduationArgs {
    /// Minimum E0 scan bound, in ETH
    #[arg(long, default_value = "1.5")]
    pub min_e0_eth: Decimal,

    /// Maximum E0 scan bound, in ETH
    #[arg(long, default_value = "5.0")]
    pub max_e0_eth: Decimal,

    /// E0 scan step, in ETH
    #[arg(long, default_value = "0.0001")]
    pub step_e0_eth: Decimal,

    /// Integer T0 points tried on each side of the derived T0
    #[arg(long, default_value = "5")]
    pub t0_window: u32,

    /// Target graduation fee in ETH (defaults to the configured fee)
    #[arg(long)]
    pub target_fee_eth: Option<Decimal>,

    /// Weight for the token-at-graduation error
    #[arg(long, default_value = "1.0")]
    pub weight_token: Decimal,

    /// Weight for the fee error
    #[arg(long, default_value = "1.0")]
    pub weight_fee: Decimal,

    /// Weight for the price deviation at the target fee
    #[arg(long, default_value = "1.0")]
    pub weight_price: Decimal,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl GraduationArgs {
    pub fn to_search(&self, config: &CurveLabConfig) -> GraduationSearch {
        let fee = self.target_fee_eth.unwrap_or(config.launch.graduation_fee_eth);
        GraduationSearch {
            range: SearchRange::from_eth(self.min_e0_eth, self.max_e0_eth, self.step_e0_eth),
            t0_window: self.t0_window,
            target_fee: to_wei(fee),
            weights: ScoreWeights {
                token: self.weight_token,
                fee: self.weight_fee,
                price: self.weight_price,
            },
        }
    }
}

#[derive(Serialize)]
struct GraduationReport<'a> {
    #[serde(flatten)]
    candidate: &'a GraduationCandidate,
    e0_eth: String,
    target_fee_eth: String,
}

pub fn exec(args: GraduationArgs, config: &CurveLabConfig) -> anyhow::Result<()> {
    let targets = config.launch.targets()?;
    let params = args.to_search(config);
    let best = search_with_fee(&targets, &params)?;

    if args.format.is_json() {
        return print_json(&GraduationReport {
            candidate: &best,
            e0_eth: format_eth(&best.curve.e0),
            target_fee_eth: format_eth(&params.target_fee),
        });
    }
    print_result(&best, &targets, &params);
    Ok(())
}

fn print_result(best: &GraduationCandidate, targets: &LaunchTargets, params: &GraduationSearch) {
    print_heading("Best parameters found");
    println!("K  = {}", best.curve.k);
    println!("T0 = {}", best.curve.t0);
    println!("E0 = {} ({} ETH)", best.curve.e0, format_eth(&best.curve.e0));
    println!();

    print_heading("Constraint checks");
    println!(
        "at e = 0 ETH: t = {} (error = {})",
        best.t_at_zero,
        &best.t_at_zero - &targets.total_supply
    );
    println!(
        "at e = {} ETH: t = {} (target error = {})",
        targets.graduation_eth_display(),
        best.t_at_grad,
        &best.t_at_grad - &targets.graduation_tokens
    );
    println!(
        "fee needed for exact price match: {} ({} ETH) (error vs target {} ETH = {} wei)",
        best.fee_for_price_match,
        format_eth(&best.fee_for_price_match),
        format_eth(&params.target_fee),
        best.fee_error
    );
    let percent = best.price_deviation.clone() * Fixed::from_int(&100.into());
    println!("price deviation using target fee: {:.8}%", percent);
    println!("composite score: {}", best.score.to_string().bold());
}
