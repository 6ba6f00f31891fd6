use clap::Args;
use curvelab_core::liquidity::{liquidity_for_amount0, liquidity_for_amount1, PriceRange};
use serde::Serialize;

use super::{print_heading, print_json, OutputFormat};

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct DepositAmount {
    /// Deposit of token0 only
    #[arg(long)]
    pub amount0: Option<f64>,

    /// Deposit of token1 only
    #[arg(long)]
    pub amount1: Option<f64>,
}

#[derive(Args, Debug)]
pub struct LiquidityArgs {
    #[command(flatten)]
    pub amount: DepositAmount,

    /// Lower tick of the position
    #[arg(long, allow_negative_numbers = true, requires = "tick_upper", conflicts_with_all = ["price_lower", "price_upper"])]
    pub tick_lower: Option<i32>,

    /// Upper tick of the position
    #[arg(long, allow_negative_numbers = true, requires = "tick_lower")]
    pub tick_upper: Option<i32>,

    /// Lower price bound (token1 per token0)
    #[arg(long, requires = "price_upper", conflicts_with_all = ["tick_lower", "tick_upper"])]
    pub price_lower: Option<f64>,

    /// Upper price bound (token1 per token0)
    #[arg(long, requires = "price_lower")]
    pub price_upper: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
pub struct LiquidityReport {
    pub token: &'static str,
    pub amount: f64,
    #[serde(flatten)]
    pub range: PriceRange,
    pub liquidity: f64,
}

pub fn compute(args: &LiquidityArgs) -> anyhow::Result<LiquidityReport> {
    let range = match (args.tick_lower, args.tick_upper, args.price_lower, args.price_upper) {
        (Some(lower), Some(upper), _, _) => PriceRange::from_ticks(lower, upper)?,
        (_, _, Some(lower), Some(upper)) => PriceRange::from_prices(lower, upper)?,
        _ => anyhow::bail!("provide --tick-lower/--tick-upper or --price-lower/--price-upper"),
    };

    let report = match (args.amount.amount0, args.amount.amount1) {
        (Some(amount), _) => LiquidityReport {
            token: "token0",
            amount,
            range,
            liquidity: liquidity_for_amount0(amount, &range),
        },
        (_, Some(amount)) => LiquidityReport {
            token: "token1",
            amount,
            range,
            liquidity: liquidity_for_amount1(amount, &range),
        },
        _ => anyhow::bail!("provide --amount0 or --amount1"),
    };
    Ok(report)
}

pub fn exec(args: LiquidityArgs) -> anyhow::Result<()> {
    let report = compute(&args)?;

    if args.format.is_json() {
        return print_json(&report);
    }
    print_heading("Single-sided liquidity");
    println!(
        "sqrt price range = [{}, {}]",
        report.range.sqrt_lower, report.range.sqrt_upper
    );
    println!("liquidity {}: {}", report.token, report.liquidity);
    Ok(())
}
