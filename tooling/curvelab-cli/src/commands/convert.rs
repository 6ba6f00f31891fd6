use clap::Args;
use curvelab_core::ticks::{
    get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, price_to_sqrt_x96, price_to_tick,
    sqrt_x96_to_price, sqrt_x96_to_tick, sqrt_x96_to_tick_floor, tick_to_price,
    tick_to_sqrt_x96, wei_per_token_to_sqrt_x96,
};
use curvelab_core::CurveLabConfig;
use num_bigint::BigInt;
use serde::Serialize;

use super::{print_heading, print_json, OutputFormat};

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ConvertInput {
    /// Price as token1 per token0
    #[arg(long)]
    pub price: Option<f64>,

    /// Q64.96 square-root price
    #[arg(long)]
    pub sqrt_x96: Option<BigInt>,

    /// Tick index
    #[arg(long, allow_negative_numbers = true)]
    pub tick: Option<i32>,

    /// Graduation-style price quoted in wei per token
    #[arg(long)]
    pub wei_per_token: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub input: ConvertInput,

    /// Tick spacing used to snap ticks (defaults to the configured spacing)
    #[arg(long)]
    pub tick_spacing: Option<i32>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
pub struct Conversion {
    pub price: f64,
    pub sqrt_price_x96: String,
    /// Raw tick truncated toward zero.
    pub tick: i32,
    /// Greatest tick whose exact sqrt ratio is at or below the input.
    pub exact_tick: Option<i32>,
    pub tick_spacing: i32,
    pub nearest_usable_tick: i32,
    pub floor_usable_tick: i32,
    /// Exact on-chain sqrt ratio, when the input was a tick.
    pub exact_sqrt_price_x96: Option<String>,
}

pub fn convert(input: &ConvertInput, spacing: i32) -> anyhow::Result<Conversion> {
    let mut exact_sqrt_price_x96 = None;
    let (price, sqrt) = if let Some(price) = input.price {
        (price, price_to_sqrt_x96(price)?)
    } else if let Some(sqrt) = &input.sqrt_x96 {
        (sqrt_x96_to_price(sqrt)?, sqrt.clone())
    } else if let Some(tick) = input.tick {
        exact_sqrt_price_x96 = Some(get_sqrt_ratio_at_tick(tick)?.to_string());
        (tick_to_price(tick), tick_to_sqrt_x96(tick)?)
    } else if let Some(wei) = input.wei_per_token {
        let sqrt = wei_per_token_to_sqrt_x96(wei)?;
        (sqrt_x96_to_price(&sqrt)?, sqrt)
    } else {
        anyhow::bail!("one of --price, --sqrt-x96, --tick or --wei-per-token is required");
    };

    Ok(Conversion {
        price,
        tick: price_to_tick(price)?,
        exact_tick: get_tick_at_sqrt_ratio(&sqrt).ok(),
        tick_spacing: spacing,
        nearest_usable_tick: sqrt_x96_to_tick(&sqrt, spacing)?,
        floor_usable_tick: sqrt_x96_to_tick_floor(&sqrt, spacing)?,
        sqrt_price_x96: sqrt.to_string(),
        exact_sqrt_price_x96,
    })
}

pub fn exec(args: ConvertArgs, config: &CurveLabConfig) -> anyhow::Result<()> {
    let spacing = args.tick_spacing.unwrap_or(config.pool.tick_spacing);
    let conversion = convert(&args.input, spacing)?;

    if args.format.is_json() {
        return print_json(&conversion);
    }
    print_heading("Price conversion");
    println!("price            = {}", conversion.price);
    println!("sqrtPriceX96     = {}", conversion.sqrt_price_x96);
    if let Some(exact) = &conversion.exact_sqrt_price_x96 {
        println!("sqrtPriceX96 (exact TickMath) = {exact}");
    }
    println!("tick (raw)       = {}", conversion.tick);
    if let Some(exact_tick) = conversion.exact_tick {
        println!("tick (exact)     = {exact_tick}");
    }
    println!(
        "usable tick (spacing {}): nearest {}, floor {}",
        conversion.tick_spacing, conversion.nearest_usable_tick, conversion.floor_usable_tick
    );
    Ok(())
}
