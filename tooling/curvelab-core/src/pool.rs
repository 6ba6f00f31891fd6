//! Price configuration for the pool a token graduates into: the primary
//! position range, the graduation price, and a secondary ETH-only position
//! starting one spacing above graduation.

use num_bigint::BigInt;
use serde::Serialize;

use crate::ticks::{
    get_sqrt_ratio_at_tick, sqrt_x96_to_tick, tick_to_sqrt_x96, wei_per_token_to_sqrt_x96,
    MAX_TICK, MIN_TICK,
};
use crate::units::serialize_display;
use crate::{CurveError, PoolConfig, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickPrice {
    pub label: &'static str,
    pub tick: i32,
    /// Float estimate `1.0001^(tick/2) * 2^96`.
    #[serde(serialize_with = "serialize_display")]
    pub sqrt_price_x96: BigInt,
    /// Exact TickMath value.
    #[serde(serialize_with = "serialize_display")]
    pub sqrt_price_x96_exact: BigInt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolSettings {
    pub tick_spacing: i32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    #[serde(serialize_with = "serialize_display")]
    pub sqrt_price_x96_graduation: BigInt,
    pub tick_graduation: i32,
    pub tick_lower_2: i32,
    pub tick_upper_2: i32,
    pub secondary_upper_offset_steps: i32,
    pub range_prices: Vec<TickPrice>,
}

fn tick_price(label: &'static str, tick: i32) -> Result<TickPrice> {
    Ok(TickPrice {
        label,
        tick,
        sqrt_price_x96: tick_to_sqrt_x96(tick)?,
        sqrt_price_x96_exact: get_sqrt_ratio_at_tick(tick)?,
    })
}

fn usable_tick(tick: i64) -> Result<i32> {
    i32::try_from(tick)
        .ok()
        .filter(|t| (MIN_TICK..=MAX_TICK).contains(t))
        .ok_or(CurveError::TickOutOfRange(tick))
}

pub fn derive_pool_settings(config: &PoolConfig) -> Result<PoolSettings> {
    let spacing = config.tick_spacing;
    if spacing <= 0 {
        return Err(CurveError::InvalidTickSpacing(spacing));
    }
    for tick in [config.tick_lower, config.tick_upper] {
        if !(MIN_TICK..=MAX_TICK).contains(&tick) {
            return Err(CurveError::TickOutOfRange(tick.into()));
        }
    }
    if config.tick_lower >= config.tick_upper {
        return Err(CurveError::InvalidRange(format!(
            "tick_lower {} must be below tick_upper {}",
            config.tick_lower, config.tick_upper
        )));
    }

    let sqrt_price_x96_graduation = wei_per_token_to_sqrt_x96(config.graduation_wei_per_token)?;
    let tick_graduation = sqrt_x96_to_tick(&sqrt_price_x96_graduation, spacing)?;
    let tick_lower_2 = usable_tick(i64::from(tick_graduation) + i64::from(spacing))?;
    let tick_upper_2 = usable_tick(
        i64::from(config.tick_upper)
            - i64::from(config.secondary_upper_offset_steps) * i64::from(spacing),
    )?;
    if tick_lower_2 >= tick_upper_2 {
        return Err(CurveError::InvalidRange(format!(
            "secondary position [{tick_lower_2}, {tick_upper_2}] is empty"
        )));
    }

    let range_prices = vec![
        tick_price("SQRT_PRICEX96_LOWER_TICK", config.tick_lower)?,
        tick_price("SQRT_PRICEX96_UPPER_TICK", config.tick_upper)?,
        tick_price("SQRT_LOWER_2", tick_lower_2)?,
        tick_price("SQRT_UPPER_2", tick_upper_2)?,
    ];

    tracing::debug!(tick_graduation, tick_lower_2, tick_upper_2, "derived pool ticks");

    Ok(PoolSettings {
        tick_spacing: spacing,
        tick_lower: config.tick_lower,
        tick_upper: config.tick_upper,
        sqrt_price_x96_graduation,
        tick_graduation,
        tick_lower_2,
        tick_upper_2,
        secondary_upper_offset_steps: config.secondary_upper_offset_steps,
        range_prices,
    })
}

/// Solidity constant block ready to paste into the graduator contract.
pub fn render_solidity(settings: &PoolSettings) -> String {
    let mut out = format!(
        "// Graduation pool price configuration\n\
         int24 constant TICK_LOWER = {lower};\n\
         int24 constant TICK_UPPER = {upper};\n\
         uint160 constant SQRT_PRICEX96_GRADUATION = {sqrt_graduation};\n\
         int24 constant TICK_GRADUATION = {graduation};\n\
         int24 constant TICK_LOWER_2 = TICK_GRADUATION + TICK_SPACING; // {lower_2}\n\
         int24 constant TICK_UPPER_2 = TICK_UPPER - ({steps} * TICK_SPACING); // {upper_2}\n\
         \n\
         // Constructor-derived values\n",
        lower = settings.tick_lower,
        upper = settings.tick_upper,
        sqrt_graduation = settings.sqrt_price_x96_graduation,
        graduation = settings.tick_graduation,
        lower_2 = settings.tick_lower_2,
        steps = settings.secondary_upper_offset_steps,
        upper_2 = settings.tick_upper_2,
    );
    for price in &settings.range_prices {
        out.push_str(&format!(
            "{} = TickMath.getSqrtPriceAtTick({}); // {} (float estimate {})\n",
            price.label, price.tick, price.sqrt_price_x96_exact, price.sqrt_price_x96
        ));
    }
    out
}
