//! Tick / sqrtPriceX96 conversions for a concentrated-liquidity pool.
//!
//! Prices are token1 per token0; for the graduation pool token0 is native
//! ETH, so a price reads as "tokens per ETH". The `f64` helpers mirror quick
//! off-chain estimates; [`get_sqrt_ratio_at_tick`] is the exact on-chain
//! TickMath result.

use num_bigint::BigInt;
use num_traits::{FromPrimitive, One, ToPrimitive};

use crate::{CurveError, Result};

pub const MIN_TICK: i32 = -887_272;
pub const MAX_TICK: i32 = 887_272;

/// Base of the tick log scale.
pub const TICK_BASE: f64 = 1.0001;

/// 2^96 as a float.
pub fn q96_f64() -> f64 {
    2f64.powi(96)
}

pub fn q96() -> BigInt {
    BigInt::one() << 96
}

fn check_tick(tick: i32) -> Result<()> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(CurveError::TickOutOfRange(tick.into()));
    }
    Ok(())
}

fn check_spacing(spacing: i32) -> Result<()> {
    if spacing <= 0 {
        return Err(CurveError::InvalidTickSpacing(spacing));
    }
    Ok(())
}

pub(crate) fn check_price(price: f64) -> Result<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(CurveError::InvalidPrice(price));
    }
    Ok(())
}

fn float_to_tick(raw: f64) -> Result<i32> {
    if !raw.is_finite() || raw < MIN_TICK as f64 || raw > MAX_TICK as f64 {
        return Err(CurveError::TickOutOfRange(raw as i64));
    }
    Ok(raw as i32)
}

/// `trunc(sqrt(price) * 2^96)`.
pub fn price_to_sqrt_x96(price: f64) -> Result<BigInt> {
    check_price(price)?;
    let scaled = (price.sqrt() * q96_f64()).trunc();
    BigInt::from_f64(scaled).ok_or(CurveError::InvalidPrice(price))
}

pub fn sqrt_x96_to_price(sqrt_price_x96: &BigInt) -> Result<f64> {
    let sqrt_price = sqrt_price_x96
        .to_f64()
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or_else(|| CurveError::SqrtPriceOutOfRange(sqrt_price_x96.to_string()))?
        / q96_f64();
    Ok(sqrt_price * sqrt_price)
}

pub fn tick_to_price(tick: i32) -> f64 {
    TICK_BASE.powf(f64::from(tick))
}

/// Tick whose price is closest below `price` in magnitude (truncated toward
/// zero, not snapped to any spacing).
pub fn price_to_tick(price: f64) -> Result<i32> {
    check_price(price)?;
    float_to_tick(price.ln() / TICK_BASE.ln())
}

/// `trunc(1.0001^(tick / 2) * 2^96)`.
pub fn tick_to_sqrt_x96(tick: i32) -> Result<BigInt> {
    check_tick(tick)?;
    let scaled = (TICK_BASE.powf(f64::from(tick) / 2.0) * q96_f64()).trunc();
    BigInt::from_f64(scaled).ok_or(CurveError::TickOutOfRange(tick.into()))
}

fn raw_tick(sqrt_price_x96: &BigInt) -> Result<f64> {
    let price = sqrt_x96_to_price(sqrt_price_x96)?;
    Ok(price.ln() / TICK_BASE.ln())
}

/// Nearest usable tick: `round(raw / spacing) * spacing`, ties to even.
pub fn sqrt_x96_to_tick(sqrt_price_x96: &BigInt, spacing: i32) -> Result<i32> {
    check_spacing(spacing)?;
    let raw = raw_tick(sqrt_price_x96)?;
    let steps = (raw / f64::from(spacing)).round_ties_even();
    float_to_tick(steps * f64::from(spacing))
}

/// Raw tick snapped down onto the spacing grid.
pub fn sqrt_x96_to_tick_floor(sqrt_price_x96: &BigInt, spacing: i32) -> Result<i32> {
    check_spacing(spacing)?;
    let raw = raw_tick(sqrt_price_x96)?;
    let snapped = raw - raw.rem_euclid(f64::from(spacing));
    float_to_tick(snapped.round_ties_even())
}

/// Encodes a price quoted in wei per token as tokens per ETH.
pub fn wei_per_token_to_sqrt_x96(wei_per_token: u64) -> Result<BigInt> {
    if wei_per_token == 0 {
        return Err(CurveError::InvalidPrice(0.0));
    }
    let tokens_per_eth = 1e18 / wei_per_token as f64;
    price_to_sqrt_x96(tokens_per_eth)
}

// ── Exact TickMath ────────────────────────────────────────────────────────────

/// `1 / sqrt(1.0001^(2^i))` in Q128.128 for bit `i` of |tick|, i >= 1.
const TICK_FACTORS: [u128; 19] = [
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x09aa508b5b7a84e1c677de54f3e99bc9,
    0x005d6af8dedb81196699c329225ee604,
    0x0002216e584f5fa1ea926041bedfe98,
    0x00000048a170391f7dc42444e8fa2,
];

const TICK_FACTOR_BIT0: u128 = 0xfffcb933bd6fad37aa2d162d1a594001;

/// Exact `sqrt(1.0001^tick) * 2^96`, rounded up, as computed on-chain.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<BigInt> {
    check_tick(tick)?;
    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 1 != 0 {
        BigInt::from(TICK_FACTOR_BIT0)
    } else {
        BigInt::one() << 128
    };
    for (bit, factor) in TICK_FACTORS.iter().enumerate() {
        if abs_tick & (1 << (bit + 1)) != 0 {
            ratio = (ratio * BigInt::from(*factor)) >> 128;
        }
    }

    if tick > 0 {
        let max_uint256 = (BigInt::one() << 256) - 1;
        ratio = max_uint256 / ratio;
    }

    // Q128.128 -> Q64.96, rounding up
    Ok((ratio + ((BigInt::one() << 32) - 1)) >> 32)
}

/// Greatest tick whose exact sqrt ratio is `<= sqrt_price_x96`.
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: &BigInt) -> Result<i32> {
    let min_ratio = get_sqrt_ratio_at_tick(MIN_TICK)?;
    let max_ratio = get_sqrt_ratio_at_tick(MAX_TICK)?;
    if *sqrt_price_x96 < min_ratio || *sqrt_price_x96 >= max_ratio {
        return Err(CurveError::SqrtPriceOutOfRange(sqrt_price_x96.to_string()));
    }

    let mut lo = MIN_TICK;
    let mut hi = MAX_TICK;
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if get_sqrt_ratio_at_tick(mid)? <= *sqrt_price_x96 {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_exact_ratio_at_bounds() {
        assert_eq!(get_sqrt_ratio_at_tick(0).unwrap(), q96());
        assert_eq!(get_sqrt_ratio_at_tick(MIN_TICK).unwrap(), BigInt::from(4_295_128_739u64));
        assert_eq!(
            get_sqrt_ratio_at_tick(MAX_TICK).unwrap(),
            BigInt::from_str("1461446703485210103287273052203988822378723970342").unwrap()
        );
    }

    #[test]
    fn test_exact_ratio_rejects_out_of_range() {
        assert!(matches!(
            get_sqrt_ratio_at_tick(MAX_TICK + 1),
            Err(CurveError::TickOutOfRange(_))
        ));
        assert!(get_sqrt_ratio_at_tick(MIN_TICK - 1).is_err());
    }

    #[test]
    fn test_exact_inverse() {
        for tick in [MIN_TICK, -196_200, -7000, -1, 0, 1, 169_800, 203_600, MAX_TICK - 1] {
            let ratio = get_sqrt_ratio_at_tick(tick).unwrap();
            assert_eq!(get_tick_at_sqrt_ratio(&ratio).unwrap(), tick);
        }
        assert!(get_tick_at_sqrt_ratio(&BigInt::from(1)).is_err());
    }

    #[test]
    fn test_float_matches_exact_closely() {
        for tick in [-7000, 0, 160_600, 203_600] {
            let float = tick_to_sqrt_x96(tick).unwrap().to_f64().unwrap();
            let exact = get_sqrt_ratio_at_tick(tick).unwrap().to_f64().unwrap();
            assert!(((float - exact) / exact).abs() < 1e-9, "tick {tick}");
        }
    }

    #[test]
    fn test_price_to_tick_truncates() {
        assert_eq!(price_to_tick(1.0).unwrap(), 0);
        // ln(0.001) / ln(1.0001) = -69081.007
        assert_eq!(price_to_tick(0.001).unwrap(), -69_081);
        assert!(price_to_tick(0.0).is_err());
        assert!(price_to_tick(f64::NAN).is_err());
    }

    #[test]
    fn test_sqrt_x96_to_tick_rounds_to_spacing() {
        let sqrt = tick_to_sqrt_x96(169_744).unwrap();
        assert_eq!(sqrt_x96_to_tick(&sqrt, 200).unwrap(), 169_800);
        assert_eq!(sqrt_x96_to_tick_floor(&sqrt, 200).unwrap(), 169_600);
        assert!(sqrt_x96_to_tick(&sqrt, 0).is_err());
    }

    #[test]
    fn test_floor_snapping_for_negative_ticks() {
        let sqrt = tick_to_sqrt_x96(-7050).unwrap();
        assert_eq!(sqrt_x96_to_tick_floor(&sqrt, 200).unwrap(), -7200);
        assert_eq!(sqrt_x96_to_tick(&sqrt, 200).unwrap(), -7000);
    }

    #[test]
    fn test_wei_per_token_encoding() {
        // 1e9 wei per token = 1e9 tokens per ETH
        let sqrt = wei_per_token_to_sqrt_x96(1_000_000_000).unwrap();
        let price = sqrt_x96_to_price(&sqrt).unwrap();
        assert!((price / 1e9 - 1.0).abs() < 1e-12);
        assert!(wei_per_token_to_sqrt_x96(0).is_err());
    }

    #[test]
    fn test_sqrt_x96_to_price_rejects_zero() {
        assert!(sqrt_x96_to_price(&BigInt::from(0)).is_err());
    }
}
