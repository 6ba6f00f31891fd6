//! Single-sided liquidity for a concentrated-liquidity position.
//!
//! All math is `f64` on unscaled sqrt prices (`sqrt(token1 / token0)`).

use serde::Serialize;

use crate::ticks::{check_price, MAX_TICK, MIN_TICK, TICK_BASE};
use crate::{CurveError, Result};

/// `sqrt(1.0001^tick)`.
pub fn sqrt_price_at_tick_f64(tick: i32) -> f64 {
    TICK_BASE.powf(f64::from(tick)).sqrt()
}

/// Position bounds expressed as sqrt prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    pub sqrt_lower: f64,
    pub sqrt_upper: f64,
}

impl PriceRange {
    pub fn from_prices(price_lower: f64, price_upper: f64) -> Result<Self> {
        check_price(price_lower)?;
        check_price(price_upper)?;
        Self::new(price_lower.sqrt(), price_upper.sqrt())
    }

    pub fn from_ticks(tick_lower: i32, tick_upper: i32) -> Result<Self> {
        for tick in [tick_lower, tick_upper] {
            if !(MIN_TICK..=MAX_TICK).contains(&tick) {
                return Err(CurveError::TickOutOfRange(tick.into()));
            }
        }
        Self::new(sqrt_price_at_tick_f64(tick_lower), sqrt_price_at_tick_f64(tick_upper))
    }

    fn new(sqrt_lower: f64, sqrt_upper: f64) -> Result<Self> {
        if sqrt_lower >= sqrt_upper {
            return Err(CurveError::InvalidRange(format!(
                "lower sqrt price {sqrt_lower} must be below upper sqrt price {sqrt_upper}"
            )));
        }
        Ok(Self {
            sqrt_lower,
            sqrt_upper,
        })
    }
}

/// Liquidity when only token0 is deposited:
/// `amount0 / (1/sqrt_lower - 1/sqrt_upper)`.
pub fn liquidity_for_amount0(amount0: f64, range: &PriceRange) -> f64 {
    amount0 / (range.sqrt_lower.recip() - range.sqrt_upper.recip())
}

/// Liquidity when only token1 is deposited:
/// `amount1 / (sqrt_upper - sqrt_lower)`.
pub fn liquidity_for_amount1(amount1: f64, range: &PriceRange) -> f64 {
    amount1 / (range.sqrt_upper - range.sqrt_lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        ((a - b) / b).abs() < 1e-12
    }

    #[test]
    fn test_sqrt_price_at_tick() {
        assert_eq!(sqrt_price_at_tick_f64(0), 1.0);
        assert!(close(sqrt_price_at_tick_f64(2), 1.0001));
    }

    #[test]
    fn test_range_rejects_empty_or_inverted() {
        assert!(matches!(
            PriceRange::from_ticks(100, 100),
            Err(CurveError::InvalidRange(_))
        ));
        assert!(PriceRange::from_ticks(200, -200).is_err());
        assert!(PriceRange::from_prices(4.0, 1.0).is_err());
        assert!(matches!(
            PriceRange::from_prices(0.0, 1.0),
            Err(CurveError::InvalidPrice(_))
        ));
        assert!(PriceRange::from_ticks(MIN_TICK - 1, 0).is_err());
    }

    #[test]
    fn test_liquidity_from_prices() {
        // sqrt bounds 1 and 2
        let range = PriceRange::from_prices(1.0, 4.0).unwrap();
        assert!(close(liquidity_for_amount0(100.0, &range), 200.0));
        assert!(close(liquidity_for_amount1(100.0, &range), 100.0));
    }

    #[test]
    fn test_liquidity_from_ticks_is_positive() {
        let range = PriceRange::from_ticks(-196_200, 69_000).unwrap();
        assert!(range.sqrt_lower < 1.0 && range.sqrt_upper > 1.0);
        let liquidity = liquidity_for_amount0(18_206_023_662.0, &range);
        assert!(liquidity > 0.0 && liquidity.is_finite());
        assert!(liquidity_for_amount1(1e27, &range) > 0.0);
    }
}
