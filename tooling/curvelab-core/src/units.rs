//! 18-decimal fixed-point unit helpers (wei / token-wei).

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use rust_decimal::Decimal;
use serde::Serializer;
use std::fmt::Display;

pub const WAD_DECIMALS: u32 = 18;

pub fn pow10(exponent: u32) -> BigInt {
    BigInt::from(10u32).pow(exponent)
}

pub fn wad() -> BigInt {
    pow10(WAD_DECIMALS)
}

/// Converts a decimal ETH amount to wei, truncating toward zero.
///
/// Exact for any `Decimal`: the mantissa is rescaled with integer arithmetic.
pub fn to_wei(eth: Decimal) -> BigInt {
    let mantissa = BigInt::from(eth.mantissa());
    let scale = eth.scale();
    if scale <= WAD_DECIMALS {
        mantissa * pow10(WAD_DECIMALS - scale)
    } else {
        mantissa / pow10(scale - WAD_DECIMALS)
    }
}

/// Whole tokens to token-wei.
pub fn tokens_to_wei(tokens: u64) -> BigInt {
    BigInt::from(tokens) * wad()
}

/// Renders a wei amount as ETH with up to 18 decimals, trailing zeros removed.
pub fn format_eth(wei: &BigInt) -> String {
    let unit = wad();
    let magnitude = wei.abs();
    let whole = &magnitude / &unit;
    let frac = &magnitude % &unit;

    let mut out = String::new();
    if wei.is_negative() {
        out.push('-');
    }
    out.push_str(&whole.to_string());
    if !frac.is_zero() {
        let digits = format!("{:0>width$}", frac.to_string(), width = WAD_DECIMALS as usize);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}

/// Integer division rounding toward negative infinity.
///
/// `BigInt`'s `/` truncates toward zero; the t0 derivation needs floor
/// semantics when its numerator is negative.
pub fn floor_div(numerator: &BigInt, denominator: &BigInt) -> BigInt {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if !remainder.is_zero() && (remainder.is_negative() != denominator.is_negative()) {
        quotient - 1
    } else {
        quotient
    }
}

pub(crate) fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_to_wei() {
        assert_eq!(to_wei(dec("8.5")), BigInt::from(8_500_000_000_000_000_000u64));
        assert_eq!(to_wei(dec("0.0001")), BigInt::from(100_000_000_000_000u64));
        assert_eq!(to_wei(dec("0")), BigInt::zero());
        assert_eq!(to_wei(dec("-1.5")), BigInt::from(-1_500_000_000_000_000_000i64));
    }

    #[test]
    fn test_to_wei_truncates_sub_wei_digits() {
        // 1e-19 ETH is below one wei
        assert_eq!(to_wei(dec("0.0000000000000000019")), BigInt::from(1));
        assert_eq!(to_wei(dec("-0.0000000000000000019")), BigInt::from(-1));
    }

    #[test]
    fn test_format_eth() {
        assert_eq!(format_eth(&to_wei(dec("2.7"))), "2.7");
        assert_eq!(format_eth(&to_wei(dec("3"))), "3");
        assert_eq!(format_eth(&BigInt::zero()), "0");
        assert_eq!(format_eth(&to_wei(dec("-0.25"))), "-0.25");
        assert_eq!(format_eth(&BigInt::from(1)), "0.000000000000000001");
    }

    #[test]
    fn test_floor_div_matches_floor_semantics() {
        let b = BigInt::from;
        assert_eq!(floor_div(&b(7), &b(2)), b(3));
        assert_eq!(floor_div(&b(-7), &b(2)), b(-4));
        assert_eq!(floor_div(&b(7), &b(-2)), b(-4));
        assert_eq!(floor_div(&b(-7), &b(-2)), b(3));
        assert_eq!(floor_div(&b(-8), &b(2)), b(-4));
    }
}
