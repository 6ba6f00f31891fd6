//! Scaled-integer decimal used for price ratios and composite scores.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::OnceLock;

use crate::units::pow10;

/// Number of fractional decimal digits carried by [`Fixed`].
pub const FIXED_DECIMALS: u32 = 60;

fn scale() -> &'static BigInt {
    static SCALE: OnceLock<BigInt> = OnceLock::new();
    SCALE.get_or_init(|| pow10(FIXED_DECIMALS))
}

/// A signed decimal stored as `value * 10^60` in a `BigInt`.
///
/// Multiplication and division truncate toward zero at the 60th digit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fixed(BigInt);

impl Fixed {
    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    pub fn one() -> Self {
        Self(scale().clone())
    }

    pub fn from_int(value: &BigInt) -> Self {
        Self(value * scale())
    }

    /// `numerator / denominator`, or `None` when the denominator is zero.
    pub fn ratio(numerator: &BigInt, denominator: &BigInt) -> Option<Self> {
        if denominator.is_zero() {
            return None;
        }
        Some(Self(numerator * scale() / denominator))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        let mantissa = BigInt::from(value.mantissa());
        Self(mantissa * pow10(FIXED_DECIMALS - value.scale()))
    }

    pub fn checked_div(&self, rhs: &Fixed) -> Option<Self> {
        if rhs.0.is_zero() {
            return None;
        }
        Some(Self(&self.0 * scale() / &rhs.0))
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// Integer part, truncated toward zero.
    pub fn trunc(&self) -> BigInt {
        &self.0 / scale()
    }

    pub fn to_f64(&self) -> f64 {
        let raw = self.0.to_f64().unwrap_or(f64::NAN);
        raw / 10f64.powi(FIXED_DECIMALS as i32)
    }
}

impl Add for Fixed {
    type Output = Fixed;

    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 + rhs.0)
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 - rhs.0)
    }
}

impl Mul for Fixed {
    type Output = Fixed;

    fn mul(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 * rhs.0 / scale())
    }
}

impl Neg for Fixed {
    type Output = Fixed;

    fn neg(self) -> Fixed {
        Fixed(-self.0)
    }
}

/// Display rounded half-to-even at the last shown digit; precision defaults
/// to 18 digits (`{:.8}` for fewer).
impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(18).min(FIXED_DECIMALS as usize) as u32;
        let unit = pow10(FIXED_DECIMALS - precision);
        let magnitude = self.0.abs();

        let mut shown = &magnitude / &unit;
        let twice_rest = (&magnitude % &unit) * 2u32;
        if twice_rest > unit || (twice_rest == unit && !(&shown % 2u32).is_zero()) {
            shown += 1u32;
        }

        let digits = pow10(precision);
        if self.0.is_negative() {
            f.write_str("-")?;
        }
        write!(f, "{}", &shown / &digits)?;
        if precision > 0 {
            let frac = (&shown % &digits).to_string();
            write!(f, ".{:0>width$}", frac, width = precision as usize)?;
        }
        Ok(())
    }
}

impl Serialize for Fixed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{:.30}", self))
    }
}
