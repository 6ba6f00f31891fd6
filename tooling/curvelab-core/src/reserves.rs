//! Constant-product bonding curve `tokens = K / (eth + E0) - T0`, in wei.

use num_bigint::BigInt;
use num_traits::Signed;
use serde::Serialize;

use crate::fixed::Fixed;
use crate::units::{floor_div, format_eth, serialize_display, to_wei, tokens_to_wei};
use crate::{CurveError, LaunchConfig, Result};

/// Launch constants converted to 18-decimal integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTargets {
    pub total_supply: BigInt,
    pub graduation_eth: BigInt,
    pub graduation_tokens: BigInt,
    pub graduation_fee: BigInt,
    pub creator_supply: BigInt,
}

impl LaunchConfig {
    pub fn targets(&self) -> Result<LaunchTargets> {
        let targets = LaunchTargets {
            total_supply: tokens_to_wei(self.total_supply),
            graduation_eth: to_wei(self.graduation_eth),
            graduation_tokens: tokens_to_wei(self.graduation_tokens),
            graduation_fee: to_wei(self.graduation_fee_eth),
            creator_supply: tokens_to_wei(self.creator_supply),
        };
        targets.validate()?;
        Ok(targets)
    }
}

impl LaunchTargets {
    fn validate(&self) -> Result<()> {
        if !self.graduation_eth.is_positive() {
            return Err(CurveError::InvalidLaunch("graduation_eth must be > 0".into()));
        }
        if !self.graduation_tokens.is_positive() {
            return Err(CurveError::InvalidLaunch("graduation_tokens must be > 0".into()));
        }
        if self.graduation_tokens >= self.total_supply {
            return Err(CurveError::InvalidLaunch(
                "graduation_tokens must be below total_supply".into(),
            ));
        }
        Ok(())
    }

    /// Numerator of the real-valued T0 that puts the curve exactly on
    /// `graduation_tokens` at `graduation_eth`:
    ///
    /// `((S + T0) * E0) / (Eg + E0) - T0 = Tg`  =>
    /// `T0 = ((S - Tg) * E0 - Tg * Eg) / Eg`
    pub fn t0_real_numerator(&self, e0: &BigInt) -> BigInt {
        (&self.total_supply - &self.graduation_tokens) * e0
            - &self.graduation_tokens * &self.graduation_eth
    }

    pub fn derived_t0_floor(&self, e0: &BigInt) -> BigInt {
        floor_div(&self.t0_real_numerator(e0), &self.graduation_eth)
    }

    pub fn graduation_eth_display(&self) -> String {
        format_eth(&self.graduation_eth)
    }
}

/// `floor(k / (eth + e0)) - t0`. Callers guarantee `eth + e0 > 0`.
pub fn reserves_from_eth(k: &BigInt, t0: &BigInt, e0: &BigInt, eth: &BigInt) -> BigInt {
    floor_div(k, &(eth + e0)) - t0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservesCurve {
    #[serde(serialize_with = "serialize_display")]
    pub k: BigInt,
    #[serde(serialize_with = "serialize_display")]
    pub t0: BigInt,
    #[serde(serialize_with = "serialize_display")]
    pub e0: BigInt,
}

impl ReservesCurve {
    pub fn new(k: BigInt, t0: BigInt, e0: BigInt) -> Result<Self> {
        if !e0.is_positive() {
            return Err(CurveError::InvalidCurve("E0 must be > 0".into()));
        }
        if !k.is_positive() {
            return Err(CurveError::InvalidCurve("K must be > 0".into()));
        }
        Ok(Self { k, t0, e0 })
    }

    /// Builds the curve with `K = (S + T0) * E0`, which pins the reserves at
    /// zero ETH to exactly `total_supply`.
    pub fn from_total_supply(total_supply: &BigInt, t0: BigInt, e0: BigInt) -> Result<Self> {
        let k = (total_supply + &t0) * &e0;
        Self::new(k, t0, e0)
    }

    fn shifted_eth(&self, eth: &BigInt) -> Result<BigInt> {
        let shifted = eth + &self.e0;
        if !shifted.is_positive() {
            return Err(CurveError::InvalidCurve(format!(
                "ETH reserves {} are at or below -E0",
                format_eth(eth)
            )));
        }
        Ok(shifted)
    }

    pub fn token_reserves(&self, eth: &BigInt) -> Result<BigInt> {
        self.shifted_eth(eth)?;
        Ok(reserves_from_eth(&self.k, &self.t0, &self.e0, eth))
    }

    /// Marginal price `(eth + E0)^2 / K` in ETH per token.
    pub fn spot_price(&self, eth: &BigInt) -> Result<Fixed> {
        let shifted = self.shifted_eth(eth)?;
        Fixed::ratio(&(&shifted * &shifted), &self.k).ok_or(CurveError::DivisionByZero("spot price"))
    }

    /// `(eth + E0) / (tokens + T0)`; accurate for small buys only.
    pub fn buy_price_estimate(&self, eth: &BigInt) -> Result<Fixed> {
        let shifted = self.shifted_eth(eth)?;
        let tokens = self.token_reserves(eth)?;
        Fixed::ratio(&shifted, &(tokens + &self.t0))
            .ok_or(CurveError::DivisionByZero("buy price estimate"))
    }
}

/// Price of a constant-product AMM seeded with the graduation reserves after
/// the fee and the creator allocation are taken out.
pub fn amm_price(
    eth: &BigInt,
    tokens: &BigInt,
    fee: &BigInt,
    creator_supply: &BigInt,
) -> Result<Fixed> {
    let pooled_tokens = tokens - creator_supply;
    if !pooled_tokens.is_positive() {
        return Err(CurveError::InvalidCurve(
            "token reserves do not cover the creator supply".into(),
        ));
    }
    Fixed::ratio(&(eth - fee), &pooled_tokens).ok_or(CurveError::DivisionByZero("AMM price"))
}

impl Default for LaunchTargets {
    fn default() -> Self {
        // Defaults always validate.
        let config = LaunchConfig::default();
        LaunchTargets {
            total_supply: tokens_to_wei(config.total_supply),
            graduation_eth: to_wei(config.graduation_eth),
            graduation_tokens: tokens_to_wei(config.graduation_tokens),
            graduation_fee: to_wei(config.graduation_fee_eth),
            creator_supply: tokens_to_wei(config.creator_supply),
        }
    }
}
