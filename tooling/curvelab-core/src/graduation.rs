//! Fee-aware fit: tokens at graduation, graduation fee and the price gap
//! between the bonding curve and the AMM it graduates into.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::fixed::Fixed;
use crate::reserves::{reserves_from_eth, LaunchTargets, ReservesCurve};
use crate::search::SearchRange;
use crate::units::serialize_display;
use crate::{CurveError, Result};

/// Coefficients of the composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub token: Decimal,
    pub fee: Decimal,
    pub price: Decimal,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            token: Decimal::ONE,
            fee: Decimal::ONE,
            price: Decimal::ONE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraduationSearch {
    pub range: SearchRange,
    /// Integer T0 points tried on each side of the derived floor.
    pub t0_window: u32,
    /// Target graduation fee, in wei.
    pub target_fee: BigInt,
    pub weights: ScoreWeights,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraduationCandidate {
    #[serde(flatten)]
    pub curve: ReservesCurve,
    #[serde(serialize_with = "serialize_display")]
    pub t_at_zero: BigInt,
    #[serde(serialize_with = "serialize_display")]
    pub t_at_grad: BigInt,
    #[serde(serialize_with = "serialize_display")]
    pub token_error: BigInt,
    /// Fee that would make the AMM open exactly at the curve's marginal price.
    #[serde(serialize_with = "serialize_display")]
    pub fee_for_price_match: BigInt,
    #[serde(serialize_with = "serialize_display")]
    pub fee_error: BigInt,
    pub price_curve: Fixed,
    pub price_amm_with_target_fee: Fixed,
    pub price_deviation: Fixed,
    pub score: Fixed,
}

struct ScoreInputs<'a> {
    token_error: &'a BigInt,
    fee_error: &'a BigInt,
    price_deviation: &'a Fixed,
    fee_for_price_match: &'a BigInt,
}

/// Weighted sum of relative errors; a negative price-match fee costs an
/// extra 1.
fn score_candidate(
    targets: &LaunchTargets,
    target_fee: &BigInt,
    weights: &ScoreWeights,
    inputs: ScoreInputs<'_>,
) -> Option<Fixed> {
    let token_ratio = Fixed::ratio(inputs.token_error, &targets.graduation_tokens)?;
    let fee_ratio = Fixed::ratio(inputs.fee_error, target_fee)?;

    let mut score = Fixed::from_decimal(weights.token) * token_ratio
        + Fixed::from_decimal(weights.fee) * fee_ratio
        + Fixed::from_decimal(weights.price) * inputs.price_deviation.clone();

    if inputs.fee_for_price_match.is_negative() {
        score = score + Fixed::one();
    }
    Some(score)
}

pub fn evaluate_candidate(
    targets: &LaunchTargets,
    e0: &BigInt,
    t0: &BigInt,
    target_fee: &BigInt,
    weights: &ScoreWeights,
) -> Option<GraduationCandidate> {
    if !e0.is_positive() || t0.is_negative() {
        return None;
    }

    let k = (&targets.total_supply + t0) * e0;
    let t_at_zero = reserves_from_eth(&k, t0, e0, &BigInt::zero());
    if t_at_zero != targets.total_supply {
        return None;
    }

    let t_at_grad = reserves_from_eth(&k, t0, e0, &targets.graduation_eth);
    if !t_at_grad.is_positive() {
        return None;
    }
    let token_error = (&t_at_grad - &targets.graduation_tokens).abs();

    let shifted = &targets.graduation_eth + e0;
    let price_curve = Fixed::ratio(&(&shifted * &shifted), &k)?;

    let amm_eth = &targets.graduation_eth - target_fee;
    if !amm_eth.is_positive() {
        return None;
    }
    let price_amm_with_target_fee = Fixed::ratio(&amm_eth, &t_at_grad)?;

    if price_curve.is_zero() {
        return None;
    }
    let price_deviation =
        (price_amm_with_target_fee.clone() - price_curve.clone()).abs().checked_div(&price_curve)?;

    let fee_for_price_match = (Fixed::from_int(&targets.graduation_eth)
        - Fixed::from_int(&t_at_grad) * price_curve.clone())
    .trunc();
    let fee_error = (&fee_for_price_match - target_fee).abs();

    let score = score_candidate(
        targets,
        target_fee,
        weights,
        ScoreInputs {
            token_error: &token_error,
            fee_error: &fee_error,
            price_deviation: &price_deviation,
            fee_for_price_match: &fee_for_price_match,
        },
    )?;

    Some(GraduationCandidate {
        curve: ReservesCurve {
            k,
            t0: t0.clone(),
            e0: e0.clone(),
        },
        t_at_zero,
        t_at_grad,
        token_error,
        fee_for_price_match,
        fee_error,
        price_curve,
        price_amm_with_target_fee,
        price_deviation,
        score,
    })
}

impl GraduationSearch {
    pub fn validate(&self, targets: &LaunchTargets) -> Result<()> {
        self.range.validate()?;
        if !self.target_fee.is_positive() || self.target_fee >= targets.graduation_eth {
            return Err(CurveError::FeeOutOfRange {
                graduation_eth: targets.graduation_eth_display(),
            });
        }
        Ok(())
    }
}

/// Lowest-score candidate over the E0 grid and the T0 window. Only strict
/// improvements replace the current best.
pub fn search_with_fee(
    targets: &LaunchTargets,
    params: &GraduationSearch,
) -> Result<GraduationCandidate> {
    params.validate(targets)?;

    let window = BigInt::from(params.t0_window);
    let one = BigInt::one();
    let mut best: Option<GraduationCandidate> = None;
    let mut evaluated = 0usize;
    let mut rejected = 0usize;

    for e0 in params.range.iter() {
        let floor_t0 = targets.derived_t0_floor(&e0);
        let mut t0 = &floor_t0 - &window;
        let last = &floor_t0 + &window;
        while t0 <= last {
            evaluated += 1;
            match evaluate_candidate(targets, &e0, &t0, &params.target_fee, &params.weights) {
                Some(candidate) => {
                    if best.as_ref().map_or(true, |b| candidate.score < b.score) {
                        best = Some(candidate);
                    }
                }
                None => rejected += 1,
            }
            t0 += &one;
        }
    }

    tracing::debug!(evaluated, rejected, "graduation scan finished");

    let best = best.ok_or(CurveError::NoCandidate)?;
    tracing::info!(
        e0 = %best.curve.e0,
        t0 = %best.curve.t0,
        score = %best.score,
        "selected graduation candidate"
    );
    Ok(best)
}
