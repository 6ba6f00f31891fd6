//! Brute-force fit of (K, T0, E0) against the graduation token target.
//!
//! E0 is scanned over a wei grid; for every E0 the closed-form T0 is floored
//! and a few neighbouring integers are tried. K always follows from the
//! zero-ETH identity `reserves(0) == total_supply`.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use rust_decimal::Decimal;
use serde::Serialize;
use std::iter;

use crate::reserves::{reserves_from_eth, LaunchTargets, ReservesCurve};
use crate::units::{serialize_display, to_wei};
use crate::{CurveError, Result};

/// Integer T0 offsets tried on each side of the derived floor.
pub const TOKEN_FIT_T0_WINDOW: i64 = 2;

/// Inclusive E0 scan grid, in wei.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRange {
    pub min_e0: BigInt,
    pub max_e0: BigInt,
    pub step_e0: BigInt,
}

impl SearchRange {
    pub fn from_eth(min_e0_eth: Decimal, max_e0_eth: Decimal, step_e0_eth: Decimal) -> Self {
        Self {
            min_e0: to_wei(min_e0_eth),
            max_e0: to_wei(max_e0_eth),
            step_e0: to_wei(step_e0_eth),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_e0.is_positive() {
            return Err(CurveError::NonPositiveMinE0);
        }
        if self.max_e0 < self.min_e0 {
            return Err(CurveError::MaxBelowMin);
        }
        if !self.step_e0.is_positive() {
            return Err(CurveError::NonPositiveStep);
        }
        Ok(())
    }

    /// E0 values `min, min + step, ...` up to and including `max`.
    ///
    /// Must only be iterated after [`SearchRange::validate`] succeeded.
    pub fn iter(&self) -> impl Iterator<Item = BigInt> + '_ {
        iter::successors(Some(self.min_e0.clone()), move |e0| Some(e0 + &self.step_e0))
            .take_while(move |e0| *e0 <= self.max_e0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub curve: ReservesCurve,
    #[serde(serialize_with = "serialize_display")]
    pub t_at_zero: BigInt,
    #[serde(serialize_with = "serialize_display")]
    pub t_at_target: BigInt,
    #[serde(serialize_with = "serialize_display")]
    pub target_error: BigInt,
}

/// Scores one `(e0, t0)` pair; `None` when it violates a hard constraint.
pub fn evaluate_candidate(targets: &LaunchTargets, e0: &BigInt, t0: &BigInt) -> Option<Candidate> {
    if !e0.is_positive() || t0.is_negative() {
        return None;
    }

    let k = (&targets.total_supply + t0) * e0;
    let t_at_zero = reserves_from_eth(&k, t0, e0, &BigInt::zero());
    if t_at_zero != targets.total_supply {
        return None;
    }

    let t_at_target = reserves_from_eth(&k, t0, e0, &targets.graduation_eth);
    let target_error = (&t_at_target - &targets.graduation_tokens).abs();

    Some(Candidate {
        curve: ReservesCurve {
            k,
            t0: t0.clone(),
            e0: e0.clone(),
        },
        t_at_zero,
        t_at_target,
        target_error,
    })
}

fn improves(candidate: &Candidate, best: &Candidate) -> bool {
    candidate.target_error < best.target_error
        || (candidate.target_error == best.target_error && candidate.curve.e0 < best.curve.e0)
}

/// Returns the candidate with the smallest `|reserves(Eg) - Tg|`; ties go to
/// the smaller E0, then to the first one evaluated.
pub fn search(targets: &LaunchTargets, range: &SearchRange) -> Result<Candidate> {
    range.validate()?;

    let mut best: Option<Candidate> = None;
    let mut evaluated = 0usize;
    let mut rejected = 0usize;

    for e0 in range.iter() {
        let floor_t0 = targets.derived_t0_floor(&e0);
        for offset in -TOKEN_FIT_T0_WINDOW..=TOKEN_FIT_T0_WINDOW {
            let t0 = &floor_t0 + BigInt::from(offset);
            evaluated += 1;
            let Some(candidate) = evaluate_candidate(targets, &e0, &t0) else {
                rejected += 1;
                continue;
            };
            match &best {
                Some(current) if !improves(&candidate, current) => {}
                _ => best = Some(candidate),
            }
        }
    }

    tracing::debug!(evaluated, rejected, "token-target scan finished");

    let best = best.ok_or(CurveError::NoCandidate)?;
    tracing::info!(
        e0 = %best.curve.e0,
        t0 = %best.curve.t0,
        error = %best.target_error,
        "selected token-target candidate"
    );
    Ok(best)
}
