use curvelab_core::graduation::{search_with_fee, GraduationSearch, ScoreWeights};
use curvelab_core::search::{evaluate_candidate, search, SearchRange, TOKEN_FIT_T0_WINDOW};
use curvelab_core::ticks::{
    get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, price_to_sqrt_x96, sqrt_x96_to_price,
    sqrt_x96_to_tick, tick_to_sqrt_x96, MAX_TICK, MIN_TICK,
};
use curvelab_core::units::to_wei;
use curvelab_core::LaunchTargets;
use num_bigint::BigInt;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// E0 grid expressed in thousandths of an ETH.
fn milli_range(min: i64, steps: i64, step: i64) -> SearchRange {
    SearchRange::from_eth(
        Decimal::new(min, 3),
        Decimal::new(min + steps * step, 3),
        Decimal::new(step, 3),
    )
}

fn brute_force_min_error(targets: &LaunchTargets, range: &SearchRange) -> Option<BigInt> {
    range
        .iter()
        .flat_map(|e0| {
            let floor_t0 = targets.derived_t0_floor(&e0);
            (-TOKEN_FIT_T0_WINDOW..=TOKEN_FIT_T0_WINDOW)
                .filter_map(|offset| {
                    evaluate_candidate(targets, &e0, &(&floor_t0 + BigInt::from(offset)))
                })
                .map(|candidate| candidate.target_error)
                .collect::<Vec<_>>()
        })
        .min()
}

// ── Token-target fit ─────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: every returned curve holds exactly the total supply at zero ETH
    #[test]
    fn prop_fit_identity_at_zero(
        min in 2200i64..6000,
        steps in 0i64..12,
        step in 1i64..80,
    ) {
        let targets = LaunchTargets::default();
        let range = milli_range(min, steps, step);
        let best = search(&targets, &range).unwrap();
        prop_assert_eq!(best.t_at_zero, targets.total_supply.clone());
        prop_assert_eq!(best.curve.k, (&targets.total_supply + &best.curve.t0) * &best.curve.e0);
    }

    /// Property: the reported error is the minimum over every evaluated pair
    #[test]
    fn prop_fit_error_is_minimal(
        min in 2200i64..6000,
        steps in 0i64..12,
        step in 1i64..80,
    ) {
        let targets = LaunchTargets::default();
        let range = milli_range(min, steps, step);
        let best = search(&targets, &range).unwrap();
        let expected = brute_force_min_error(&targets, &range).unwrap();
        prop_assert!(best.target_error >= BigInt::from(0));
        prop_assert_eq!(best.target_error, expected);
    }

    /// Property: refining a grid never makes the best error worse
    #[test]
    fn prop_finer_grid_never_worse(
        min in 2200i64..6000,
        steps in 1i64..6,
        fine_step in 1i64..20,
        factor in 2i64..5,
    ) {
        let targets = LaunchTargets::default();
        let coarse = milli_range(min, steps, fine_step * factor);
        let fine = milli_range(min, steps * factor, fine_step);
        let coarse_best = search(&targets, &coarse).unwrap();
        let fine_best = search(&targets, &fine).unwrap();
        prop_assert!(fine_best.target_error <= coarse_best.target_error);
    }
}

// ── Fee-aware fit ────────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: widening the T0 window never increases the best score
    #[test]
    fn prop_wider_window_never_worse(
        min in 2300i64..4000,
        steps in 0i64..4,
        step in 5i64..50,
        window in 0u32..3,
        extra in 1u32..3,
    ) {
        let targets = LaunchTargets::default();
        let params = |t0_window| GraduationSearch {
            range: milli_range(min, steps, step),
            t0_window,
            target_fee: to_wei(Decimal::new(5, 1)),
            weights: ScoreWeights::default(),
        };
        let narrow = search_with_fee(&targets, &params(window)).unwrap();
        let wide = search_with_fee(&targets, &params(window + extra)).unwrap();
        prop_assert!(wide.score <= narrow.score);
        prop_assert_eq!(wide.t_at_zero, targets.total_supply.clone());
    }
}

// ── Tick math ────────────────────────────────────────────────────────────────────

proptest! {
    /// Property: price -> sqrtPriceX96 -> price stays within float tolerance
    #[test]
    fn prop_price_sqrt_roundtrip(exponent in -6.0f64..12.0, mantissa in 1.0f64..10.0) {
        let price = mantissa * 10f64.powf(exponent);
        let sqrt = price_to_sqrt_x96(price).unwrap();
        let back = sqrt_x96_to_price(&sqrt).unwrap();
        prop_assert!(((back - price) / price).abs() < 1e-9);
    }

    /// Property: ticks on the spacing grid survive the float round trip
    #[test]
    fn prop_on_grid_tick_roundtrip(
        spacing in prop::sample::select(vec![1i32, 10, 60, 200]),
        step in -4000i32..4000,
    ) {
        let tick = step * spacing;
        prop_assume!((MIN_TICK..=MAX_TICK).contains(&tick));
        let sqrt = tick_to_sqrt_x96(tick).unwrap();
        prop_assert_eq!(sqrt_x96_to_tick(&sqrt, spacing).unwrap(), tick);
    }

    /// Property: the exact tick lookup inverts the exact sqrt ratio
    #[test]
    fn prop_exact_tick_inverse(tick in MIN_TICK..MAX_TICK) {
        let ratio = get_sqrt_ratio_at_tick(tick).unwrap();
        prop_assert_eq!(get_tick_at_sqrt_ratio(&ratio).unwrap(), tick);
    }
}
