use super::error::ProjectionError;
use super::types::CurvePoint;

/// Cumulative fraction of the addressable pool converted by time `t`, following
/// a logistic S-curve with steepness `steepness` and inflection `inflection`.
///
/// Very large `|steepness|` saturates to exactly 0.0 or 1.0 instead of
/// overflowing.
pub fn conversion(t: f64, steepness: f64, inflection: f64) -> f64 {
    1.0 / (1.0 + (-steepness * (t - inflection)).exp())
}

/// Fraction of the pool converting during `period` alone. Period 1 has no
/// earlier reference point, so it takes the full cumulative value.
pub(crate) fn incremental_conversion(period: u32, steepness: f64, inflection: f64) -> f64 {
    let current = conversion(f64::from(period), steepness, inflection);
    if period > 1 {
        current - conversion(f64::from(period - 1), steepness, inflection)
    } else {
        current
    }
}

/// Samples the S-curve at `samples` evenly spaced times over `[0, periods]`.
pub fn adoption_curve(
    steepness: f64,
    inflection: f64,
    initial_users: f64,
    periods: u32,
    samples: usize,
) -> Result<Vec<CurvePoint>, ProjectionError> {
    if periods == 0 {
        return Err(ProjectionError::invalid("periods", "must be >= 1"));
    }
    if samples < 2 {
        return Err(ProjectionError::invalid("samples", "must be >= 2"));
    }

    let horizon = f64::from(periods);
    let last = (samples - 1) as f64;
    Ok((0..samples)
        .map(|i| {
            let t = horizon * i as f64 / last;
            let fraction = conversion(t, steepness, inflection);
            CurvePoint {
                t,
                fraction,
                users: initial_users * fraction,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, prop_assume, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn zero_steepness_is_flat_half() {
        for t in [-10.0, 0.0, 3.0, 6.0, 120.0] {
            assert_approx(conversion(t, 0.0, 6.0), 0.5);
        }
    }

    #[test]
    fn negative_steepness_mirrors_curve() {
        let rising = conversion(8.0, 1.0, 6.0);
        let falling = conversion(8.0, -1.0, 6.0);
        assert!(rising > 0.5);
        assert!(falling < 0.5);
        assert_approx(rising + falling, 1.0);
    }

    #[test]
    fn huge_steepness_saturates_without_overflow() {
        assert_eq!(conversion(5.0, 1e6, 6.0), 0.0);
        assert_eq!(conversion(7.0, 1e6, 6.0), 1.0);
        assert_approx(conversion(6.0, 1e6, 6.0), 0.5);
    }

    #[test]
    fn first_period_increment_is_cumulative_value() {
        assert_approx(incremental_conversion(1, 1.0, 6.0), conversion(1.0, 1.0, 6.0));
        assert_approx(
            incremental_conversion(4, 1.0, 6.0),
            conversion(4.0, 1.0, 6.0) - conversion(3.0, 1.0, 6.0),
        );
    }

    #[test]
    fn adoption_curve_spans_horizon() {
        let points = adoption_curve(1.0, 6.0, 10_000.0, 12, 5).expect("valid curve");
        assert_eq!(points.len(), 5);
        assert_approx(points[0].t, 0.0);
        assert_approx(points[2].t, 6.0);
        assert_approx(points[4].t, 12.0);
        assert_approx(points[2].fraction, 0.5);
        assert_approx(points[2].users, 5_000.0);
        assert!(points.windows(2).all(|w| w[0].fraction < w[1].fraction));
    }

    #[test]
    fn adoption_curve_rejects_degenerate_sampling() {
        assert!(matches!(
            adoption_curve(1.0, 6.0, 100.0, 12, 1),
            Err(ProjectionError::InvalidParameter { name: "samples", .. })
        ));
        assert!(matches!(
            adoption_curve(1.0, 6.0, 100.0, 0, 10),
            Err(ProjectionError::InvalidParameter { name: "periods", .. })
        ));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_curve_is_half_at_inflection(
            steepness_milli in -20_000i32..20_000,
            inflection_centi in -5_000i32..5_000
        ) {
            prop_assume!(steepness_milli != 0);
            let a = f64::from(steepness_milli) / 1_000.0;
            let b = f64::from(inflection_centi) / 100.0;
            prop_assert_eq!(conversion(b, a, b), 0.5);
        }

        #[test]
        fn prop_curve_stays_in_unit_interval(
            steepness_milli in -20_000i32..20_000,
            inflection in -50i32..50,
            t in -100i32..100
        ) {
            let value = conversion(
                f64::from(t),
                f64::from(steepness_milli) / 1_000.0,
                f64::from(inflection),
            );
            prop_assert!((0.0..=1.0).contains(&value));
        }
    }
}
