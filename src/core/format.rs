//! Compact number and axis labels for tabular and chart output.

/// Months per year, used to switch long horizons to a yearly axis.
const PERIODS_PER_YEAR: u32 = 12;
const YEARLY_AXIS_ABOVE: u32 = 60;

pub fn format_value(value: f64) -> String {
    let magnitude = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if magnitude >= 1_000_000.0 {
        format!("{sign}{:.1}M", magnitude / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{sign}{:.1}K", magnitude / 1_000.0)
    } else {
        let whole = value.round();
        // -0.4 rounds to -0.0, which would print as "-0".
        if whole == 0.0 {
            "0".to_string()
        } else {
            format!("{whole:.0}")
        }
    }
}

pub fn period_label(period: u32, periods: u32) -> String {
    if periods > YEARLY_AXIS_ABOVE {
        let years = (f64::from(period) / f64::from(PERIODS_PER_YEAR)).round();
        format!("{years:.0}Y")
    } else {
        period.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviates_thousands_and_millions() {
        assert_eq!(format_value(999.0), "999");
        assert_eq!(format_value(1_000.0), "1.0K");
        assert_eq!(format_value(12_340.0), "12.3K");
        assert_eq!(format_value(2_500_000.0), "2.5M");
    }

    #[test]
    fn keeps_sign_on_negative_values() {
        assert_eq!(format_value(-4_200.0), "-4.2K");
        assert_eq!(format_value(-1_200_000.0), "-1.2M");
        assert_eq!(format_value(-12.0), "-12");
    }

    #[test]
    fn values_rounding_to_zero_have_no_sign() {
        assert_eq!(format_value(-0.4), "0");
        assert_eq!(format_value(0.4), "0");
        assert_eq!(format_value(-0.0), "0");
        assert_eq!(format_value(-0.6), "-1");
    }

    #[test]
    fn long_horizons_label_in_years() {
        assert_eq!(period_label(7, 12), "7");
        assert_eq!(period_label(60, 60), "60");
        assert_eq!(period_label(24, 120), "2Y");
        assert_eq!(period_label(36, 61), "3Y");
    }

    #[test]
    fn half_years_round_up() {
        assert_eq!(period_label(18, 120), "2Y");
        assert_eq!(period_label(30, 120), "3Y");
        assert_eq!(period_label(6, 120), "1Y");
    }
}
