use serde::Serialize;

use super::types::Params;

/// Above this steepness the S-curve is effectively a step at the inflection.
pub const STEEP_CURVE_THRESHOLD: f64 = 5.0;

/// Non-fatal plausibility warnings. The engine simulates these inputs as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Advisory {
    SteepCurve { steepness: f64 },
    InflectionOutsideHorizon { inflection: f64, periods: u32 },
    RetentionAboveOne { retention: f64 },
    TrialConversionOutOfRange { trial_conversion: f64 },
    NegativePrice { price: f64 },
}

impl Advisory {
    pub fn message(&self) -> String {
        match self {
            Advisory::SteepCurve { steepness } => format!(
                "curve steepness {steepness} makes conversion a near-step at the inflection"
            ),
            Advisory::InflectionOutsideHorizon { inflection, periods } => format!(
                "inflection period {inflection} lies outside the simulated horizon 0..={periods}"
            ),
            Advisory::RetentionAboveOne { retention } => {
                format!("retention {retention} above 1 grows the paying base on its own")
            }
            Advisory::TrialConversionOutOfRange { trial_conversion } => {
                format!("trial conversion {trial_conversion} is not a fraction in [0, 1]")
            }
            Advisory::NegativePrice { price } => format!("price {price} is negative"),
        }
    }
}

pub fn advisories(params: &Params) -> Vec<Advisory> {
    let mut out = Vec::new();
    if params.curve_steepness.abs() > STEEP_CURVE_THRESHOLD {
        out.push(Advisory::SteepCurve {
            steepness: params.curve_steepness,
        });
    }
    if !(0.0..=f64::from(params.periods)).contains(&params.curve_inflection) {
        out.push(Advisory::InflectionOutsideHorizon {
            inflection: params.curve_inflection,
            periods: params.periods,
        });
    }
    if params.retention > 1.0 {
        out.push(Advisory::RetentionAboveOne {
            retention: params.retention,
        });
    }
    if !(0.0..=1.0).contains(&params.trial_conversion) {
        out.push(Advisory::TrialConversionOutOfRange {
            trial_conversion: params.trial_conversion,
        });
    }
    if params.price < 0.0 {
        out.push(Advisory::NegativePrice {
            price: params.price,
        });
    }
    out
}
