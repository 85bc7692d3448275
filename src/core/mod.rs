mod advisory;
mod curve;
mod engine;
mod error;
mod format;
mod types;

pub use advisory::{Advisory, STEEP_CURVE_THRESHOLD, advisories};
pub use curve::{adoption_curve, conversion};
pub use engine::{
    break_even_period, discount_factor, project, simulate_freemium, simulate_trial, validate,
};
pub use error::ProjectionError;
pub use format::{format_value, period_label};
pub use types::{CurvePoint, ModelPeriod, MonthlyRecord, Params, Projection};
