use serde::{Deserialize, Serialize};

/// Business inputs shared by both monetization models. Rates are fractions
/// per period (0.05 = 5%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    #[serde(alias = "N")]
    pub initial_users: f64,
    #[serde(alias = "p")]
    pub price: f64,
    #[serde(alias = "c_trial")]
    pub trial_conversion: f64,
    #[serde(alias = "a")]
    pub curve_steepness: f64,
    #[serde(alias = "b")]
    pub curve_inflection: f64,
    #[serde(alias = "r")]
    pub retention: f64,
    #[serde(alias = "CAC")]
    pub acquisition_cost: f64,
    #[serde(alias = "d")]
    pub discount_rate: f64,
    #[serde(alias = "g")]
    pub growth_rate: f64,
    #[serde(alias = "T")]
    pub periods: u32,
}

/// Side-by-side snapshot of both models at the end of one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyRecord {
    pub period: u32,
    #[serde(rename = "trialCumulativeNPV")]
    pub trial_cumulative_npv: f64,
    #[serde(rename = "freemiumCumulativeNPV")]
    pub freemium_cumulative_npv: f64,
    #[serde(rename = "trialActiveUsers")]
    pub trial_active_users: f64,
    #[serde(rename = "freemiumActiveUsers")]
    pub freemium_active_users: f64,
}

/// Intermediate values of a single model for one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPeriod {
    pub period: u32,
    pub new_paying_users: f64,
    pub paying_users: f64,
    pub active_users: f64,
    pub revenue: f64,
    pub acquisition_cost: f64,
    pub cash_flow: f64,
    pub discount_factor: f64,
    pub cumulative_npv: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub monthly: Vec<MonthlyRecord>,
    pub trial_npv: f64,
    pub freemium_npv: f64,
    pub break_even_period: Option<u32>,
    pub trial: Vec<ModelPeriod>,
    pub freemium: Vec<ModelPeriod>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub t: f64,
    pub fraction: f64,
    pub users: f64,
}
