use tracing::debug;

use super::curve::incremental_conversion;
use super::error::ProjectionError;
use super::types::{ModelPeriod, MonthlyRecord, Params, Projection};

/// Runs both monetization models over `params.periods` and compares them.
///
/// Validation happens up front; either the whole projection is returned or
/// nothing is computed.
pub fn project(params: &Params) -> Result<Projection, ProjectionError> {
    validate(params)?;

    let trial = simulate_trial(params);
    let freemium = simulate_freemium(params);
    let monthly: Vec<MonthlyRecord> = trial
        .iter()
        .zip(&freemium)
        .map(|(t, f)| MonthlyRecord {
            period: t.period,
            trial_cumulative_npv: t.cumulative_npv,
            freemium_cumulative_npv: f.cumulative_npv,
            trial_active_users: t.active_users,
            freemium_active_users: f.active_users,
        })
        .collect();

    let (trial_npv, freemium_npv) = monthly
        .last()
        .map(|last| (last.trial_cumulative_npv, last.freemium_cumulative_npv))
        .unwrap_or((0.0, 0.0));
    let break_even_period = break_even_period(&monthly);

    debug!(
        periods = params.periods,
        trial_npv,
        freemium_npv,
        ?break_even_period,
        "projection complete"
    );

    Ok(Projection {
        monthly,
        trial_npv,
        freemium_npv,
        break_even_period,
        trial,
        freemium,
    })
}

pub fn validate(params: &Params) -> Result<(), ProjectionError> {
    if params.periods == 0 {
        return Err(ProjectionError::invalid("periods", "must be >= 1"));
    }
    if params.discount_rate.is_nan() || params.discount_rate <= -1.0 {
        return Err(ProjectionError::invalid(
            "discount_rate",
            format!(
                "must be > -1 so the discount factor is defined, got {}",
                params.discount_rate
            ),
        ));
    }
    Ok(())
}

/// First period at which freemium's cumulative NPV meets or exceeds trial's.
pub fn break_even_period(monthly: &[MonthlyRecord]) -> Option<u32> {
    monthly
        .iter()
        .find(|record| record.freemium_cumulative_npv >= record.trial_cumulative_npv)
        .map(|record| record.period)
}

pub fn discount_factor(discount_rate: f64, period: u32) -> f64 {
    1.0 / (1.0 + discount_rate).powf(f64::from(period))
}

/// Fresh trial cohort of `initial_users` every period; a fixed share converts
/// at once and acquisition cost is charged on each period's conversions.
pub fn simulate_trial(params: &Params) -> Vec<ModelPeriod> {
    let new_paying_users = params.initial_users * params.trial_conversion;
    let mut paying_users = 0.0;
    let mut npv = 0.0;

    (1..=params.periods)
        .map(|period| {
            paying_users = paying_users * params.retention + new_paying_users;
            let revenue = paying_users * params.price;
            let acquisition_cost = new_paying_users * params.acquisition_cost;
            let cash_flow = revenue - acquisition_cost;
            let discount_factor = discount_factor(params.discount_rate, period);
            npv += cash_flow * discount_factor;

            ModelPeriod {
                period,
                new_paying_users,
                paying_users,
                active_users: paying_users,
                revenue,
                acquisition_cost,
                cash_flow,
                discount_factor,
                cumulative_npv: npv,
            }
        })
        .collect()
}

/// Geometrically growing free pool converting along the S-curve.
pub fn simulate_freemium(params: &Params) -> Vec<ModelPeriod> {
    let mut total_users = params.initial_users;
    let mut paying_users = 0.0;
    let mut npv = 0.0;

    (1..=params.periods)
        .map(|period| {
            // Conversions are measured against the pool entering the period.
            let new_paying_users = total_users
                * incremental_conversion(period, params.curve_steepness, params.curve_inflection);
            paying_users = paying_users * params.retention + new_paying_users;
            let revenue = paying_users * params.price;
            let acquisition_cost = new_paying_users * params.acquisition_cost;
            let cash_flow = revenue - acquisition_cost;
            let discount_factor = discount_factor(params.discount_rate, period);
            npv += cash_flow * discount_factor;
            total_users *= 1.0 + params.growth_rate;

            ModelPeriod {
                period,
                new_paying_users,
                paying_users,
                active_users: total_users,
                revenue,
                acquisition_cost,
                cash_flow,
                discount_factor,
                cumulative_npv: npv,
            }
        })
        .collect()
}
