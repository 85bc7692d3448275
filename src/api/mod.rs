use axum::{
    Router,
    extract::{Json, Query},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum, error::ErrorKind};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    Advisory, CurvePoint, ModelPeriod, MonthlyRecord, Params, Projection, adoption_curve,
    advisories, format_value, period_label, project,
};

const DEFAULT_CURVE_SAMPLES: usize = 100;
const MAX_CURVE_SAMPLES: usize = 10_000;
const MAX_PERIODS: u32 = 1_200;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    users: Option<f64>,
    price: Option<f64>,
    trial_conversion: Option<f64>,
    curve_steepness: Option<f64>,
    curve_inflection: Option<f64>,
    retention: Option<f64>,
    cac: Option<f64>,
    discount_rate: Option<f64>,
    growth_rate: Option<f64>,
    periods: Option<u32>,
    details: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CurvePayload {
    steepness: Option<f64>,
    inflection: Option<f64>,
    users: Option<f64>,
    periods: Option<u32>,
    samples: Option<usize>,
}

#[derive(Parser, Debug)]
#[command(
    name = "monetize",
    about = "Compare Free Trial and Freemium monetization by projected NPV and active users"
)]
struct Cli {
    #[arg(
        long,
        default_value_t = 10_000.0,
        help = "New trial users per period; also the initial free user pool"
    )]
    users: f64,
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Price per paying user per period"
    )]
    price: f64,
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Share of each trial cohort converting to paid, in percent"
    )]
    trial_conversion: f64,
    #[arg(
        long,
        default_value_t = 1.0,
        allow_negative_numbers = true,
        help = "Freemium S-curve steepness; negative values invert the curve"
    )]
    curve_steepness: f64,
    #[arg(
        long,
        default_value_t = 6.0,
        allow_negative_numbers = true,
        help = "Period at which the freemium S-curve crosses 50% conversion"
    )]
    curve_inflection: f64,
    #[arg(
        long,
        default_value_t = 95.0,
        help = "Per-period retention of paying users in percent"
    )]
    retention: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Acquisition cost per newly converted paying user"
    )]
    cac: f64,
    #[arg(
        long,
        default_value_t = 10.0,
        allow_negative_numbers = true,
        help = "Per-period discount rate in percent"
    )]
    discount_rate: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        allow_negative_numbers = true,
        help = "Per-period growth of the freemium user pool in percent"
    )]
    growth_rate: f64,
    #[arg(long, default_value_t = 12, help = "Number of periods to project")]
    periods: u32,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Copy, Clone, Debug)]
struct ApiOptions {
    details: bool,
}

#[derive(Debug)]
struct ApiRequest {
    params: Params,
    options: ApiOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    params: Params,
    trial_npv: f64,
    freemium_npv: f64,
    break_even_period: Option<u32>,
    monthly_data: Vec<MonthlyRecord>,
    warnings: Vec<Advisory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trial_periods: Option<Vec<ModelPeriod>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    freemium_periods: Option<Vec<ModelPeriod>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CurveResponse {
    steepness: f64,
    inflection: f64,
    points: Vec<CurvePoint>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_params(cli: &Cli) -> Result<Params, String> {
    let numeric = [
        ("--users", cli.users),
        ("--price", cli.price),
        ("--trial-conversion", cli.trial_conversion),
        ("--curve-steepness", cli.curve_steepness),
        ("--curve-inflection", cli.curve_inflection),
        ("--retention", cli.retention),
        ("--cac", cli.cac),
        ("--discount-rate", cli.discount_rate),
        ("--growth-rate", cli.growth_rate),
    ];
    if let Some((flag, _)) = numeric.iter().find(|(_, value)| !value.is_finite()) {
        return Err(format!("{flag} must be a finite number"));
    }

    if cli.periods == 0 {
        return Err("--periods must be >= 1".to_string());
    }

    if cli.periods > MAX_PERIODS {
        return Err(format!("--periods must be <= {MAX_PERIODS}"));
    }

    if cli.discount_rate <= -100.0 {
        return Err("--discount-rate must be > -100".to_string());
    }

    Ok(Params {
        initial_users: cli.users,
        price: cli.price,
        trial_conversion: cli.trial_conversion / 100.0,
        curve_steepness: cli.curve_steepness,
        curve_inflection: cli.curve_inflection,
        retention: cli.retention / 100.0,
        acquisition_cost: cli.cac,
        discount_rate: cli.discount_rate / 100.0,
        growth_rate: cli.growth_rate / 100.0,
        periods: cli.periods,
    })
}

/// Parses command-line arguments, runs one projection and renders it.
///
/// `--help` and `--version` come back as `Ok` with the rendered text; every
/// other argument error is an `Err`.
pub fn run_cli<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Ok(e.to_string());
        }
        Err(e) => return Err(e.to_string()),
    };
    debug!(?cli, "parsed command line");
    let format = cli.format;
    let params = build_params(&cli)?;
    let projection = project(&params).map_err(|e| e.to_string())?;

    match format {
        OutputFormat::Table => Ok(render_table(&params, &projection)),
        OutputFormat::Json => {
            let response = build_project_response(params, projection, true);
            serde_json::to_string_pretty(&response)
                .map_err(|e| format!("failed to serialize projection: {e}"))
        }
    }
}

fn render_table(params: &Params, projection: &Projection) -> String {
    let mut lines = vec![format!(
        "{:>8}  {:>12}  {:>12}  {:>10}  {:>12}",
        "Period", "Trial NPV", "Freemium NPV", "Trial MAU", "Freemium MAU"
    )];
    lines.extend(projection.monthly.iter().map(|record| {
        format!(
            "{:>8}  {:>12}  {:>12}  {:>10}  {:>12}",
            period_label(record.period, params.periods),
            format_value(record.trial_cumulative_npv),
            format_value(record.freemium_cumulative_npv),
            format_value(record.trial_active_users),
            format_value(record.freemium_active_users),
        )
    }));

    lines.push(String::new());
    lines.push(format!(
        "Free Trial NPV: ${}",
        format_value(projection.trial_npv)
    ));
    lines.push(format!(
        "Freemium NPV:   ${}",
        format_value(projection.freemium_npv)
    ));
    lines.push(match projection.break_even_period {
        Some(period) => format!("Break-even:     period {period}"),
        None => format!("Break-even:     none within {} periods", params.periods),
    });
    lines.extend(
        advisories(params)
            .iter()
            .map(|advisory| format!("warning: {}", advisory.message())),
    );
    lines.join("\n")
}

fn router() -> Router {
    Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/curve", get(curve_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "projection HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, router()).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn project_handler_impl(payload: ProjectPayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            warn!(error = %msg, "rejected projection request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let projection = match project(&request.params) {
        Ok(projection) => projection,
        Err(e) => {
            warn!(error = %e, "projection failed validation");
            return error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };
    debug!(
        periods = request.params.periods,
        break_even = ?projection.break_even_period,
        "served projection"
    );

    let response = build_project_response(request.params, projection, request.options.details);
    json_response(StatusCode::OK, response)
}

async fn curve_handler(Query(payload): Query<CurvePayload>) -> Response {
    match curve_response_from_payload(payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => {
            warn!(error = %msg, "rejected curve request");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ProjectPayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.users {
        cli.users = v;
    }
    if let Some(v) = payload.price {
        cli.price = v;
    }
    if let Some(v) = payload.trial_conversion {
        cli.trial_conversion = v;
    }
    if let Some(v) = payload.curve_steepness {
        cli.curve_steepness = v;
    }
    if let Some(v) = payload.curve_inflection {
        cli.curve_inflection = v;
    }
    if let Some(v) = payload.retention {
        cli.retention = v;
    }
    if let Some(v) = payload.cac {
        cli.cac = v;
    }
    if let Some(v) = payload.discount_rate {
        cli.discount_rate = v;
    }
    if let Some(v) = payload.growth_rate {
        cli.growth_rate = v;
    }
    if let Some(v) = payload.periods {
        cli.periods = v;
    }

    let params = build_params(&cli)?;
    Ok(ApiRequest {
        params,
        options: ApiOptions {
            details: payload.details.unwrap_or(false),
        },
    })
}

fn curve_response_from_payload(payload: CurvePayload) -> Result<CurveResponse, String> {
    let defaults = default_cli_for_api();
    let steepness = payload.steepness.unwrap_or(defaults.curve_steepness);
    let inflection = payload.inflection.unwrap_or(defaults.curve_inflection);
    let samples = payload.samples.unwrap_or(DEFAULT_CURVE_SAMPLES);
    if samples > MAX_CURVE_SAMPLES {
        return Err(format!("samples must be <= {MAX_CURVE_SAMPLES}"));
    }

    let points = adoption_curve(
        steepness,
        inflection,
        payload.users.unwrap_or(defaults.users),
        payload.periods.unwrap_or(defaults.periods),
        samples,
    )
    .map_err(|e| e.to_string())?;

    Ok(CurveResponse {
        steepness,
        inflection,
        points,
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        users: 10_000.0,
        price: 10.0,
        trial_conversion: 10.0,
        curve_steepness: 1.0,
        curve_inflection: 6.0,
        retention: 95.0,
        cac: 5.0,
        discount_rate: 10.0,
        growth_rate: 5.0,
        periods: 12,
        format: OutputFormat::Table,
    }
}

fn build_project_response(
    params: Params,
    projection: Projection,
    details: bool,
) -> ProjectResponse {
    let Projection {
        monthly,
        trial_npv,
        freemium_npv,
        break_even_period,
        trial,
        freemium,
    } = projection;

    ProjectResponse {
        params,
        trial_npv,
        freemium_npv,
        break_even_period,
        monthly_data: monthly,
        warnings: advisories(&params),
        trial_periods: details.then_some(trial),
        freemium_periods: details.then_some(freemium),
    }
}
