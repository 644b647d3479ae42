use axum::{
    Router,
    extract::{
        Json, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{
    FinanceError, Goal, GoalLedger, GoalPlan, GoalSpec, RetirementProfile, Timeline,
    project_timeline,
};
use crate::format::{format_currency, format_months};
use crate::interaction_log::{InteractionLog, InteractionRecord};

const MAX_AGE: u32 = 120;

#[derive(Parser, Debug)]
#[command(
    name = "dreamlife",
    about = "Estimate retirement net worth and the monthly savings each goal needs"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "info",
        help = "Log level (RUST_LOG overrides)"
    )]
    pub log_level: String,
    #[arg(
        long,
        global = true,
        help = "Append one CSV record per computation to this file"
    )]
    pub log_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print a projection for the given inputs
    Project(ProjectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    #[command(flatten)]
    profile: ProfileArgs,
    #[arg(
        long = "goal",
        value_parser = parse_goal_arg,
        help = "Savings goal as name,target,rate,year=YYYY or name,target,rate,monthly=AMOUNT; repeatable"
    )]
    goals: Vec<GoalPayload>,
    #[arg(long, help = "Year goals are measured from; defaults to the system clock")]
    current_year: Option<i32>,
}

#[derive(Args, Debug, Clone)]
struct ProfileArgs {
    #[arg(long, default_value_t = 30)]
    current_age: u32,
    #[arg(long, default_value_t = 65)]
    retirement_age: u32,
    #[arg(long, default_value_t = 5000.0, help = "Monthly income after tax")]
    monthly_income: f64,
    #[arg(long, default_value_t = 2000.0)]
    monthly_expenses: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Expected annual rate of return in percent, e.g. 5; 6-7 is typical for stocks"
    )]
    rate_of_return: f64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Finance(#[from] FinanceError),
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoalPayload {
    name: Option<String>,
    target_amount: Option<f64>,
    #[serde(alias = "annualRatePct")]
    rate_of_return: Option<f64>,
    target_year: Option<i32>,
    monthly_contribution: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    monthly_income: Option<f64>,
    monthly_expenses: Option<f64>,
    #[serde(alias = "annualRatePct")]
    rate_of_return: Option<f64>,
    current_year: Option<i32>,
    goals: Vec<GoalPayload>,
}

#[derive(Debug)]
struct ProjectRequest {
    profile: RetirementProfile,
    goals: Vec<GoalSpec>,
    current_year: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct RejectedGoal {
    index: usize,
    name: String,
    kind: &'static str,
    message: String,
}

#[derive(Debug)]
struct Projection {
    ledger: GoalLedger,
    rejected: Vec<RejectedGoal>,
    net_worth: f64,
    timeline: Timeline,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    current_year: i32,
    retirement_age: u32,
    months_to_retirement: u32,
    monthly_surplus: f64,
    total_monthly_commitment: f64,
    remaining_for_retirement: f64,
    overcommitted: bool,
    projected_net_worth: f64,
    goals: Vec<Goal>,
    rejected_goals: Vec<RejectedGoal>,
    timeline: Timeline,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

#[derive(Clone, Default)]
struct AppState {
    interaction_log: Option<Arc<InteractionLog>>,
}

pub fn current_year() -> i32 {
    i32::from(jiff::Zoned::now().year())
}

fn non_negative(field: &str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new(field, "must be a finite number >= 0"));
    }
    Ok(value)
}

fn build_profile(args: &ProfileArgs) -> Result<RetirementProfile, ValidationError> {
    if args.current_age > MAX_AGE {
        return Err(ValidationError::new(
            "currentAge",
            format!("must be between 0 and {MAX_AGE}"),
        ));
    }
    if args.retirement_age > MAX_AGE {
        return Err(ValidationError::new(
            "retirementAge",
            format!("must be between 0 and {MAX_AGE}"),
        ));
    }
    if args.retirement_age <= args.current_age {
        return Err(ValidationError::new(
            "retirementAge",
            "must be greater than currentAge",
        ));
    }

    Ok(RetirementProfile {
        current_age: args.current_age,
        retirement_age: args.retirement_age,
        monthly_income: non_negative("monthlyIncome", args.monthly_income)?,
        monthly_expenses: non_negative("monthlyExpenses", args.monthly_expenses)?,
        annual_rate_pct: non_negative("rateOfReturn", args.rate_of_return)?,
    })
}

fn build_goal_spec(payload: &GoalPayload, index: usize) -> Result<GoalSpec, ValidationError> {
    let field = |name: &str| format!("goals[{index}].{name}");

    let name = payload.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ValidationError::new(field("name"), "must not be empty"));
    }
    let Some(target_amount) = payload.target_amount else {
        return Err(ValidationError::new(field("targetAmount"), "is required"));
    };
    let target_amount = non_negative(&field("targetAmount"), target_amount)?;
    let annual_rate_pct = non_negative(
        &field("rateOfReturn"),
        payload.rate_of_return.unwrap_or(0.0),
    )?;

    let plan = match (payload.target_year, payload.monthly_contribution) {
        (Some(target_year), None) => GoalPlan::TargetYear { target_year },
        (None, Some(monthly_contribution)) => GoalPlan::MonthlyContribution {
            monthly_contribution: non_negative(
                &field("monthlyContribution"),
                monthly_contribution,
            )?,
        },
        (Some(_), Some(_)) => {
            return Err(ValidationError::new(
                field("targetYear"),
                "set either targetYear or monthlyContribution, not both",
            ));
        }
        (None, None) => {
            return Err(ValidationError::new(
                field("targetYear"),
                "one of targetYear or monthlyContribution is required",
            ));
        }
    };

    Ok(GoalSpec {
        name: name.to_string(),
        target_amount,
        annual_rate_pct,
        plan,
    })
}

fn parse_goal_arg(raw: &str) -> Result<GoalPayload, String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [name, target, rate, plan] = parts.as_slice() else {
        return Err(
            "expected name,target,rate,year=YYYY or name,target,rate,monthly=AMOUNT".to_string(),
        );
    };

    let number = |label: &str, value: &str| {
        value
            .parse::<f64>()
            .map_err(|e| format!("invalid {label} '{value}': {e}"))
    };

    let mut payload = GoalPayload {
        name: Some((*name).to_string()),
        target_amount: Some(number("target", *target)?),
        rate_of_return: Some(number("rate", *rate)?),
        ..GoalPayload::default()
    };

    match plan.split_once('=') {
        Some(("year", year)) => {
            payload.target_year = Some(
                year.parse::<i32>()
                    .map_err(|e| format!("invalid year '{year}': {e}"))?,
            );
        }
        Some(("monthly", amount)) => {
            payload.monthly_contribution = Some(number("monthly contribution", amount)?);
        }
        _ => return Err(format!("expected year=YYYY or monthly=AMOUNT, got '{plan}'")),
    }

    Ok(payload)
}

fn default_args_for_api() -> ProfileArgs {
    ProfileArgs {
        current_age: 30,
        retirement_age: 65,
        monthly_income: 5_000.0,
        monthly_expenses: 2_000.0,
        rate_of_return: 5.0,
    }
}

#[cfg(test)]
fn api_request_from_json(json: &str, default_year: i32) -> Result<ProjectRequest, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload, default_year).map_err(|e| e.to_string())
}

fn api_request_from_payload(
    payload: ProjectPayload,
    default_year: i32,
) -> Result<ProjectRequest, ValidationError> {
    let mut args = default_args_for_api();

    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        args.retirement_age = v;
    }
    if let Some(v) = payload.monthly_income {
        args.monthly_income = v;
    }
    if let Some(v) = payload.monthly_expenses {
        args.monthly_expenses = v;
    }
    if let Some(v) = payload.rate_of_return {
        args.rate_of_return = v;
    }

    let profile = build_profile(&args)?;
    let goals = payload
        .goals
        .iter()
        .enumerate()
        .map(|(index, goal)| build_goal_spec(goal, index))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ProjectRequest {
        profile,
        goals,
        current_year: payload.current_year.unwrap_or(default_year),
    })
}

fn cli_request(args: &ProjectArgs) -> Result<ProjectRequest, ValidationError> {
    let profile = build_profile(&args.profile)?;
    let goals = args
        .goals
        .iter()
        .enumerate()
        .map(|(index, goal)| build_goal_spec(goal, index))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ProjectRequest {
        profile,
        goals,
        current_year: args.current_year.unwrap_or_else(current_year),
    })
}

/// Goals that cannot be resolved are reported alongside the projection rather
/// than failing it; only the retirement projection itself can fail.
fn run_projection(request: &ProjectRequest) -> Result<Projection, FinanceError> {
    let mut ledger = GoalLedger::new();
    let mut rejected = Vec::new();

    for (index, spec) in request.goals.iter().enumerate() {
        if let Err(e) = ledger.add(spec.clone(), request.current_year) {
            tracing::info!(goal = %spec.name, kind = e.kind(), "goal rejected: {e}");
            rejected.push(RejectedGoal {
                index,
                name: spec.name.clone(),
                kind: e.kind(),
                message: e.to_string(),
            });
        }
    }

    let net_worth = ledger.projected_retirement_net_worth(&request.profile)?;
    let timeline = project_timeline(&request.profile, &ledger, request.current_year)?;
    tracing::debug!(
        goals = ledger.len(),
        rejected = rejected.len(),
        net_worth,
        "projection computed"
    );

    Ok(Projection {
        ledger,
        rejected,
        net_worth,
        timeline,
    })
}

fn build_project_response(request: &ProjectRequest, projection: Projection) -> ProjectResponse {
    let profile = &request.profile;
    let ledger = &projection.ledger;
    ProjectResponse {
        current_year: request.current_year,
        retirement_age: profile.retirement_age,
        months_to_retirement: profile.months_to_retirement(),
        monthly_surplus: profile.monthly_surplus(),
        total_monthly_commitment: ledger.total_monthly_commitment(),
        remaining_for_retirement: ledger.remaining_for_retirement(profile),
        overcommitted: ledger.is_overcommitted(profile),
        projected_net_worth: projection.net_worth,
        goals: ledger.goals().to_vec(),
        rejected_goals: projection.rejected,
        timeline: projection.timeline,
    }
}

fn render_report(request: &ProjectRequest, projection: &Projection) -> String {
    let profile = &request.profile;
    let ledger = &projection.ledger;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Months to retirement: {}",
        profile.months_to_retirement()
    );
    let _ = writeln!(
        out,
        "Monthly surplus: {}",
        format_currency(profile.monthly_surplus())
    );
    let _ = writeln!(
        out,
        "Committed to goals: {}",
        format_currency(ledger.total_monthly_commitment())
    );
    let _ = writeln!(
        out,
        "Remaining for retirement: {}",
        format_currency(ledger.remaining_for_retirement(profile))
    );
    let _ = writeln!(
        out,
        "Your estimated net worth at age {} is: {}",
        profile.retirement_age,
        format_currency(projection.net_worth)
    );

    if !ledger.is_empty() {
        let _ = writeln!(out, "\nGoals:");
        for goal in ledger.goals() {
            let _ = writeln!(
                out,
                "  {} {}: {}/month toward {} by {} ({})",
                goal.id,
                goal.name,
                format_currency(goal.resolved.monthly_contribution),
                format_currency(goal.target_amount),
                goal.resolved.target_year,
                format_months(goal.resolved.horizon_months)
            );
        }
    }

    if !projection.rejected.is_empty() {
        let _ = writeln!(out, "\nRejected goals:");
        for rejected in &projection.rejected {
            let _ = writeln!(out, "  {}: {}", rejected.name, rejected.message);
        }
    }

    if ledger.is_overcommitted(profile) {
        let _ = writeln!(
            out,
            "\nWarning: goal contributions exceed your monthly surplus, so retirement savings shrink every month."
        );
    }

    let _ = writeln!(out, "\n{:>5} {:>6} {:>18}", "Age", "Year", "Balance");
    for point in &projection.timeline.points {
        let _ = writeln!(
            out,
            "{:>5} {:>6} {:>18}",
            point.age,
            point.year,
            format_currency(point.balance)
        );
    }

    out
}

/// Run the `project` subcommand and return the printable report.
pub fn run_project_command(
    args: &ProjectArgs,
    interaction_log: Option<&InteractionLog>,
) -> Result<String, ProjectError> {
    let request = cli_request(args)?;
    let projection = run_projection(&request)?;
    if let Some(log) = interaction_log {
        log.record(&InteractionRecord::new(
            &request.profile,
            &projection.ledger,
            projection.net_worth,
        ));
    }
    Ok(render_report(&request, &projection))
}

pub async fn run_http_server(
    port: u16,
    interaction_log: Option<InteractionLog>,
) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let state = AppState {
        interaction_log: interaction_log.map(Arc::new),
    };
    let app = Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler)
        .with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("dreamlife HTTP API listening on http://{addr}");
    tracing::info!("Local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found", None)
}

async fn project_get_handler(
    State(state): State<AppState>,
    payload: Result<Query<ProjectPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => project_handler_impl(&state, payload),
        Err(rejection) => error_response(rejection.status(), &rejection.body_text(), None),
    }
}

async fn project_post_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProjectPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => project_handler_impl(&state, payload),
        Err(rejection) => error_response(rejection.status(), &rejection.body_text(), None),
    }
}

fn project_handler_impl(state: &AppState, payload: ProjectPayload) -> Response {
    let request = match api_request_from_payload(payload, current_year()) {
        Ok(request) => request,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string(), None),
    };

    let projection = match run_projection(&request) {
        Ok(projection) => projection,
        Err(e) => {
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                &e.to_string(),
                Some(e.kind()),
            );
        }
    };

    if let Some(log) = &state.interaction_log {
        log.record(&InteractionRecord::new(
            &request.profile,
            &projection.ledger,
            projection.net_worth,
        ));
    }

    json_response(StatusCode::OK, build_project_response(&request, projection))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str, kind: Option<&'static str>) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            kind,
        },
    )
}
