use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{instrument, warn};

use super::dto::{
    BmiQuery, BmiResponse, CurrentTdeeResponse, TdeeRequest, TdeeResponse, WeeklySummaryResponse,
};
use super::error::MetricsError;
use super::formulas::{compute_bmi, ActivityLevel, Sex};
use super::service::TdeeInput;
use crate::{auth::jwt::AuthUser, state::AppState};

pub fn metrics_routes() -> Router<AppState> {
    Router::new()
        .route("/metrics/tdee", get(get_tdee).post(post_tdee))
        .route("/metrics/weekly", get(get_weekly))
        .route("/metrics/bmi", get(get_bmi))
}

fn parse_tdee_request(body: &TdeeRequest) -> Result<TdeeInput, MetricsError> {
    Ok(TdeeInput {
        weight_kg: body.weight_kg,
        height_cm: body.height_cm,
        age: body.age,
        sex: body.sex.parse::<Sex>()?,
        activity: ActivityLevel::try_from(body.activity_level)?,
    })
}

#[instrument(skip(state, body))]
pub async fn post_tdee(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<TdeeRequest>,
) -> Result<Json<TdeeResponse>, (StatusCode, String)> {
    let input = parse_tdee_request(&body).map_err(|e| {
        warn!(error = %e, %user_id, "rejected tdee input");
        e
    })?;
    let recorded = state.metrics.record_tdee(user_id, input).await?;
    Ok(Json(TdeeResponse {
        record: recorded.record,
        tdee: recorded.exact,
    }))
}

#[instrument(skip(state))]
pub async fn get_tdee(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<CurrentTdeeResponse>, (StatusCode, String)> {
    let calories = state.metrics.current_tdee(user_id).await?;
    Ok(Json(CurrentTdeeResponse { calories }))
}

#[instrument(skip(state))]
pub async fn get_weekly(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<WeeklySummaryResponse>, (StatusCode, String)> {
    let (window, totals) = state
        .metrics
        .week_summary_at(user_id, OffsetDateTime::now_utc())
        .await?;
    Ok(Json(WeeklySummaryResponse { window, totals }))
}

pub async fn get_bmi(Query(q): Query<BmiQuery>) -> Json<BmiResponse> {
    Json(BmiResponse {
        bmi: compute_bmi(q.weight_kg, q.height_cm),
    })
}
