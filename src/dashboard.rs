use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tracing::{error, instrument};

use crate::{
    auth::jwt::AuthUser,
    meals::repo::{self as meals_repo, MealRecord},
    metrics::weekly::WeeklyAggregate,
    profiles::{dto::ProfileResponse, repo as profiles_repo},
    state::AppState,
};

const RECENT_MEALS: i64 = 5;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub profile: Option<ProfileResponse>,
    pub recent_meals: Vec<MealRecord>,
    pub tdee: i32,
    pub week: WeeklyAggregate,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

#[instrument(skip(state))]
pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DashboardResponse>, (StatusCode, String)> {
    let internal = |e: anyhow::Error| {
        error!(error = %e, %user_id, "dashboard query failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
    };

    let profile = profiles_repo::get(&state.db, user_id).await.map_err(internal)?;
    let recent_meals = meals_repo::list_by_user(&state.db, user_id, RECENT_MEALS, 0)
        .await
        .map_err(internal)?;
    let tdee = state.metrics.current_tdee(user_id).await?;
    let week = state.metrics.current_week_summary(user_id).await?;

    Ok(Json(DashboardResponse {
        profile: profile.map(Into::into),
        recent_meals,
        tdee,
        week,
    }))
}
