use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::CreateExerciseRequest,
    repo::{self, ExerciseRecord, NewExercise},
};
use crate::{auth::jwt::AuthUser, meals::Pagination, state::AppState};

pub fn exercise_routes() -> Router<AppState> {
    Router::new()
        .route("/exercises", get(list_exercises).post(create_exercise))
        .route("/exercises/:id", get(get_exercise).delete(delete_exercise))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "exercise request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
}

#[instrument(skip(state))]
pub async fn list_exercises(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<ExerciseRecord>>, (StatusCode, String)> {
    let (limit, offset) = p.clamped();
    let rows = repo::list_by_user(&state.db, user_id, limit, offset)
        .await
        .map_err(internal)?;
    Ok(Json(rows))
}

#[instrument(skip(state, body))]
pub async fn create_exercise(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateExerciseRequest>,
) -> Result<(StatusCode, HeaderMap, Json<ExerciseRecord>), (StatusCode, String)> {
    if let Err(msg) = body.validate() {
        warn!(%user_id, %msg, "rejected exercise");
        return Err((StatusCode::BAD_REQUEST, msg));
    }
    let new = NewExercise {
        name: body.name.trim(),
        calories_burned: body.calories_burned,
        duration_minutes: body.duration_minutes,
        occurred_at: body.occurred_at,
    };
    let ex = repo::insert(&state.db, user_id, &new).await.map_err(internal)?;
    info!(%user_id, exercise_id = %ex.id, burned = ex.calories_burned, "exercise logged");

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/exercises/{}", ex.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(ex)))
}

#[instrument(skip(state))]
pub async fn get_exercise(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ExerciseRecord>, (StatusCode, String)> {
    repo::get(&state.db, user_id, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Exercise not found".into()))
}

#[instrument(skip(state))]
pub async fn delete_exercise(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if repo::delete(&state.db, user_id, id).await.map_err(internal)? {
        info!(%user_id, exercise_id = %id, "exercise deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Exercise not found".into()))
    }
}
