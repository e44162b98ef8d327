use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateMealRequest, MealDetails, Pagination},
    repo::{self, MealRecord, NewMeal},
};
use crate::{auth::jwt::AuthUser, state::AppState};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/:id", get(get_meal).delete(delete_meal))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "meal request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<MealRecord>>, (StatusCode, String)> {
    let (limit, offset) = p.clamped();
    let meals = repo::list_by_user(&state.db, user_id, limit, offset)
        .await
        .map_err(internal)?;
    Ok(Json(meals))
}

#[instrument(skip(state, body))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateMealRequest>,
) -> Result<(StatusCode, HeaderMap, Json<MealDetails>), (StatusCode, String)> {
    if let Err(msg) = body.validate() {
        warn!(%user_id, %msg, "rejected meal");
        return Err((StatusCode::BAD_REQUEST, msg));
    }
    let new = NewMeal {
        name: body.name.trim(),
        calories: body.calories,
        protein: body.protein,
        carbs: body.carbs,
        fat: body.fat,
        description: body.description.as_deref(),
        occurred_at: body.occurred_at,
    };
    let meal = repo::insert(&state.db, user_id, &new).await.map_err(internal)?;
    info!(%user_id, meal_id = %meal.id, calories = meal.calories, "meal created");

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/meals/{}", meal.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(meal.into())))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MealDetails>, (StatusCode, String)> {
    match repo::get(&state.db, user_id, id).await.map_err(internal)? {
        Some(meal) => Ok(Json(meal.into())),
        None => Err((StatusCode::NOT_FOUND, "Meal not found".into())),
    }
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if repo::delete(&state.db, user_id, id).await.map_err(internal)? {
        info!(%user_id, meal_id = %id, "meal deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Meal not found".into()))
    }
}
