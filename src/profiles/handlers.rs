use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{error, info, instrument};

use super::{
    dto::{ProfileResponse, UpdateProfileRequest},
    repo::{self, Profile, ProfileUpdate},
};
use crate::{auth::jwt::AuthUser, state::AppState};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(put_profile))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "profile request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let profile = repo::get(&state.db, user_id)
        .await
        .map_err(internal)?
        .unwrap_or(Profile {
            user_id,
            age: None,
            weight_kg: None,
            height_cm: None,
            dietary_preferences: None,
        });
    Ok(Json(profile.into()))
}

#[instrument(skip(state, body))]
pub async fn put_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    body.validate()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg.to_string()))?;
    let update = ProfileUpdate {
        age: body.age,
        weight_kg: body.weight_kg,
        height_cm: body.height_cm,
        dietary_preferences: body.dietary_preferences.as_deref(),
    };
    let profile = repo::upsert(&state.db, user_id, &update)
        .await
        .map_err(internal)?;
    info!(%user_id, "profile updated");
    Ok(Json(profile.into()))
}
