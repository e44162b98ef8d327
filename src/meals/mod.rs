mod dto;
mod handlers;
pub mod repo;

pub use dto::Pagination;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::meal_routes()
}
