//! Derived metrics: BMI/TDEE formulas, weekly aggregation and the
//! service that persists and reads them back.

mod dto;
pub mod error;
pub mod formulas;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod service;
pub mod store;
pub mod weekly;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::metrics_routes()
}
