use serde::{Deserialize, Serialize};

use super::store::TdeeRecord;
use super::weekly::{TimeWindow, WeeklyAggregate};

/// Sex arrives as free text so unknown values surface as a 400 with a message.
#[derive(Debug, Deserialize)]
pub struct TdeeRequest {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: i32,
    pub sex: String,
    pub activity_level: i64,
}

#[derive(Debug, Serialize)]
pub struct TdeeResponse {
    #[serde(flatten)]
    pub record: TdeeRecord,
    pub tdee: f64,
}

#[derive(Debug, Serialize)]
pub struct CurrentTdeeResponse {
    pub calories: i32,
}

#[derive(Debug, Serialize)]
pub struct WeeklySummaryResponse {
    pub window: TimeWindow,
    #[serde(flatten)]
    pub totals: WeeklyAggregate,
}

#[derive(Debug, Deserialize)]
pub struct BmiQuery {
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct BmiResponse {
    pub bmi: Option<f64>,
}
