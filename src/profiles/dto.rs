use serde::{Deserialize, Serialize};

use super::repo::Profile;
use crate::metrics::formulas::compute_bmi;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub age: Option<i32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub dietary_preferences: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.age.is_some_and(|a| a < 0) {
            return Err("age must be non-negative");
        }
        if self.weight_kg.is_some_and(|w| !w.is_finite() || w < 0.0) {
            return Err("weight must be a non-negative number");
        }
        if self.height_cm.is_some_and(|h| !h.is_finite() || h < 0.0) {
            return Err("height must be a non-negative number");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub age: Option<i32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub dietary_preferences: Option<String>,
    pub bmi: Option<f64>,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            bmi: compute_bmi(p.weight_kg, p.height_cm),
            age: p.age,
            weight_kg: p.weight_kg,
            height_cm: p.height_cm,
            dietary_preferences: p.dietary_preferences,
        }
    }
}
