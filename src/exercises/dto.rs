use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Deserialize)]
pub struct CreateExerciseRequest {
    pub name: String,
    pub calories_burned: f64,
    pub duration_minutes: i32,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub occurred_at: Option<OffsetDateTime>,
}

impl CreateExerciseRequest {
    pub fn validate(&self) -> Result<(), String> {
        let name = self.name.trim();
        if name.is_empty() || name.chars().count() > 100 {
            return Err("name must be 1 to 100 characters".into());
        }
        if !self.calories_burned.is_finite() || self.calories_burned < 0.0 {
            return Err("calories_burned cannot be negative".into());
        }
        if self.duration_minutes < 0 {
            return Err("duration_minutes cannot be negative".into());
        }
        Ok(())
    }
}
