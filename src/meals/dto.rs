use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo::MealRecord;
use crate::metrics::formulas::{
    macro_percentages, MacroPercentages, KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN,
};

/// Allowed gap between stated calories and the macro total, as a share of the total.
const MACRO_KCAL_TOLERANCE: f64 = 0.02;
/// Lower bound of the allowed gap in kcal, for small meals and label rounding.
const MACRO_KCAL_TOLERANCE_MIN: f64 = 1.0;

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    pub name: String,
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub occurred_at: Option<OffsetDateTime>,
}

impl CreateMealRequest {
    pub fn validate(&self) -> Result<(), String> {
        let name = self.name.trim();
        if name.is_empty() || name.chars().count() > 100 {
            return Err("name must be 1 to 100 characters".into());
        }
        let fields = [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
        ];
        for (field, v) in fields {
            if !v.is_finite() || v < 0.0 {
                return Err(format!("{field} cannot be negative"));
            }
        }
        let from_macros = KCAL_PER_G_PROTEIN * self.protein
            + KCAL_PER_G_CARBS * self.carbs
            + KCAL_PER_G_FAT * self.fat;
        let tolerance = (from_macros * MACRO_KCAL_TOLERANCE).max(MACRO_KCAL_TOLERANCE_MIN);
        if (self.calories - from_macros).abs() > tolerance {
            return Err(format!(
                "calories must match the value calculated from macros: {from_macros:.2} kcal"
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MealDetails {
    #[serde(flatten)]
    pub meal: MealRecord,
    pub macro_distribution: MacroPercentages,
}

impl From<MealRecord> for MealDetails {
    fn from(meal: MealRecord) -> Self {
        let macro_distribution = macro_percentages(meal.calories, meal.protein, meal.carbs, meal.fat);
        Self {
            meal,
            macro_distribution,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl Pagination {
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 100), self.offset.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(calories: f64, protein: f64, carbs: f64, fat: f64) -> CreateMealRequest {
        CreateMealRequest {
            name: "Oats".into(),
            calories,
            protein,
            carbs,
            fat,
            description: None,
            occurred_at: None,
        }
    }

    #[test]
    fn accepts_calories_matching_macros() {
        assert!(req(500.0, 30.0, 50.0, 20.0).validate().is_ok());
        // label rounding: 2% of 500 kcal either way
        assert!(req(495.0, 30.0, 50.0, 20.0).validate().is_ok());
        assert!(req(505.0, 30.0, 50.0, 20.0).validate().is_ok());
        // 1 kcal floor for tiny entries
        assert!(req(1.0, 0.0, 0.0, 0.0).validate().is_ok());
        assert!(req(0.0, 0.0, 0.0, 0.0).validate().is_ok());
    }

    #[test]
    fn rejects_calories_above_macro_total() {
        let err = req(600.0, 30.0, 50.0, 20.0).validate().unwrap_err();
        assert!(err.contains("500.00"));
    }

    #[test]
    fn rejects_under_reported_calories() {
        let err = req(450.0, 30.0, 50.0, 20.0).validate().unwrap_err();
        assert!(err.contains("500.00"));
        // 50g protein is 200 kcal; 100 kcal would put protein at 200%
        assert!(req(100.0, 50.0, 0.0, 0.0).validate().is_err());
    }

    #[test]
    fn accepted_meal_shares_stay_near_hundred() {
        let r = req(495.0, 30.0, 50.0, 20.0);
        assert!(r.validate().is_ok());
        let p = macro_percentages(r.calories, r.protein, r.carbs, r.fat);
        assert!((p.protein + p.carbs + p.fat - 100.0).abs() <= 100.0 * MACRO_KCAL_TOLERANCE + 0.1);
    }

    #[test]
    fn rejects_negative_and_blank() {
        assert!(req(100.0, -1.0, 50.0, 0.0).validate().is_err());
        let mut r = req(0.0, 0.0, 0.0, 0.0);
        r.name = "   ".into();
        assert!(r.validate().is_err());
    }

    #[test]
    fn parses_optional_timestamp() {
        let body = r#"{"name":"Soup","calories":78,"protein":5,"carbs":10,"fat":2,
                       "occurred_at":"2025-03-01T08:30:00Z"}"#;
        let parsed: CreateMealRequest = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.occurred_at.unwrap().hour(), 8);

        let body = r#"{"name":"Soup","calories":0}"#;
        let parsed: CreateMealRequest = serde_json::from_str(body).unwrap();
        assert!(parsed.occurred_at.is_none());
        assert_eq!(parsed.fat, 0.0);
    }

    #[test]
    fn pagination_is_clamped() {
        let p = Pagination { limit: 1000, offset: -5 };
        assert_eq!(p.clamped(), (100, 0));
    }
}
