use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::MetricsError;

/// Activity multipliers for levels 1 (sedentary) through 5 (super active).
pub const ACTIVITY_MULTIPLIERS: [f64; 5] = [1.2, 1.375, 1.55, 1.725, 1.9];

pub const MAX_WEIGHT_KG: f64 = 1000.0;
pub const MAX_HEIGHT_CM: f64 = 300.0;
pub const MAX_AGE: i32 = 150;

pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARBS: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    fn bmr_constant(self) -> f64 {
        match self {
            Sex::Male => 5.0,
            Sex::Female => -161.0,
        }
    }
}

impl FromStr for Sex {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            other => Err(MetricsError::invalid(format!(
                "sex must be \"male\" or \"female\", got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    SuperActive,
}

impl ActivityLevel {
    pub fn multiplier(self) -> f64 {
        ACTIVITY_MULTIPLIERS[self.index()]
    }

    fn index(self) -> usize {
        match self {
            ActivityLevel::Sedentary => 0,
            ActivityLevel::LightlyActive => 1,
            ActivityLevel::ModeratelyActive => 2,
            ActivityLevel::VeryActive => 3,
            ActivityLevel::SuperActive => 4,
        }
    }
}

impl TryFrom<i64> for ActivityLevel {
    type Error = MetricsError;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(ActivityLevel::Sedentary),
            2 => Ok(ActivityLevel::LightlyActive),
            3 => Ok(ActivityLevel::ModeratelyActive),
            4 => Ok(ActivityLevel::VeryActive),
            5 => Ok(ActivityLevel::SuperActive),
            _ => Err(MetricsError::invalid(format!(
                "activity level must be in 1..=5, got {level}"
            ))),
        }
    }
}

/// Share of caloric intake per macronutrient, in percent.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct MacroPercentages {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// BMI rounded to two decimals, or `None` when it can't be computed.
pub fn compute_bmi(weight_kg: Option<f64>, height_cm: Option<f64>) -> Option<f64> {
    let (w, h) = (weight_kg?, height_cm?);
    if !w.is_finite() || !h.is_finite() || w < 0.0 || h <= 0.0 {
        return None;
    }
    let meters = h / 100.0;
    Some(round2(w / (meters * meters)))
}

/// Rejects negative, non-finite or implausibly large body measurements.
pub fn validate_body(weight_kg: f64, height_cm: f64, age: i32) -> Result<(), MetricsError> {
    if !weight_kg.is_finite() || !(0.0..=MAX_WEIGHT_KG).contains(&weight_kg) {
        return Err(MetricsError::invalid(format!(
            "weight must be between 0 and {MAX_WEIGHT_KG} kg"
        )));
    }
    if !height_cm.is_finite() || !(0.0..=MAX_HEIGHT_CM).contains(&height_cm) {
        return Err(MetricsError::invalid(format!(
            "height must be between 0 and {MAX_HEIGHT_CM} cm"
        )));
    }
    if !(0..=MAX_AGE).contains(&age) {
        return Err(MetricsError::invalid(format!("age must be between 0 and {MAX_AGE}")));
    }
    Ok(())
}

/// Mifflin-St Jeor BMR scaled by the activity multiplier. Unrounded.
pub fn compute_tdee(
    weight_kg: f64,
    height_cm: f64,
    age: i32,
    sex: Sex,
    activity: ActivityLevel,
) -> Result<f64, MetricsError> {
    validate_body(weight_kg, height_cm, age)?;
    let bmr = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age) + sex.bmr_constant();
    Ok(bmr * activity.multiplier())
}

pub fn macro_percentages(calories: f64, protein_g: f64, carbs_g: f64, fat_g: f64) -> MacroPercentages {
    if calories <= 0.0 {
        return MacroPercentages::default();
    }
    let share = |kcal: f64| round2(kcal / calories * 100.0);
    MacroPercentages {
        protein: share(protein_g * KCAL_PER_G_PROTEIN),
        carbs: share(carbs_g * KCAL_PER_G_CARBS),
        fat: share(fat_g * KCAL_PER_G_FAT),
    }
}
