use serde::Serialize;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::error::MetricsError;
use super::formulas::{macro_percentages, MacroPercentages};
use super::store::MetricsStore;

pub const WEEK_LOOKBACK_DAYS: i64 = 7;

/// Closed interval `[start, end]` of record timestamps.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TimeWindow {
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

impl TimeWindow {
    /// The seven days ending at `now`.
    pub fn rolling_week(now: OffsetDateTime) -> Self {
        Self {
            start: now - Duration::days(WEEK_LOOKBACK_DAYS),
            end: now,
        }
    }

    #[cfg(test)]
    pub fn contains(&self, at: OffsetDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Derived weekly totals. Never stored.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct WeeklyAggregate {
    pub intake_total: f64,
    pub burned_total: f64,
    pub net_total: f64,
    pub macro_percentages: MacroPercentages,
}

pub async fn compute_weekly_totals(
    store: &dyn MetricsStore,
    owner: Uuid,
    window: &TimeWindow,
) -> Result<WeeklyAggregate, MetricsError> {
    let meals = store.find_meals_by_owner_in_window(owner, window).await?;
    let exercises = store.find_exercises_by_owner_in_window(owner, window).await?;

    let (mut intake, mut protein, mut carbs, mut fat) = (0.0, 0.0, 0.0, 0.0);
    for m in &meals {
        intake += m.calories;
        protein += m.protein;
        carbs += m.carbs;
        fat += m.fat;
    }
    let burned = exercises.iter().fold(0.0, |acc, e| acc + e.calories_burned);

    debug!(
        %owner,
        meals = meals.len(),
        exercises = exercises.len(),
        intake,
        burned,
        "weekly totals computed"
    );

    Ok(WeeklyAggregate {
        intake_total: intake,
        burned_total: burned,
        net_total: intake - burned,
        macro_percentages: macro_percentages(intake, protein, carbs, fat),
    })
}
