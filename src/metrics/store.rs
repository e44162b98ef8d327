use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::Date;
use uuid::Uuid;

use super::error::MetricsError;
use super::weekly::TimeWindow;
use crate::exercises::repo::{self as exercises_repo, ExerciseRecord};
use crate::meals::repo::{self as meals_repo, MealRecord};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// The single live TDEE value of a user.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct TdeeRecord {
    pub user_id: Uuid,
    pub calories: i32,
    #[serde(with = "iso_date")]
    pub recorded_on: Date,
}

/// Record store consumed by the metrics core.
#[async_trait]
pub trait MetricsStore: Send + Sync {
    async fn find_meals_by_owner_in_window(
        &self,
        owner: Uuid,
        window: &TimeWindow,
    ) -> Result<Vec<MealRecord>, MetricsError>;

    async fn find_exercises_by_owner_in_window(
        &self,
        owner: Uuid,
        window: &TimeWindow,
    ) -> Result<Vec<ExerciseRecord>, MetricsError>;

    /// Insert or replace the owner's TDEE row; at most one row per owner.
    async fn upsert_tdee(&self, owner: Uuid, calories: i32) -> Result<TdeeRecord, MetricsError>;

    async fn find_latest_tdee(&self, owner: Uuid) -> Result<Option<TdeeRecord>, MetricsError>;
}

#[derive(Clone)]
pub struct PgMetricsStore {
    db: PgPool,
}

impl PgMetricsStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn ensure_owner(&self, owner: Uuid) -> Result<(), MetricsError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(owner)
            .fetch_one(&self.db)
            .await?;
        if exists {
            Ok(())
        } else {
            Err(MetricsError::NotFound(owner))
        }
    }
}

const FOREIGN_KEY_VIOLATION: &str = "23503";

#[async_trait]
impl MetricsStore for PgMetricsStore {
    async fn find_meals_by_owner_in_window(
        &self,
        owner: Uuid,
        window: &TimeWindow,
    ) -> Result<Vec<MealRecord>, MetricsError> {
        self.ensure_owner(owner).await?;
        Ok(meals_repo::list_in_window(&self.db, owner, window).await?)
    }

    async fn find_exercises_by_owner_in_window(
        &self,
        owner: Uuid,
        window: &TimeWindow,
    ) -> Result<Vec<ExerciseRecord>, MetricsError> {
        self.ensure_owner(owner).await?;
        Ok(exercises_repo::list_in_window(&self.db, owner, window).await?)
    }

    async fn upsert_tdee(&self, owner: Uuid, calories: i32) -> Result<TdeeRecord, MetricsError> {
        // UNIQUE(user_id) makes this a single atomic write under concurrency.
        let res = sqlx::query_as::<_, TdeeRecord>(
            r#"
            INSERT INTO tdee_records (user_id, calories, recorded_on)
            VALUES ($1, $2, CURRENT_DATE)
            ON CONFLICT (user_id) DO UPDATE
               SET calories = EXCLUDED.calories,
                   recorded_on = EXCLUDED.recorded_on,
                   updated_at = now()
            RETURNING user_id, calories, recorded_on
            "#,
        )
        .bind(owner)
        .bind(calories)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(rec) => Ok(rec),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
                Err(MetricsError::NotFound(owner))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_latest_tdee(&self, owner: Uuid) -> Result<Option<TdeeRecord>, MetricsError> {
        let row = sqlx::query_as::<_, TdeeRecord>(
            r#"
            SELECT user_id, calories, recorded_on
            FROM tdee_records
            WHERE user_id = $1
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(owner)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }
}
