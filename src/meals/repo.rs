use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::metrics::weekly::TimeWindow;

/// Meal row. Immutable once inserted; only the owner may delete it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MealRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

pub struct NewMeal<'a> {
    pub name: &'a str,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub description: Option<&'a str>,
    pub occurred_at: Option<OffsetDateTime>,
}

const COLUMNS: &str = "id, user_id, name, calories, protein, carbs, fat, description, occurred_at";

pub async fn insert(db: &PgPool, user_id: Uuid, meal: &NewMeal<'_>) -> anyhow::Result<MealRecord> {
    let sql = format!(
        r#"
        INSERT INTO meals (user_id, name, calories, protein, carbs, fat, description, occurred_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, now()))
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, MealRecord>(&sql)
        .bind(user_id)
        .bind(meal.name)
        .bind(meal.calories)
        .bind(meal.protein)
        .bind(meal.carbs)
        .bind(meal.fat)
        .bind(meal.description)
        .bind(meal.occurred_at)
        .fetch_one(db)
        .await
        .context("insert meal")?;
    Ok(row)
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<MealRecord>> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM meals
        WHERE user_id = $1
        ORDER BY occurred_at DESC
        LIMIT $2 OFFSET $3
        "#
    );
    let rows = sqlx::query_as::<_, MealRecord>(&sql)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("list meals by user")?;
    Ok(rows)
}

pub async fn get(db: &PgPool, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<Option<MealRecord>> {
    let sql = format!("SELECT {COLUMNS} FROM meals WHERE id = $1 AND user_id = $2");
    let row = sqlx::query_as::<_, MealRecord>(&sql)
        .bind(meal_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("get meal")?;
    Ok(row)
}

/// Returns false when no meal with that id belongs to the user.
pub async fn delete(db: &PgPool, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM meals WHERE id = $1 AND user_id = $2")
        .bind(meal_id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete meal")?;
    Ok(res.rows_affected() > 0)
}

pub async fn list_in_window(
    db: &PgPool,
    user_id: Uuid,
    window: &TimeWindow,
) -> Result<Vec<MealRecord>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM meals
        WHERE user_id = $1 AND occurred_at >= $2 AND occurred_at <= $3
        ORDER BY occurred_at ASC
        "#
    );
    sqlx::query_as::<_, MealRecord>(&sql)
        .bind(user_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(db)
        .await
}
