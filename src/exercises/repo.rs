use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::metrics::weekly::TimeWindow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ExerciseRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub calories_burned: f64,
    pub duration_minutes: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

pub struct NewExercise<'a> {
    pub name: &'a str,
    pub calories_burned: f64,
    pub duration_minutes: i32,
    pub occurred_at: Option<OffsetDateTime>,
}

const COLUMNS: &str = "id, user_id, name, calories_burned, duration_minutes, occurred_at";

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    ex: &NewExercise<'_>,
) -> anyhow::Result<ExerciseRecord> {
    let sql = format!(
        r#"
        INSERT INTO exercises (user_id, name, calories_burned, duration_minutes, occurred_at)
        VALUES ($1, $2, $3, $4, COALESCE($5, now()))
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, ExerciseRecord>(&sql)
        .bind(user_id)
        .bind(ex.name)
        .bind(ex.calories_burned)
        .bind(ex.duration_minutes)
        .bind(ex.occurred_at)
        .fetch_one(db)
        .await
        .context("insert exercise")?;
    Ok(row)
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<ExerciseRecord>> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM exercises
        WHERE user_id = $1
        ORDER BY occurred_at DESC
        LIMIT $2 OFFSET $3
        "#
    );
    let rows = sqlx::query_as::<_, ExerciseRecord>(&sql)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("list exercises by user")?;
    Ok(rows)
}

pub async fn get(
    db: &PgPool,
    user_id: Uuid,
    exercise_id: Uuid,
) -> anyhow::Result<Option<ExerciseRecord>> {
    let sql = format!("SELECT {COLUMNS} FROM exercises WHERE id = $1 AND user_id = $2");
    let row = sqlx::query_as::<_, ExerciseRecord>(&sql)
        .bind(exercise_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("get exercise")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: Uuid, exercise_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM exercises WHERE id = $1 AND user_id = $2")
        .bind(exercise_id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete exercise")?;
    Ok(res.rows_affected() > 0)
}

pub async fn list_in_window(
    db: &PgPool,
    user_id: Uuid,
    window: &TimeWindow,
) -> Result<Vec<ExerciseRecord>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM exercises
        WHERE user_id = $1 AND occurred_at >= $2 AND occurred_at <= $3
        ORDER BY occurred_at ASC
        "#
    );
    sqlx::query_as::<_, ExerciseRecord>(&sql)
        .bind(user_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(db)
        .await
}
