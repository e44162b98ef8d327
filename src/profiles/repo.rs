use anyhow::Context;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub age: Option<i32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub dietary_preferences: Option<String>,
}

pub struct ProfileUpdate<'a> {
    pub age: Option<i32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub dietary_preferences: Option<&'a str>,
}

pub async fn insert_empty_tx(tx: &mut Transaction<'_, Postgres>, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO profiles (user_id) VALUES ($1)")
        .bind(user_id)
        .execute(&mut **tx)
        .await
        .context("insert profile")?;
    Ok(())
}

pub async fn get(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
    let row = sqlx::query_as::<_, Profile>(
        r#"
        SELECT user_id, age, weight_kg, height_cm, dietary_preferences
        FROM profiles
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get profile")?;
    Ok(row)
}

/// Replaces the editable fields, creating the row for users registered without one.
pub async fn upsert(db: &PgPool, user_id: Uuid, p: &ProfileUpdate<'_>) -> anyhow::Result<Profile> {
    let row = sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profiles (user_id, age, weight_kg, height_cm, dietary_preferences)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id) DO UPDATE
           SET age = EXCLUDED.age,
               weight_kg = EXCLUDED.weight_kg,
               height_cm = EXCLUDED.height_cm,
               dietary_preferences = EXCLUDED.dietary_preferences
        RETURNING user_id, age, weight_kg, height_cm, dietary_preferences
        "#,
    )
    .bind(user_id)
    .bind(p.age)
    .bind(p.weight_kg)
    .bind(p.height_cm)
    .bind(p.dietary_preferences)
    .fetch_one(db)
    .await
    .context("upsert profile")?;
    Ok(row)
}
