use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::error::MetricsError;
use super::store::{MetricsStore, TdeeRecord};
use super::weekly::TimeWindow;
use crate::exercises::repo::ExerciseRecord;
use crate::meals::repo::MealRecord;

#[derive(Default)]
struct Inner {
    owners: HashSet<Uuid>,
    meals: Vec<MealRecord>,
    exercises: Vec<ExerciseRecord>,
    // keyed by owner: one live row each
    tdee: HashMap<Uuid, TdeeRecord>,
}

/// Process-local store with the same contract as the Postgres one.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_owner(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.lock().unwrap().owners.insert(id);
        id
    }

    pub fn add_meal(
        &self,
        owner: Uuid,
        calories: f64,
        protein: f64,
        carbs: f64,
        fat: f64,
        occurred_at: OffsetDateTime,
    ) {
        self.inner.lock().unwrap().meals.push(MealRecord {
            id: Uuid::new_v4(),
            user_id: owner,
            name: "meal".into(),
            calories,
            protein,
            carbs,
            fat,
            description: None,
            occurred_at,
        });
    }

    pub fn add_exercise(
        &self,
        owner: Uuid,
        calories_burned: f64,
        duration_minutes: i32,
        occurred_at: OffsetDateTime,
    ) {
        self.inner.lock().unwrap().exercises.push(ExerciseRecord {
            id: Uuid::new_v4(),
            user_id: owner,
            name: "exercise".into(),
            calories_burned,
            duration_minutes,
            occurred_at,
        });
    }

    pub fn tdee_rows_for(&self, owner: Uuid) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.tdee.values().filter(|r| r.user_id == owner).count()
    }

    fn check_owner(inner: &Inner, owner: Uuid) -> Result<(), MetricsError> {
        if inner.owners.contains(&owner) {
            Ok(())
        } else {
            Err(MetricsError::NotFound(owner))
        }
    }
}

#[async_trait]
impl MetricsStore for InMemoryStore {
    async fn find_meals_by_owner_in_window(
        &self,
        owner: Uuid,
        window: &TimeWindow,
    ) -> Result<Vec<MealRecord>, MetricsError> {
        let inner = self.inner.lock().unwrap();
        Self::check_owner(&inner, owner)?;
        Ok(inner
            .meals
            .iter()
            .filter(|m| m.user_id == owner && window.contains(m.occurred_at))
            .cloned()
            .collect())
    }

    async fn find_exercises_by_owner_in_window(
        &self,
        owner: Uuid,
        window: &TimeWindow,
    ) -> Result<Vec<ExerciseRecord>, MetricsError> {
        let inner = self.inner.lock().unwrap();
        Self::check_owner(&inner, owner)?;
        Ok(inner
            .exercises
            .iter()
            .filter(|e| e.user_id == owner && window.contains(e.occurred_at))
            .cloned()
            .collect())
    }

    async fn upsert_tdee(&self, owner: Uuid, calories: i32) -> Result<TdeeRecord, MetricsError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_owner(&inner, owner)?;
        let rec = TdeeRecord {
            user_id: owner,
            calories,
            recorded_on: OffsetDateTime::now_utc().date(),
        };
        inner.tdee.insert(owner, rec.clone());
        Ok(rec)
    }

    async fn find_latest_tdee(&self, owner: Uuid) -> Result<Option<TdeeRecord>, MetricsError> {
        Ok(self.inner.lock().unwrap().tdee.get(&owner).cloned())
    }
}
