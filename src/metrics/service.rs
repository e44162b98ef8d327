use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::error::MetricsError;
use super::formulas::{compute_tdee, ActivityLevel, Sex};
use super::store::{MetricsStore, TdeeRecord};
use super::weekly::{compute_weekly_totals, TimeWindow, WeeklyAggregate};

/// Body measurements submitted for a TDEE calculation.
#[derive(Debug, Clone, Copy)]
pub struct TdeeInput {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: i32,
    pub sex: Sex,
    pub activity: ActivityLevel,
}

/// A stored TDEE together with the unrounded value it came from.
#[derive(Debug, Clone)]
pub struct RecordedTdee {
    pub record: TdeeRecord,
    pub exact: f64,
}

/// Entry point for TDEE and weekly read/write paths.
#[derive(Clone)]
pub struct DerivedMetricsService {
    store: Arc<dyn MetricsStore>,
}

impl DerivedMetricsService {
    pub fn new(store: Arc<dyn MetricsStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn record_tdee(&self, owner: Uuid, input: TdeeInput) -> Result<RecordedTdee, MetricsError> {
        let exact = compute_tdee(
            input.weight_kg,
            input.height_cm,
            input.age,
            input.sex,
            input.activity,
        )?;
        let calories = to_kcal(exact);
        let record = self.store.upsert_tdee(owner, calories).await?;
        info!(%owner, calories = record.calories, "tdee recorded");
        Ok(RecordedTdee { record, exact })
    }

    /// Latest stored TDEE in kcal, 0 when the owner never recorded one.
    pub async fn current_tdee(&self, owner: Uuid) -> Result<i32, MetricsError> {
        let latest = self.store.find_latest_tdee(owner).await?;
        Ok(latest.map(|r| r.calories).unwrap_or(0))
    }

    pub async fn current_week_summary(&self, owner: Uuid) -> Result<WeeklyAggregate, MetricsError> {
        let (_, agg) = self.week_summary_at(owner, OffsetDateTime::now_utc()).await?;
        Ok(agg)
    }

    pub async fn week_summary_at(
        &self,
        owner: Uuid,
        now: OffsetDateTime,
    ) -> Result<(TimeWindow, WeeklyAggregate), MetricsError> {
        let window = TimeWindow::rolling_week(now);
        debug!(%owner, start = %window.start, end = %window.end, "weekly window");
        let agg = compute_weekly_totals(self.store.as_ref(), owner, &window).await?;
        Ok((window, agg))
    }
}

/// Whole kilocalories; negative estimates clamp to zero.
fn to_kcal(tdee: f64) -> i32 {
    tdee.max(0.0).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::memory::InMemoryStore;
    use time::Duration;

    fn service() -> (Arc<InMemoryStore>, DerivedMetricsService) {
        let store = Arc::new(InMemoryStore::new());
        let svc = DerivedMetricsService::new(store.clone());
        (store, svc)
    }

    fn input(weight_kg: f64, activity: i64) -> TdeeInput {
        TdeeInput {
            weight_kg,
            height_cm: 175.0,
            age: 25,
            sex: Sex::Male,
            activity: ActivityLevel::try_from(activity).unwrap(),
        }
    }

    #[test]
    fn kcal_rounding_and_clamp() {
        assert_eq!(to_kcal(2594.3125), 2594);
        assert_eq!(to_kcal(2594.5), 2595);
        assert_eq!(to_kcal(-120.0), 0);
    }

    #[tokio::test]
    async fn current_tdee_defaults_to_zero() {
        let (store, svc) = service();
        let owner = store.add_owner();
        assert_eq!(svc.current_tdee(owner).await.unwrap(), 0);
        assert_eq!(svc.current_tdee(Uuid::new_v4()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn recorded_value_is_read_back() {
        let (store, svc) = service();
        let owner = store.add_owner();
        let rec = svc.record_tdee(owner, input(70.0, 3)).await.unwrap();
        assert!((rec.exact - 2594.3125).abs() < 1e-9);
        assert_eq!(rec.record.calories, 2594);
        assert_eq!(svc.current_tdee(owner).await.unwrap(), rec.record.calories);
    }

    #[tokio::test]
    async fn second_record_replaces_first() {
        let (store, svc) = service();
        let owner = store.add_owner();
        svc.record_tdee(owner, input(70.0, 1)).await.unwrap();
        let second = svc.record_tdee(owner, input(90.0, 5)).await.unwrap();
        assert_eq!(store.tdee_rows_for(owner), 1);
        assert_eq!(svc.current_tdee(owner).await.unwrap(), second.record.calories);
    }

    #[tokio::test]
    async fn concurrent_records_leave_one_row() {
        let (store, svc) = service();
        let owner = store.add_owner();
        let (a, b) = tokio::join!(
            svc.record_tdee(owner, input(70.0, 2)),
            svc.record_tdee(owner, input(80.0, 4)),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(store.tdee_rows_for(owner), 1);
        let current = svc.current_tdee(owner).await.unwrap();
        assert!(current == a.record.calories || current == b.record.calories);
    }

    #[tokio::test]
    async fn many_spawned_records_leave_one_row() {
        let (store, svc) = service();
        let owner = store.add_owner();
        let mut handles = Vec::new();
        for i in 0..16 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                svc.record_tdee(owner, input(60.0 + i as f64, 1 + (i % 5))).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert_eq!(store.tdee_rows_for(owner), 1);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_storage() {
        let (store, svc) = service();
        let owner = store.add_owner();
        let err = svc.record_tdee(owner, input(-70.0, 3)).await.unwrap_err();
        assert!(matches!(err, MetricsError::InvalidArgument(_)));
        assert_eq!(store.tdee_rows_for(owner), 0);
    }

    #[tokio::test]
    async fn huge_weight_is_rejected_instead_of_saturating() {
        let (store, svc) = service();
        let owner = store.add_owner();
        let err = svc.record_tdee(owner, input(1e300, 5)).await.unwrap_err();
        assert!(matches!(err, MetricsError::InvalidArgument(_)));
        assert_eq!(store.tdee_rows_for(owner), 0);
    }

    #[tokio::test]
    async fn unknown_owner_cannot_record() {
        let (_, svc) = service();
        let err = svc.record_tdee(Uuid::new_v4(), input(70.0, 3)).await.unwrap_err();
        assert!(matches!(err, MetricsError::NotFound(_)));
    }

    #[tokio::test]
    async fn week_summary_uses_rolling_window() {
        let (store, svc) = service();
        let owner = store.add_owner();
        let now = OffsetDateTime::now_utc();
        store.add_meal(owner, 400.0, 25.0, 40.0, 15.0, now - Duration::days(2));
        store.add_meal(owner, 700.0, 25.0, 40.0, 15.0, now - Duration::days(10));
        store.add_exercise(owner, 150.0, 20, now - Duration::days(1));

        let (window, agg) = svc.week_summary_at(owner, now).await.unwrap();
        assert_eq!(window.end, now);
        assert_eq!(agg.intake_total, 400.0);
        assert_eq!(agg.net_total, 250.0);

        let current = svc.current_week_summary(owner).await.unwrap();
        assert_eq!(current.intake_total, 400.0);
    }
}
