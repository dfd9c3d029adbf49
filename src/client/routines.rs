//! Working set of routines for a session, with optimistic mutations.
//!
//! Every mutation follows the same cycle: capture a snapshot, apply the
//! change locally, issue the call, and restore the snapshot only when the
//! call fails. Creation is the exception: nothing is shown until the server
//! confirms the row.

use crate::client::api::{Api, ApiError};
use crate::models::{CreateRoutine, DayOfWeek, RoutineWithWeek, UpdateRoutine, WeeklyData};
use crate::stats;
use uuid::Uuid;

/// Routine enriched with the derived weekly target (`apw`) and week result
/// (`wr`). Both are recomputed locally, never trusted from a cache.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineView {
    pub routine: crate::models::Routine,
    pub weekly_data: Option<WeeklyData>,
    pub apw: u32,
    pub wr: u32,
}

impl RoutineView {
    fn from_item(item: RoutineWithWeek, work_days: u32) -> Self {
        let mut view = Self {
            routine: item.routine,
            weekly_data: item.weekly_data,
            apw: 0,
            wr: 0,
        };
        view.recompute(work_days);
        view
    }

    fn recompute(&mut self, work_days: u32) {
        self.apw = stats::apw(self.routine.daily_average, work_days);
        self.wr = stats::week_result(self.weekly_data.as_ref());
    }
}

pub struct RoutinesStore<A> {
    api: A,
    routines: Vec<RoutineView>,
    work_days: u32,
    error: Option<String>,
    is_loading: bool,
    has_fetched: bool,
}

impl<A: Api> RoutinesStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            routines: Vec::new(),
            work_days: 5,
            error: None,
            is_loading: false,
            has_fetched: false,
        }
    }

    pub fn routines(&self) -> &[RoutineView] {
        &self.routines
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn work_days(&self) -> u32 {
        self.work_days
    }

    pub fn has_fetched(&self) -> bool {
        self.has_fetched
    }

    /// Mirror of the settings store's work_days; recomputes `apw` for every
    /// routine currently held. Pure and synchronous.
    pub fn set_work_days(&mut self, work_days: u32) {
        self.work_days = work_days;
        for view in &mut self.routines {
            view.recompute(work_days);
        }
    }

    /// Loads the full set once per session; repeat calls are suppressed
    /// while a fetch is in flight or after one has completed.
    pub async fn fetch(&mut self) -> Result<(), ApiError> {
        if self.has_fetched || self.is_loading {
            return Ok(());
        }
        self.is_loading = true;
        self.error = None;
        match self.api.list_routines().await {
            Ok(items) => {
                let work_days = self.work_days;
                self.routines = items
                    .into_iter()
                    .map(|item| RoutineView::from_item(item, work_days))
                    .collect();
                self.has_fetched = true;
                self.is_loading = false;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.to_string());
                self.is_loading = false;
                Err(err)
            }
        }
    }

    /// Awaited, not optimistic: only the confirmed row joins local state.
    pub async fn create(&mut self, req: CreateRoutine) -> Result<(), ApiError> {
        self.error = None;
        match self.api.create_routine(&req).await {
            Ok(item) => {
                let work_days = self.work_days;
                self.routines.push(RoutineView::from_item(item, work_days));
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn update(&mut self, id: Uuid, patch: UpdateRoutine) -> Result<(), ApiError> {
        let Some(idx) = self.routines.iter().position(|r| r.routine.id == id) else {
            return Ok(());
        };
        let snapshot = self.routines[idx].clone();
        patch.apply_to(&mut self.routines[idx].routine);
        self.routines[idx].recompute(self.work_days);
        self.error = None;

        match self.api.update_routine(id, &patch).await {
            Ok(_) => Ok(()),
            Err(err) => {
                self.restore(id, snapshot);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// On failure the entire prior list comes back, not just the one item.
    pub async fn delete(&mut self, id: Uuid) -> Result<(), ApiError> {
        let snapshot = self.routines.clone();
        self.routines.retain(|r| r.routine.id != id);
        self.error = None;

        match self.api.delete_routine(id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.routines = snapshot;
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn increment(&mut self, id: Uuid, day: DayOfWeek) -> Result<(), ApiError> {
        let Some(idx) = self.routines.iter().position(|r| r.routine.id == id) else {
            return Ok(());
        };
        let snapshot = self.routines[idx].clone();
        self.bump_day(idx, day, 1);
        self.error = None;

        match self.api.increment_day(id, day).await {
            Ok(_) => Ok(()),
            Err(err) => {
                self.restore(id, snapshot);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// A day counter is a natural number: at 0 this is a no-op and no call
    /// is issued.
    pub async fn decrement(&mut self, id: Uuid, day: DayOfWeek) -> Result<(), ApiError> {
        let Some(idx) = self.routines.iter().position(|r| r.routine.id == id) else {
            return Ok(());
        };
        let current = self.routines[idx]
            .weekly_data
            .as_ref()
            .map(|week| week.day(day))
            .unwrap_or(0);
        if current == 0 {
            return Ok(());
        }

        let snapshot = self.routines[idx].clone();
        self.bump_day(idx, day, -1);
        self.error = None;

        match self.api.decrement_day(id, day).await {
            Ok(_) => Ok(()),
            Err(err) => {
                self.restore(id, snapshot);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Direct set of one day's counter.
    pub async fn set_day_points(
        &mut self,
        id: Uuid,
        day: DayOfWeek,
        value: u32,
    ) -> Result<(), ApiError> {
        let Some(idx) = self.routines.iter().position(|r| r.routine.id == id) else {
            return Ok(());
        };
        let snapshot = self.routines[idx].clone();
        {
            let view = &mut self.routines[idx];
            let week = view
                .weekly_data
                .get_or_insert_with(|| WeeklyData::zeroed(id, stats::current_week_start()));
            *week.day_mut(day) = value;
            view.recompute(self.work_days);
        }
        self.error = None;

        match self.api.set_day(id, day, value).await {
            Ok(_) => Ok(()),
            Err(err) => {
                self.restore(id, snapshot);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn bump_day(&mut self, idx: usize, day: DayOfWeek, delta: i32) {
        let id = self.routines[idx].routine.id;
        let view = &mut self.routines[idx];
        let week = view
            .weekly_data
            .get_or_insert_with(|| WeeklyData::zeroed(id, stats::current_week_start()));
        let counter = week.day_mut(day);
        *counter = counter.saturating_add_signed(delta);
        view.recompute(self.work_days);
    }

    fn restore(&mut self, id: Uuid, snapshot: RoutineView) {
        if let Some(slot) = self.routines.iter_mut().find(|r| r.routine.id == id) {
            *slot = snapshot;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::MockApi;
    use crate::models::Routine;
    use chrono::Utc;

    fn store_with(items: Vec<RoutineWithWeek>) -> RoutinesStore<MockApi> {
        RoutinesStore::new(MockApi::with_routines(items))
    }

    fn item(name: &str, daily_average: u32) -> RoutineWithWeek {
        let now = Utc::now();
        RoutineWithWeek {
            routine: Routine {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                name: name.to_string(),
                daily_average,
                comments: None,
                sort_order: 0,
                created_at: now,
                updated_at: now,
            },
            weekly_data: None,
        }
    }

    #[tokio::test]
    async fn fetch_runs_only_once_per_session() {
        let mut store = store_with(vec![item("Run", 2)]);
        store.fetch().await.unwrap();
        store.fetch().await.unwrap();
        assert_eq!(store.api.list_calls.get(), 1);
        assert_eq!(store.routines().len(), 1);
    }

    #[tokio::test]
    async fn fetch_enriches_with_apw_and_wr() {
        let mut store = store_with(vec![item("Run", 2)]);
        store.fetch().await.unwrap();
        // default work_days is 5
        assert_eq!(store.routines()[0].apw, 10);
        assert_eq!(store.routines()[0].wr, 0);
    }

    #[tokio::test]
    async fn set_work_days_recomputes_every_routine() {
        let mut store = store_with(vec![item("Run", 2), item("Read", 3)]);
        store.fetch().await.unwrap();
        store.set_work_days(3);
        let apws: Vec<u32> = store.routines().iter().map(|r| r.apw).collect();
        assert_eq!(apws, vec![6, 9]);
    }

    #[tokio::test]
    async fn create_appends_only_the_confirmed_row() {
        let mut store = store_with(vec![]);
        store.fetch().await.unwrap();
        store
            .create(CreateRoutine {
                name: "Run".to_string(),
                daily_average: 2,
                comments: None,
            })
            .await
            .unwrap();
        assert_eq!(store.routines().len(), 1);
        assert_eq!(store.routines()[0].apw, 10);
    }

    #[tokio::test]
    async fn failed_create_leaves_list_unchanged() {
        let mut store = store_with(vec![item("Run", 2)]);
        store.fetch().await.unwrap();
        store.api.fail.set(true);
        let result = store
            .create(CreateRoutine {
                name: "Read".to_string(),
                daily_average: 1,
                comments: None,
            })
            .await;
        assert!(result.is_err());
        assert_eq!(store.routines().len(), 1);
        assert!(store.error().is_some());
    }

    #[tokio::test]
    async fn failed_update_reverts_to_snapshot() {
        let mut store = store_with(vec![item("Run", 2)]);
        store.fetch().await.unwrap();
        let before = store.routines()[0].clone();
        let id = before.routine.id;

        store.api.fail.set(true);
        let result = store
            .update(
                id,
                UpdateRoutine {
                    name: Some("Sprint".to_string()),
                    daily_average: Some(9),
                    ..UpdateRoutine::default()
                },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(store.routines()[0], before);
        assert!(store.error().is_some());
    }

    #[tokio::test]
    async fn successful_update_keeps_optimistic_value() {
        let mut store = store_with(vec![item("Run", 2)]);
        store.fetch().await.unwrap();
        let id = store.routines()[0].routine.id;

        store
            .update(
                id,
                UpdateRoutine {
                    daily_average: Some(4),
                    ..UpdateRoutine::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(store.routines()[0].routine.daily_average, 4);
        assert_eq!(store.routines()[0].apw, 20);
    }

    #[tokio::test]
    async fn failed_delete_restores_the_entire_list() {
        let mut store = store_with(vec![item("Run", 2), item("Read", 3)]);
        store.fetch().await.unwrap();
        let before: Vec<RoutineView> = store.routines().to_vec();
        let id = before[0].routine.id;

        store.api.fail.set(true);
        assert!(store.delete(id).await.is_err());
        assert_eq!(store.routines(), before.as_slice());
        assert!(store.error().is_some());
    }

    #[tokio::test]
    async fn delete_removes_optimistically() {
        let mut store = store_with(vec![item("Run", 2), item("Read", 3)]);
        store.fetch().await.unwrap();
        let id = store.routines()[0].routine.id;
        store.delete(id).await.unwrap();
        assert_eq!(store.routines().len(), 1);
    }

    #[tokio::test]
    async fn increment_creates_zeroed_week_with_target_day_at_one() {
        let mut store = store_with(vec![item("Run", 2)]);
        store.fetch().await.unwrap();
        let id = store.routines()[0].routine.id;

        store.increment(id, DayOfWeek::Wednesday).await.unwrap();

        let week = store.routines()[0].weekly_data.as_ref().unwrap();
        assert_eq!(week.wednesday, 1);
        assert_eq!(week.total(), 1);
        assert_eq!(store.routines()[0].wr, 1);
    }

    #[tokio::test]
    async fn failed_increment_reverts_that_routine() {
        let mut store = store_with(vec![item("Run", 2)]);
        store.fetch().await.unwrap();
        let before = store.routines()[0].clone();
        let id = before.routine.id;

        store.api.fail.set(true);
        assert!(store.increment(id, DayOfWeek::Monday).await.is_err());
        assert_eq!(store.routines()[0], before);
        assert!(store.error().is_some());
    }

    #[tokio::test]
    async fn decrement_at_zero_is_a_no_op_with_no_call() {
        let mut store = store_with(vec![item("Run", 2)]);
        store.fetch().await.unwrap();
        let before = store.routines()[0].clone();
        let id = before.routine.id;

        store.decrement(id, DayOfWeek::Monday).await.unwrap();

        assert_eq!(store.api.mutation_calls.get(), 0);
        assert_eq!(store.routines()[0], before);
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn decrement_reduces_an_existing_counter() {
        let mut store = store_with(vec![item("Run", 2)]);
        store.fetch().await.unwrap();
        let id = store.routines()[0].routine.id;
        store.increment(id, DayOfWeek::Monday).await.unwrap();
        store.increment(id, DayOfWeek::Monday).await.unwrap();

        store.decrement(id, DayOfWeek::Monday).await.unwrap();

        let week = store.routines()[0].weekly_data.as_ref().unwrap();
        assert_eq!(week.monday, 1);
        assert_eq!(store.routines()[0].wr, 1);
    }

    #[tokio::test]
    async fn set_day_points_writes_the_value_directly() {
        let mut store = store_with(vec![item("Run", 2)]);
        store.fetch().await.unwrap();
        let id = store.routines()[0].routine.id;

        store
            .set_day_points(id, DayOfWeek::Friday, 4)
            .await
            .unwrap();

        let week = store.routines()[0].weekly_data.as_ref().unwrap();
        assert_eq!(week.friday, 4);
        assert_eq!(store.routines()[0].wr, 4);
    }

    #[tokio::test]
    async fn mutating_an_unknown_id_is_a_no_op() {
        let mut store = store_with(vec![item("Run", 2)]);
        store.fetch().await.unwrap();
        store
            .increment(Uuid::new_v4(), DayOfWeek::Monday)
            .await
            .unwrap();
        assert_eq!(store.api.mutation_calls.get(), 0);
    }
}
