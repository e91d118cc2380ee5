use super::{RemoteStore, Result, StoreData, StoreError};
use crate::models::{DailyPracticeRow, GoalRow, WeeklyTargetRow};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    FetchWeeklyTargets,
    FetchGoals,
    FetchDailyPractice,
    UpsertDailyMinutes,
    UpsertGoalProgress,
    UpsertGoalTitle,
    DeletePracticeForDate,
}

impl StoreOp {
    pub fn is_write(self) -> bool {
        !matches!(
            self,
            StoreOp::FetchWeeklyTargets | StoreOp::FetchGoals | StoreOp::FetchDailyPractice
        )
    }
}

/// Process-local store. Nothing survives a restart.
///
/// Individual operations can be made to fail, and every call is logged, which
/// makes it the backend of choice for exercising the tracker.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<StoreData>,
    failing: Mutex<HashSet<StoreOp>>,
    calls: Mutex<Vec<StoreOp>>,
}

impl MemoryStore {
    pub fn new(data: StoreData) -> Self {
        Self {
            data: Mutex::new(data),
            ..Self::default()
        }
    }

    pub async fn fail_on(&self, op: StoreOp) {
        self.failing.lock().await.insert(op);
    }

    pub async fn recover(&self, op: StoreOp) {
        self.failing.lock().await.remove(&op);
    }

    pub async fn data(&self) -> StoreData {
        self.data.lock().await.clone()
    }

    pub async fn calls(&self) -> Vec<StoreOp> {
        self.calls.lock().await.clone()
    }

    pub async fn write_count(&self) -> usize {
        self.calls.lock().await.iter().filter(|op| op.is_write()).count()
    }

    async fn enter(&self, op: StoreOp) -> Result<()> {
        self.calls.lock().await.push(op);
        if self.failing.lock().await.contains(&op) {
            return Err(StoreError::Unavailable(format!("{op:?} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn fetch_weekly_targets(&self) -> Result<Vec<WeeklyTargetRow>> {
        self.enter(StoreOp::FetchWeeklyTargets).await?;
        Ok(self.data.lock().await.weekly_targets.clone())
    }

    async fn fetch_goals(&self) -> Result<Vec<GoalRow>> {
        self.enter(StoreOp::FetchGoals).await?;
        Ok(self.data.lock().await.goals.clone())
    }

    async fn fetch_daily_practice(&self, since: NaiveDate) -> Result<Vec<DailyPracticeRow>> {
        self.enter(StoreOp::FetchDailyPractice).await?;
        Ok(self.data.lock().await.practice_since(since))
    }

    async fn upsert_daily_minutes(
        &self,
        date: NaiveDate,
        category: &str,
        minutes: u32,
    ) -> Result<()> {
        self.enter(StoreOp::UpsertDailyMinutes).await?;
        self.data.lock().await.set_minutes(date, category, minutes);
        Ok(())
    }

    async fn upsert_goal_progress(&self, goal_id: &str, progress: u32) -> Result<()> {
        self.enter(StoreOp::UpsertGoalProgress).await?;
        self.data
            .lock()
            .await
            .update_goal(goal_id, |row| row.progress = progress);
        Ok(())
    }

    async fn upsert_goal_title(&self, goal_id: &str, title: &str) -> Result<()> {
        self.enter(StoreOp::UpsertGoalTitle).await?;
        self.data
            .lock()
            .await
            .update_goal(goal_id, |row| row.title = title.to_string());
        Ok(())
    }

    async fn delete_practice_for_date(&self, date: NaiveDate) -> Result<()> {
        self.enter(StoreOp::DeletePracticeForDate).await?;
        self.data.lock().await.delete_date(date);
        Ok(())
    }
}
