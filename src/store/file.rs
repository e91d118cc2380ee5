use super::{RemoteStore, Result, StoreData};
use crate::models::{DailyPracticeRow, GoalRow, WeeklyTargetRow};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};
use tracing::{error, warn};

/// Keeps all tables in a single JSON document on disk.
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonFileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = load_data(&path).await;
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `apply` to a copy and keeps it only once it is on disk.
    async fn write(&self, apply: impl FnOnce(&mut StoreData)) -> Result<()> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        apply(&mut next);
        persist_data(&self.path, &next).await?;
        *data = next;
        Ok(())
    }
}

async fn load_data(path: &Path) -> StoreData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                StoreData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            StoreData::default()
        }
    }
}

async fn persist_data(path: &Path, data: &StoreData) -> Result<()> {
    let payload = serde_json::to_vec_pretty(data)?;
    fs::write(path, payload).await?;
    Ok(())
}

#[async_trait]
impl RemoteStore for JsonFileStore {
    async fn fetch_weekly_targets(&self) -> Result<Vec<WeeklyTargetRow>> {
        Ok(self.data.lock().await.weekly_targets.clone())
    }

    async fn fetch_goals(&self) -> Result<Vec<GoalRow>> {
        Ok(self.data.lock().await.goals.clone())
    }

    async fn fetch_daily_practice(&self, since: NaiveDate) -> Result<Vec<DailyPracticeRow>> {
        Ok(self.data.lock().await.practice_since(since))
    }

    async fn upsert_daily_minutes(
        &self,
        date: NaiveDate,
        category: &str,
        minutes: u32,
    ) -> Result<()> {
        self.write(|data| data.set_minutes(date, category, minutes))
            .await
    }

    async fn upsert_goal_progress(&self, goal_id: &str, progress: u32) -> Result<()> {
        self.write(|data| {
            if !data.update_goal(goal_id, |row| row.progress = progress) {
                warn!("no goal row with id {goal_id}");
            }
        })
        .await
    }

    async fn upsert_goal_title(&self, goal_id: &str, title: &str) -> Result<()> {
        self.write(|data| {
            if !data.update_goal(goal_id, |row| row.title = title.to_string()) {
                warn!("no goal row with id {goal_id}");
            }
        })
        .await
    }

    async fn delete_practice_for_date(&self, date: NaiveDate) -> Result<()> {
        self.write(|data| data.delete_date(date)).await
    }
}
