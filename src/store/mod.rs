//! Remote persistence for practice records and goals.
//!
//! The tracker talks to a [`RemoteStore`]; which backend sits behind it is
//! chosen at start-up from configuration.

mod file;
mod memory;
mod rest;

pub use file::JsonFileStore;
pub use memory::{MemoryStore, StoreOp};
pub use rest::PostgrestStore;

use crate::models::{DailyPracticeRow, GoalRow, WeeklyTargetRow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// CRUD surface over the `weekly_targets`, `goals` and `daily_practice` tables.
///
/// Writes are last-write-wins per key; no concurrency token is carried.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn fetch_weekly_targets(&self) -> Result<Vec<WeeklyTargetRow>>;

    async fn fetch_goals(&self) -> Result<Vec<GoalRow>>;

    /// Practice rows dated on or after `since`.
    async fn fetch_daily_practice(&self, since: NaiveDate) -> Result<Vec<DailyPracticeRow>>;

    /// Stores the cumulative `minutes` for one (date, category) pair.
    async fn upsert_daily_minutes(&self, date: NaiveDate, category: &str, minutes: u32)
        -> Result<()>;

    async fn upsert_goal_progress(&self, goal_id: &str, progress: u32) -> Result<()>;

    async fn upsert_goal_title(&self, goal_id: &str, title: &str) -> Result<()>;

    /// Removes every category row for `date`.
    async fn delete_practice_for_date(&self, date: NaiveDate) -> Result<()>;
}

/// All three tables held together, used by the local backends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub weekly_targets: Vec<WeeklyTargetRow>,
    #[serde(default)]
    pub goals: Vec<GoalRow>,
    #[serde(default)]
    pub daily_practice: Vec<DailyPracticeRow>,
}

impl StoreData {
    pub(crate) fn practice_since(&self, since: NaiveDate) -> Vec<DailyPracticeRow> {
        self.daily_practice
            .iter()
            .filter(|row| row.practice_date >= since)
            .cloned()
            .collect()
    }

    pub(crate) fn set_minutes(&mut self, date: NaiveDate, category: &str, minutes: u32) {
        match self
            .daily_practice
            .iter_mut()
            .find(|row| row.practice_date == date && row.practice_type == category)
        {
            Some(row) => row.minutes = minutes,
            None => self.daily_practice.push(DailyPracticeRow {
                practice_date: date,
                practice_type: category.to_string(),
                minutes,
            }),
        }
    }

    /// Returns false when no goal row carries `goal_id`.
    pub(crate) fn update_goal(&mut self, goal_id: &str, update: impl FnOnce(&mut GoalRow)) -> bool {
        match self.goals.iter_mut().find(|row| row.goal_id == goal_id) {
            Some(row) => {
                update(row);
                true
            }
            None => false,
        }
    }

    pub(crate) fn delete_date(&mut self, date: NaiveDate) {
        self.daily_practice.retain(|row| row.practice_date != date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_minutes_overwrites_instead_of_adding() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        let mut data = StoreData::default();
        data.set_minutes(date, "scales", 5);
        data.set_minutes(date, "scales", 10);
        data.set_minutes(date, "chords", 5);

        assert_eq!(data.daily_practice.len(), 2);
        let scales = data
            .daily_practice
            .iter()
            .find(|row| row.practice_type == "scales")
            .unwrap();
        assert_eq!(scales.minutes, 10);
    }

    #[test]
    fn delete_date_leaves_other_days() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
        let mut data = StoreData::default();
        data.set_minutes(today, "scales", 5);
        data.set_minutes(today, "piece", 15);
        data.set_minutes(yesterday, "scales", 20);

        data.delete_date(today);

        assert_eq!(data.daily_practice.len(), 1);
        assert_eq!(data.daily_practice[0].practice_date, yesterday);
        assert_eq!(data.practice_since(today).len(), 0);
        assert_eq!(data.practice_since(yesterday).len(), 1);
    }
}
