//! Owner of the practice snapshot.
//!
//! Every mutation is applied to the in-memory snapshot first and then pushed
//! to the store. A failed push is logged and reported through `synced`, but the
//! local change is kept; the next successful reload brings the two back in
//! line. Writes carry cumulative values, so two racing pushes for the same key
//! resolve last-write-wins on the remote side.

use crate::aggregation::{build_overview_at, build_stats_at, build_today_at, goal_completion};
use crate::models::{
    DailyPractice, DailyPracticeRow, GoalHorizon, GoalRename, GoalUpdate, OverviewResponse,
    PracticeCategory, PracticeUndo, PracticeUpdate, RenameOutcome, Snapshot, StatsResponse,
    TodayResponse,
};
use crate::store::{self, RemoteStore};
use chrono::{Duration, Local, NaiveDate, Utc};
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

pub const DEFAULT_INCREMENT_MINUTES: u32 = 5;

/// Days of practice history fetched on reload.
pub const RELOAD_WINDOW_DAYS: i64 = 30;

pub struct PracticeTracker {
    store: Arc<dyn RemoteStore>,
    snapshot: Mutex<Snapshot>,
}

impl PracticeTracker {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self::with_snapshot(store, Snapshot::default())
    }

    pub fn with_snapshot(store: Arc<dyn RemoteStore>, snapshot: Snapshot) -> Self {
        Self {
            store,
            snapshot: Mutex::new(snapshot),
        }
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.snapshot.lock().await.clone()
    }

    pub async fn overview_at(&self, today: NaiveDate) -> OverviewResponse {
        build_overview_at(today, &*self.snapshot.lock().await)
    }

    pub async fn overview(&self) -> OverviewResponse {
        self.overview_at(today()).await
    }

    pub async fn today(&self) -> TodayResponse {
        build_today_at(today(), &*self.snapshot.lock().await)
    }

    pub async fn stats(&self) -> StatsResponse {
        build_stats_at(today(), &*self.snapshot.lock().await)
    }

    pub async fn record_practice(&self, category: PracticeCategory, minutes: u32) -> PracticeUpdate {
        self.record_practice_on(today(), category, minutes).await
    }

    pub async fn record_practice_on(
        &self,
        date: NaiveDate,
        category: PracticeCategory,
        minutes: u32,
    ) -> PracticeUpdate {
        let total = {
            let mut snapshot = self.snapshot.lock().await;
            let entry = snapshot
                .daily_practice
                .entry(date)
                .or_default()
                .entry(category)
                .or_default();
            *entry = entry.saturating_add(minutes);
            *entry
        };

        let synced = match self
            .store
            .upsert_daily_minutes(date, category.as_str(), total)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                error!("failed to save practice for {date} {category}: {err}");
                false
            }
        };

        PracticeUpdate {
            date,
            category,
            minutes: total,
            synced,
        }
    }

    /// Drops every entry recorded today. `removed` is false if there was nothing to drop.
    pub async fn undo_today(&self) -> PracticeUndo {
        self.undo_on(today()).await
    }

    pub async fn undo_on(&self, date: NaiveDate) -> PracticeUndo {
        if self.snapshot.lock().await.daily_practice.remove(&date).is_none() {
            return PracticeUndo {
                removed: false,
                synced: true,
            };
        }

        let synced = match self.store.delete_practice_for_date(date).await {
            Ok(()) => true,
            Err(err) => {
                error!("failed to delete practice for {date}: {err}");
                false
            }
        };
        PracticeUndo {
            removed: true,
            synced,
        }
    }

    /// Advances a goal by one step of its kind, never past its target.
    pub async fn increment_goal(&self, goal_id: &str) -> Option<GoalUpdate> {
        let (goal, completion, celebrate) = {
            let mut snapshot = self.snapshot.lock().await;
            let goal = snapshot.goal_mut(goal_id)?;
            let was_complete = goal_completion(goal).is_complete;
            goal.progress = goal
                .target
                .min(goal.progress.saturating_add(goal.kind.step()));
            let completion = goal_completion(goal);
            (goal.clone(), completion, !was_complete && completion.is_complete)
        };

        let synced = self.push_progress(goal_id, goal.progress).await;
        Some(GoalUpdate {
            goal,
            completion,
            celebrate,
            synced,
        })
    }

    pub async fn reset_goal(&self, goal_id: &str) -> Option<GoalUpdate> {
        let (goal, completion) = {
            let mut snapshot = self.snapshot.lock().await;
            let goal = snapshot.goal_mut(goal_id)?;
            goal.progress = 0;
            (goal.clone(), goal_completion(goal))
        };

        let synced = self.push_progress(goal_id, 0).await;
        Some(GoalUpdate {
            goal,
            completion,
            celebrate: false,
            synced,
        })
    }

    pub async fn rename_goal(&self, goal_id: &str, new_text: &str) -> GoalRename {
        let title = new_text.trim();
        if title.is_empty() {
            return GoalRename::local(RenameOutcome::Rejected);
        }

        {
            let mut snapshot = self.snapshot.lock().await;
            let Some(goal) = snapshot.goal_mut(goal_id) else {
                return GoalRename::local(RenameOutcome::NotFound);
            };
            if goal.text == title {
                return GoalRename::local(RenameOutcome::Unchanged);
            }
            goal.text = title.to_string();
        }

        let synced = match self.store.upsert_goal_title(goal_id, title).await {
            Ok(()) => true,
            Err(err) => {
                error!("failed to save title for goal {goal_id}: {err}");
                false
            }
        };
        GoalRename {
            outcome: RenameOutcome::Renamed,
            synced,
        }
    }

    /// Replaces the whole snapshot from the store.
    ///
    /// Nothing is replaced unless all three fetches succeed.
    pub async fn reload(&self) -> store::Result<()> {
        self.reload_at(today()).await
    }

    pub async fn reload_at(&self, today: NaiveDate) -> store::Result<()> {
        let since = today - Duration::days(RELOAD_WINDOW_DAYS);
        let fetched = tokio::try_join!(
            self.store.fetch_weekly_targets(),
            self.store.fetch_goals(),
            self.store.fetch_daily_practice(since),
        );

        let (targets, goals, practice) = match fetched {
            Ok(rows) => rows,
            Err(err) => {
                error!("failed to reload practice data: {err}");
                return Err(err);
            }
        };

        let mut next = Snapshot {
            loaded_at: Some(Utc::now()),
            ..Snapshot::default()
        };

        for row in targets {
            match row.practice_type.parse::<PracticeCategory>() {
                Ok(category) => {
                    next.weekly_targets.insert(category, row.target_minutes);
                }
                Err(err) => warn!("skipping weekly target: {err}"),
            }
        }

        for row in goals {
            let goal_id = row.goal_id.clone();
            match row.into_goal() {
                Ok((GoalHorizon::Monthly, goal)) => next.monthly_goals.push(goal),
                Ok((GoalHorizon::LongTerm, goal)) => next.long_term_goals.push(goal),
                Err(err) => warn!("skipping goal {goal_id}: {err}"),
            }
        }

        next.daily_practice = collect_practice(practice);

        info!(
            "reloaded {} weekly targets, {} goals, {} practice days",
            next.weekly_targets.len(),
            next.monthly_goals.len() + next.long_term_goals.len(),
            next.daily_practice.len()
        );
        *self.snapshot.lock().await = next;
        Ok(())
    }

    async fn push_progress(&self, goal_id: &str, progress: u32) -> bool {
        match self.store.upsert_goal_progress(goal_id, progress).await {
            Ok(()) => true,
            Err(err) => {
                error!("failed to save progress for goal {goal_id}: {err}");
                false
            }
        }
    }
}

fn collect_practice(rows: Vec<DailyPracticeRow>) -> DailyPractice {
    let mut daily: DailyPractice = BTreeMap::new();
    for row in rows {
        match row.practice_type.parse::<PracticeCategory>() {
            // A duplicate (date, category) row overwrites the earlier one.
            Ok(category) => {
                daily
                    .entry(row.practice_date)
                    .or_default()
                    .insert(category, row.minutes);
            }
            Err(err) => warn!("skipping practice row for {}: {err}", row.practice_date),
        }
    }
    daily
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
