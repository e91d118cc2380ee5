use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Minutes per category for a single day.
pub type DayPractice = BTreeMap<PracticeCategory, u32>;

/// Practice log keyed by calendar date.
pub type DailyPractice = BTreeMap<NaiveDate, DayPractice>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PracticeCategory {
    Chords,
    Scales,
    Piece,
    SightReading,
}

impl PracticeCategory {
    pub const ALL: [PracticeCategory; 4] = [
        PracticeCategory::Chords,
        PracticeCategory::Scales,
        PracticeCategory::Piece,
        PracticeCategory::SightReading,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PracticeCategory::Chords => "chords",
            PracticeCategory::Scales => "scales",
            PracticeCategory::Piece => "piece",
            PracticeCategory::SightReading => "sight-reading",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PracticeCategory::Chords => "Chord Practice",
            PracticeCategory::Scales => "Scales Practice",
            PracticeCategory::Piece => "New Piece Work",
            PracticeCategory::SightReading => "Sight Reading",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            PracticeCategory::Chords => "musical-notes-outline",
            PracticeCategory::Scales => "grid-outline",
            PracticeCategory::Piece => "document-text-outline",
            PracticeCategory::SightReading => "eye-outline",
        }
    }
}

impl fmt::Display for PracticeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue(pub String);

impl fmt::Display for UnknownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl std::error::Error for UnknownValue {}

impl FromStr for PracticeCategory {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        PracticeCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| UnknownValue(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    Percentage,
    Counter,
}

impl GoalKind {
    /// Amount added by a single increment.
    pub fn step(self) -> u32 {
        match self {
            GoalKind::Percentage => 5,
            GoalKind::Counter => 1,
        }
    }
}

impl FromStr for GoalKind {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "percentage" => Ok(GoalKind::Percentage),
            "counter" => Ok(GoalKind::Counter),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalHorizon {
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "longTerm")]
    LongTerm,
}

impl FromStr for GoalHorizon {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "monthly" => Ok(GoalHorizon::Monthly),
            "longTerm" => Ok(GoalHorizon::LongTerm),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub text: String,
    pub progress: u32,
    pub target: u32,
    pub kind: GoalKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalCompletion {
    pub percentage: u32,
    pub is_complete: bool,
}

/// In-memory state owned by the tracker between reloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub daily_practice: DailyPractice,
    pub weekly_targets: BTreeMap<PracticeCategory, u32>,
    pub monthly_goals: Vec<Goal>,
    pub long_term_goals: Vec<Goal>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn goal(&self, goal_id: &str) -> Option<&Goal> {
        self.monthly_goals
            .iter()
            .chain(self.long_term_goals.iter())
            .find(|goal| goal.id == goal_id)
    }

    pub fn goal_mut(&mut self, goal_id: &str) -> Option<&mut Goal> {
        self.monthly_goals
            .iter_mut()
            .chain(self.long_term_goals.iter_mut())
            .find(|goal| goal.id == goal_id)
    }
}

// Rows as stored remotely. Enumerated columns stay as strings so unknown
// values can be skipped instead of failing the whole fetch.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTargetRow {
    pub practice_type: String,
    pub target_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalRow {
    pub goal_id: String,
    pub goal_type: String,
    pub title: String,
    pub progress: u32,
    pub target: u32,
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPracticeRow {
    pub practice_date: NaiveDate,
    pub practice_type: String,
    pub minutes: u32,
}

impl GoalRow {
    pub fn into_goal(self) -> Result<(GoalHorizon, Goal), UnknownValue> {
        let horizon = self.goal_type.parse::<GoalHorizon>()?;
        let kind = self.data_type.parse::<GoalKind>()?;
        Ok((
            horizon,
            Goal {
                id: self.goal_id,
                text: self.title,
                progress: self.progress,
                target: self.target,
                kind,
            },
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct PracticeRequest {
    pub category: String,
    pub minutes: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeUpdate {
    pub date: NaiveDate,
    pub category: PracticeCategory,
    pub minutes: u32,
    pub synced: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalUpdate {
    pub goal: Goal,
    pub completion: GoalCompletion,
    /// Set only on the increment that moves the goal from incomplete to complete.
    pub celebrate: bool,
    pub synced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameOutcome {
    Renamed,
    Unchanged,
    Rejected,
    NotFound,
}

/// `synced` is true when no remote write was needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeUndo {
    pub removed: bool,
    pub synced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalRename {
    pub outcome: RenameOutcome,
    pub synced: bool,
}

impl GoalRename {
    /// An outcome decided without touching the store.
    pub fn local(outcome: RenameOutcome) -> Self {
        Self {
            outcome,
            synced: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeEntryView {
    pub category: PracticeCategory,
    pub name: String,
    pub icon: String,
    pub minutes: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    pub date: NaiveDate,
    pub practice: Vec<PracticeEntryView>,
    pub total_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyGoalView {
    pub category: PracticeCategory,
    pub text: String,
    pub minutes: u32,
    pub target: u32,
    pub percentage: u32,
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalView {
    pub id: String,
    pub text: String,
    pub progress: u32,
    pub target: u32,
    pub kind: GoalKind,
    pub percentage: u32,
    pub is_complete: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OverviewResponse {
    pub today: TodayResponse,
    pub week_start: NaiveDate,
    pub weekly_goals: Vec<WeeklyGoalView>,
    pub monthly_goals: Vec<GoalView>,
    pub long_term_goals: Vec<GoalView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub minutes: DayPractice,
    pub total: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeeklyPoint {
    pub week: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub minutes: BTreeMap<PracticeCategory, u32>,
    pub total: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub last_7_days: Vec<DailyPoint>,
    pub weekly_totals: Vec<WeeklyPoint>,
}
