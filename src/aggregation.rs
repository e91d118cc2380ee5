use crate::models::{
    DailyPoint, DailyPractice, DayPractice, Goal, GoalCompletion, GoalKind, GoalView,
    OverviewResponse, PracticeCategory, PracticeEntryView, Snapshot, StatsResponse,
    TodayResponse, WeeklyGoalView, WeeklyPoint,
};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

const WEEK_COUNT: usize = 4;

/// Monday at or before `date`. Sundays belong to the week that started six days earlier.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Per-category minutes over the seven days starting at `start`.
///
/// Only categories recorded on at least one of those days are present.
pub fn weekly_totals(daily: &DailyPractice, start: NaiveDate) -> BTreeMap<PracticeCategory, u32> {
    let end = start + Duration::days(6);
    let mut totals = BTreeMap::new();
    for (_, day) in daily.range(start..=end) {
        for (category, minutes) in day {
            let total: &mut u32 = totals.entry(*category).or_default();
            *total = total.saturating_add(*minutes);
        }
    }
    totals
}

/// Completion of a monthly or long-term goal.
///
/// The percentage is left unclamped; a goal pushed past its target by an
/// external write reports more than 100.
pub fn goal_completion(goal: &Goal) -> GoalCompletion {
    if goal.target == 0 {
        return GoalCompletion {
            percentage: 100,
            is_complete: true,
        };
    }

    let percentage = match goal.kind {
        GoalKind::Percentage => goal.progress,
        GoalKind::Counter => ratio_percent(goal.progress, goal.target),
    };

    GoalCompletion {
        percentage,
        is_complete: goal.progress >= goal.target,
    }
}

pub fn total_minutes(day: &DayPractice) -> u32 {
    day.values().fold(0u32, |sum, minutes| sum.saturating_add(*minutes))
}

pub fn weekly_goal_progress(
    targets: &BTreeMap<PracticeCategory, u32>,
    totals: &BTreeMap<PracticeCategory, u32>,
) -> Vec<WeeklyGoalView> {
    targets
        .iter()
        .map(|(category, target)| {
            let minutes = totals.get(category).copied().unwrap_or(0);
            let percentage = if *target == 0 {
                100
            } else {
                ratio_percent(minutes, *target)
            };
            WeeklyGoalView {
                category: *category,
                text: category.display_name().to_string(),
                minutes,
                target: *target,
                percentage,
                is_complete: minutes >= *target,
            }
        })
        .collect()
}

pub fn goal_view(goal: &Goal) -> GoalView {
    let completion = goal_completion(goal);
    GoalView {
        id: goal.id.clone(),
        text: goal.text.clone(),
        progress: goal.progress,
        target: goal.target,
        kind: goal.kind,
        percentage: completion.percentage,
        is_complete: completion.is_complete,
    }
}

pub fn build_today_at(today: NaiveDate, snapshot: &Snapshot) -> TodayResponse {
    let day = snapshot.daily_practice.get(&today);
    let practice = PracticeCategory::ALL
        .into_iter()
        .map(|category| PracticeEntryView {
            category,
            name: category.display_name().to_string(),
            icon: category.icon().to_string(),
            minutes: day.and_then(|d| d.get(&category)).copied().unwrap_or(0),
        })
        .collect();

    TodayResponse {
        date: today,
        practice,
        total_minutes: day.map(total_minutes).unwrap_or(0),
    }
}

pub fn build_overview_at(today: NaiveDate, snapshot: &Snapshot) -> OverviewResponse {
    let start = week_start(today);
    let totals = weekly_totals(&snapshot.daily_practice, start);

    OverviewResponse {
        today: build_today_at(today, snapshot),
        week_start: start,
        weekly_goals: weekly_goal_progress(&snapshot.weekly_targets, &totals),
        monthly_goals: snapshot.monthly_goals.iter().map(goal_view).collect(),
        long_term_goals: snapshot.long_term_goals.iter().map(goal_view).collect(),
    }
}

pub fn build_stats_at(today: NaiveDate, snapshot: &Snapshot) -> StatsResponse {
    let daily = &snapshot.daily_practice;

    let mut last_7_days = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let date = today - Duration::days(offset as i64);
        let minutes = daily.get(&date).cloned().unwrap_or_default();
        last_7_days.push(DailyPoint {
            date,
            total: total_minutes(&minutes),
            minutes,
        });
    }

    let current_week_start = week_start(today);
    let mut weekly = Vec::with_capacity(WEEK_COUNT);
    for offset in (0..WEEK_COUNT).rev() {
        let start = current_week_start - Duration::weeks(offset as i64);
        let minutes = weekly_totals(daily, start);
        weekly.push(WeeklyPoint {
            week: week_label(start),
            start_date: start,
            end_date: start + Duration::days(6),
            total: total_minutes(&minutes),
            minutes,
        });
    }

    StatsResponse {
        last_7_days,
        weekly_totals: weekly,
    }
}

fn ratio_percent(value: u32, target: u32) -> u32 {
    (100.0 * f64::from(value) / f64::from(target)).round() as u32
}

fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PracticeCategory::{Chords, Piece, Scales, SightReading};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn day(entries: &[(PracticeCategory, u32)]) -> DayPractice {
        entries.iter().copied().collect()
    }

    fn goal(kind: GoalKind, progress: u32, target: u32) -> Goal {
        Goal {
            id: "g".into(),
            text: "goal".into(),
            progress,
            target,
            kind,
        }
    }

    #[test]
    fn week_start_of_sunday_is_previous_monday() {
        // 2026-01-11 is a Sunday.
        assert_eq!(week_start(date(2026, 1, 11)), date(2026, 1, 5));
    }

    #[test]
    fn week_start_of_midweek_and_monday() {
        assert_eq!(week_start(date(2026, 1, 7)), date(2026, 1, 5));
        assert_eq!(week_start(date(2026, 1, 5)), date(2026, 1, 5));
        // Crosses a year boundary.
        assert_eq!(week_start(date(2026, 1, 1)), date(2025, 12, 29));
    }

    #[test]
    fn weekly_totals_sums_exactly_seven_days() {
        let start = date(2026, 1, 5);
        let mut daily = DailyPractice::new();
        daily.insert(date(2026, 1, 4), day(&[(Piece, 40)]));
        daily.insert(start, day(&[(Scales, 10), (Chords, 5)]));
        daily.insert(date(2026, 1, 8), day(&[(Scales, 15)]));
        daily.insert(date(2026, 1, 11), day(&[(Chords, 20)]));
        daily.insert(date(2026, 1, 12), day(&[(SightReading, 30)]));

        let totals = weekly_totals(&daily, start);

        assert_eq!(totals.get(&Scales), Some(&25));
        assert_eq!(totals.get(&Chords), Some(&25));
        assert!(!totals.contains_key(&Piece));
        assert!(!totals.contains_key(&SightReading));
        assert_eq!(totals.len(), 2);
    }

    #[test]
    fn weekly_totals_empty_week() {
        let daily = DailyPractice::new();
        assert!(weekly_totals(&daily, date(2026, 1, 5)).is_empty());
    }

    #[test]
    fn zero_target_is_always_complete() {
        for kind in [GoalKind::Percentage, GoalKind::Counter] {
            for progress in [0, 3, 250] {
                let completion = goal_completion(&goal(kind, progress, 0));
                assert_eq!(completion.percentage, 100);
                assert!(completion.is_complete);
            }
        }
    }

    #[test]
    fn percentage_goal_reports_progress_directly() {
        let completion = goal_completion(&goal(GoalKind::Percentage, 35, 100));
        assert_eq!(completion.percentage, 35);
        assert!(!completion.is_complete);
    }

    #[test]
    fn counter_goal_rounds_and_is_not_clamped() {
        let completion = goal_completion(&goal(GoalKind::Counter, 1, 3));
        assert_eq!(completion.percentage, 33);
        let completion = goal_completion(&goal(GoalKind::Counter, 2, 3));
        assert_eq!(completion.percentage, 67);

        let completion = goal_completion(&goal(GoalKind::Counter, 15, 10));
        assert_eq!(completion.percentage, 150);
        assert!(completion.is_complete);
    }

    #[test]
    fn weekly_goal_progress_uses_totals() {
        let targets: BTreeMap<_, _> = [(Scales, 60), (Piece, 30)].into_iter().collect();
        let totals: BTreeMap<_, _> = [(Scales, 45), (Piece, 45), (Chords, 10)].into_iter().collect();

        let views = weekly_goal_progress(&targets, &totals);
        assert_eq!(views.len(), 2);

        let scales = views.iter().find(|v| v.category == Scales).unwrap();
        assert_eq!(scales.percentage, 75);
        assert!(!scales.is_complete);

        let piece = views.iter().find(|v| v.category == Piece).unwrap();
        assert_eq!(piece.percentage, 150);
        assert!(piece.is_complete);
    }

    #[test]
    fn overview_zero_fills_today() {
        let today = date(2026, 1, 7);
        let mut snapshot = Snapshot::default();
        snapshot
            .daily_practice
            .insert(today, day(&[(Scales, 10), (Chords, 5)]));

        let overview = build_overview_at(today, &snapshot);
        assert_eq!(overview.week_start, date(2026, 1, 5));
        assert_eq!(overview.today.practice.len(), 4);
        assert_eq!(overview.today.total_minutes, 15);
        let piece = overview
            .today
            .practice
            .iter()
            .find(|entry| entry.category == Piece)
            .unwrap();
        assert_eq!(piece.minutes, 0);
        assert_eq!(piece.name, "New Piece Work");
    }

    #[test]
    fn stats_series_lengths_and_totals() {
        let today = date(2026, 1, 7);
        let mut snapshot = Snapshot::default();
        snapshot
            .daily_practice
            .insert(date(2026, 1, 6), day(&[(Scales, 10), (Piece, 20)]));
        snapshot
            .daily_practice
            .insert(date(2025, 12, 30), day(&[(Chords, 5)]));

        let stats = build_stats_at(today, &snapshot);
        assert_eq!(stats.last_7_days.len(), 7);
        assert_eq!(stats.weekly_totals.len(), WEEK_COUNT);

        let yesterday = stats
            .last_7_days
            .iter()
            .find(|point| point.date == date(2026, 1, 6))
            .expect("missing day");
        assert_eq!(yesterday.total, 30);

        let current = stats.weekly_totals.last().unwrap();
        assert_eq!(current.start_date, date(2026, 1, 5));
        assert_eq!(current.week, "2026-W02");
        assert_eq!(current.total, 30);

        let previous = &stats.weekly_totals[WEEK_COUNT - 2];
        assert_eq!(previous.start_date, date(2025, 12, 29));
        assert_eq!(previous.total, 5);
    }
}
