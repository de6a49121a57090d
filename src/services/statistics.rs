// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Aggregate statistics over activity collections.
//!
//! Every function here is pure and total: empty input yields zeroes, never
//! an error or a NaN.

use serde::Serialize;
use std::cmp::Ordering;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Activity, Priority, Status};
use crate::services::occupancy;

/// Activity counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatusCounts {
    pub total: u32,
    pub completed: u32,
    pub in_progress: u32,
    pub pending: u32,
    pub postponed: u32,
}

impl StatusCounts {
    fn add(&mut self, status: Status) {
        self.total += 1;
        match status {
            Status::Done => self.completed += 1,
            Status::InProgress => self.in_progress += 1,
            Status::Todo => self.pending += 1,
            Status::Postponed => self.postponed += 1,
        }
    }

    /// `round(completed / total * 100)`, 0 when empty.
    pub fn completion_rate(&self) -> u32 {
        percentage(self.completed as f64, self.total)
    }

    /// Completed count fully, in-progress at half weight.
    pub fn productivity_score(&self) -> u32 {
        percentage(self.completed as f64 + self.in_progress as f64 * 0.5, self.total)
    }
}

/// Activity counts per priority, keyed by the wire names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PriorityCounts {
    pub alta: u32,
    pub media: u32,
    pub bassa: u32,
}

impl PriorityCounts {
    fn add(&mut self, priority: Priority) {
        match priority {
            Priority::High => self.alta += 1,
            Priority::Medium => self.media += 1,
            Priority::Low => self.bassa += 1,
        }
    }
}

fn percentage(numerator: f64, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (numerator / total as f64 * 100.0).round() as u32
}

pub fn basic_counts<'a, I>(activities: I) -> StatusCounts
where
    I: IntoIterator<Item = &'a Activity>,
{
    let mut counts = StatusCounts::default();
    for activity in activities {
        counts.add(activity.status);
    }
    counts
}

pub fn completion_rate<'a, I>(activities: I) -> u32
where
    I: IntoIterator<Item = &'a Activity>,
{
    basic_counts(activities).completion_rate()
}

pub fn productivity_score<'a, I>(activities: I) -> u32
where
    I: IntoIterator<Item = &'a Activity>,
{
    basic_counts(activities).productivity_score()
}

pub fn priority_breakdown<'a, I>(activities: I) -> PriorityCounts
where
    I: IntoIterator<Item = &'a Activity>,
{
    let mut counts = PriorityCounts::default();
    for activity in activities {
        counts.add(activity.priority);
    }
    counts
}

/// Sum of [`occupancy::duration`] over all activities.
pub fn total_hours<'a, I>(activities: I) -> f64
where
    I: IntoIterator<Item = &'a Activity>,
{
    activities.into_iter().map(occupancy::duration).sum()
}

/// Sum of [`occupancy::duration`] over completed activities.
pub fn completed_hours<'a, I>(activities: I) -> f64
where
    I: IntoIterator<Item = &'a Activity>,
{
    activities
        .into_iter()
        .filter(|a| a.status == Status::Done)
        .map(occupancy::duration)
        .sum()
}

/// Completion rate restricted to `alta` activities; 0 when there are none.
pub fn high_priority_completion<'a, I>(activities: I) -> u32
where
    I: IntoIterator<Item = &'a Activity>,
{
    completion_rate(
        activities
            .into_iter()
            .filter(|a| a.priority == Priority::High),
    )
}

/// Mean of per-day entry counts over the days that had any, to one decimal.
pub fn average_per_active_day(total_day_entries: u32, active_days: u32) -> f64 {
    if active_days == 0 {
        return 0.0;
    }
    (total_day_entries as f64 / active_days as f64 * 10.0).round() / 10.0
}

/// Display order: priority descending, then time (all-day first), then date.
pub fn compare_activities(a: &Activity, b: &Activity) -> Ordering {
    b.priority
        .rank()
        .cmp(&a.priority.rank())
        .then_with(|| a.time.cmp(&b.time))
        .then_with(|| a.date.cmp(&b.date))
}

/// Stable sort by [`compare_activities`].
pub fn sort_activities<T: std::borrow::Borrow<Activity>>(activities: &mut [T]) {
    activities.sort_by(|a, b| compare_activities(a.borrow(), b.borrow()));
}

/// All aggregates of one collection, computed in a single pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PeriodSummary {
    pub counts: StatusCounts,
    pub priorities: PriorityCounts,
    pub completion_rate: u32,
    pub productivity_score: u32,
    pub total_hours: f64,
    pub completed_hours: f64,
    pub high_priority_completion: u32,
}

impl PeriodSummary {
    pub fn from_activities<'a, I>(activities: I) -> Self
    where
        I: IntoIterator<Item = &'a Activity>,
    {
        let mut counts = StatusCounts::default();
        let mut priorities = PriorityCounts::default();
        let mut high = StatusCounts::default();
        let mut total_hours = 0.0;
        let mut completed_hours = 0.0;

        for activity in activities {
            counts.add(activity.status);
            priorities.add(activity.priority);
            if activity.priority == Priority::High {
                high.add(activity.status);
            }
            let hours = occupancy::duration(activity);
            total_hours += hours;
            if activity.status == Status::Done {
                completed_hours += hours;
            }
        }

        Self {
            counts,
            priorities,
            completion_rate: counts.completion_rate(),
            productivity_score: counts.productivity_score(),
            total_hours,
            completed_hours,
            high_priority_completion: high.completion_rate(),
        }
    }

    pub fn total(&self) -> u32 {
        self.counts.total
    }
}

/// Signed change from a previous period to the current one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PeriodComparison {
    pub activities_change: i64,
    pub completion_change: i64,
    pub hours_change: f64,
    pub is_improving: bool,
}

impl PeriodComparison {
    pub fn between(current: &PeriodSummary, previous: &PeriodSummary) -> Self {
        Self {
            activities_change: current.total() as i64 - previous.total() as i64,
            completion_change: current.completion_rate as i64 - previous.completion_rate as i64,
            hours_change: current.total_hours - previous.total_hours,
            is_improving: current.completion_rate > previous.completion_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn with_status(id: u64, status: Status) -> Activity {
        let mut activity = Activity::new(id, format!("A{}", id), date(2024, 3, 10));
        activity.status = status;
        activity
    }

    #[test]
    fn test_empty_collection_is_all_zero() {
        let empty: Vec<Activity> = Vec::new();
        assert_eq!(completion_rate(&empty), 0);
        assert_eq!(productivity_score(&empty), 0);
        assert_eq!(high_priority_completion(&empty), 0);
        assert_eq!(total_hours(&empty), 0.0);
        assert_eq!(PeriodSummary::from_activities(&empty), PeriodSummary::default());
    }

    #[test]
    fn test_completion_and_productivity_example() {
        let activities = vec![
            with_status(1, Status::Done),
            with_status(2, Status::Done),
            with_status(3, Status::InProgress),
            with_status(4, Status::Todo),
        ];
        assert_eq!(completion_rate(&activities), 50);
        assert_eq!(productivity_score(&activities), 63);

        let counts = basic_counts(&activities);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.completed, 2);
        assert_eq!(counts.in_progress, 1);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.postponed, 0);
    }

    #[test]
    fn test_high_priority_completion_two_of_three() {
        let mut activities: Vec<Activity> = (1..=3)
            .map(|id| {
                let mut a = with_status(id, Status::Done);
                a.priority = Priority::High;
                a
            })
            .collect();
        activities[2].status = Status::Todo;
        activities.push(with_status(9, Status::Todo));
        assert_eq!(high_priority_completion(&activities), 67);
    }

    #[test]
    fn test_rates_stay_within_bounds() {
        let all_done: Vec<Activity> = (1..=5).map(|id| with_status(id, Status::Done)).collect();
        assert_eq!(completion_rate(&all_done), 100);
        assert_eq!(productivity_score(&all_done), 100);
    }

    #[test]
    fn test_priority_breakdown() {
        let mut activities = vec![with_status(1, Status::Todo), with_status(2, Status::Todo)];
        activities[0].priority = Priority::High;
        activities[1].priority = Priority::Low;
        let counts = priority_breakdown(&activities);
        assert_eq!(counts, PriorityCounts { alta: 1, media: 0, bassa: 1 });
        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json["alta"], 1);
    }

    #[test]
    fn test_hours_only_count_completed() {
        let mut done = with_status(1, Status::Done);
        done.duration = Some(3.0);
        let mut todo = with_status(2, Status::Todo);
        todo.duration = Some(2.0);
        let activities = vec![done, todo];
        assert_eq!(total_hours(&activities), 5.0);
        assert_eq!(completed_hours(&activities), 3.0);
    }

    #[test]
    fn test_sort_order() {
        let mut low = with_status(1, Status::Todo);
        low.priority = Priority::Low;
        let mut high_late = with_status(2, Status::Todo);
        high_late.priority = Priority::High;
        high_late.time = NaiveTime::from_hms_opt(15, 0, 0);
        let mut high_all_day = with_status(3, Status::Todo);
        high_all_day.priority = Priority::High;
        let mut high_early_date = with_status(4, Status::Todo);
        high_early_date.priority = Priority::High;
        high_early_date.date = date(2024, 3, 1);

        let mut activities = vec![low, high_late, high_all_day, high_early_date];
        sort_activities(&mut activities);
        let ids: Vec<u64> = activities.iter().map(|a| a.id.0).collect();
        assert_eq!(ids, vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_average_per_active_day() {
        assert_eq!(average_per_active_day(0, 0), 0.0);
        assert_eq!(average_per_active_day(7, 3), 2.3);
        assert_eq!(average_per_active_day(6, 3), 2.0);
    }

    #[test]
    fn test_comparison_deltas() {
        let current = PeriodSummary::from_activities(&vec![
            with_status(1, Status::Done),
            with_status(2, Status::Done),
        ]);
        let previous = PeriodSummary::from_activities(&vec![
            with_status(3, Status::Done),
            with_status(4, Status::Todo),
            with_status(5, Status::Todo),
        ]);
        let cmp = PeriodComparison::between(&current, &previous);
        assert_eq!(cmp.activities_change, -1);
        assert_eq!(cmp.completion_change, 100 - 33);
        assert_eq!(cmp.hours_change, -1.0);
        assert!(cmp.is_improving);

        let flat = PeriodComparison::between(&previous, &previous);
        assert!(!flat.is_improving);
    }
}
