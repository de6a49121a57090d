// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Period view models built from a user's confirmed activities.
//!
//! All aggregators take the full collection and the current date/time and
//! do their own date filtering, so they are pure and deterministic.

pub mod daily;
pub mod monthly;
pub mod status;
pub mod weekly;

pub use daily::{build_daily, DailyView, SlotSize};
pub use monthly::{build_monthly, MonthlyView};
pub use status::{build_status_view, StatusFilter, StatusView};
pub use weekly::{build_weekly, WeekSpan, WeeklyView};

use chrono::NaiveDate;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Activity, ActivityId, Status};
use crate::services::occupancy;
use crate::services::statistics::{self, StatusCounts};

/// Activities grouped into the four status buckets.
///
/// Every bucket is always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatusBuckets {
    #[serde(rename = "da-fare")]
    pub todo: Vec<Activity>,
    #[serde(rename = "in-corso")]
    pub in_progress: Vec<Activity>,
    #[serde(rename = "fatta")]
    pub done: Vec<Activity>,
    #[serde(rename = "rimandata")]
    pub postponed: Vec<Activity>,
}

impl StatusBuckets {
    /// Group activities, keeping the input order inside each bucket.
    pub fn from_activities<'a, I>(activities: I) -> Self
    where
        I: IntoIterator<Item = &'a Activity>,
    {
        let mut buckets = Self::default();
        for activity in activities {
            buckets.bucket_mut(activity.status).push(activity.clone());
        }
        buckets
    }

    pub fn bucket(&self, status: Status) -> &[Activity] {
        match status {
            Status::Todo => &self.todo,
            Status::InProgress => &self.in_progress,
            Status::Done => &self.done,
            Status::Postponed => &self.postponed,
        }
    }

    fn bucket_mut(&mut self, status: Status) -> &mut Vec<Activity> {
        match status {
            Status::Todo => &mut self.todo,
            Status::InProgress => &mut self.in_progress,
            Status::Done => &mut self.done,
            Status::Postponed => &mut self.postponed,
        }
    }

    /// Sort every bucket with `compare`.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Activity, &Activity) -> std::cmp::Ordering,
    {
        for status in Status::ALL {
            self.bucket_mut(status).sort_by(&mut compare);
        }
    }

    pub fn len(&self) -> usize {
        Status::ALL.iter().map(|s| self.bucket(*s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rollup of the activities occupying one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub is_today: bool,
    pub activity_ids: Vec<ActivityId>,
    pub counts: StatusCounts,
    pub completion_rate: u32,
    pub productivity: u32,
    /// Hours spent on this date; spanning activities contribute their
    /// per-day share
    pub total_hours: f64,
}

impl DaySummary {
    pub fn for_date(activities: &[Activity], date: NaiveDate, today: NaiveDate) -> Self {
        let mut on_day = occupancy::filter_for_date(activities, date);
        statistics::sort_activities(&mut on_day);
        let counts = statistics::basic_counts(on_day.iter().copied());
        Self {
            date,
            is_today: date == today,
            activity_ids: on_day.iter().map(|a| a.id).collect(),
            counts,
            completion_rate: counts.completion_rate(),
            productivity: counts.productivity_score(),
            total_hours: on_day.iter().copied().map(occupancy::hours_per_day).sum(),
        }
    }

    pub fn total(&self) -> u32 {
        self.counts.total
    }
}

/// Earliest day with the highest positive `key`, or `None` when all are zero.
fn earliest_max_by<F>(days: &[DaySummary], key: F) -> Option<NaiveDate>
where
    F: Fn(&DaySummary) -> u32,
{
    let mut best: Option<(&DaySummary, u32)> = None;
    for day in days {
        let value = key(day);
        if value == 0 {
            continue;
        }
        match best {
            Some((_, current)) if current >= value => {}
            _ => best = Some((day, value)),
        }
    }
    best.map(|(day, _)| day.date)
}

/// Day with the highest productivity; ties go to the earliest.
pub fn most_productive_day(days: &[DaySummary]) -> Option<NaiveDate> {
    earliest_max_by(days, |d| d.productivity)
}

/// Day with the most activities; ties go to the earliest.
pub fn busiest_day(days: &[DaySummary]) -> Option<NaiveDate> {
    earliest_max_by(days, |d| d.total())
}
