// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Status board: every activity, filtered and grouped by status.

use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Activity, Priority, Status};
use crate::services::occupancy;
use crate::services::statistics::PeriodSummary;
use crate::services::views::StatusBuckets;

/// Start-date window relative to today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum DateRange {
    #[default]
    All,
    /// Starting today or later
    Today,
    /// Starting within the last seven days or later
    Week,
    /// Starting within the last month or later
    Month,
    /// Overlapping the explicit `from`..`to` range
    Custom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SortKey {
    #[default]
    Priority,
    Date,
    Title,
    Status,
}

/// Query options for the status board. Everything is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatusFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub range: DateRange,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub search: Option<String>,
    pub sort: SortKey,
}

impl StatusFilter {
    fn matches(&self, activity: &Activity, today: NaiveDate) -> bool {
        if self.status.is_some_and(|s| s != activity.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != activity.priority) {
            return false;
        }
        if !self.in_range(activity, today) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => matches_search(activity, needle),
            _ => true,
        }
    }

    fn in_range(&self, activity: &Activity, today: NaiveDate) -> bool {
        let cutoff = match self.range {
            DateRange::All => return true,
            DateRange::Today => today,
            DateRange::Week => today - Duration::days(7),
            DateRange::Month => today
                .checked_sub_months(Months::new(1))
                .unwrap_or(NaiveDate::MIN),
            DateRange::Custom => {
                let from = self.from.unwrap_or(NaiveDate::MIN);
                let to = self.to.unwrap_or(NaiveDate::MAX);
                return occupancy::is_active_in_range(activity, from, to);
            }
        };
        activity.date >= cutoff
    }
}

fn matches_search(activity: &Activity, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    activity.title.to_lowercase().contains(&needle)
        || activity
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
}

/// Board order of statuses: open work first.
fn status_rank(status: Status) -> u8 {
    match status {
        Status::Todo => 0,
        Status::InProgress => 1,
        Status::Done => 2,
        Status::Postponed => 3,
    }
}

fn compare(sort: SortKey, a: &Activity, b: &Activity) -> Ordering {
    match sort {
        SortKey::Priority => b
            .priority
            .rank()
            .cmp(&a.priority.rank())
            .then_with(|| a.date.cmp(&b.date)),
        SortKey::Date => a.date.cmp(&b.date),
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::Status => status_rank(a.status).cmp(&status_rank(b.status)),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatusBoardStats {
    #[serde(flatten)]
    pub summary: PeriodSummary,
    /// Not done and starting before today
    pub overdue: u32,
    /// Occupying today
    pub today: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatusView {
    pub sort: SortKey,
    /// Filtered activities in the requested order
    pub activities: Vec<Activity>,
    pub buckets: StatusBuckets,
    pub stats: StatusBoardStats,
}

pub fn build_status_view(activities: &[Activity], filter: &StatusFilter, today: NaiveDate) -> StatusView {
    let mut selected: Vec<Activity> = activities
        .iter()
        .filter(|a| filter.matches(a, today))
        .cloned()
        .collect();
    selected.sort_by(|a, b| compare(filter.sort, a, b));

    let stats = StatusBoardStats {
        summary: PeriodSummary::from_activities(&selected),
        overdue: selected
            .iter()
            .filter(|a| a.status != Status::Done && a.date < today)
            .count() as u32,
        today: selected
            .iter()
            .filter(|a| occupancy::is_active_on_date(a, today))
            .count() as u32,
    };

    StatusView {
        sort: filter.sort,
        buckets: StatusBuckets::from_activities(&selected),
        activities: selected,
        stats,
    }
}
