// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Month view as a fixed 6×7 calendar grid.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Activity;
use crate::services::occupancy;
use crate::services::statistics::{self, PeriodComparison, PeriodSummary};
use crate::services::views::weekly::week_start;
use crate::services::views::DaySummary;

pub const GRID_CELLS: usize = 42;
const DAYS_PER_ROW: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MonthCell {
    #[serde(flatten)]
    pub day: DaySummary,
    pub in_month: bool,
}

/// Totals for one row of the grid, over its full seven days.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeekRow {
    pub week_number: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total: u32,
    pub completed: u32,
    pub completion_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MonthlyView {
    pub year: i32,
    pub month: u32,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub cells: Vec<MonthCell>,
    pub weeks: Vec<WeekRow>,
    /// Totals over the distinct activities touching the month itself
    pub summary: PeriodSummary,
    pub productive_days: u32,
    pub total_days: u32,
    pub average_per_productive_day: f64,
    pub comparison: PeriodComparison,
}

/// First and last date of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first);
    (first, last)
}

/// The 42 dates of the grid for the month containing `date`, from the
/// Monday on or before the 1st.
pub fn grid_dates(date: NaiveDate) -> Vec<NaiveDate> {
    let (first, _) = month_bounds(date);
    week_start(first).iter_days().take(GRID_CELLS).collect()
}

fn month_summary(activities: &[Activity], date: NaiveDate) -> PeriodSummary {
    let (first, last) = month_bounds(date);
    PeriodSummary::from_activities(occupancy::filter_for_range(activities, first, last))
}

/// Build the view for the month containing `selected`.
pub fn build_monthly(activities: &[Activity], selected: NaiveDate, today: NaiveDate) -> MonthlyView {
    let (first_day, last_day) = month_bounds(selected);

    let cells: Vec<MonthCell> = grid_dates(selected)
        .into_iter()
        .map(|date| MonthCell {
            day: DaySummary::for_date(activities, date, today),
            in_month: date.month() == first_day.month() && date.year() == first_day.year(),
        })
        .collect();

    let weeks = cells
        .chunks(DAYS_PER_ROW)
        .enumerate()
        .filter_map(|(index, row)| {
            let start = row.first()?.day.date;
            let end = row.last()?.day.date;
            let counts = statistics::basic_counts(occupancy::filter_for_range(activities, start, end));
            Some(WeekRow {
                week_number: index as u32 + 1,
                start,
                end,
                total: counts.total,
                completed: counts.completed,
                completion_rate: counts.completion_rate(),
            })
        })
        .collect();

    let in_month = cells.iter().filter(|c| c.in_month);
    let productive_days = in_month.clone().filter(|c| c.day.total() > 0).count() as u32;
    let day_entries: u32 = in_month.clone().map(|c| c.day.total()).sum();
    let total_days = in_month.count() as u32;

    let summary = month_summary(activities, selected);
    let previous_month = first_day
        .checked_sub_months(Months::new(1))
        .unwrap_or(first_day - Duration::days(1));
    let comparison = PeriodComparison::between(&summary, &month_summary(activities, previous_month));

    MonthlyView {
        year: first_day.year(),
        month: first_day.month(),
        first_day,
        last_day,
        cells,
        weeks,
        summary,
        productive_days,
        total_days,
        average_per_productive_day: statistics::average_per_active_day(day_entries, productive_days),
        comparison,
    }
}
