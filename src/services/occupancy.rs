// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Date/time occupancy of activities.
//!
//! Decides which calendar dates an activity "happens on", whether it spans
//! several days or hours, and how many hours it is worth for statistics.
//! Malformed spans (end date before start date) never panic: such an
//! activity occupies only its start date.

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::Activity;
use crate::time_utils::format_time;

/// Hours credited per day to a multi-day activity without times.
pub const HOURS_PER_DAY: f64 = 8.0;
/// Hours credited to an activity with no usable span or explicit duration.
pub const DEFAULT_DURATION_HOURS: f64 = 1.0;

const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Last date occupied by the activity.
///
/// Falls back to the start date when the end date is missing or precedes it.
pub fn effective_end(activity: &Activity) -> NaiveDate {
    match activity.end_date {
        Some(end) if end > activity.date => end,
        _ => activity.date,
    }
}

/// Whether the activity occupies `target`.
pub fn is_active_on_date(activity: &Activity, target: NaiveDate) -> bool {
    activity.date <= target && target <= effective_end(activity)
}

/// Whether the activity's span overlaps the closed range `[start, end]`.
pub fn is_active_in_range(activity: &Activity, start: NaiveDate, end: NaiveDate) -> bool {
    activity.date <= end && effective_end(activity) >= start
}

/// Activities occupying `target`, in input order.
pub fn filter_for_date(activities: &[Activity], target: NaiveDate) -> Vec<&Activity> {
    activities
        .iter()
        .filter(|a| is_active_on_date(a, target))
        .collect()
}

/// Activities overlapping `[start, end]`, in input order.
pub fn filter_for_range(activities: &[Activity], start: NaiveDate, end: NaiveDate) -> Vec<&Activity> {
    activities
        .iter()
        .filter(|a| is_active_in_range(a, start, end))
        .collect()
}

/// Explicit flag, or an end date that differs from the start date.
pub fn is_multi_day(activity: &Activity) -> bool {
    activity.is_multi_day || activity.end_date.is_some_and(|end| end != activity.date)
}

/// Explicit flag, or both times present and different.
pub fn is_multi_hour(activity: &Activity) -> bool {
    if activity.is_multi_hour {
        return true;
    }
    match (activity.time, activity.end_time) {
        (Some(start), Some(end)) => start != end,
        _ => false,
    }
}

/// Hours the activity is worth for statistics.
///
/// - multi-day without explicit duration: timed spans count the hours from
///   start instant to end instant (rounded up), untimed spans count
///   8 hours per occupied day
/// - multi-hour on one day: hours between the times, rounded up
/// - anything else: the explicit duration, or 1 hour
///
/// Spans that come out empty or negative fall through to the next rule.
pub fn duration(activity: &Activity) -> f64 {
    if is_multi_day(activity) && activity.duration.is_none() {
        let end_date = effective_end(activity);
        if let (Some(start), Some(end)) = (activity.time, activity.end_time) {
            if let Some(hours) = hours_between(activity.date.and_time(start), end_date.and_time(end)) {
                return hours;
            }
        }
        let days = (end_date - activity.date).num_days() + 1;
        return days as f64 * HOURS_PER_DAY;
    }

    if is_multi_hour(activity) {
        if let (Some(start), Some(end)) = (activity.time, activity.end_time) {
            let day = activity.date;
            if let Some(hours) = hours_between(day.and_time(start), day.and_time(end)) {
                return hours;
            }
        }
    }

    activity.duration.unwrap_or(DEFAULT_DURATION_HOURS)
}

/// Share of [`duration`] that falls on each occupied date.
///
/// Multi-day activities spread their hours evenly over the dates they
/// occupy; everything else keeps its full duration.
pub fn hours_per_day(activity: &Activity) -> f64 {
    let days = (effective_end(activity) - activity.date).num_days() + 1;
    duration(activity) / days as f64
}

/// Whole hours from `start` to `end`, rounded up; `None` if not positive.
fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> Option<f64> {
    let minutes = (end - start).num_minutes();
    if minutes <= 0 {
        return None;
    }
    Some((minutes as f64 / 60.0).ceil())
}

/// Human-readable schedule of the activity.
///
/// Empty for all-day activities on a single date.
pub fn format_time_range(activity: &Activity) -> String {
    if is_multi_day(activity) {
        let start_date = activity.date.format(DISPLAY_DATE_FORMAT);
        let end_date = effective_end(activity).format(DISPLAY_DATE_FORMAT);
        return match (activity.time, activity.end_time) {
            (Some(start), Some(end)) => format!(
                "{} {} - {} {}",
                start_date,
                format_time(start),
                end_date,
                format_time(end)
            ),
            (Some(start), None) => format!("{} {} - {}", start_date, format_time(start), end_date),
            _ => format!("{} - {}", start_date, end_date),
        };
    }

    match (activity.time, activity.end_time) {
        (Some(start), Some(end)) if is_multi_hour(activity) => {
            format!("{} - {}", format_time(start), format_time(end))
        }
        (Some(start), _) => format_time(start),
        _ => String::new(),
    }
}
