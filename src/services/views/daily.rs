// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Single-day view: time slots, status buckets and a short trend.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Activity, ActivityId};
use crate::services::occupancy;
use crate::services::statistics::{self, PeriodSummary};
use crate::services::views::StatusBuckets;
use crate::time_utils::format_time;

const MINUTES_PER_DAY: u32 = 24 * 60;
const TREND_DAYS: i64 = 7;

/// Granularity of the daily timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SlotSize {
    Hour,
    #[default]
    HalfHour,
}

impl SlotSize {
    pub fn minutes(self) -> u32 {
        match self {
            SlotSize::Hour => 60,
            SlotSize::HalfHour => 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TimeSlot {
    /// `HH:MM` start of the slot
    pub time: String,
    pub hour: u32,
    pub minute: u32,
    pub activity_ids: Vec<ActivityId>,
    pub is_past: bool,
    pub is_current: bool,
    pub is_future: bool,
    pub is_night_time: bool,
    pub is_work_time: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub total: u32,
    pub completion_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyView {
    pub date: NaiveDate,
    pub is_today: bool,
    pub slot_size: SlotSize,
    /// All activities occupying the date, in display order
    pub activities: Vec<Activity>,
    pub all_day: Vec<ActivityId>,
    pub slots: Vec<TimeSlot>,
    pub buckets: StatusBuckets,
    pub summary: PeriodSummary,
    /// Start of the slot with the most activities, if any slot has one
    pub busiest_slot: Option<String>,
    pub trend: Vec<TrendPoint>,
}

/// Build the view for `date` as seen at `now`.
pub fn build_daily(
    activities: &[Activity],
    date: NaiveDate,
    slot_size: SlotSize,
    now: NaiveDateTime,
) -> DailyView {
    let mut on_day = occupancy::filter_for_date(activities, date);
    statistics::sort_activities(&mut on_day);

    let is_today = now.date() == date;
    let slots = build_slots(&on_day, date, slot_size, is_today.then(|| now.time()));
    let busiest_slot = busiest_slot(&slots);

    let mut buckets = StatusBuckets::from_activities(on_day.iter().copied());
    buckets.sort_by(statistics::compare_activities);

    DailyView {
        date,
        is_today,
        slot_size,
        all_day: on_day
            .iter()
            .filter(|a| a.time.is_none())
            .map(|a| a.id)
            .collect(),
        summary: PeriodSummary::from_activities(on_day.iter().copied()),
        activities: on_day.into_iter().cloned().collect(),
        slots,
        buckets,
        busiest_slot,
        trend: completion_trend(activities, date),
    }
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Whether `activity` belongs in the slot `[start, start + len)` of `date`.
///
/// Timed activities sit in the slot containing their start time. Multi-hour
/// activities with an end time also sit in every later slot they overlap.
/// A timed span over several days is clipped to `date` first: it runs from
/// midnight on later days and until midnight before its last day.
fn in_slot(activity: &Activity, date: NaiveDate, start: u32, len: u32) -> bool {
    let Some(time) = activity.time else {
        return false;
    };
    let last_day = occupancy::effective_end(activity);
    if last_day > activity.date {
        let from = if date == activity.date { minute_of_day(time) } else { 0 };
        let until = match activity.end_time {
            Some(end) if date == last_day => minute_of_day(end),
            _ => MINUTES_PER_DAY,
        };
        return from < start + len && until > start;
    }

    let begins = minute_of_day(time);
    if begins >= start && begins < start + len {
        return true;
    }
    match activity.end_time {
        Some(end) if occupancy::is_multi_hour(activity) => {
            begins <= start && minute_of_day(end) > start
        }
        _ => false,
    }
}

fn build_slots(
    on_day: &[&Activity],
    date: NaiveDate,
    slot_size: SlotSize,
    now: Option<NaiveTime>,
) -> Vec<TimeSlot> {
    let len = slot_size.minutes();
    let now_minute = now.map(minute_of_day);

    (0..MINUTES_PER_DAY)
        .step_by(len as usize)
        .map(|start| {
            let hour = start / 60;
            let minute = start % 60;
            let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
            TimeSlot {
                time: format_time(time),
                hour,
                minute,
                activity_ids: on_day
                    .iter()
                    .filter(|a| in_slot(a, date, start, len))
                    .map(|a| a.id)
                    .collect(),
                is_past: now_minute.is_some_and(|n| start + len <= n),
                is_current: now_minute.is_some_and(|n| start <= n && n < start + len),
                is_future: now_minute.is_some_and(|n| start > n),
                is_night_time: hour < 6,
                is_work_time: (9..18).contains(&hour),
            }
        })
        .collect()
}

fn busiest_slot(slots: &[TimeSlot]) -> Option<String> {
    let mut best: Option<&TimeSlot> = None;
    for slot in slots {
        let count = slot.activity_ids.len();
        if count == 0 {
            continue;
        }
        match best {
            Some(b) if b.activity_ids.len() >= count => {}
            _ => best = Some(slot),
        }
    }
    best.map(|slot| slot.time.clone())
}

/// Completion rate for each of the seven days ending at `date`.
fn completion_trend(activities: &[Activity], date: NaiveDate) -> Vec<TrendPoint> {
    (0..TREND_DAYS)
        .rev()
        .map(|back| {
            let day = date - Duration::days(back);
            let counts = statistics::basic_counts(occupancy::filter_for_date(activities, day));
            TrendPoint {
                date: day,
                total: counts.total,
                completion_rate: counts.completion_rate(),
            }
        })
        .collect()
}
