// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Week view: per-day rollups, week totals, comparison and insights.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Activity;
use crate::services::occupancy;
use crate::services::statistics::{self, PeriodComparison, PeriodSummary};
use crate::services::views::{busiest_day, most_productive_day, DaySummary};

/// Completion rate at or above which a week is "excellent".
const EXCELLENT_COMPLETION: u32 = 80;
/// Completion rate below which a week with activities is "low".
const LOW_COMPLETION: u32 = 50;
/// Fewer productive days than this in a full week suggests spreading out.
const SPREAD_OUT_THRESHOLD: u32 = 5;

/// Number of days shown, counted from Monday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WeekSpan {
    Three,
    Five,
    #[default]
    Seven,
}

impl WeekSpan {
    pub fn days(self) -> u8 {
        match self {
            WeekSpan::Three => 3,
            WeekSpan::Five => 5,
            WeekSpan::Seven => 7,
        }
    }
}

impl TryFrom<u8> for WeekSpan {
    type Error = String;

    fn try_from(days: u8) -> Result<Self, Self::Error> {
        match days {
            3 => Ok(WeekSpan::Three),
            5 => Ok(WeekSpan::Five),
            7 => Ok(WeekSpan::Seven),
            other => Err(format!("week span must be 3, 5 or 7 days, got {}", other)),
        }
    }
}

impl From<WeekSpan> for u8 {
    fn from(span: WeekSpan) -> u8 {
        span.days()
    }
}

/// Observations about a week, rendered to text by the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum WeeklyInsight {
    #[serde(rename_all = "camelCase")]
    ExcellentCompletion { completion_rate: u32 },
    #[serde(rename_all = "camelCase")]
    LowCompletion { completion_rate: u32 },
    AllHighPriorityDone,
    MostProductiveDay { date: NaiveDate, productivity: u32 },
    BusiestDay { date: NaiveDate, total: u32 },
    Improving,
    #[serde(rename_all = "camelCase")]
    SpreadOut { productive_days: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeeklyView {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[cfg_attr(feature = "binding-generation", ts(type = "3 | 5 | 7"))]
    pub span: WeekSpan,
    pub days: Vec<DaySummary>,
    /// Totals over the distinct activities touching the shown days
    pub summary: PeriodSummary,
    pub productive_days: u32,
    pub average_per_productive_day: f64,
    pub most_productive_day: Option<NaiveDate>,
    pub busiest_day: Option<NaiveDate>,
    pub comparison: PeriodComparison,
    pub insights: Vec<WeeklyInsight>,
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn span_range(start: NaiveDate, span: WeekSpan) -> (NaiveDate, NaiveDate) {
    (start, start + Duration::days(span.days() as i64 - 1))
}

/// Build the view for the week containing `selected`.
pub fn build_weekly(
    activities: &[Activity],
    selected: NaiveDate,
    span: WeekSpan,
    today: NaiveDate,
) -> WeeklyView {
    let (start, end) = span_range(week_start(selected), span);
    let days: Vec<DaySummary> = start
        .iter_days()
        .take(span.days() as usize)
        .map(|day| DaySummary::for_date(activities, day, today))
        .collect();

    let summary = PeriodSummary::from_activities(occupancy::filter_for_range(activities, start, end));

    let (prev_start, prev_end) = span_range(start - Duration::days(7), span);
    let previous =
        PeriodSummary::from_activities(occupancy::filter_for_range(activities, prev_start, prev_end));
    let comparison = PeriodComparison::between(&summary, &previous);

    let productive_days = days.iter().filter(|d| d.total() > 0).count() as u32;
    let day_entries: u32 = days.iter().map(DaySummary::total).sum();

    let mut view = WeeklyView {
        start,
        end,
        span,
        most_productive_day: most_productive_day(&days),
        busiest_day: busiest_day(&days),
        days,
        summary,
        productive_days,
        average_per_productive_day: statistics::average_per_active_day(day_entries, productive_days),
        comparison,
        insights: Vec::new(),
    };
    view.insights = insights(&view);
    view
}

fn day<'a>(view: &'a WeeklyView, date: NaiveDate) -> Option<&'a DaySummary> {
    view.days.iter().find(|d| d.date == date)
}

fn insights(view: &WeeklyView) -> Vec<WeeklyInsight> {
    let mut out = Vec::new();
    let summary = &view.summary;

    if summary.total() > 0 {
        if summary.completion_rate >= EXCELLENT_COMPLETION {
            out.push(WeeklyInsight::ExcellentCompletion {
                completion_rate: summary.completion_rate,
            });
        } else if summary.completion_rate < LOW_COMPLETION {
            out.push(WeeklyInsight::LowCompletion {
                completion_rate: summary.completion_rate,
            });
        }
    }

    if summary.priorities.alta > 0 && summary.high_priority_completion == 100 {
        out.push(WeeklyInsight::AllHighPriorityDone);
    }

    if let Some(best) = view.most_productive_day.and_then(|d| day(view, d)) {
        out.push(WeeklyInsight::MostProductiveDay {
            date: best.date,
            productivity: best.productivity,
        });
    }

    if let Some(busiest) = view.busiest_day.and_then(|d| day(view, d)) {
        out.push(WeeklyInsight::BusiestDay {
            date: busiest.date,
            total: busiest.total(),
        });
    }

    if view.comparison.is_improving {
        out.push(WeeklyInsight::Improving);
    }

    if view.span == WeekSpan::Seven && view.productive_days < SPREAD_OUT_THRESHOLD {
        out.push(WeeklyInsight::SpreadOut {
            productive_days: view.productive_days,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, Status};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn activity(id: u64, d: NaiveDate, status: Status) -> Activity {
        let mut activity = Activity::new(id, format!("A{}", id), d);
        activity.status = status;
        activity
    }

    #[test]
    fn test_week_starts_on_monday() {
        // 2024-03-10 is a Sunday.
        assert_eq!(week_start(date(2024, 3, 10)), date(2024, 3, 4));
        assert_eq!(week_start(date(2024, 3, 4)), date(2024, 3, 4));
        assert_eq!(week_start(date(2024, 1, 3)), date(2024, 1, 1));
    }

    #[test]
    fn test_week_span_parsing() {
        assert_eq!(WeekSpan::try_from(5), Ok(WeekSpan::Five));
        assert!(WeekSpan::try_from(4).is_err());
        let span: WeekSpan = serde_json::from_str("3").unwrap();
        assert_eq!(span, WeekSpan::Three);
    }

    #[test]
    fn test_empty_week_is_zero() {
        let view = build_weekly(&[], date(2024, 3, 6), WeekSpan::Seven, date(2024, 3, 6));
        assert_eq!(view.days.len(), 7);
        assert_eq!(view.summary.total(), 0);
        assert_eq!(view.summary.completion_rate, 0);
        assert_eq!(view.productive_days, 0);
        assert_eq!(view.average_per_productive_day, 0.0);
        assert_eq!(view.most_productive_day, None);
        assert_eq!(view.busiest_day, None);
        assert!(!view.insights.contains(&WeeklyInsight::Improving));
        assert!(view
            .insights
            .iter()
            .all(|i| !matches!(i, WeeklyInsight::LowCompletion { .. })));
    }

    #[test]
    fn test_span_limits_days() {
        let activities = vec![activity(1, date(2024, 3, 9), Status::Done)];
        let view = build_weekly(&activities, date(2024, 3, 6), WeekSpan::Five, date(2024, 3, 6));
        assert_eq!(view.days.len(), 5);
        assert_eq!(view.end, date(2024, 3, 8));
        assert_eq!(view.summary.total(), 0);
    }

    #[test]
    fn test_spanning_activity_counted_once_in_totals() {
        let mut trip = activity(1, date(2024, 3, 5), Status::Done);
        trip.end_date = Some(date(2024, 3, 7));
        let activities = vec![trip, activity(2, date(2024, 3, 6), Status::Todo)];

        let view = build_weekly(&activities, date(2024, 3, 6), WeekSpan::Seven, date(2024, 3, 6));
        assert_eq!(view.summary.total(), 2);
        assert_eq!(view.summary.completion_rate, 50);
        assert_eq!(view.productive_days, 3);
        // 1 + 2 + 1 day entries over 3 productive days.
        assert_eq!(view.average_per_productive_day, 1.3);
        assert_eq!(view.busiest_day, Some(date(2024, 3, 6)));
        assert_eq!(view.most_productive_day, Some(date(2024, 3, 5)));
        assert!(view.days[2].is_today);
    }

    #[test]
    fn test_comparison_with_previous_week() {
        let activities = vec![
            activity(1, date(2024, 2, 27), Status::Todo),
            activity(2, date(2024, 2, 28), Status::Todo),
            activity(3, date(2024, 3, 5), Status::Done),
        ];
        let view = build_weekly(&activities, date(2024, 3, 6), WeekSpan::Seven, date(2024, 3, 6));
        assert_eq!(view.comparison.activities_change, -1);
        assert_eq!(view.comparison.completion_change, 100);
        assert!(view.comparison.is_improving);
    }

    #[test]
    fn test_insights() {
        let mut urgent = activity(1, date(2024, 3, 4), Status::Done);
        urgent.priority = Priority::High;
        let activities = vec![urgent, activity(2, date(2024, 3, 5), Status::Done)];
        let view = build_weekly(&activities, date(2024, 3, 6), WeekSpan::Seven, date(2024, 3, 6));

        assert!(view
            .insights
            .contains(&WeeklyInsight::ExcellentCompletion { completion_rate: 100 }));
        assert!(view.insights.contains(&WeeklyInsight::AllHighPriorityDone));
        assert!(view.insights.contains(&WeeklyInsight::MostProductiveDay {
            date: date(2024, 3, 4),
            productivity: 100
        }));
        assert!(view.insights.contains(&WeeklyInsight::Improving));
        assert!(view
            .insights
            .contains(&WeeklyInsight::SpreadOut { productive_days: 2 }));

        let json = serde_json::to_value(&view.insights[0]).unwrap();
        assert_eq!(json["kind"], "excellentCompletion");
        assert_eq!(json["completionRate"], 100);
    }

    #[test]
    fn test_low_completion_insight() {
        let activities = vec![
            activity(1, date(2024, 3, 4), Status::Todo),
            activity(2, date(2024, 3, 5), Status::Todo),
        ];
        let view = build_weekly(&activities, date(2024, 3, 6), WeekSpan::Three, date(2024, 3, 6));
        assert!(view
            .insights
            .contains(&WeeklyInsight::LowCompletion { completion_rate: 0 }));
        assert!(view
            .insights
            .iter()
            .all(|i| !matches!(i, WeeklyInsight::SpreadOut { .. })));
    }
}
