// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Planner activity model, creation drafts and partial updates.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Priority, Status};
use crate::time_utils::{hhmm_option, hhmm_patch};

/// Repository-assigned activity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityId(
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))] pub u64,
);

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A scheduled activity as stored by the planner backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Activity {
    pub id: ActivityId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Start date
    pub date: NaiveDate,
    /// Start time; `None` means all-day
    #[serde(default, with = "hhmm_option")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default, with = "hhmm_option")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub is_multi_day: bool,
    #[serde(default)]
    pub is_multi_hour: bool,
    pub status: Status,
    pub priority: Priority,
    #[serde(default)]
    pub category: Option<String>,
    /// Planned duration in hours
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Activity {
    /// Minimal all-day activity, mostly useful for fixtures.
    pub fn new(id: u64, title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: ActivityId(id),
            title: title.into(),
            description: None,
            date,
            time: None,
            end_date: None,
            end_time: None,
            is_multi_day: false,
            is_multi_hour: false,
            status: Status::Todo,
            priority: Priority::Medium,
            category: None,
            duration: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Apply a partial update, returning the merged activity.
    pub fn merged_with(&self, patch: &ActivityPatch) -> Activity {
        let mut merged = self.clone();
        if let Some(title) = &patch.title {
            merged.title = title.clone();
        }
        if let Some(description) = &patch.description {
            merged.description = description.clone();
        }
        if let Some(date) = patch.date {
            merged.date = date;
        }
        if let Some(time) = patch.time {
            merged.time = time;
        }
        if let Some(end_date) = patch.end_date {
            merged.end_date = end_date;
        }
        if let Some(end_time) = patch.end_time {
            merged.end_time = end_time;
        }
        if let Some(flag) = patch.is_multi_day {
            merged.is_multi_day = flag;
        }
        if let Some(flag) = patch.is_multi_hour {
            merged.is_multi_hour = flag;
        }
        if let Some(status) = patch.status {
            merged.status = status;
        }
        if let Some(priority) = patch.priority {
            merged.priority = priority;
        }
        if let Some(category) = &patch.category {
            merged.category = category.clone();
        }
        if let Some(duration) = patch.duration {
            merged.duration = duration;
        }
        merged
    }
}

/// Input for creating a new activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_draft_span"))]
pub struct ActivityDraft {
    #[validate(
        length(min = 1, max = 200, message = "Title must be 1-200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default, with = "hhmm_option")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default, with = "hhmm_option")]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub is_multi_day: bool,
    #[serde(default)]
    pub is_multi_hour: bool,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl ActivityDraft {
    /// Materialise the draft with a repository-assigned id.
    pub fn into_activity(self, id: ActivityId) -> Activity {
        Activity {
            id,
            title: self.title.trim().to_string(),
            description: self.description,
            date: self.date,
            time: self.time,
            end_date: self.end_date,
            end_time: self.end_time,
            is_multi_day: self.is_multi_day,
            is_multi_hour: self.is_multi_hour,
            status: self.status,
            priority: self.priority,
            category: self.category,
            duration: self.duration,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Partial update. Outer `None` leaves a field untouched; for nullable
/// fields an inner `None` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, max = 200, message = "Title must be 1-200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, with = "hhmm_patch", skip_serializing_if = "Option::is_none")]
    pub time: Option<Option<NaiveTime>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, with = "hhmm_patch", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Option<NaiveTime>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_multi_day: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_multi_hour: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<Option<f64>>,
}

/// Body of a direct status change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: Status,
}

/// Deserialize a present-but-null field as `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_not_blank(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Title must not be blank".into());
        return Err(err);
    }
    Ok(())
}

fn validate_draft_span(draft: &ActivityDraft) -> Result<(), ValidationError> {
    check_span(draft.date, draft.time, draft.end_date, draft.end_time)
}

/// Check the schedule rules of an activity span.
///
/// - the end date must not precede the start date
/// - on a single day, the end time must be after the start time
pub fn check_span(
    date: NaiveDate,
    time: Option<NaiveTime>,
    end_date: Option<NaiveDate>,
    end_time: Option<NaiveTime>,
) -> Result<(), ValidationError> {
    if let Some(end_date) = end_date {
        if end_date < date {
            let mut err = ValidationError::new("end_date_before_date");
            err.message = Some("End date cannot be before the start date".into());
            return Err(err);
        }
    }

    let same_day = end_date.map_or(true, |end| end == date);
    if let (true, Some(start), Some(end)) = (same_day, time, end_time) {
        if end <= start {
            let mut err = ValidationError::new("end_time_not_after_time");
            err.message = Some("End time must be after the start time".into());
            return Err(err);
        }
    }

    Ok(())
}
