// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity status and priority enumerations.
//!
//! Both serialize to the literal wire values used by the planner backend
//! (`da-fare`, `in-corso`, `fatta`, `rimandata` and `bassa`, `media`, `alta`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The four states an activity moves through.
///
/// The cycle is `da-fare → in-corso → fatta → rimandata → da-fare` and has no
/// terminal state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Status {
    #[default]
    #[serde(rename = "da-fare")]
    Todo,
    #[serde(rename = "in-corso")]
    InProgress,
    #[serde(rename = "fatta")]
    Done,
    #[serde(rename = "rimandata")]
    Postponed,
}

impl Status {
    /// All statuses in cycle order.
    pub const ALL: [Status; 4] = [
        Status::Todo,
        Status::InProgress,
        Status::Done,
        Status::Postponed,
    ];

    /// Wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "da-fare",
            Status::InProgress => "in-corso",
            Status::Done => "fatta",
            Status::Postponed => "rimandata",
        }
    }

    /// The status that follows this one in the cycle.
    pub fn next(self) -> Status {
        match self {
            Status::Todo => Status::InProgress,
            Status::InProgress => Status::Done,
            Status::Done => Status::Postponed,
            Status::Postponed => Status::Todo,
        }
    }

    /// Parse a wire value, treating anything unrecognised as `da-fare`.
    pub fn from_wire_lenient(raw: &str) -> Status {
        raw.parse().unwrap_or(Status::Todo)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "da-fare" => Ok(Status::Todo),
            "in-corso" => Ok(Status::InProgress),
            "fatta" => Ok(Status::Done),
            "rimandata" => Ok(Status::Postponed),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Advance a status given as raw wire text.
///
/// Unknown text is treated as `da-fare` before advancing, so the result is
/// always `in-corso` for garbage input.
pub fn next_status(current: &str) -> Status {
    Status::from_wire_lenient(current).next()
}

/// Activity priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Priority {
    #[serde(rename = "bassa")]
    Low,
    #[default]
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "bassa",
            Priority::Medium => "media",
            Priority::High => "alta",
        }
    }

    /// Sort weight; higher means more important.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bassa" => Ok(Priority::Low),
            "media" => Ok(Priority::Medium),
            "alta" => Ok(Priority::High),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Error for text that is not one of the closed wire values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value '{0}'")]
pub struct UnknownVariant(pub String);
