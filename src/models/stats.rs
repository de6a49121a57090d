//! Server-side statistics snapshots.
//!
//! The planner backend computes a coarse snapshot (`GET /activities/stats`).
//! Views use the client-side statistics engine instead so that every number
//! on screen comes from the same confirmed collection; the snapshot is kept
//! for the dashboard badge and the admin panel.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Activity, Priority, Status};

/// Aggregate snapshot as served by the planner backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStats {
    #[serde(default)]
    pub total: u32,
    /// Activity count per status
    #[serde(default)]
    pub by_status: HashMap<Status, u32>,
    /// Activity count per priority
    #[serde(default)]
    pub by_priority: HashMap<Priority, u32>,
    /// Activity count per non-empty category
    #[serde(default)]
    pub by_category: HashMap<String, u32>,
    /// Activities starting today or later
    #[serde(default)]
    pub this_week: u32,
    /// Activities starting in the current calendar month
    #[serde(default)]
    pub this_month: u32,
}

impl ServerStats {
    /// Compute the snapshot the same way the backend does.
    pub fn tally<'a>(activities: impl IntoIterator<Item = &'a Activity>, today: NaiveDate) -> Self {
        let mut stats = ServerStats::default();
        for status in Status::ALL {
            stats.by_status.insert(status, 0);
        }
        for priority in Priority::ALL {
            stats.by_priority.insert(priority, 0);
        }

        for activity in activities {
            stats.total += 1;
            *stats.by_status.entry(activity.status).or_insert(0) += 1;
            *stats.by_priority.entry(activity.priority).or_insert(0) += 1;

            if let Some(category) = activity.category.as_deref().filter(|c| !c.is_empty()) {
                *stats.by_category.entry(category.to_string()).or_insert(0) += 1;
            }

            if activity.date >= today {
                stats.this_week += 1;
            }
            if activity.date.year() == today.year() && activity.date.month() == today.month() {
                stats.this_month += 1;
            }
        }

        stats
    }
}

/// User counters for the admin panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserCounts {
    pub total: u32,
    pub active: u32,
    pub admins: u32,
}

/// Activity counters for the admin panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityCounts {
    pub total: u32,
    #[serde(default)]
    pub by_status: HashMap<Status, u32>,
}

/// Per-user activity count row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserActivityCount {
    pub username: String,
    pub activity_count: u32,
}

/// System-wide statistics for the admin panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub users: UserCounts,
    pub activities: ActivityCounts,
    #[serde(default)]
    pub user_activity_counts: Vec<UserActivityCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_activity(id: u64, day: NaiveDate, status: Status, category: Option<&str>) -> Activity {
        let mut activity = Activity::new(id, format!("Test Activity {}", id), day);
        activity.status = status;
        activity.category = category.map(String::from);
        activity
    }

    #[test]
    fn test_tally_counts_by_status_and_category() {
        let today = date(2024, 3, 15);
        let activities = vec![
            make_activity(1, date(2024, 3, 1), Status::Done, Some("work")),
            make_activity(2, date(2024, 3, 20), Status::Todo, Some("work")),
            make_activity(3, date(2024, 4, 2), Status::Todo, Some("")),
        ];

        let stats = ServerStats::tally(&activities, today);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_status.get(&Status::Done), Some(&1));
        assert_eq!(stats.by_status.get(&Status::Todo), Some(&2));
        assert_eq!(stats.by_status.get(&Status::Postponed), Some(&0));
        assert_eq!(stats.by_category.get("work"), Some(&2));
        assert_eq!(stats.by_category.len(), 1);
        assert_eq!(stats.this_week, 2);
        assert_eq!(stats.this_month, 2);
    }

    #[test]
    fn test_tally_empty() {
        let stats = ServerStats::tally(&Vec::<Activity>::new(), date(2024, 1, 1));
        assert_eq!(stats.total, 0);
        assert_eq!(stats.by_priority.get(&Priority::High), Some(&0));
    }

    #[test]
    fn test_snapshot_deserializes_wire_keys() {
        let json = r#"{
            "total": 2,
            "byStatus": {"da-fare": 1, "fatta": 1, "in-corso": 0, "rimandata": 0},
            "byPriority": {"alta": 2, "media": 0, "bassa": 0},
            "byCategory": {},
            "thisWeek": 1,
            "thisMonth": 2
        }"#;
        let stats: ServerStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.by_status.get(&Status::Done), Some(&1));
        assert_eq!(stats.by_priority.get(&Priority::High), Some(&2));
    }
}
