// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.

use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// A named grouping of tasks owned by one chat.
///
/// Epics soft-delete: `deleted_at` is set instead of removing the row, so
/// ownership checks against an already-deleted epic still resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Epic {
    pub id: i64,
    pub chat_id: i64,
    pub name: String,
    pub description: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A unit of work belonging to exactly one epic. Hard-deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    pub epic_id: i64,
    pub name: String,
    pub description: String,
}

/// Timer record lifecycle status. Stored as snake_case text.
///
/// `in_progress` is the only non-terminal state; once a row leaves it the
/// transition is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum TimelogStatus {
    InProgress,
    Done,
    Cancelled,
}

/// One contiguous timer interval against a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timelog {
    pub id: i64,
    pub task_id: i64,
    pub start: DateTime<Utc>,
    /// Non-null exactly when `status` is terminal.
    pub end: Option<DateTime<Utc>>,
    pub status: TimelogStatus,
    /// Opaque blob the refresh job uses to locate the live display message.
    /// The store never interprets it.
    pub display_metadata: Option<String>,
}

impl Timelog {
    /// Human-readable elapsed time, measured to `end` when set, else to `now`.
    pub fn elapsed_text(&self, now: DateTime<Utc>) -> String {
        format_elapsed(self.end.unwrap_or(now) - self.start)
    }
}

/// Render a duration as non-zero hour/minute/second components in
/// descending order: "1 hour 2 minutes 5 seconds", "45 seconds", and the
/// empty string for an exact zero.
pub fn format_elapsed(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours} hour{}", plural(hours)));
    }
    if minutes > 0 {
        parts.push(format!("{minutes} minute{}", plural(minutes)));
    }
    if seconds > 0 {
        parts.push(format!("{seconds} second{}", plural(seconds)));
    }
    parts.join(" ")
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Per-chat conversation mode governing how the next free-text message is
/// interpreted. Stored as snake_case text; an absent row means `Normal`.
///
/// `ReportDuration` is reserved: persisted rows naming it still load, but no
/// handler enters or consumes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ConversationMode {
    #[default]
    Normal,
    CreateEpic,
    CreateTask,
    EditTask,
    EditEpic,
    ReportDuration,
}

/// A chat's conversation position: its mode plus whatever params the
/// handler that entered the mode stashed for the follow-up message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    pub mode: ConversationMode,
    pub params: Map<String, Value>,
}

/// The closed set of columns a single-column edit may touch. Anything else
/// is a validation error before it reaches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum EditColumn {
    Name,
    Description,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_full_decomposition() {
        assert_eq!(
            format_elapsed(Duration::seconds(3725)),
            "1 hour 2 minutes 5 seconds"
        );
    }

    #[test]
    fn elapsed_seconds_only() {
        assert_eq!(format_elapsed(Duration::seconds(45)), "45 seconds");
    }

    #[test]
    fn elapsed_minute_and_seconds() {
        assert_eq!(format_elapsed(Duration::seconds(90)), "1 minute 30 seconds");
    }

    #[test]
    fn elapsed_zero_is_empty() {
        assert_eq!(format_elapsed(Duration::seconds(0)), "");
    }

    #[test]
    fn elapsed_skips_zero_components() {
        assert_eq!(format_elapsed(Duration::seconds(3600)), "1 hour");
        assert_eq!(format_elapsed(Duration::seconds(3605)), "1 hour 5 seconds");
        assert_eq!(format_elapsed(Duration::seconds(120)), "2 minutes");
    }

    #[test]
    fn elapsed_negative_clamps_to_zero() {
        assert_eq!(format_elapsed(Duration::seconds(-5)), "");
    }

    #[test]
    fn timelog_elapsed_uses_end_when_set() {
        let start = Utc::now();
        let log = Timelog {
            id: 1,
            task_id: 1,
            start,
            end: Some(start + Duration::seconds(61)),
            status: TimelogStatus::Done,
            display_metadata: None,
        };
        // `now` far in the future must not matter once end is set.
        assert_eq!(
            log.elapsed_text(start + Duration::seconds(10_000)),
            "1 minute 1 second"
        );
    }

    #[test]
    fn mode_round_trips_through_text() {
        for mode in [
            ConversationMode::Normal,
            ConversationMode::CreateEpic,
            ConversationMode::CreateTask,
            ConversationMode::EditTask,
            ConversationMode::EditEpic,
            ConversationMode::ReportDuration,
        ] {
            let text = mode.to_string();
            assert_eq!(text.parse::<ConversationMode>().unwrap(), mode);
        }
    }

    #[test]
    fn edit_column_rejects_unknown() {
        assert!("name".parse::<EditColumn>().is_ok());
        assert!("description".parse::<EditColumn>().is_ok());
        assert!("chat_id".parse::<EditColumn>().is_err());
    }
}
