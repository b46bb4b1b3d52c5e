//! Per-action inputs and the rows built from them
//!
//! Each input lists the fields the client may set for that action. Anything
//! else in `data` is dropped. A field counts as absent when it is missing,
//! `null`, or an empty string; absent fields fall back to the action's
//! default, or are left out of the row so the database default applies.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used for transaction dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const DEFAULT_TASK_PRIORITY: &str = "p2";
pub const DEFAULT_TASK_STATUS: &str = "todo";
pub const DEFAULT_PROJECT_CATEGORY: &str = "personal";
pub const DEFAULT_PROJECT_PRIORITY: &str = "medium";
pub const PROJECT_INITIAL_STATUS: &str = "planned";
pub const DEFAULT_HABIT_CATEGORY: &str = "health";
pub const DEFAULT_HABIT_FREQUENCY: &str = "daily";
pub const DEFAULT_HABIT_COLOR: &str = "#00D9FF";
pub const DEFAULT_GOAL_HORIZON: &str = "medium";
pub const GOAL_INITIAL_STATUS: &str = "in_progress";

/// Treat empty strings like missing values
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn or_default(value: Option<String>, default: &str) -> String {
    present(value).unwrap_or_else(|| default.to_string())
}

/// Transaction amount, forwarded exactly as the client sent it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(serde_json::Number),
    Text(String),
}

// =============================================================================
// Inputs
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HabitInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub frequency: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub horizon: Option<String>,
    pub target_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionInput {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub amount: Option<Amount>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TaskRow {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectRow {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    pub priority: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HabitRow {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    pub frequency: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalRow {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub horizon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionRow {
    pub user_id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: String,
}

impl TaskInput {
    pub fn into_row(self, user_id: &str) -> TaskRow {
        TaskRow {
            user_id: user_id.to_string(),
            title: present(self.title),
            description: present(self.description),
            priority: or_default(self.priority, DEFAULT_TASK_PRIORITY),
            due_date: present(self.due_date),
            status: or_default(self.status, DEFAULT_TASK_STATUS),
        }
    }
}

impl ProjectInput {
    pub fn into_row(self, user_id: &str) -> ProjectRow {
        ProjectRow {
            user_id: user_id.to_string(),
            title: present(self.title),
            description: present(self.description),
            category: or_default(self.category, DEFAULT_PROJECT_CATEGORY),
            priority: or_default(self.priority, DEFAULT_PROJECT_PRIORITY),
            status: PROJECT_INITIAL_STATUS.to_string(),
        }
    }
}

impl HabitInput {
    pub fn into_row(self, user_id: &str) -> HabitRow {
        HabitRow {
            user_id: user_id.to_string(),
            title: present(self.title),
            description: present(self.description),
            category: or_default(self.category, DEFAULT_HABIT_CATEGORY),
            frequency: or_default(self.frequency, DEFAULT_HABIT_FREQUENCY),
            color: or_default(self.color, DEFAULT_HABIT_COLOR),
        }
    }
}

impl GoalInput {
    pub fn into_row(self, user_id: &str) -> GoalRow {
        GoalRow {
            user_id: user_id.to_string(),
            title: present(self.title),
            description: present(self.description),
            horizon: or_default(self.horizon, DEFAULT_GOAL_HORIZON),
            target_date: present(self.target_date),
            status: GOAL_INITIAL_STATUS.to_string(),
        }
    }
}

impl TransactionInput {
    /// `today` fills in a missing date
    pub fn into_row(self, user_id: &str, today: NaiveDate) -> TransactionRow {
        TransactionRow {
            user_id: user_id.to_string(),
            kind: present(self.kind),
            amount: self.amount,
            category: present(self.category),
            description: present(self.description),
            date: present(self.date).unwrap_or_else(|| today.format(DATE_FORMAT).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string_counts_as_absent() {
        let row = TaskInput {
            priority: Some(String::new()),
            ..Default::default()
        }
        .into_row("u1");
        assert_eq!(row.priority, DEFAULT_TASK_PRIORITY);
    }

    #[test]
    fn test_supplied_values_kept() {
        let row = HabitInput {
            title: Some("Read".into()),
            category: Some("mind".into()),
            frequency: Some("weekly".into()),
            color: Some("#FF00AA".into()),
            ..Default::default()
        }
        .into_row("u1");

        assert_eq!(row.category, "mind");
        assert_eq!(row.frequency, "weekly");
        assert_eq!(row.color, "#FF00AA");
    }

    #[test]
    fn test_amount_kept_verbatim() {
        let input: TransactionInput =
            serde_json::from_str(r#"{"type":"expense","amount":"12.50"}"#).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let row = serde_json::to_value(input.into_row("u1", today)).unwrap();

        assert_eq!(row["amount"], "12.50");
        assert_eq!(row["type"], "expense");
        assert_eq!(row["date"], "2026-03-09");
    }

    #[test]
    fn test_absent_optional_fields_are_omitted() {
        let row = serde_json::to_value(TaskInput::default().into_row("u1")).unwrap();
        let fields = row.as_object().unwrap();

        assert!(!fields.contains_key("title"));
        assert!(!fields.contains_key("due_date"));
        assert_eq!(fields.len(), 3);
    }
}
