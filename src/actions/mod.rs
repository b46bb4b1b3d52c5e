//! Action dispatch
//!
//! A client names an action and passes a `data` object. The action decides
//! which collection the row goes into and which defaults apply:
//!
//! | Action               | Collection     | Defaults                                   |
//! |----------------------|----------------|--------------------------------------------|
//! | `create_task`        | `tasks`        | priority `p2`, status `todo`               |
//! | `create_project`     | `projects`     | category `personal`, priority `medium`, status `planned` (forced) |
//! | `create_habit`       | `habits`       | category `health`, frequency `daily`, color `#00D9FF` |
//! | `create_goal`        | `goals`        | horizon `medium`, status `in_progress` (forced) |
//! | `create_transaction` | `transactions` | date = today (UTC)                         |
//!
//! Every row is owned by the caller's resolved identity.

pub mod dispatcher;
pub mod rows;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::db::Collection;
use crate::types::ApiError;

pub use dispatcher::ActionDispatcher;
pub use rows::{GoalInput, HabitInput, ProjectInput, TaskInput, TransactionInput};

/// Request body of the action function
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// A parsed, known action
#[derive(Debug, Clone)]
pub enum Action {
    CreateTask(TaskInput),
    CreateProject(ProjectInput),
    CreateHabit(HabitInput),
    CreateGoal(GoalInput),
    CreateTransaction(TransactionInput),
}

impl Action {
    /// Parse an action name and its data
    ///
    /// The name is checked first, so an unknown action is reported as such
    /// whatever the data looks like.
    pub fn parse(name: &str, data: serde_json::Value) -> Result<Self, ApiError> {
        match name {
            "create_task" => Ok(Action::CreateTask(parse_data(data)?)),
            "create_project" => Ok(Action::CreateProject(parse_data(data)?)),
            "create_habit" => Ok(Action::CreateHabit(parse_data(data)?)),
            "create_goal" => Ok(Action::CreateGoal(parse_data(data)?)),
            "create_transaction" => Ok(Action::CreateTransaction(parse_data(data)?)),
            other => Err(ApiError::InvalidAction(other.to_string())),
        }
    }

    /// Wire name of the action
    pub fn name(&self) -> &'static str {
        match self {
            Action::CreateTask(_) => "create_task",
            Action::CreateProject(_) => "create_project",
            Action::CreateHabit(_) => "create_habit",
            Action::CreateGoal(_) => "create_goal",
            Action::CreateTransaction(_) => "create_transaction",
        }
    }

    /// Collection the row is inserted into
    pub fn collection(&self) -> Collection {
        match self {
            Action::CreateTask(_) => Collection::Tasks,
            Action::CreateProject(_) => Collection::Projects,
            Action::CreateHabit(_) => Collection::Habits,
            Action::CreateGoal(_) => Collection::Goals,
            Action::CreateTransaction(_) => Collection::Transactions,
        }
    }

    /// Build the row to insert, owned by `user_id`
    pub fn into_row(self, user_id: &str, today: NaiveDate) -> Result<serde_json::Value, ApiError> {
        let row = match self {
            Action::CreateTask(input) => serde_json::to_value(input.into_row(user_id)),
            Action::CreateProject(input) => serde_json::to_value(input.into_row(user_id)),
            Action::CreateHabit(input) => serde_json::to_value(input.into_row(user_id)),
            Action::CreateGoal(input) => serde_json::to_value(input.into_row(user_id)),
            Action::CreateTransaction(input) => {
                serde_json::to_value(input.into_row(user_id, today))
            }
        };
        row.map_err(|e| ApiError::Internal(format!("Failed to build row: {}", e)))
    }
}

/// Missing or null `data` means "no fields"
fn parse_data<T: DeserializeOwned + Default>(data: serde_json::Value) -> Result<T, ApiError> {
    match data {
        serde_json::Value::Null => Ok(T::default()),
        serde_json::Value::Object(_) => serde_json::from_value(data)
            .map_err(|e| ApiError::InvalidInput(format!("Invalid data: {}", e))),
        _ => Err(ApiError::InvalidInput("data must be an object".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_unknown_action() {
        let err = Action::parse("delete_everything", json!({})).unwrap_err();
        assert!(matches!(err, ApiError::InvalidAction(ref a) if a == "delete_everything"));
    }

    #[test]
    fn test_unknown_action_wins_over_bad_data() {
        let err = Action::parse("drop_table", json!("not an object")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidAction(_)));
    }

    #[test]
    fn test_wrong_field_type_is_invalid_input() {
        let err = Action::parse("create_task", json!({ "title": 42 })).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_null_data_uses_defaults() {
        let action = Action::parse("create_habit", serde_json::Value::Null).unwrap();
        let row = action.into_row("user-1", today()).unwrap();
        assert_eq!(
            row,
            json!({
                "user_id": "user-1",
                "category": "health",
                "frequency": "daily",
                "color": "#00D9FF",
            })
        );
    }

    #[test]
    fn test_task_defaults() {
        let action = Action::parse("create_task", json!({ "title": "Write report" })).unwrap();
        assert_eq!(action.collection(), Collection::Tasks);

        let row = action.into_row("user-1", today()).unwrap();
        assert_eq!(row["priority"], "p2");
        assert_eq!(row["status"], "todo");
        assert_eq!(row["title"], "Write report");
        assert_eq!(row["user_id"], "user-1");
    }

    #[test]
    fn test_task_supplied_priority_kept() {
        let action = Action::parse(
            "create_task",
            json!({ "title": "Ship", "priority": "p0", "status": "in_progress", "due_date": "2026-11-01" }),
        )
        .unwrap();
        let row = action.into_row("user-1", today()).unwrap();
        assert_eq!(row["priority"], "p0");
        assert_eq!(row["status"], "in_progress");
        assert_eq!(row["due_date"], "2026-11-01");
    }

    #[test]
    fn test_project_status_forced() {
        let action = Action::parse(
            "create_project",
            json!({ "title": "Garden", "status": "done" }),
        )
        .unwrap();
        let row = action.into_row("user-1", today()).unwrap();
        assert_eq!(row["status"], "planned");
        assert_eq!(row["category"], "personal");
        assert_eq!(row["priority"], "medium");
    }

    #[test]
    fn test_goal_status_forced() {
        let action = Action::parse(
            "create_goal",
            json!({ "title": "Run 10k", "horizon": "long", "status": "achieved" }),
        )
        .unwrap();
        let row = action.into_row("user-1", today()).unwrap();
        assert_eq!(row["status"], "in_progress");
        assert_eq!(row["horizon"], "long");
    }

    #[test]
    fn test_goal_defaults() {
        let action = Action::parse("create_goal", json!({ "title": "Read 12 books" })).unwrap();
        assert_eq!(action.collection(), Collection::Goals);

        let row = action.into_row("user-1", today()).unwrap();
        assert_eq!(row["horizon"], "medium");
        assert_eq!(row["status"], "in_progress");
        assert_eq!(row["title"], "Read 12 books");
    }

    #[test]
    fn test_transaction_date_defaults_to_today() {
        let action = Action::parse(
            "create_transaction",
            json!({ "type": "income", "amount": 250, "category": "salary" }),
        )
        .unwrap();
        let row = action.into_row("user-1", today()).unwrap();
        assert_eq!(row["date"], "2026-10-16");
        assert_eq!(row["amount"], 250);
    }

    #[test]
    fn test_owner_cannot_be_overridden() {
        let action = Action::parse(
            "create_task",
            json!({ "title": "Sneaky", "user_id": "someone-else" }),
        )
        .unwrap();
        let row = action.into_row("user-1", today()).unwrap();
        assert_eq!(row["user_id"], "user-1");
    }

    #[test]
    fn test_missing_action_name() {
        let request: ActionRequest = serde_json::from_str(r#"{"data":{}}"#).unwrap();
        let err = Action::parse(&request.action, request.data).unwrap_err();
        assert!(matches!(err, ApiError::InvalidAction(_)));
    }
}
