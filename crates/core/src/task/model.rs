//! Task model definitions

use serde::{Deserialize, Deserializer, Serialize};

/// A persisted to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub done: bool,
    pub author: String,
}

/// The caller-supplied fields of a task, used for both create and update
///
/// Absent and `null` fields take their zero value. Unknown fields are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NewTask {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub done: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl NewTask {
    /// Create a new record with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Mark the task done or not
    pub fn with_done(mut self, done: bool) -> Self {
        self.done = done;
        self
    }

    /// Materialize the record under an assigned identifier
    pub fn into_task(self, id: i64) -> Task {
        Task {
            id,
            name: self.name,
            description: self.description,
            done: self.done,
            author: self.author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let task = NewTask::new("Test task");
        assert_eq!(task.name, "Test task");
        assert_eq!(task.description, "");
        assert!(!task.done);
        assert_eq!(task.author, "");
    }

    #[test]
    fn test_into_task_keeps_fields() {
        let task = NewTask::new("Write docs")
            .with_description("README first")
            .with_author("alice")
            .with_done(true)
            .into_task(7);

        assert_eq!(task.id, 7);
        assert_eq!(task.name, "Write docs");
        assert_eq!(task.description, "README first");
        assert!(task.done);
        assert_eq!(task.author, "alice");
    }

    #[test]
    fn test_missing_fields_take_zero_values() {
        let task: NewTask = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert_eq!(task, NewTask::new("x"));
    }

    #[test]
    fn test_null_fields_take_zero_values() {
        let task: NewTask =
            serde_json::from_str(r#"{"name":null,"description":null,"done":null,"author":"eve"}"#)
                .unwrap();
        assert_eq!(task, NewTask::default().with_author("eve"));
    }

    #[test]
    fn test_wrong_type_is_still_rejected() {
        assert!(serde_json::from_str::<NewTask>(r#"{"done":"yes"}"#).is_err());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = serde_json::from_str::<NewTask>(r#"{"name":"x","bogus":1}"#).unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_task_serializes_done_field() {
        let task = NewTask::new("x").with_done(true).into_task(1);
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["done"], true);
    }
}
