//! Domain DTOs for the todo API.
//!
//! # Design
//! The wire format is camelCase JSON (`userId`). These types mirror the
//! mock-server's schema but are defined independently; integration tests
//! catch any schema drift between the two crates.

use serde::{Deserialize, Serialize};

/// Id reserved for the locally-synthesized placeholder shown while a create
/// request is in flight. The backend never assigns it.
pub const PLACEHOLDER_ID: i64 = 0;

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
}

impl Todo {
    /// Placeholder record for a create that has not been confirmed yet.
    pub fn placeholder(input: &NewTodo) -> Self {
        Self {
            id: PLACEHOLDER_ID,
            user_id: input.user_id,
            title: input.title.clone(),
            completed: input.completed,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id == PLACEHOLDER_ID
    }
}

impl AsRef<Todo> for Todo {
    fn as_ref(&self) -> &Todo {
        self
    }
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            completed: None,
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }
}
