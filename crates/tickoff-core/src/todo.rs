//! Todo items.
//!
//! A todo belongs to exactly one user. Marking an incomplete todo as
//! complete is what feeds the streak engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Build a new todo with a fresh id.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyTitle`] if the title is blank.
    pub fn new(user_id: &str, title: &str, completed: bool) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: validate_title(title)?,
            completed,
            created_at: Utc::now(),
        })
    }

    /// Apply a partial update, reporting whether the item just became complete.
    pub fn apply(&mut self, patch: &TodoPatch) -> bool {
        if let Some(title) = patch.title.as_deref() {
            // Blank titles are ignored rather than rejected.
            if let Ok(title) = validate_title(title) {
                self.title = title;
            }
        }

        let was_completed = self.completed;
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        !was_completed && self.completed
    }
}

/// Partial update of a todo. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn complete() -> Self {
        Self {
            completed: Some(true),
            ..Default::default()
        }
    }

    pub fn reopen() -> Self {
        Self {
            completed: Some(false),
            ..Default::default()
        }
    }

    pub fn rename(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

fn validate_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}
