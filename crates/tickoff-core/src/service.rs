//! Tracker: the glue between todos, the streak engine and storage.
//!
//! Every completion runs one `load -> record_completion -> save` cycle. The
//! store rejects a save whose version moved underneath it, in which case
//! the whole cycle is repeated from a fresh load, up to `max_retries`
//! extra times.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result, StoreError, ValidationError};
use crate::storage::{StreakStore, TodoStore};
use crate::streak::{Clock, StreakEngine, StreakRecord, StreakView};
use crate::todo::{Todo, TodoPatch};

/// Result of a todo write, with the streak view if the write completed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoUpdate {
    pub todo: Todo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<StreakView>,
}

pub struct Tracker<S, C> {
    store: S,
    clock: C,
    engine: StreakEngine,
    max_retries: u32,
}

impl<S, C> Tracker<S, C>
where
    S: StreakStore + TodoStore,
    C: Clock,
{
    pub fn new(store: S, clock: C, engine: StreakEngine) -> Self {
        Self {
            store,
            clock,
            engine,
            max_retries: 3,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record one completion for `user_id` on the clock's current day.
    ///
    /// # Errors
    /// Returns [`CoreError::Conflict`] once retries are exhausted, a
    /// [`CoreError::Streak`] if the engine rejects the day, or the store's
    /// error. In every error case nothing was persisted.
    pub fn record_completion(&self, user_id: &str) -> Result<StreakView> {
        let user_id = require_user(user_id)?;
        let today = self.clock.today();
        let attempts = self.max_retries.saturating_add(1);

        for attempt in 1..=attempts {
            let (record, version) = match self.store.load(user_id)? {
                Some(loaded) => (loaded.value, Some(loaded.version)),
                None => (StreakRecord::new(user_id), None),
            };

            let next = self.engine.record_completion(&record, today)?;

            match self.store.save(&next, version) {
                Ok(new_version) => {
                    info!(
                        user_id,
                        %today,
                        current = next.current_streak,
                        longest = next.longest_streak,
                        total = next.total_completed,
                        version = new_version,
                        "completion saved"
                    );
                    return Ok(self.engine.view_status(&next, today));
                }
                Err(StoreError::Conflict { .. }) => {
                    warn!(user_id, attempt, attempts, "streak update conflicted, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(CoreError::Conflict {
            user_id: user_id.to_string(),
            attempts,
        })
    }

    /// Current streak as it should be displayed today. Persists nothing.
    ///
    /// # Errors
    /// Returns the store's error if the record cannot be read.
    pub fn status(&self, user_id: &str) -> Result<StreakView> {
        let user_id = require_user(user_id)?;
        let today = self.clock.today();
        let record = self
            .store
            .load(user_id)?
            .map(|loaded| loaded.value)
            .unwrap_or_else(|| StreakRecord::new(user_id));

        let view = self.engine.view_status(&record, today);
        debug!(
            user_id,
            %today,
            stored = record.current_streak,
            shown = view.current,
            "streak status"
        );
        Ok(view)
    }

    /// Create a todo. A todo created already complete counts as a completion.
    ///
    /// If that completion cannot be recorded the todo is removed again, so a
    /// failed call leaves nothing behind.
    ///
    /// # Errors
    /// Returns a validation error for a blank title, or a storage/streak error.
    pub fn create_todo(&self, user_id: &str, title: &str, completed: bool) -> Result<TodoUpdate> {
        let user_id = require_user(user_id)?;
        let todo = Todo::new(user_id, title, completed)?;
        self.store.insert_todo(&todo)?;
        debug!(user_id, todo_id = %todo.id, "todo created");

        if !completed {
            return Ok(TodoUpdate { todo, streak: None });
        }
        match self.record_completion(user_id) {
            Ok(view) => Ok(TodoUpdate {
                todo,
                streak: Some(view),
            }),
            Err(e) => {
                if let Err(cleanup_err) = self.store.delete_todo(user_id, &todo.id) {
                    warn!(todo_id = %todo.id, error = %cleanup_err, "failed to remove todo");
                }
                Err(e)
            }
        }
    }

    /// List the user's todos in creation order.
    ///
    /// # Errors
    /// Returns a storage error.
    pub fn list_todos(&self, user_id: &str) -> Result<Vec<Todo>> {
        let user_id = require_user(user_id)?;
        Ok(self.store.list_todos(user_id)?)
    }

    /// Apply `patch` to one of the user's todos.
    ///
    /// An incomplete -> complete transition fires exactly one completion;
    /// reopening a todo leaves the streak alone.
    ///
    /// # Errors
    /// Returns [`CoreError::NotFound`] if the todo does not exist for this
    /// user, [`CoreError::TodoConflict`] if another writer changed its
    /// completion state first, or a storage/streak error.
    pub fn update_todo(&self, user_id: &str, id: &str, patch: &TodoPatch) -> Result<TodoUpdate> {
        let user_id = require_user(user_id)?;
        let mut todo = self
            .store
            .get_todo(user_id, id)?
            .ok_or_else(|| not_found(id))?;

        let was_completed = todo.completed;
        let became_complete = todo.apply(patch);

        if !self.store.update_todo(&todo, was_completed)? {
            warn!(user_id, todo_id = id, "todo changed underneath update");
            return Err(CoreError::TodoConflict { id: id.to_string() });
        }

        let streak = if became_complete {
            Some(self.complete_or_revert(&todo, was_completed)?)
        } else {
            None
        };
        Ok(TodoUpdate { todo, streak })
    }

    /// Delete one of the user's todos.
    ///
    /// # Errors
    /// Returns [`CoreError::NotFound`] if it does not exist for this user.
    pub fn delete_todo(&self, user_id: &str, id: &str) -> Result<()> {
        let user_id = require_user(user_id)?;
        if !self.store.delete_todo(user_id, id)? {
            return Err(not_found(id));
        }
        debug!(user_id, todo_id = id, "todo deleted");
        Ok(())
    }

    /// Record the completion for a todo that was just updated to complete.
    /// If the streak cannot be updated, put the todo's completion flag back
    /// so the transition can be retried.
    fn complete_or_revert(&self, todo: &Todo, was_completed: bool) -> Result<StreakView> {
        match self.record_completion(&todo.user_id) {
            Ok(view) => Ok(view),
            Err(e) => {
                let mut reverted = todo.clone();
                reverted.completed = was_completed;
                if let Err(revert_err) = self.store.update_todo(&reverted, todo.completed) {
                    warn!(todo_id = %todo.id, error = %revert_err, "failed to revert todo");
                }
                Err(e)
            }
        }
    }
}

fn require_user(user_id: &str) -> Result<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyUserId.into());
    }
    Ok(trimmed)
}

fn not_found(id: &str) -> CoreError {
    CoreError::NotFound {
        kind: "Todo",
        id: id.to_string(),
    }
}
