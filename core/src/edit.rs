//! Inline title editing for a single list item.
//!
//! An item is either displayed or being edited; at most one item is edited at
//! a time, so the editing state is a single optional [`EditSession`] owned by
//! the presenter rather than a flag on every item.

use crate::types::Todo;

/// What committing an edit (Enter or blur) asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommit {
    /// Title did not change; leave edit mode without a request.
    Unchanged,
    /// Send the trimmed title.
    Rename(String),
    /// The draft was emptied; deleting the record is the requested outcome.
    Remove,
}

/// Sub-state of an edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditPhase {
    Drafting,
    /// A rename or delete for this item is in flight.
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    todo_id: i64,
    original: String,
    draft: String,
    phase: EditPhase,
}

impl EditSession {
    pub fn begin(todo: &Todo) -> Self {
        Self {
            todo_id: todo.id,
            original: todo.title.clone(),
            draft: todo.title.clone(),
            phase: EditPhase::Drafting,
        }
    }

    pub fn todo_id(&self) -> i64 {
        self.todo_id
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_submitted(&self) -> bool {
        self.phase == EditPhase::Submitted
    }

    /// Replace the draft text. Ignored while a submission is in flight.
    pub fn set_draft(&mut self, draft: impl Into<String>) {
        if self.phase == EditPhase::Drafting {
            self.draft = draft.into();
        }
    }

    /// Decide what the current draft means, without changing state.
    pub fn commit(&self) -> EditCommit {
        let trimmed = self.draft.trim();
        if trimmed.is_empty() {
            EditCommit::Remove
        } else if trimmed == self.original {
            EditCommit::Unchanged
        } else {
            EditCommit::Rename(trimmed.to_string())
        }
    }

    pub(crate) fn mark_submitted(&mut self) {
        self.phase = EditPhase::Submitted;
    }

    /// The submitted request failed: keep the draft and let the user retry.
    pub(crate) fn reopen(&mut self) {
        self.phase = EditPhase::Drafting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(title: &str) -> Todo {
        Todo {
            id: 3,
            user_id: 1,
            title: title.to_string(),
            completed: false,
        }
    }

    #[test]
    fn begins_with_current_title_as_draft() {
        let session = EditSession::begin(&todo("Walk dog"));
        assert_eq!(session.todo_id(), 3);
        assert_eq!(session.draft(), "Walk dog");
        assert_eq!(session.commit(), EditCommit::Unchanged);
    }

    #[test]
    fn changed_title_is_trimmed() {
        let mut session = EditSession::begin(&todo("Walk dog"));
        session.set_draft("  Walk cat ");
        assert_eq!(session.commit(), EditCommit::Rename("Walk cat".to_string()));
    }

    #[test]
    fn whitespace_around_same_title_is_unchanged() {
        let mut session = EditSession::begin(&todo("Walk dog"));
        session.set_draft(" Walk dog  ");
        assert_eq!(session.commit(), EditCommit::Unchanged);
    }

    #[test]
    fn emptied_draft_means_remove() {
        let mut session = EditSession::begin(&todo("Walk dog"));
        session.set_draft("   ");
        assert_eq!(session.commit(), EditCommit::Remove);
    }

    #[test]
    fn draft_is_frozen_while_submitted() {
        let mut session = EditSession::begin(&todo("a"));
        session.set_draft("b");
        session.mark_submitted();
        session.set_draft("c");
        assert_eq!(session.draft(), "b");
        session.reopen();
        session.set_draft("c");
        assert_eq!(session.draft(), "c");
    }
}
