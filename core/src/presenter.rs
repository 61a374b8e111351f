//! Headless presentation state for the todo list.
//!
//! `Presenter` turns user intents into store operations and outbound
//! requests, and renders everything a front end needs into an immutable
//! [`Snapshot`]. It owns the view-only state: the filter, the creation
//! draft, the inline edit session and where focus should be.

use std::time::Duration;

use tracing::debug;

use crate::edit::{EditCommit, EditSession};
use crate::error::{ApiError, ErrorKind, NoticeId, StoreError};
use crate::filter::{self, FilterMode};
use crate::http::HttpResponse;
use crate::store::{Outbound, RequestId, Settlement, TodoEntry, TodoStore, EMPTY_TITLE_CLEAR_DELAY};
use crate::types::{Todo, TodoPatch};

/// Where keyboard focus belongs after the last transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    NewTodo,
    EditField(i64),
}

/// Work the host must do on behalf of an intent.
#[derive(Debug, Default)]
pub struct Effects {
    pub requests: Vec<Outbound>,
    /// Clear this notice after the delay, unless something replaced it.
    pub expire_notice: Option<(NoticeId, Duration)>,
}

impl Effects {
    fn requests(requests: Vec<Outbound>) -> Self {
        Self {
            requests,
            expire_notice: None,
        }
    }

    fn request(outbound: Outbound) -> Self {
        Self::requests(vec![outbound])
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty() && self.expire_notice.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemMode {
    Display,
    Editing { draft: String },
}

/// One row of the rendered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub mode: ItemMode,
    pub loading: bool,
    pub failed: Option<ErrorKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    pub show_toggle_all: bool,
    pub all_completed: bool,
    pub draft: String,
    pub input_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterView {
    pub items_left: usize,
    pub filter: FilterMode,
    pub clear_completed_enabled: bool,
}

impl FooterView {
    pub fn items_left_label(&self) -> String {
        format!("{} items left", self.items_left)
    }
}

/// Full UI state after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub header: HeaderView,
    pub items: Vec<ItemView>,
    pub placeholder: Option<ItemView>,
    pub footer: Option<FooterView>,
    pub error_text: Option<String>,
    pub focus: Focus,
    pub loading: bool,
}

#[derive(Debug)]
pub struct Presenter {
    store: TodoStore,
    filter: FilterMode,
    draft: String,
    edit: Option<EditSession>,
    focus: Focus,
    focus_epoch: u64,
}

impl Presenter {
    pub fn new(store: TodoStore, filter: FilterMode) -> Self {
        Self {
            store,
            filter,
            draft: String::new(),
            edit: None,
            focus: Focus::NewTodo,
            focus_epoch: 0,
        }
    }

    pub fn store(&self) -> &TodoStore {
        &self.store
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Bumped every time focus is (re)assigned, even to the same target, so a
    /// front end can tell "focus the field again" from "nothing happened".
    pub fn focus_epoch(&self) -> u64 {
        self.focus_epoch
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// Ids of the records currently shown, in display order.
    pub fn visible_ids(&self) -> Vec<i64> {
        filter::project(self.store.entries(), self.filter)
            .into_iter()
            .map(TodoEntry::id)
            .collect()
    }

    /// Initial load. Also used to reload.
    pub fn start(&mut self) -> Effects {
        Effects::request(self.store.load())
    }

    /// Update the creation field. Ignored while the field is disabled.
    pub fn set_draft(&mut self, draft: impl Into<String>) {
        if !self.store.is_loading() {
            self.draft = draft.into();
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn submit_draft(&mut self) -> Effects {
        if self.store.is_loading() {
            debug!("creation field is disabled while loading");
            return Effects::default();
        }
        match self.store.create(&self.draft) {
            Ok(outbound) => Effects::request(outbound),
            Err(StoreError::EmptyTitle { notice }) => Effects {
                requests: Vec::new(),
                expire_notice: Some((notice, EMPTY_TITLE_CLEAR_DELAY)),
            },
            Err(e) => {
                debug!(error = %e, "create rejected");
                Effects::default()
            }
        }
    }

    /// Enter inline edit for a record (double-click). Abandons any other
    /// draft edit. Returns whether edit mode was entered.
    pub fn begin_edit(&mut self, id: i64) -> bool {
        if self.edit.as_ref().is_some_and(EditSession::is_submitted) {
            return false;
        }
        let Some(entry) = self.store.get(id) else {
            return false;
        };
        if entry.is_pending() {
            return false;
        }
        self.edit = Some(EditSession::begin(&entry.todo));
        self.refocus(Focus::EditField(id));
        true
    }

    pub fn set_edit_draft(&mut self, draft: impl Into<String>) {
        if let Some(session) = self.edit.as_mut() {
            session.set_draft(draft);
        }
    }

    /// Enter or blur in the edit field.
    pub fn commit_edit(&mut self) -> Effects {
        let Some(session) = self.edit.as_ref() else {
            return Effects::default();
        };
        if session.is_submitted() {
            return Effects::default();
        }
        let id = session.todo_id();
        let result = match session.commit() {
            EditCommit::Unchanged => {
                self.close_edit();
                return Effects::default();
            }
            EditCommit::Rename(title) => self.store.update(id, TodoPatch::title(title)),
            EditCommit::Remove => self.store.delete(id),
        };
        match result {
            Ok(outbound) => {
                if let Some(session) = self.edit.as_mut() {
                    session.mark_submitted();
                }
                Effects::request(outbound)
            }
            Err(e) => {
                debug!(id, error = %e, "edit commit rejected");
                Effects::default()
            }
        }
    }

    /// Escape in the edit field: drop the draft, no request.
    pub fn cancel_edit(&mut self) {
        if self.edit.as_ref().is_some_and(|s| !s.is_submitted()) {
            self.close_edit();
        }
    }

    pub fn delete(&mut self, id: i64) -> Effects {
        self.single(id, |store| store.delete(id))
    }

    pub fn toggle(&mut self, id: i64) -> Effects {
        self.single(id, |store| store.toggle(id))
    }

    pub fn toggle_all(&mut self) -> Effects {
        Effects::requests(self.store.toggle_all())
    }

    pub fn clear_completed(&mut self) -> Effects {
        Effects::requests(self.store.clear_completed())
    }

    pub fn set_filter(&mut self, filter: FilterMode) {
        self.filter = filter;
    }

    pub fn dismiss_error(&mut self) {
        self.store.dismiss_error();
    }

    pub fn expire_error(&mut self, notice: NoticeId) -> bool {
        self.store.expire_error(notice)
    }

    /// Feed a completed request back in and move focus accordingly.
    pub fn settle(&mut self, ticket: RequestId, outcome: Result<HttpResponse, ApiError>) -> Settlement {
        let settlement = self.store.settle(ticket, outcome);
        match &settlement {
            Settlement::Loaded { .. } => {
                if self.edit.is_none() {
                    self.refocus(Focus::NewTodo);
                }
            }
            Settlement::Created(_) => {
                self.draft.clear();
                self.focus_new_todo_unless_editing();
            }
            Settlement::Deleted(id) => {
                if self.edit_target() == Some(*id) {
                    self.edit = None;
                }
                self.focus_new_todo_unless_editing();
            }
            Settlement::Updated(todo) => {
                if self.edit.as_ref().is_some_and(|s| s.todo_id() == todo.id && s.is_submitted()) {
                    self.close_edit();
                }
            }
            Settlement::Failed { todo_id: Some(id), .. } => {
                if let Some(session) = self.edit.as_mut().filter(|s| s.todo_id() == *id && s.is_submitted()) {
                    session.reopen();
                    self.refocus(Focus::EditField(*id));
                }
            }
            Settlement::Failed { todo_id: None, .. } => self.focus_new_todo_unless_editing(),
            Settlement::Ignored => {}
        }
        settlement
    }

    pub fn snapshot(&self) -> Snapshot {
        let loading = self.store.is_loading();
        let entries = self.store.entries();

        let items = filter::project(entries, self.filter)
            .into_iter()
            .map(|entry| self.item_view(entry))
            .collect();

        let placeholder = self.store.placeholder().map(|todo| ItemView {
            id: todo.id,
            title: todo.title.clone(),
            completed: todo.completed,
            mode: ItemMode::Display,
            loading: true,
            failed: None,
        });

        let footer = (!entries.is_empty()).then(|| FooterView {
            items_left: filter::active_count(entries),
            filter: self.filter,
            clear_completed_enabled: self.store.any_completed(),
        });

        Snapshot {
            header: HeaderView {
                show_toggle_all: !loading && !entries.is_empty(),
                all_completed: !entries.is_empty() && self.store.all_completed(),
                draft: self.draft.clone(),
                input_enabled: !loading,
            },
            items,
            placeholder,
            footer,
            error_text: self.store.error().map(|notice| notice.kind.to_string()),
            focus: self.focus,
            loading,
        }
    }

    fn item_view(&self, entry: &TodoEntry) -> ItemView {
        let todo: &Todo = &entry.todo;
        let mode = match &self.edit {
            Some(session) if session.todo_id() == todo.id => ItemMode::Editing {
                draft: session.draft().to_string(),
            },
            _ => ItemMode::Display,
        };
        ItemView {
            id: todo.id,
            title: todo.title.clone(),
            completed: todo.completed,
            mode,
            loading: entry.is_pending(),
            failed: entry.last_failure,
        }
    }

    fn single(&mut self, id: i64, op: impl FnOnce(&mut TodoStore) -> Result<Outbound, StoreError>) -> Effects {
        match op(&mut self.store) {
            Ok(outbound) => Effects::request(outbound),
            Err(e) => {
                debug!(id, error = %e, "intent rejected");
                Effects::default()
            }
        }
    }

    fn edit_target(&self) -> Option<i64> {
        self.edit.as_ref().map(EditSession::todo_id)
    }

    fn refocus(&mut self, focus: Focus) {
        self.focus = focus;
        self.focus_epoch += 1;
    }

    fn close_edit(&mut self) {
        self.edit = None;
        self.refocus(Focus::NewTodo);
    }

    fn focus_new_todo_unless_editing(&mut self) {
        if self.edit.is_none() {
            self.refocus(Focus::NewTodo);
        }
    }
}
