//! Session-local todo collection with optimistic reconciliation.
//!
//! # Design
//! The store never performs I/O. Every operation that needs the backend
//! returns an [`Outbound`]: a ticket plus the `HttpRequest` to execute. The
//! host runs the request however it likes and hands the outcome back through
//! [`TodoStore::settle`], which parses it and commits or reverts local state.
//!
//! Tickets are unique for the lifetime of the store, so settlements can be
//! delivered in any order. Each in-flight request touches exactly one record
//! (or the placeholder, or the whole list for a load), and a record accepts
//! at most one request at a time, so concurrent settlements never conflict.
//!
//! Which record is "loading" is a status tag on the record itself rather than
//! a set of ids tracked next to the list.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};

use crate::client::TodoClient;
use crate::error::{ApiError, ErrorKind, NoticeId, StoreError};
use crate::filter;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{NewTodo, Todo, TodoPatch};

/// How long the empty-title notice stays up before it clears itself.
pub const EMPTY_TITLE_CLEAR_DELAY: Duration = Duration::from_secs(3);

/// Correlates an outbound request with its settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

/// A request the host must execute, tagged with the ticket to settle it with.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub ticket: RequestId,
    pub request: HttpRequest,
}

/// What, if anything, is in flight for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemStatus {
    #[default]
    Idle,
    PendingDelete,
    PendingEdit,
}

/// A backend-confirmed record plus its client-side status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoEntry {
    pub todo: Todo,
    pub status: ItemStatus,
    /// Kind of the last request for this record that failed. Cleared when a
    /// new request is issued for it.
    pub last_failure: Option<ErrorKind>,
}

impl TodoEntry {
    fn new(todo: Todo) -> Self {
        Self {
            todo,
            status: ItemStatus::Idle,
            last_failure: None,
        }
    }

    pub fn id(&self) -> i64 {
        self.todo.id
    }

    pub fn is_pending(&self) -> bool {
        self.status != ItemStatus::Idle
    }
}

impl AsRef<Todo> for TodoEntry {
    fn as_ref(&self) -> &Todo {
        &self.todo
    }
}

/// The single banner slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorNotice {
    pub id: NoticeId,
    pub kind: ErrorKind,
}

/// Result of reconciling one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Loaded { count: usize },
    Created(Todo),
    Deleted(i64),
    Updated(Todo),
    /// The request failed; `todo_id` names the affected record, if any.
    Failed { kind: ErrorKind, todo_id: Option<i64> },
    /// The ticket was not issued by this store or was already settled.
    Ignored,
}

#[derive(Debug, Clone, Copy)]
enum Pending {
    Load,
    Create,
    Delete(i64),
    Update(i64),
}

#[derive(Debug)]
pub struct TodoStore {
    client: TodoClient,
    entries: Vec<TodoEntry>,
    placeholder: Option<Todo>,
    error: Option<ErrorNotice>,
    in_flight: HashMap<RequestId, Pending>,
    next_ticket: u64,
    next_notice: u64,
}

impl TodoStore {
    pub fn new(client: TodoClient) -> Self {
        Self {
            client,
            entries: Vec::new(),
            placeholder: None,
            error: None,
            in_flight: HashMap::new(),
            next_ticket: 1,
            next_notice: 1,
        }
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    pub fn entries(&self) -> &[TodoEntry] {
        &self.entries
    }

    pub fn get(&self, id: i64) -> Option<&TodoEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn todos(&self) -> impl Iterator<Item = &Todo> + '_ {
        self.entries.iter().map(|e| &e.todo)
    }

    pub fn placeholder(&self) -> Option<&Todo> {
        self.placeholder.as_ref()
    }

    pub fn error(&self) -> Option<ErrorNotice> {
        self.error
    }

    /// True while at least one request is outstanding.
    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn all_completed(&self) -> bool {
        self.entries.iter().all(|e| e.todo.completed)
    }

    pub fn any_completed(&self) -> bool {
        filter::completed_count(&self.entries) > 0
    }

    /// Fetch every todo for the session's user.
    pub fn load(&mut self) -> Outbound {
        let request = self.client.build_list_todos();
        self.issue(Pending::Load, request)
    }

    /// Start creating a todo from raw user input.
    pub fn create(&mut self, title: &str) -> Result<Outbound, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            let notice = self.raise(ErrorKind::EmptyTitle);
            return Err(StoreError::EmptyTitle { notice });
        }
        if self.placeholder.is_some() {
            return Err(StoreError::CreateInFlight);
        }

        let input = NewTodo {
            user_id: self.client.user_id(),
            title: title.to_string(),
            completed: false,
        };
        let request = match self.client.build_create_todo(&input) {
            Ok(request) => request,
            Err(e) => return Err(self.encode_failure(ErrorKind::AddFailed, e)),
        };
        self.placeholder = Some(Todo::placeholder(&input));
        Ok(self.issue(Pending::Create, request))
    }

    pub fn delete(&mut self, id: i64) -> Result<Outbound, StoreError> {
        let entry = self.idle_entry_mut(id)?;
        entry.status = ItemStatus::PendingDelete;
        entry.last_failure = None;
        let request = self.client.build_delete_todo(id);
        Ok(self.issue(Pending::Delete(id), request))
    }

    /// Delete every completed record that has nothing else in flight. Each
    /// delete settles on its own.
    pub fn clear_completed(&mut self) -> Vec<Outbound> {
        let ids: Vec<i64> = self
            .entries
            .iter()
            .filter(|e| e.todo.completed && !e.is_pending())
            .map(TodoEntry::id)
            .collect();
        ids.into_iter().filter_map(|id| self.delete(id).ok()).collect()
    }

    pub fn update(&mut self, id: i64, patch: TodoPatch) -> Result<Outbound, StoreError> {
        self.idle_entry_mut(id)?;
        let request = match self.client.build_update_todo(id, &patch) {
            Ok(request) => request,
            Err(e) => return Err(self.encode_failure(ErrorKind::UpdateFailed, e)),
        };
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id() == id) {
            entry.status = ItemStatus::PendingEdit;
            entry.last_failure = None;
        }
        Ok(self.issue(Pending::Update(id), request))
    }

    /// Flip the completion flag of one record.
    pub fn toggle(&mut self, id: i64) -> Result<Outbound, StoreError> {
        let completed = self
            .get(id)
            .map(|e| e.todo.completed)
            .ok_or(StoreError::UnknownTodo(id))?;
        self.update(id, TodoPatch::completed(!completed))
    }

    /// Complete everything, or un-complete everything if it is all done
    /// already. Only records not yet at the target state are updated.
    pub fn toggle_all(&mut self) -> Vec<Outbound> {
        let target = !self.all_completed();
        let ids: Vec<i64> = self
            .entries
            .iter()
            .filter(|e| e.todo.completed != target && !e.is_pending())
            .map(TodoEntry::id)
            .collect();
        debug!(target, count = ids.len(), "toggling all todos");
        ids.into_iter()
            .filter_map(|id| self.update(id, TodoPatch::completed(target)).ok())
            .collect()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Clear the banner if it still shows `notice`. Returns whether it did.
    pub fn expire_error(&mut self, notice: NoticeId) -> bool {
        match self.error {
            Some(current) if current.id == notice => {
                self.error = None;
                true
            }
            _ => false,
        }
    }

    /// Reconcile the outcome of a request issued under `ticket`.
    pub fn settle(&mut self, ticket: RequestId, outcome: Result<HttpResponse, ApiError>) -> Settlement {
        let Some(pending) = self.in_flight.remove(&ticket) else {
            debug!(?ticket, "ignoring settlement for unknown ticket");
            return Settlement::Ignored;
        };

        match pending {
            Pending::Load => match outcome.and_then(|r| self.client.parse_list_todos(r)) {
                Ok(todos) => {
                    let count = todos.len();
                    self.entries = todos.into_iter().map(TodoEntry::new).collect();
                    self.restore_pending_statuses();
                    debug!(count, "loaded todos");
                    Settlement::Loaded { count }
                }
                Err(e) => self.fail(ErrorKind::LoadFailed, None, &e),
            },
            Pending::Create => {
                self.placeholder = None;
                match outcome.and_then(|r| self.client.parse_create_todo(r)) {
                    Ok(todo) => {
                        debug!(id = todo.id, "created todo");
                        self.entries.push(TodoEntry::new(todo.clone()));
                        Settlement::Created(todo)
                    }
                    Err(e) => self.fail(ErrorKind::AddFailed, None, &e),
                }
            }
            Pending::Delete(id) => match outcome.and_then(|r| self.client.parse_delete_todo(r)) {
                Ok(()) => {
                    self.entries.retain(|e| e.id() != id);
                    debug!(id, "deleted todo");
                    Settlement::Deleted(id)
                }
                Err(e) => self.fail(ErrorKind::DeleteFailed, Some(id), &e),
            },
            Pending::Update(id) => match outcome.and_then(|r| self.client.parse_update_todo(r)) {
                Ok(todo) => {
                    if let Some(entry) = self.entries.iter_mut().find(|e| e.id() == id) {
                        entry.todo = todo.clone();
                        entry.status = ItemStatus::Idle;
                    }
                    debug!(id, "updated todo");
                    Settlement::Updated(todo)
                }
                Err(e) => self.fail(ErrorKind::UpdateFailed, Some(id), &e),
            },
        }
    }

    fn issue(&mut self, pending: Pending, request: HttpRequest) -> Outbound {
        let ticket = RequestId(self.next_ticket);
        self.next_ticket += 1;
        debug!(?ticket, method = %request.method, path = %request.path, "issuing request");
        self.in_flight.insert(ticket, pending);
        Outbound { ticket, request }
    }

    fn idle_entry_mut(&mut self, id: i64) -> Result<&mut TodoEntry, StoreError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or(StoreError::UnknownTodo(id))?;
        if entry.is_pending() {
            return Err(StoreError::Busy(id));
        }
        Ok(entry)
    }

    fn raise(&mut self, kind: ErrorKind) -> NoticeId {
        let id = NoticeId(self.next_notice);
        self.next_notice += 1;
        self.error = Some(ErrorNotice { id, kind });
        id
    }

    fn fail(&mut self, kind: ErrorKind, todo_id: Option<i64>, error: &ApiError) -> Settlement {
        warn!(?kind, ?todo_id, %error, "request failed");
        if let Some(id) = todo_id {
            if let Some(entry) = self.entries.iter_mut().find(|e| e.id() == id) {
                entry.status = ItemStatus::Idle;
                entry.last_failure = Some(kind);
            }
        }
        self.raise(kind);
        Settlement::Failed { kind, todo_id }
    }

    fn encode_failure(&mut self, kind: ErrorKind, error: ApiError) -> StoreError {
        warn!(?kind, %error, "request could not be built");
        self.raise(kind);
        StoreError::Encode(error.to_string())
    }

    /// A reload replaces every record; requests still in flight keep their
    /// records marked.
    fn restore_pending_statuses(&mut self) {
        for pending in self.in_flight.values() {
            let (id, status) = match *pending {
                Pending::Delete(id) => (id, ItemStatus::PendingDelete),
                Pending::Update(id) => (id, ItemStatus::PendingEdit),
                Pending::Load | Pending::Create => continue,
            };
            if let Some(entry) = self.entries.iter_mut().find(|e| e.id() == id) {
                entry.status = status;
            }
        }
    }
}
