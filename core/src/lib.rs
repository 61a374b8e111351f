//! Sans-IO client core for a user's todo list.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). On top of the request layer
//! sit an optimistic todo store, a filter projection and a headless
//! presenter that renders snapshots for whatever front end hosts it.
//!
//! # Design
//! - `TodoClient` is stateless: it holds only `base_url` and `user_id`.
//! - `TodoStore` hands out ticketed requests and reconciles their outcomes
//!   in any order through `settle`.
//! - `Presenter` maps user intents onto the store and owns view-only state
//!   (filter, drafts, edit session, focus).
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod edit;
pub mod error;
pub mod filter;
pub mod http;
pub mod presenter;
pub mod store;
pub mod types;

pub use client::TodoClient;
pub use edit::{EditCommit, EditSession};
pub use error::{ApiError, ErrorKind, NoticeId, StoreError};
pub use filter::FilterMode;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use presenter::{Effects, Focus, FooterView, HeaderView, ItemMode, ItemView, Presenter, Snapshot};
pub use store::{
    ErrorNotice, ItemStatus, Outbound, RequestId, Settlement, TodoEntry, TodoStore, EMPTY_TITLE_CLEAR_DELAY,
};
pub use types::{NewTodo, Todo, TodoPatch, PLACEHOLDER_ID};
