use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub user_id: Option<i64>,
}

/// Failures to inject, shared with the test that owns the server.
#[derive(Debug, Default)]
pub struct Faults {
    pub fail_list: bool,
    pub fail_create: bool,
    pub fail_update: HashSet<i64>,
    pub fail_delete: HashSet<i64>,
}

#[derive(Debug, Default)]
pub struct Db {
    todos: BTreeMap<i64, Todo>,
    next_id: i64,
}

impl Db {
    fn insert(&mut self, user_id: i64, title: String, completed: bool) -> Todo {
        self.next_id += 1;
        let todo = Todo {
            id: self.next_id,
            user_id,
            title,
            completed,
        };
        self.todos.insert(todo.id, todo.clone());
        todo
    }
}

#[derive(Clone, Default)]
pub struct AppState {
    pub db: Arc<RwLock<Db>>,
    pub faults: Arc<RwLock<Faults>>,
}

impl AppState {
    /// Insert a todo directly, bypassing the HTTP layer.
    pub async fn seed(&self, user_id: i64, title: &str, completed: bool) -> Todo {
        self.db.write().await.insert(user_id, title.to_string(), completed)
    }

    pub async fn todos(&self) -> Vec<Todo> {
        self.db.read().await.todos.values().cloned().collect()
    }
}

pub fn app() -> Router {
    app_with_state(AppState::default())
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).patch(update_todo).delete(delete_todo))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, AppState::default()).await
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn list_todos(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Todo>>, StatusCode> {
    if state.faults.read().await.fail_list {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let db = state.db.read().await;
    let todos: Vec<Todo> = db
        .todos
        .values()
        .filter(|t| params.user_id.map_or(true, |user_id| t.user_id == user_id))
        .cloned()
        .collect();
    debug!(user_id = ?params.user_id, count = todos.len(), "list todos");
    Ok(Json(todos))
}

async fn create_todo(
    State(state): State<AppState>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), StatusCode> {
    if state.faults.read().await.fail_create {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let todo = state
        .db
        .write()
        .await
        .insert(input.user_id, input.title, input.completed);
    debug!(id = todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Todo>, StatusCode> {
    let db = state.db.read().await;
    db.todos.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, StatusCode> {
    if state.faults.read().await.fail_update.contains(&id) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let mut db = state.db.write().await;
    let todo = db.todos.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    debug!(id, "updated todo");
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    if state.faults.read().await.fail_delete.contains(&id) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let mut db = state.db.write().await;
    db.todos.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(StatusCode::NOT_FOUND)
}
