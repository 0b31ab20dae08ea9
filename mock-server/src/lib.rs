use std::{cmp::Ordering, collections::BTreeMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: usize = 10;
const TEXT_MIN_CHARS: usize = 3;
const TEXT_MAX_CHARS: usize = 120;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub text: String,
    pub done: bool,
    pub priority: Priority,
    pub creation_date: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub done_date: Option<DateTime<Utc>>,
}

/// Body of create and update requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub page: usize,
    pub size: Option<usize>,
    pub text: Option<String>,
    pub priority: Option<Priority>,
    pub done: Option<bool>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPage {
    pub content: Vec<Todo>,
    pub total_elements: usize,
    pub total_pages: usize,
    pub last: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoStats {
    pub total_done: u64,
    pub average_done_time: String,
    pub total_low_done: u64,
    pub average_low_done_time: String,
    pub total_medium_done: u64,
    pub average_medium_done_time: String,
    pub total_high_done: u64,
    pub average_high_done_time: String,
}

/// Items in creation order.
pub type Db = Arc<RwLock<Vec<Todo>>>;

pub fn app() -> Router {
    router(Db::default())
}

pub fn router(db: Db) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/stats", get(todo_stats))
        .route("/todos/{id}", put(update_todo).delete(delete_todo))
        .route("/todos/{id}/done", put(complete_todo))
        .route("/todos/{id}/undone", put(uncomplete_todo))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ApiError {
    NotFound(Uuid),
    BadRequest(String),
    /// Field name to message.
    Invalid(BTreeMap<&'static str, &'static str>),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": format!("To Do not found with id {id}") })),
            )
                .into_response(),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response(),
            ApiError::Invalid(fields) => (StatusCode::BAD_REQUEST, Json(fields)).into_response(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list_todos(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Result<Json<TodoPage>, ApiError> {
    let size = params.size.unwrap_or(DEFAULT_PAGE_SIZE);
    if size == 0 {
        return Err(ApiError::BadRequest("Page size must not be less than one".into()));
    }
    let order = parse_sort(params.sort_by.as_deref().unwrap_or(""))?;

    let todos = db.read().await;
    let needle = params.text.as_deref().map(str::to_lowercase);
    let mut matching: Vec<&Todo> = todos
        .iter()
        .filter(|t| params.done.map_or(true, |done| t.done == done))
        .filter(|t| params.priority.map_or(true, |p| t.priority == p))
        .filter(|t| {
            needle
                .as_deref()
                .map_or(true, |n| t.text.to_lowercase().contains(n))
        })
        .collect();
    matching.sort_by(|a, b| compare(&order, a, b));

    let total = matching.len();
    let total_pages = total.div_ceil(size);
    let content = matching
        .into_iter()
        .skip(params.page.saturating_mul(size))
        .take(size)
        .cloned()
        .collect();

    Ok(Json(TodoPage {
        content,
        total_elements: total,
        total_pages,
        last: params.page + 1 >= total_pages,
    }))
}

async fn create_todo(
    State(db): State<Db>,
    input: Result<Json<NewTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let (text, priority, due_date) = validate(input)?;
    let todo = Todo {
        id: Uuid::new_v4(),
        text,
        done: false,
        priority,
        creation_date: Utc::now(),
        due_date,
        done_date: None,
    };
    db.write().await.push(todo.clone());
    tracing::info!(id = %todo.id, "created");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    input: Result<Json<NewTodo>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let (text, priority, due_date) = validate(input)?;
    modify(&db, id, |todo| {
        todo.text = text;
        todo.priority = priority;
        todo.due_date = due_date;
    })
    .await
}

async fn complete_todo(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Todo>, ApiError> {
    modify(&db, id, |todo| {
        todo.done = true;
        todo.done_date.get_or_insert_with(Utc::now);
    })
    .await
}

async fn uncomplete_todo(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Todo>, ApiError> {
    modify(&db, id, |todo| {
        todo.done = false;
        todo.done_date = None;
    })
    .await
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    let mut todos = db.write().await;
    let pos = todos
        .iter()
        .position(|t| t.id == id)
        .ok_or(ApiError::NotFound(id))?;
    todos.remove(pos);
    tracing::info!(%id, "deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn todo_stats(State(db): State<Db>) -> Json<TodoStats> {
    let todos = db.read().await;
    let mut all = Bucket::default();
    let mut by_priority: BTreeMap<Priority, Bucket> = BTreeMap::new();

    for todo in todos.iter().filter(|t| t.done) {
        let Some(done_date) = todo.done_date else {
            continue;
        };
        let seconds = (done_date - todo.creation_date).num_seconds().max(0) as u64;
        all.add(seconds);
        by_priority.entry(todo.priority).or_default().add(seconds);
    }

    let bucket = |p| by_priority.get(&p).copied().unwrap_or_default();
    let (low, medium, high) = (
        bucket(Priority::Low),
        bucket(Priority::Medium),
        bucket(Priority::High),
    );
    Json(TodoStats {
        total_done: all.count,
        average_done_time: all.average(),
        total_low_done: low.count,
        average_low_done_time: low.average(),
        total_medium_done: medium.count,
        average_medium_done_time: medium.average(),
        total_high_done: high.count,
        average_high_done_time: high.average(),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn modify(db: &Db, id: Uuid, f: impl FnOnce(&mut Todo)) -> Result<Json<Todo>, ApiError> {
    let mut todos = db.write().await;
    let todo = todos
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or(ApiError::NotFound(id))?;
    f(todo);
    Ok(Json(todo.clone()))
}

fn validate(
    input: Result<Json<NewTodo>, JsonRejection>,
) -> Result<(String, Priority, Option<NaiveDate>), ApiError> {
    let Json(input) = input.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let mut errors = BTreeMap::new();

    let text = input.text.unwrap_or_default();
    let chars = text.chars().count();
    if text.trim().is_empty() {
        errors.insert("text", "must not be blank");
    } else if !(TEXT_MIN_CHARS..=TEXT_MAX_CHARS).contains(&chars) {
        errors.insert("text", "size must be between 3 and 120");
    }
    if input.priority.is_none() {
        errors.insert("priority", "must not be null");
    }
    if input.due_date.is_some_and(|d| d < Utc::now().date_naive()) {
        errors.insert("dueDate", "must be a date in the present or in the future");
    }

    match input.priority {
        Some(priority) if errors.is_empty() => Ok((text, priority, input.due_date)),
        _ => Err(ApiError::Invalid(errors)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortKey {
    Priority,
    DueDate,
}

/// Parse `field:asc,field:desc` into sort keys; `true` means ascending.
fn parse_sort(raw: &str) -> Result<Vec<(SortKey, bool)>, ApiError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(|token| {
            let (field, order) = token
                .split_once(':')
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid sort field: {token}")))?;
            let key = match field.trim() {
                "priority" => SortKey::Priority,
                "dueDate" => SortKey::DueDate,
                other => return Err(ApiError::BadRequest(format!("Invalid sort field: {other}"))),
            };
            let ascending = match order.trim() {
                "asc" => true,
                "desc" => false,
                other => return Err(ApiError::BadRequest(format!("Invalid sort order: {other}"))),
            };
            Ok((key, ascending))
        })
        .collect()
}

/// Chained comparison; absent due dates sort first when ascending.
fn compare(order: &[(SortKey, bool)], a: &Todo, b: &Todo) -> Ordering {
    order
        .iter()
        .map(|(key, ascending)| {
            let ord = match key {
                SortKey::Priority => a.priority.cmp(&b.priority),
                SortKey::DueDate => a.due_date.cmp(&b.due_date),
            };
            if *ascending {
                ord
            } else {
                ord.reverse()
            }
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    count: u64,
    seconds: u64,
}

impl Bucket {
    fn add(&mut self, seconds: u64) {
        self.count += 1;
        self.seconds += seconds;
    }

    /// `MM:SS`, or empty when nothing was completed.
    fn average(&self) -> String {
        if self.count == 0 {
            return String::new();
        }
        format_minutes(self.seconds / self.count)
    }
}

fn format_minutes(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(priority: Priority, due: Option<(i32, u32, u32)>) -> Todo {
        Todo {
            id: Uuid::nil(),
            text: "Test".to_string(),
            done: false,
            priority,
            creation_date: Utc::now(),
            due_date: due.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            done_date: None,
        }
    }

    #[test]
    fn todo_serializes_camel_case() {
        let json = serde_json::to_value(todo(Priority::High, Some((2030, 1, 2)))).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["priority"], "HIGH");
        assert_eq!(json["dueDate"], "2030-01-02");
        assert!(json["doneDate"].is_null());
        assert!(json.get("creationDate").is_some());
    }

    #[test]
    fn new_todo_fields_are_optional_until_validated() {
        let input: NewTodo = serde_json::from_str(r#"{"text":"Walk"}"#).unwrap();
        assert_eq!(input.text.as_deref(), Some("Walk"));
        assert!(input.priority.is_none());
        assert!(input.due_date.is_none());
    }

    #[test]
    fn parse_sort_accepts_known_fields() {
        let order = parse_sort("priority:desc,dueDate:asc").unwrap();
        assert_eq!(order, vec![(SortKey::Priority, false), (SortKey::DueDate, true)]);
        assert!(parse_sort("").unwrap().is_empty());
    }

    #[test]
    fn parse_sort_rejects_unknown_fields_and_orders() {
        assert!(matches!(parse_sort("text:asc"), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_sort("priority:up"), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_sort("priority"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn compare_chains_fields_in_order() {
        let order = parse_sort("priority:desc,dueDate:asc").unwrap();
        let a = todo(Priority::High, Some((2030, 5, 1)));
        let b = todo(Priority::High, None);
        let c = todo(Priority::Low, None);
        assert_eq!(compare(&order, &a, &c), Ordering::Less);
        // Equal priority: absent due date first.
        assert_eq!(compare(&order, &b, &a), Ordering::Less);
    }

    #[test]
    fn average_formats_minutes_and_seconds() {
        let mut bucket = Bucket::default();
        assert_eq!(bucket.average(), "");
        bucket.add(30);
        bucket.add(150);
        assert_eq!(bucket.average(), "01:30");
        assert_eq!(format_minutes(3_725), "62:05");
    }
}
