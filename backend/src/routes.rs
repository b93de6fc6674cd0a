use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch},
    Router,
};
use serde_json::{json, Value};
use taskfin_shared::{CreatedRecord, Finance, NewFinance, NewTask, RecordId, Task, TaskPatch};

use crate::collection::{RedisPool, FINANCES, TASKS};
use crate::error::ApiError;

pub fn router(pool: RedisPool) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/:id", patch(update_task).delete(delete_task))
        .route("/api/finances", get(list_finances).post(create_finance))
        .route("/api/finances/:id", delete(delete_finance))
        .with_state(pool)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_tasks(State(pool): State<RedisPool>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = TASKS.list(&pool).await?;
    tracing::debug!(count = tasks.len(), "listed tasks");
    Ok(Json(tasks))
}

async fn create_task(
    State(pool): State<RedisPool>,
    Json(task): Json<NewTask>,
) -> Result<(StatusCode, Json<CreatedRecord>), ApiError> {
    task.validate()?;
    let id = TASKS.insert(&pool, &task).await?;
    tracing::info!(%id, "task created");
    Ok((StatusCode::CREATED, Json(CreatedRecord { id })))
}

async fn update_task(
    Path(id): Path<RecordId>,
    State(pool): State<RedisPool>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    let task: Task = TASKS.update(&pool, &id, &patch).await?;
    tracing::info!(%id, completed = task.completed, "task updated");
    Ok(Json(task))
}

async fn delete_task(
    Path(id): Path<RecordId>,
    State(pool): State<RedisPool>,
) -> Result<StatusCode, ApiError> {
    TASKS.remove(&pool, &id).await?;
    tracing::info!(%id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_finances(State(pool): State<RedisPool>) -> Result<Json<Vec<Finance>>, ApiError> {
    let finances = FINANCES.list(&pool).await?;
    tracing::debug!(count = finances.len(), "listed finances");
    Ok(Json(finances))
}

async fn create_finance(
    State(pool): State<RedisPool>,
    Json(finance): Json<NewFinance>,
) -> Result<(StatusCode, Json<CreatedRecord>), ApiError> {
    let id = FINANCES.insert(&pool, &finance).await?;
    tracing::info!(%id, "finance record created");
    Ok((StatusCode::CREATED, Json(CreatedRecord { id })))
}

async fn delete_finance(
    Path(id): Path<RecordId>,
    State(pool): State<RedisPool>,
) -> Result<StatusCode, ApiError> {
    FINANCES.remove(&pool, &id).await?;
    tracing::info!(%id, "finance record deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use redis::Client;
    use std::sync::Arc;
    use tower::ServiceExt;

    // Opening a client does not connect, so routes that fail before touching
    // storage can be exercised without a Redis server.
    fn app() -> Router {
        let client = Client::open("redis://127.0.0.1:6379").unwrap();
        router(Arc::new(client))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_answers_without_storage() {
        let response = app()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let response = app()
            .oneshot(post_json(
                "/api/tasks",
                json!({"title": "  ", "dueDate": "2025-02-24", "priority": "low"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "*Missing Information: title");
    }

    #[tokio::test]
    async fn zero_amount_is_rejected() {
        let response = app()
            .oneshot(post_json(
                "/api/finances",
                json!({
                    "amount": "0",
                    "method": "cash",
                    "date": "2025-02-24T10:00:00Z",
                    "financeType": "expense"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn finances_have_no_update_route() {
        let request = Request::builder()
            .method("PATCH")
            .uri("/api/finances/abc")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
