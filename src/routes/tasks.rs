use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{TaskInput, TaskUpdate},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::info;
use validator::Validate;

fn task_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Task {} not found", id))
}

/// Lists every task, newest first.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects ordered by `created_at` descending.
/// - `401 Unauthorized`: missing or invalid bearer token.
#[get("")]
pub async fn get_tasks(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list_tasks().await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task.
///
/// ## Request Body:
/// A JSON object matching `TaskInput`: `title`, `description`, `status`, `priority`
/// and `category` are required; `due_datetime` and `assigneeId` are optional.
///
/// ## Responses:
/// - `201 Created`: the stored task.
/// - `400 Bad Request`: malformed body or an unknown `assigneeId`.
/// - `422 Unprocessable Entity`: a field failed validation.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = state.tasks.create_task(task_data.into_inner()).await?;
    info!("Task {} created by {}", task.id, auth.email());
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: the task.
/// - `404 Not Found`: no task with that ID.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let id = task_id.into_inner();
    let task = state
        .tasks
        .find_task(id)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates an existing task.
///
/// Fields present in the body replace the stored values, omitted fields are kept,
/// and `updated_at` always advances. `null` clears `due_datetime` or `assigneeId`.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `404 Not Found`: no task with that ID.
/// - `422 Unprocessable Entity`: a field failed validation.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let id = task_id.into_inner();

    let task = state
        .tasks
        .update_task(id, task_data.into_inner())
        .await?
        .ok_or_else(|| task_not_found(id))?;
    info!("Task {} updated by {}", task.id, auth.email());
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task by its ID.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `404 Not Found`: no task with that ID.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let id = task_id.into_inner();
    if !state.tasks.delete_task(id).await? {
        return Err(task_not_found(id));
    }

    info!("Task {} deleted by {}", id, auth.email());
    Ok(HttpResponse::NoContent().finish())
}
