use async_trait::async_trait;
use sqlx::PgPool;

use super::{TaskRepository, UserRepository, DUPLICATE_EMAIL};
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskInput, TaskUpdate, User, UserChanges};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, is_active, is_admin, created_at, updated_at";

const TASK_COLUMNS: &str = "id, title, description, due_datetime, created_at, updated_at, \
     status, priority, category, assignee_id";

/// PostgreSQL-backed repository. Every operation is a single statement.
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Unique violations on `users` can only come from the email column.
fn map_user_error(error: sqlx::Error) -> AppError {
    match error {
        sqlx::Error::Database(ref db_error) if db_error.is_unique_violation() => {
            AppError::BadRequest(DUPLICATE_EMAIL.into())
        }
        other => other.into(),
    }
}

fn map_task_error(error: sqlx::Error) -> AppError {
    match error {
        sqlx::Error::Database(ref db_error) if db_error.is_foreign_key_violation() => {
            AppError::BadRequest("Assignee does not exist".into())
        }
        other => other.into(),
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash, is_active, is_admin, created_at, updated_at) \
             VALUES ($1, $2, $3, TRUE, FALSE, NOW(), NOW()) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_error)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_user(&self, id: i32, changes: UserChanges) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users \
             SET name = $2, email = $3, password_hash = $4, is_active = $5, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.password_hash)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_error)
    }
}

#[async_trait]
impl TaskRepository for PgRepository {
    async fn create_task(&self, input: TaskInput) -> Result<Task, AppError> {
        sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (title, description, due_datetime, status, priority, category, assignee_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW()) \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(input.title)
        .bind(input.description)
        .bind(input.due_datetime)
        .bind(input.status)
        .bind(input.priority)
        .bind(input.category)
        .bind(input.assignee_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_task_error)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn find_task(&self, id: i32) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn update_task(&self, id: i32, update: TaskUpdate) -> Result<Option<Task>, AppError> {
        // Nullable columns take a presence flag so that an explicit null can clear them.
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                due_datetime = CASE WHEN $4 THEN $5 ELSE due_datetime END, \
                status = COALESCE($6, status), \
                priority = COALESCE($7, priority), \
                category = COALESCE($8, category), \
                assignee_id = CASE WHEN $9 THEN $10 ELSE assignee_id END, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.due_datetime.is_some())
        .bind(update.due_datetime.flatten())
        .bind(update.status)
        .bind(update.priority)
        .bind(update.category)
        .bind(update.assignee_id.is_some())
        .bind(update.assignee_id.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_task_error)
    }

    async fn delete_task(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
