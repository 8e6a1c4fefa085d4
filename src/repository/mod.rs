//! Storage interfaces for users and tasks.
//!
//! Handlers only see the [`UserRepository`] and [`TaskRepository`] traits.
//! [`PgRepository`] is the production backend; [`MemoryRepository`] keeps the
//! same invariants in process memory and backs the test suite.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewUser, Task, TaskInput, TaskUpdate, User, UserChanges};

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Message used when an insert or update collides with an existing email.
pub const DUPLICATE_EMAIL: &str = "Email already registered";

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user with server-assigned id and timestamps.
    ///
    /// # Errors
    /// `AppError::BadRequest` if the email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, AppError>;

    /// Replaces the profile fields of user `id` and bumps `updated_at`.
    /// Returns `None` if no such user exists.
    ///
    /// # Errors
    /// `AppError::BadRequest` if the new email belongs to another user.
    async fn update_user(&self, id: i32, changes: UserChanges) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts a task with server-assigned id and timestamps.
    ///
    /// # Errors
    /// `AppError::BadRequest` if `assignee_id` does not reference a user.
    async fn create_task(&self, input: TaskInput) -> Result<Task, AppError>;

    /// All tasks, newest first.
    async fn list_tasks(&self) -> Result<Vec<Task>, AppError>;

    async fn find_task(&self, id: i32) -> Result<Option<Task>, AppError>;

    /// Applies `update` to task `id` and bumps `updated_at`.
    /// Returns `None` if no such task exists.
    async fn update_task(&self, id: i32, update: TaskUpdate) -> Result<Option<Task>, AppError>;

    /// Returns whether a task was deleted.
    async fn delete_task(&self, id: i32) -> Result<bool, AppError>;
}
