//! In-memory repository.
//!
//! Enforces the same invariants as the PostgreSQL schema: monotonic ids,
//! unique emails, and assignees that must reference an existing user.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{TaskRepository, UserRepository, DUPLICATE_EMAIL};
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskInput, TaskUpdate, User, UserChanges};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    tasks: BTreeMap<i32, Task>,
    last_user_id: i32,
    last_task_id: i32,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Wall-clock time, nudged forward so consecutive writes never share a timestamp.
    fn tick(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + chrono::Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }

    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != except)
    }

    fn check_assignee(&self, assignee_id: Option<i32>) -> Result<(), AppError> {
        match assignee_id {
            Some(id) if !self.users.contains_key(&id) => {
                Err(AppError::BadRequest("Assignee does not exist".into()))
            }
            _ => Ok(()),
        }
    }
}

/// Process-local repository backed by ordered maps.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::InternalServerError("Repository lock poisoned".into()))
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.lock()?;
        if tables.email_taken(&user.email, None) {
            return Err(AppError::BadRequest(DUPLICATE_EMAIL.into()));
        }

        tables.last_user_id += 1;
        let now = tables.tick();
        let user = User {
            id: tables.last_user_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            is_active: true,
            is_admin: false,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.lock()?;
        Ok(tables.users.values().find(|user| user.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn update_user(&self, id: i32, changes: UserChanges) -> Result<Option<User>, AppError> {
        let mut tables = self.lock()?;
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }
        if tables.email_taken(&changes.email, Some(id)) {
            return Err(AppError::BadRequest(DUPLICATE_EMAIL.into()));
        }

        let now = tables.tick();
        let updated = tables.users.get_mut(&id).map(|user| {
            user.name = changes.name;
            user.email = changes.email;
            user.password_hash = changes.password_hash;
            user.is_active = changes.is_active;
            user.updated_at = now;
            user.clone()
        });
        Ok(updated)
    }
}

#[async_trait]
impl TaskRepository for MemoryRepository {
    async fn create_task(&self, input: TaskInput) -> Result<Task, AppError> {
        let mut tables = self.lock()?;
        tables.check_assignee(input.assignee_id)?;

        tables.last_task_id += 1;
        let now = tables.tick();
        let task = Task::new(tables.last_task_id, input, now);
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        let tables = self.lock()?;
        let mut tasks: Vec<Task> = tables.tasks.values().cloned().collect();
        tasks.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(tasks)
    }

    async fn find_task(&self, id: i32) -> Result<Option<Task>, AppError> {
        Ok(self.lock()?.tasks.get(&id).cloned())
    }

    async fn update_task(&self, id: i32, update: TaskUpdate) -> Result<Option<Task>, AppError> {
        let mut tables = self.lock()?;
        if !tables.tasks.contains_key(&id) {
            return Ok(None);
        }
        if let Some(assignee_id) = update.assignee_id {
            tables.check_assignee(assignee_id)?;
        }

        let now = tables.tick();
        let updated = tables.tasks.get_mut(&id).map(|task| {
            update.apply_to(task);
            task.updated_at = now;
            task.clone()
        });
        Ok(updated)
    }

    async fn delete_task(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.lock()?.tasks.remove(&id).is_some())
    }
}
