pub mod task;
pub mod user;

pub use task::{Task, TaskCategory, TaskInput, TaskPriority, TaskStatus, TaskUpdate};
pub use user::{NewUser, User, UserChanges, UserResponse};
