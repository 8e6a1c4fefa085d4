use std::sync::Arc;

use crate::auth::JwtConfig;
use crate::repository::{TaskRepository, UserRepository};

/// Shared application state, registered once as `web::Data<AppState>`.
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub jwt: JwtConfig,
}

impl AppState {
    /// Uses one backend for both users and tasks.
    pub fn new<R>(repository: R, jwt: JwtConfig) -> Self
    where
        R: UserRepository + TaskRepository + 'static,
    {
        let repository = Arc::new(repository);
        Self {
            users: repository.clone(),
            tasks: repository,
            jwt,
        }
    }
}
