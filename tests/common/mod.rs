#![allow(dead_code)]

use actix_web::{test, web};
use jsonwebtoken::Algorithm;
use serde_json::{json, Value};
use ticketdesk::auth::{issue_token, JwtConfig};
use ticketdesk::repository::MemoryRepository;
use ticketdesk::state::AppState;

pub const SECRET: &str = "integration-test-secret";

pub fn jwt_config() -> JwtConfig {
    JwtConfig::new(SECRET, Algorithm::HS256, chrono::Duration::minutes(30))
}

pub fn state() -> web::Data<AppState> {
    web::Data::new(AppState::new(MemoryRepository::new(), jwt_config()))
}

pub fn bearer(email: &str) -> (&'static str, String) {
    let token = issue_token(email, &jwt_config()).unwrap();
    ("Authorization", format!("Bearer {}", token))
}

/// Registers a user through the API and logs them in, returning an
/// `Authorization` header carrying the issued token.
pub async fn register_and_login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> Result<(&'static str, String), String> {
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "name": "Test User",
            "email": email,
            "password": password,
            "confirm_password": password
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    if !status.is_success() {
        let body = test::read_body(resp).await;
        return Err(format!(
            "Failed to register user. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_form([("username", email), ("password", password)])
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    if !status.is_success() {
        return Err(format!(
            "Failed to log in. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }

    let token: Value = serde_json::from_slice(&body)
        .map_err(|e| format!("Failed to parse login response: {}", e))?;
    let access_token = token["access_token"]
        .as_str()
        .ok_or_else(|| "Login response has no access_token".to_string())?;
    Ok(("Authorization", format!("Bearer {}", access_token)))
}

/// Builds the API the way `main.rs` mounts it, backed by the given state.
#[macro_export]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .wrap(actix_web::middleware::Logger::default())
                .service(
                    actix_web::web::scope(ticketdesk::config::API_PREFIX)
                        .wrap(ticketdesk::auth::AuthMiddleware::new(
                            ticketdesk::config::API_PREFIX,
                        ))
                        .configure(ticketdesk::routes::config),
                ),
        )
        .await
    };
}
