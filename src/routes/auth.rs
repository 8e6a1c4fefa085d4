use crate::{
    auth::{
        ensure_passwords_match, hash_password, issue_token, verify_password, AuthenticatedUser,
        LoginForm, RegisterRequest, TokenResponse, UpdateProfileRequest,
    },
    error::AppError,
    models::{NewUser, User, UserChanges, UserResponse},
    repository::DUPLICATE_EMAIL,
    state::AppState,
};
use actix_web::{get, post, put, web, HttpResponse, Responder};
use log::{info, warn};
use validator::Validate;

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".into())
}

/// Resolves the token subject to a stored user. A token for a user that no
/// longer exists is treated like a bad token.
async fn current_user(state: &AppState, auth: &AuthenticatedUser) -> Result<User, AppError> {
    state
        .users
        .find_user_by_email(auth.email())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".into()))
}

/// Login user
///
/// Takes form-encoded `username` (the email) and `password`, and returns a bearer
/// token. Unknown emails and wrong passwords get the same 401.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<impl Responder, AppError> {
    let user = match state.users.find_user_by_email(&form.username).await? {
        Some(user) => user,
        None => {
            warn!("Login attempt for unknown email");
            return Err(invalid_credentials());
        }
    };

    if !verify_password(&form.password, &user.password_hash)? {
        warn!("Failed login for user {}", user.id);
        return Err(invalid_credentials());
    }

    let token = issue_token(&user.email, &state.jwt)?;
    info!("User {} logged in", user.id);
    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token)))
}

/// Register a new user
///
/// ## Responses:
/// - `201 Created`: the new user.
/// - `400 Bad Request`: passwords differ or the email is already registered.
/// - `422 Unprocessable Entity`: a field failed validation.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let register_data = register_data.into_inner();
    ensure_passwords_match(&register_data.password, &register_data.confirm_password)?;
    register_data.validate()?;

    if state
        .users
        .find_user_by_email(&register_data.email)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(DUPLICATE_EMAIL.into()));
    }

    let password_hash = hash_password(&register_data.password)?;
    let user = state
        .users
        .create_user(NewUser {
            name: register_data.name,
            email: register_data.email,
            password_hash,
        })
        .await?;

    info!("Registered user {}", user.id);
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Returns the authenticated user's profile.
#[get("/me")]
pub async fn me(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = current_user(&state, &auth).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Replaces the authenticated user's profile.
///
/// Same password and validation rules as registration. Changing the email
/// invalidates outstanding tokens, since tokens are bound to the email.
#[put("/me")]
pub async fn update_me(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    profile: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, AppError> {
    let profile = profile.into_inner();
    ensure_passwords_match(&profile.password, &profile.confirm_password)?;
    profile.validate()?;

    let user = current_user(&state, &auth).await?;
    let changes = UserChanges {
        name: profile.name,
        email: profile.email,
        password_hash: hash_password(&profile.password)?,
        is_active: profile.is_active,
    };

    let updated = state
        .users
        .update_user(user.id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    info!("Updated profile of user {}", updated.id);
    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}
