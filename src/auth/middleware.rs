use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::debug;

use crate::auth::token::verify_token;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a valid bearer token on every request under the wrapped scope,
/// except for the public paths.
///
/// On success the verified [`Claims`](crate::auth::Claims) are stored in the request
/// extensions for [`AuthenticatedUser`](crate::auth::AuthenticatedUser) to pick up.
/// Failures are answered directly with a 401 JSON response.
pub struct AuthMiddleware {
    public_paths: Rc<Vec<String>>,
}

impl AuthMiddleware {
    /// Guards everything under `prefix` except health, login and register.
    pub fn new(prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        Self {
            public_paths: Rc::new(
                ["/health", "/auth/login", "/auth/register"]
                    .iter()
                    .map(|path| format!("{}{}", prefix, path))
                    .collect(),
            ),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            public_paths: Rc::clone(&self.public_paths),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    public_paths: Rc<Vec<String>>,
}

impl<S> AuthMiddlewareService<S> {
    fn is_public(&self, path: &str) -> bool {
        let path = path.trim_end_matches('/');
        self.public_paths.iter().any(|public| public == path)
    }
}

fn authenticate(req: &ServiceRequest) -> Result<(), AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::InternalServerError("Application state is not configured".into()))?;

    let token = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))?;

    let claims = verify_token(token, &state.jwt)?;
    req.extensions_mut().insert(claims);
    Ok(())
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !self.is_public(req.path()) {
            if let Err(app_err) = authenticate(&req) {
                debug!("Rejected {} {}: {}", req.method(), req.path(), app_err);
                let response = app_err.error_response().map_into_right_body();
                let (request, _payload) = req.into_parts();
                return Box::pin(async move { Ok(ServiceResponse::new(request, response)) });
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
