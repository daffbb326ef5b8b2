use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::{TokenCodec, TokenKind};
use crate::error::AppError;

/// Request-authentication middleware.
///
/// Validates the `Authorization: Bearer` token as a `session-access` token
/// and inserts the subject id into request extensions for
/// `AuthenticatedUserId` to pick up. The codec is resolved from app data;
/// there is no environment fallback.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Skip authentication for health check and the auth endpoints
        // themselves (registration, login, token-driven flows).
        let path = req.path();
        if path == "/health" || path.starts_with("/api/auth/") {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let codec = match req.app_data::<web::Data<TokenCodec>>() {
            Some(codec) => codec.clone(),
            None => {
                let app_err = AppError::InternalServerError(
                    "TokenCodec not configured in app data".into(),
                );
                return Box::pin(async move { Err(app_err.into()) });
            }
        };

        let auth_header = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match auth_header {
            Some(token) => match codec.verify(token, TokenKind::SessionAccess) {
                Ok(subject) => {
                    req.extensions_mut().insert(subject);
                    let fut = self.service.call(req);
                    Box::pin(fut)
                }
                Err(token_err) => {
                    let app_err: AppError = token_err.into();
                    Box::pin(async move { Err(app_err.into()) })
                }
            },
            None => {
                let app_err = AppError::Unauthorized("Missing token".into());
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}
