//! Bearer token middleware.
//!
//! Wrap any route that needs an authenticated caller with [`BearerAuthMiddlewareFactory`]. The middleware reads the
//! `Authorization: Bearer <token>` header, validates the token and resolves its subject to a [`User`]. The user is
//! stored in the request extensions, where handlers pick it up with the [`CurrentUser`] extractor.
//!
//! Every failure is rejected with a 401 and the same "Unauthorized" message. A missing or badly prefixed header is
//! rejected before the user store is touched.
//!
//! The middleware expects `web::Data<TokenValidator>` and `web::Data<AuthApi<U>>` to be registered as app data.

use std::{
    future::{ready, Ready},
    marker::PhantomData,
    rc::Rc,
};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    web,
    Error,
    FromRequest,
    HttpMessage,
    HttpRequest,
};
use chrono::Utc;
use doakan_engine::{db_types::User, traits::UserManagement, AuthApi};
use futures::future::LocalBoxFuture;
use log::*;

use crate::{
    auth::TokenValidator,
    errors::{AuthError, ServerError},
};

const BEARER_PREFIX: &str = "Bearer ";

/// The authenticated caller of the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn user(&self) -> &User {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<CurrentUser>().cloned();
        ready(user.ok_or_else(|| {
            warn!("🔐️ A handler asked for the current user, but the request was not authenticated");
            ServerError::AuthenticationError(AuthError::MissingToken)
        }))
    }
}

pub struct BearerAuthMiddlewareFactory<U> {
    _store: PhantomData<fn() -> U>,
}

impl<U> BearerAuthMiddlewareFactory<U> {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self { _store: PhantomData }
    }
}

impl<S, B, U> Transform<S, ServiceRequest> for BearerAuthMiddlewareFactory<U>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    U: UserManagement + 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<EitherBody<B>>;
    type Transform = BearerAuthMiddlewareService<S, U>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerAuthMiddlewareService { service: Rc::new(service), _store: PhantomData }))
    }
}

pub struct BearerAuthMiddlewareService<S, U> {
    service: Rc<S>,
    _store: PhantomData<fn() -> U>,
}

impl<S, B, U> Service<ServiceRequest> for BearerAuthMiddlewareService<S, U>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    U: UserManagement + 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<EitherBody<B>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let result = authenticate::<U>(&req).await;
            match result {
                Ok(user) => {
                    trace!("🔐️ Request to {} authenticated as user #{}", req.path(), user.id);
                    req.extensions_mut().insert(CurrentUser(user));
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                },
                Err(e) => {
                    debug!("🔐️ Rejecting request to {}. {e}", req.path());
                    Ok(req.error_response(e).map_into_right_body())
                },
            }
        })
    }
}

async fn authenticate<U: UserManagement + 'static>(req: &ServiceRequest) -> Result<User, ServerError> {
    let token = bearer_token(req.headers())?.to_string();
    let validator = req
        .app_data::<web::Data<TokenValidator>>()
        .cloned()
        .ok_or_else(|| ServerError::ConfigurationError("No token validator has been registered".into()))?;
    let claims = validator.validate(&token, Utc::now())?;
    let api = req
        .app_data::<web::Data<AuthApi<U>>>()
        .cloned()
        .ok_or_else(|| ServerError::ConfigurationError("No user store has been registered".into()))?;
    let user = api.resolve_user(claims.user_id).await?;
    Ok(user)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = value.to_str().map_err(|_| AuthError::InvalidToken)?;
    let token = value.strip_prefix(BEARER_PREFIX).ok_or(AuthError::MissingToken)?.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}
