use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use uuid::Uuid;

use super::{jwt::verify_jwt_token, models::Role};
use crate::{error::ApiError, lang::RequestLang, state::AuthConfig};

/// Authenticated caller, resolved from an `Authorization: Bearer` token.
///
/// Take `Option<AuthUser>` on routes that also serve anonymous callers; a
/// request without the header then yields `None`, while a bad token is still
/// rejected.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl AuthUser {
    /// 403 unless the caller has one of `allowed`.
    pub fn require_role(&self, allowed: &[Role], lang: RequestLang) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            return Ok(());
        }
        tracing::debug!(user_id = %self.user_id, role = ?self.role, "role not allowed");
        Err(ApiError::Forbidden(lang.messages().not_enough_rights.to_string()))
    }

    /// 403 unless the caller wrote the entity or is ROOT.
    pub fn require_owner(&self, author_id: Uuid, lang: RequestLang) -> Result<(), ApiError> {
        if self.role == Role::Root || self.user_id == author_id {
            return Ok(());
        }
        Err(ApiError::Forbidden(lang.messages().not_enough_rights.to_string()))
    }

    pub fn is_root(&self) -> bool {
        self.role == Role::Root
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_config = AuthConfig::from_ref(state);
        let lang = RequestLang::from_parts(parts);
        let unauthorized = || ApiError::Auth(lang.messages().not_authorized.to_string());

        let TypedHeader(Authorization(bearer)) =
            <TypedHeader<Authorization<Bearer>> as FromRequestParts<S>>::from_request_parts(parts, state)
                .await
                .map_err(|_| unauthorized())?;

        let claims = verify_jwt_token(bearer.token(), &auth_config.jwt_secret).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            unauthorized()
        })?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| unauthorized())?;

        Ok(Self {
            user_id,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        })
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(None);
        }
        <Self as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}
