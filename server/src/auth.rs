use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use axum_extra::TypedHeader;
use error_stack::Report;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kernel::prelude::entity::{Actor, RequestContext, Role, UserId};
use kernel::KernelError;

use crate::error::ErrorStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub is_staff: bool,
    pub exp: u64,
}

impl From<Claims> for Actor {
    fn from(claims: Claims) -> Self {
        let role = if claims.is_staff {
            Role::Staff
        } else {
            Role::Member
        };
        Actor::new(UserId::new(claims.sub), role)
    }
}

/// Checks HS256 bearer tokens issued by the identity service.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> error_stack::Result<Actor, KernelError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| Actor::from(data.claims))
            .map_err(|error| {
                Report::new(error)
                    .change_context(KernelError::Unauthenticated)
                    .attach_printable("Rejected bearer token")
            })
    }
}

/// The caller of a request. A request without `Authorization` is anonymous, one with a bad
/// token is rejected outright.
#[derive(Debug)]
pub struct Authenticated(pub RequestContext);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    Arc<JwtVerifier>: FromRef<S>,
{
    type Rejection = ErrorStatus;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await {
            Ok(TypedHeader(authorization)) => {
                let verifier = Arc::<JwtVerifier>::from_ref(state);
                let actor = verifier.verify(authorization.token())?;
                Ok(Self(RequestContext::authenticated(actor)))
            }
            Err(rejection) => match rejection.reason() {
                TypedHeaderRejectionReason::Missing => Ok(Self(RequestContext::anonymous())),
                _ => Err(ErrorStatus::from(
                    Report::new(KernelError::Unauthenticated)
                        .attach_printable(format!("Malformed authorization header: {rejection}")),
                )),
            },
        }
    }
}
