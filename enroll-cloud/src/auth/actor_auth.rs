//! Bearer JWT → [`Actor`]
//!
//! Tokens are issued by the platform's session service; this crate only
//! verifies them.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::Role;

use super::policy::{RolePolicy, ScopeRule, policy_for};
use crate::db::HistoryScope;
use crate::state::AppState;

/// JWT claims for an authenticated actor
#[derive(Debug, Serialize, Deserialize)]
pub struct ActorClaims {
    /// User ID
    pub sub: String,
    pub role: Role,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// The user performing a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn policy(&self) -> &'static RolePolicy {
        policy_for(self.role)
    }

    pub fn history_scope(&self) -> HistoryScope {
        let id = self.id.clone();
        match self.policy().history_scope {
            ScopeRule::All => HistoryScope::All,
            ScopeRule::AssignedOrEnrolled => HistoryScope::AssignedOrEnrolled(id),
            ScopeRule::AgentNetwork => HistoryScope::AgentNetwork(id),
            ScopeRule::EnrolledBy => HistoryScope::EnrolledBy(id),
            ScopeRule::Own => HistoryScope::Own(id),
        }
    }
}

#[cfg(test)]
const JWT_EXPIRY_HOURS: i64 = 24;

/// Issue a token the way the session service does
#[cfg(test)]
pub(crate) fn create_token(
    user_id: &str,
    role: Role,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = ActorClaims {
        sub: user_id.to_string(),
        role,
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and validate a bearer token
pub fn verify_token(token: &str, secret: &str) -> Result<Actor, AppError> {
    let token_data = jsonwebtoken::decode::<ActorClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::new(ErrorCode::TokenExpired)
            }
            _ => AppError::invalid_token("Invalid or expired token"),
        }
    })?;

    Ok(Actor::new(token_data.claims.sub, token_data.claims.role))
}

/// Middleware that verifies the bearer JWT and stores the [`Actor`] in
/// request extensions
pub async fn actor_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::invalid_token("Invalid Authorization format").into_response())?;

    let actor = verify_token(token, &state.jwt_secret).map_err(IntoResponse::into_response)?;

    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header};

    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_roundtrip() {
        let token = create_token("e1", Role::Employee, SECRET).unwrap();
        let actor = verify_token(&token, SECRET).unwrap();
        assert_eq!(actor, Actor::new("e1", Role::Employee));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token("e1", Role::Employee, SECRET).unwrap();
        let err = verify_token(&token, "other").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = ActorClaims {
            sub: "u1".into(),
            role: Role::User,
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        let err = verify_token(&token, SECRET).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenExpired);
    }

    #[test]
    fn test_history_scope_follows_policy() {
        assert_eq!(Actor::new("a1", Role::Admin).history_scope(), HistoryScope::All);
        assert_eq!(
            Actor::new("g1", Role::Agent).history_scope(),
            HistoryScope::AgentNetwork("g1".into())
        );
        assert_eq!(
            Actor::new("s1", Role::Associate).history_scope(),
            HistoryScope::EnrolledBy("s1".into())
        );
    }
}
