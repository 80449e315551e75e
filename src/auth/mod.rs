use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

mod ownership;

pub use ownership::{require_owner, OwnershipError};

/// Identity of an authenticated caller.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
    pub email: Option<String>,
}

/// Request extension set by [`identity_middleware`] on every request it
/// passes through: `None` for anonymous callers.
#[derive(Debug, Clone)]
pub struct Identity(pub Option<Caller>);

impl Identity {
    pub fn user_id(&self) -> Option<&str> {
        self.0.as_ref().map(|caller| caller.user_id.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    exp: i64,
}

/// HS256 bearer-token verification. Token issuance lives elsewhere; this
/// service only needs to recover the caller id each request carries.
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_secs: i64,
}

impl AuthService {
    pub fn new(secret: &str, token_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl_secs,
        }
    }

    /// Issue a signed access token identifying a user.
    pub fn issue_token(&self, user_id: &str, email: Option<&str>) -> anyhow::Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.map(str::to_string),
            exp: chrono::Utc::now().timestamp() + self.token_ttl_secs,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Verify a bearer token and return the caller it identifies.
    pub fn verify_token(&self, token: &str) -> anyhow::Result<Caller> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;

        Ok(Caller {
            user_id: data.claims.sub,
            email: data.claims.email,
        })
    }
}

/// Attach the caller identity to the request. Requests without a bearer
/// token pass through anonymously (downstream guards decide whether that is
/// acceptable); a token that fails verification is rejected outright.
pub async fn identity_middleware(
    auth_service: Arc<AuthService>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let identity = match token {
        None => Identity(None),
        Some(token) => match auth_service.verify_token(token) {
            Ok(caller) => Identity(Some(caller)),
            Err(_) => {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({ "error": "Invalid or expired token" })),
                )
                    .into_response()
            }
        },
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrip_recovers_the_caller() {
        let auth = AuthService::new("test-secret", 900);

        let token = auth
            .issue_token("u1", Some("u1@example.com"))
            .expect("token issuance");
        let caller = auth.verify_token(&token).expect("verification");

        assert_eq!(caller.user_id, "u1");
        assert_eq!(caller.email, Some("u1@example.com".to_string()));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let auth = AuthService::new("test-secret", 900);
        let other = AuthService::new("other-secret", 900);

        let token = other.issue_token("u1", None).expect("token issuance");

        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = AuthService::new("test-secret", -3600);

        let token = auth.issue_token("u1", None).expect("token issuance");

        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let auth = AuthService::new("test-secret", 900);

        assert!(auth.verify_token("not-a-jwt").is_err());
    }
}
