use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

const ADMIN_ROLES: [&str; 2] = ["admin", "hr"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AuthFailure {
    Missing,
    Malformed,
    UnsupportedScheme,
    InvalidToken,
    Forbidden,
}

impl AuthFailure {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            AuthFailure::Missing => (StatusCode::UNAUTHORIZED, "missing_authorization"),
            AuthFailure::Malformed => (StatusCode::UNAUTHORIZED, "bad_authorization"),
            AuthFailure::UnsupportedScheme => (StatusCode::UNAUTHORIZED, "unsupported_scheme"),
            AuthFailure::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AuthFailure::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
        };
        (status, Json(json!({ "error": code }))).into_response()
    }
}

/// Decodes an HS256 bearer token and checks that it carries an admin role.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthFailure> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|_| AuthFailure::InvalidToken)?;

    let role = data.claims.role.clone().unwrap_or_default();
    if !ADMIN_ROLES.iter().any(|r| r.eq_ignore_ascii_case(&role)) {
        return Err(AuthFailure::Forbidden);
    }
    Ok(data.claims)
}

fn bearer_token(req: &Request) -> Result<&str, AuthFailure> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthFailure::Missing)?;
    let value = header.to_str().map_err(|_| AuthFailure::Malformed)?;
    value
        .strip_prefix("Bearer ")
        .ok_or(AuthFailure::UnsupportedScheme)
}

pub async fn require_admin(mut req: Request, next: Next) -> Response {
    let config = crate::config::get_config();
    let claims = match bearer_token(&req).and_then(|t| verify_token(t, &config.jwt_secret)) {
        Ok(claims) => claims,
        Err(failure) => {
            tracing::warn!(reason = ?failure, path = %req.uri().path(), "Rejected admin request");
            return failure.into_response();
        }
    };
    req.extensions_mut().insert(claims);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(role: Option<&str>, exp_offset: i64, secret: &str) -> String {
        let exp = (chrono::Utc::now().timestamp() + exp_offset) as usize;
        let claims = Claims {
            sub: "admin-1".into(),
            exp,
            role: role.map(str::to_string),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn accepts_admin_and_hr_roles() {
        let claims = verify_token(&token(Some("ADMIN"), 600, "s3cret"), "s3cret").unwrap();
        assert_eq!(claims.sub, "admin-1");
        assert!(verify_token(&token(Some("hr"), 600, "s3cret"), "s3cret").is_ok());
    }

    #[test]
    fn rejects_other_roles() {
        assert_eq!(
            verify_token(&token(Some("candidate"), 600, "s3cret"), "s3cret").unwrap_err(),
            AuthFailure::Forbidden
        );
        assert_eq!(
            verify_token(&token(None, 600, "s3cret"), "s3cret").unwrap_err(),
            AuthFailure::Forbidden
        );
    }

    #[test]
    fn rejects_bad_signature_and_expired_tokens() {
        assert_eq!(
            verify_token(&token(Some("admin"), 600, "other"), "s3cret").unwrap_err(),
            AuthFailure::InvalidToken
        );
        assert_eq!(
            verify_token(&token(Some("admin"), -3600, "s3cret"), "s3cret").unwrap_err(),
            AuthFailure::InvalidToken
        );
    }
}
