use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::JwtConfig, state::AppState};

pub const ISSUER: &str = "devbook";
pub const TOKEN_TTL: Duration = Duration::from_secs(2 * 60 * 60);
const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT payload. Every field is required when decoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,   // user ID
    pub iss: String, // always ISSUER
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("missing token")]
    MissingToken,
    #[error("authorization header must be `Bearer <token>`")]
    MalformedHeader,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("unexpected signing algorithm")]
    UnexpectedAlgorithm,
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidAlgorithm => TokenError::UnexpectedAlgorithm,
            _ => TokenError::Invalid(e.to_string()),
        }
    }
}

/// HMAC signing and verification keys, built once from configuration.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // no grace period past `exp`
        validation.leeway = 0;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(config.secret.as_bytes())
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    fn issue_at(&self, user_id: Uuid, now: OffsetDateTime) -> Result<String, TokenError> {
        let exp = now + TimeDuration::seconds(TOKEN_TTL.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token =
            encode(&Header::new(ALGORITHM), &claims, &self.encoding).map_err(TokenError::Signing)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Validates the raw value of an `Authorization` header.
    pub fn validate(&self, header: Option<&str>) -> Result<Claims, TokenError> {
        let token = bearer_token(header)?;
        self.verify(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

fn bearer_token(header: Option<&str>) -> Result<&str, TokenError> {
    let header = match header {
        None | Some("") => return Err(TokenError::MissingToken),
        Some(h) => h,
    };
    match header.split(' ').collect::<Vec<_>>().as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(token),
        _ => Err(TokenError::MalformedHeader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // base64url of {"alg":"RS256","typ":"JWT"}
    const RS256_HEADER: &str = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9";

    fn keys() -> JwtKeys {
        JwtKeys::new(b"dev-secret")
    }

    fn later() -> usize {
        (OffsetDateTime::now_utc().unix_timestamp() + 3600) as usize
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[test]
    fn issue_and_validate() {
        let keys = keys();
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id).expect("sign");
        let claims = keys.validate(Some(&bearer(&token))).expect("validate");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL.as_secs() as usize);
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = keys();
        let issued = OffsetDateTime::now_utc() - TimeDuration::hours(3);
        let token = keys.issue_at(Uuid::new_v4(), issued).expect("sign");
        let err = keys.validate(Some(&bearer(&token))).unwrap_err();
        assert!(matches!(err, TokenError::Expired), "got {err:?}");
    }

    #[test]
    fn token_expired_seconds_ago_is_rejected() {
        let keys = keys();
        let ttl = TimeDuration::seconds(TOKEN_TTL.as_secs() as i64);
        let issued = OffsetDateTime::now_utc() - ttl - TimeDuration::seconds(5);
        let token = keys.issue_at(Uuid::new_v4(), issued).expect("sign");
        let err = keys.validate(Some(&bearer(&token))).unwrap_err();
        assert!(matches!(err, TokenError::Expired), "got {err:?}");
    }

    #[test]
    fn token_from_other_key_is_rejected() {
        let token = JwtKeys::new(b"other-secret").issue(Uuid::new_v4()).unwrap();
        let err = keys().validate(Some(&bearer(&token))).unwrap_err();
        assert!(matches!(err, TokenError::InvalidSignature), "got {err:?}");
    }

    #[test]
    fn other_hmac_variant_is_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            iss: ISSUER.into(),
            iat: 0,
            exp: later(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .unwrap();
        let err = keys().verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::UnexpectedAlgorithm), "got {err:?}");
    }

    #[test]
    fn asymmetric_header_is_rejected() {
        let keys = keys();
        let token = keys.issue(Uuid::new_v4()).unwrap();
        let (_, rest) = token.split_once('.').unwrap();
        let forged = format!("{RS256_HEADER}.{rest}");
        let err = keys.verify(&forged).unwrap_err();
        assert!(matches!(err, TokenError::UnexpectedAlgorithm), "got {err:?}");
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            iss: "someone-else".into(),
            iat: 0,
            exp: later(),
        };
        let token = encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .unwrap();
        assert!(matches!(keys().verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn non_uuid_subject_is_rejected() {
        let claims = serde_json::json!({
            "sub": "not-a-uuid",
            "iss": ISSUER,
            "iat": 0,
            "exp": later(),
        });
        let token = encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .unwrap();
        assert!(matches!(keys().verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            keys().validate(Some("Bearer abc.def")),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn header_shape() {
        let keys = keys();
        assert!(matches!(keys.validate(None), Err(TokenError::MissingToken)));
        assert!(matches!(keys.validate(Some("")), Err(TokenError::MissingToken)));
        for header in ["Bearer", "Bearer ", "bearer abc", "Token abc", "Bearer a b", "Bearer  abc"] {
            assert!(
                matches!(keys.validate(Some(header)), Err(TokenError::MalformedHeader)),
                "{header:?} should be malformed"
            );
        }
    }
}
