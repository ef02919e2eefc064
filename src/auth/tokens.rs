use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{config::JwtConfig, state::AppState};

/// Confirmation links stay valid for a week; reset links for 15 minutes.
const CONFIRMATION_TTL_DAYS: i64 = 7;
const RESET_TTL_MINUTES: i64 = 15;

/// Every issued token names its purpose. A token presented to an endpoint
/// expecting a different kind fails verification even when the signature and
/// expiry are fine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Session,
    EmailConfirm,
    PasswordReset,
}

/// JWT payload. `sub` is the username for session tokens and the email
/// address for confirmation and reset tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    pub kind: TokenKind,
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub algorithm: Algorithm,
    pub session_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            algorithm,
            expiration_seconds,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: algorithm.parse().unwrap_or(Algorithm::HS256),
            session_ttl: Duration::from_secs(expiration_seconds.max(0) as u64),
        }
    }
}

impl JwtKeys {
    fn issue(&self, sub: &str, kind: TokenKind, ttl: TimeDuration) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: sub.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: (now + ttl).unix_timestamp() as usize,
            kind,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(%sub, kind = ?kind, "jwt signed");
        Ok(token)
    }

    /// Session token for an authenticated user. `ttl` overrides the
    /// configured expiration when given.
    pub fn issue_session(&self, username: &str, ttl: Option<Duration>) -> anyhow::Result<String> {
        let ttl = ttl.unwrap_or(self.session_ttl);
        self.issue(
            username,
            TokenKind::Session,
            TimeDuration::seconds(ttl.as_secs() as i64),
        )
    }

    pub fn issue_confirmation(&self, email: &str) -> anyhow::Result<String> {
        self.issue(
            email,
            TokenKind::EmailConfirm,
            TimeDuration::days(CONFIRMATION_TTL_DAYS),
        )
    }

    pub fn issue_reset(&self, email: &str) -> anyhow::Result<String> {
        self.issue(
            email,
            TokenKind::PasswordReset,
            TimeDuration::minutes(RESET_TTL_MINUTES),
        )
    }

    /// Validate signature, expiry (no leeway) and structure, then require the
    /// expected kind.
    pub fn verify(&self, token: &str, expected: TokenKind) -> anyhow::Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        if data.claims.kind != expected {
            anyhow::bail!("token kind mismatch");
        }
        debug!(sub = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    #[tokio::test]
    async fn sign_and_verify_session_token() {
        let keys = make_keys();
        let token = keys.issue_session("jane", None).expect("sign session");
        let claims = keys.verify(&token, TokenKind::Session).expect("verify");
        assert_eq!(claims.sub, "jane");
        assert_eq!(claims.kind, TokenKind::Session);
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn confirmation_and_reset_carry_email_subject() {
        let keys = make_keys();
        let token = keys.issue_confirmation("jane@example.com").unwrap();
        let claims = keys.verify(&token, TokenKind::EmailConfirm).unwrap();
        assert_eq!(claims.sub, "jane@example.com");

        let token = keys.issue_reset("jane@example.com").unwrap();
        let claims = keys.verify(&token, TokenKind::PasswordReset).unwrap();
        assert_eq!(claims.sub, "jane@example.com");
    }

    #[tokio::test]
    async fn kind_mismatch_is_rejected() {
        let keys = make_keys();
        let session = keys.issue_session("jane", None).unwrap();
        let err = keys.verify(&session, TokenKind::PasswordReset).unwrap_err();
        assert!(err.to_string().contains("kind mismatch"));

        let reset = keys.issue_reset("jane@example.com").unwrap();
        assert!(keys.verify(&reset, TokenKind::Session).is_err());
        assert!(keys.verify(&reset, TokenKind::EmailConfirm).is_err());
    }

    #[tokio::test]
    async fn expired_token_fails_verification() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: "jane".into(),
            iat: (now - TimeDuration::hours(2)).unix_timestamp() as usize,
            exp: (now - TimeDuration::hours(1)).unix_timestamp() as usize,
            kind: TokenKind::Session,
        };
        let token = encode(&Header::new(keys.algorithm), &claims, &keys.encoding).unwrap();
        assert!(keys.verify(&token, TokenKind::Session).is_err());
    }

    #[tokio::test]
    async fn zero_ttl_token_expires_immediately() {
        let keys = make_keys();
        let token = keys
            .issue_session("jane", Some(Duration::ZERO))
            .expect("sign session");
        // exp == iat; one tick past the issuing second it must be invalid
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(keys.verify(&token, TokenKind::Session).is_err());
    }

    #[tokio::test]
    async fn tampered_signature_is_rejected() {
        let keys = make_keys();
        let token = keys.issue_session("jane", None).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });
        assert!(keys.verify(&tampered, TokenKind::Session).is_err());
    }
}
