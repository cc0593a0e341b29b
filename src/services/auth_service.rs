//! AuthService — the identity gateway: account provisioning, credential
//! verification, and JWT issuance. Passwords are stored as Argon2id hashes
//! in the `accounts` table; tokens are HS256 JWTs carrying the account id
//! as subject.

use crate::{errors::AppError, models::account::Account};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("a user with e-mail `{0}` already exists")]
    EmailTaken(String),
    #[error("User or password invalid")]
    InvalidCredentials,
    #[error("account `{0}` not found")]
    AccountNotFound(i64),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Signing parameters for issued tokens, sourced from AppConfig.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub token_ttl_secs: i64,
}

/// Claims embedded in every issued token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account id as a string.
    pub sub: String,
    pub email: String,
    /// Unique token id.
    pub jti: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    /// Capability names granted to the bearer beyond plain authentication.
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Capability required to reassign another student's spot. Checked by
/// [`Claims::can_change_student_spot`]; currently attached to no route.
#[allow(dead_code)]
pub const CHANGE_STUDENT_SPOT_SCOPE: &str = "ChangeStudentSpot";

impl Claims {
    #[allow(dead_code)]
    pub fn can_change_student_spot(&self) -> bool {
        self.scopes.iter().any(|s| s == CHANGE_STUDENT_SPOT_SCOPE)
    }
}

/// Response body for `/user/register` and `/user/login`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenEnvelope {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
    pub user_token: UserToken,
}

#[derive(Debug, Serialize)]
pub struct UserToken {
    pub id: String,
    pub email: String,
    pub claims: Vec<UserClaim>,
}

#[derive(Debug, Serialize)]
pub struct UserClaim {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// AuthService provides the two identity operations the API needs:
/// - `create_account` — provision credentials for a freshly registered
///   student.
/// - `authenticate` — verify an email/password pair.
///
/// plus token issue/verify. It holds no state beyond the pool and the
/// signing keys.
#[derive(Clone)]
pub struct AuthService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,

    issuer: String,
    audience: String,
    token_ttl_secs: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(db: Arc<SqlitePool>, settings: JwtSettings) -> Self {
        Self {
            db,
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            issuer: settings.issuer,
            audience: settings.audience,
            token_ttl_secs: settings.token_ttl_secs,
        }
    }

    /// Provision credentials for a student. The account id is the student
    /// id. Returns EmailTaken when the email is already registered.
    pub async fn create_account(
        &self,
        student_id: i64,
        email: &str,
        password: &str,
    ) -> AuthResult<Account> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?
            .to_string();

        let insert = sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (id, email, password_hash, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING id, email, password_hash, created_at",
        )
        .bind(student_id)
        .bind(email)
        .bind(&password_hash)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await;

        match insert {
            Ok(account) => Ok(account),
            Err(err) if is_unique_violation(&err) => Err(AuthError::EmailTaken(email.to_string())),
            Err(err) => Err(AuthError::Sqlx(err)),
        }
    }

    /// Verify an email/password pair against the stored hash. Unknown
    /// emails and wrong passwords are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> AuthResult<Account> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, email, password_hash, created_at FROM accounts WHERE email = ?",
        )
        .bind(email)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => AuthError::InvalidCredentials,
            other => AuthError::Sqlx(other),
        })?;

        let parsed = PasswordHash::new(&account.password_hash)
            .map_err(|e| AuthError::Hash(e.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::InvalidCredentials)?;

        Ok(account)
    }

    /// Fetch an account by id. Returns AccountNotFound if missing.
    pub async fn find_account(&self, id: i64) -> AuthResult<Account> {
        sqlx::query_as::<_, Account>(
            "SELECT id, email, password_hash, created_at FROM accounts WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => AuthError::AccountNotFound(id),
            other => AuthError::Sqlx(other),
        })
    }

    /// Build a signed token envelope for an authenticated account.
    pub fn issue_token(&self, account: &Account) -> AuthResult<TokenEnvelope> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.token_ttl_secs);

        let claims = Claims {
            sub: account.id.to_string(),
            email: account.email.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            scopes: Vec::new(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(TokenEnvelope {
            access_token,
            expires_in: self.token_ttl_secs,
            user_token: UserToken {
                id: claims.sub.clone(),
                email: claims.email.clone(),
                claims: vec![
                    UserClaim {
                        kind: "sub".into(),
                        value: claims.sub,
                    },
                    UserClaim {
                        kind: "email".into(),
                        value: claims.email,
                    },
                    UserClaim {
                        kind: "jti".into(),
                        value: claims.jti,
                    },
                ],
            },
        })
    }

    /// Decode and validate a bearer token, checking signature, expiry,
    /// issuer, and audience.
    pub fn verify_token(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}

/// The authenticated caller, extracted from the Authorization header on
/// protected routes. Rejects with 401 before the handler body runs.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account_id: i64,
    pub email: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AuthService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthService::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::unauthorized("missing bearer token"))?;

        let claims = auth
            .verify_token(token)
            .map_err(|_| AppError::unauthorized("invalid bearer token"))?;
        let account_id = claims
            .sub
            .parse()
            .map_err(|_| AppError::unauthorized("invalid bearer token"))?;

        Ok(AuthUser {
            account_id,
            email: claims.email,
        })
    }
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_pool;

    fn settings() -> JwtSettings {
        JwtSettings {
            secret: "test-secret".into(),
            issuer: "parking-api".into(),
            audience: "parking-api-clients".into(),
            token_ttl_secs: 7200,
        }
    }

    async fn service() -> AuthService {
        AuthService::new(test_pool().await, settings())
    }

    #[tokio::test]
    async fn create_and_authenticate_roundtrip() {
        let svc = service().await;
        let account = svc.create_account(1, "b@x.com", "p4ssword").await.unwrap();
        assert_eq!(account.id, 1);
        assert_ne!(account.password_hash, "p4ssword");

        let authed = svc.authenticate("b@x.com", "p4ssword").await.unwrap();
        assert_eq!(authed.id, 1);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let svc = service().await;
        svc.create_account(1, "b@x.com", "p4ssword").await.unwrap();

        let err = svc.authenticate("b@x.com", "nope").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = svc.authenticate("who@x.com", "p4ssword").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let svc = service().await;
        svc.create_account(1, "b@x.com", "p4ssword").await.unwrap();

        let err = svc.create_account(2, "b@x.com", "other").await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn issued_tokens_verify_back_to_the_account() {
        let svc = service().await;
        let account = svc.create_account(7, "b@x.com", "p4ssword").await.unwrap();

        let envelope = svc.issue_token(&account).unwrap();
        assert_eq!(envelope.expires_in, 7200);
        assert_eq!(envelope.user_token.id, "7");

        let claims = svc.verify_token(&envelope.access_token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.email, "b@x.com");
        assert!(!claims.can_change_student_spot());
    }

    #[tokio::test]
    async fn foreign_and_tampered_tokens_are_rejected() {
        let svc = service().await;
        let account = svc.create_account(7, "b@x.com", "p4ssword").await.unwrap();
        let envelope = svc.issue_token(&account).unwrap();

        let mut tampered = envelope.access_token.clone();
        tampered.pop();
        assert!(svc.verify_token(&tampered).is_err());

        let other = AuthService::new(
            svc.db.clone(),
            JwtSettings {
                secret: "different-secret".into(),
                ..settings()
            },
        );
        assert!(other.verify_token(&envelope.access_token).is_err());
    }

    #[tokio::test]
    async fn find_account_reports_missing_ids() {
        let svc = service().await;
        let err = svc.find_account(99).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountNotFound(99)));
    }
}
