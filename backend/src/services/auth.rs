//! Authentication service for account management and JWT handling
//!
//! Provides:
//! - Account creation with bcrypt password hashing
//! - Sign-in and JWT issuance
//! - Token verification for incoming requests
//! - Bootstrap of the first staff/admin account

use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::{CreateUser, Database, UpdateUserFlags, UserRecord};
use crate::error::{LibraryError, Result};

// ============================================================================
// JWT Claims
// ============================================================================

/// Claims carried by issued tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User ID (subject)
    pub sub: String,
    /// Login identifier
    pub email: String,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp of the sign-in
    #[serde(rename = "origIat")]
    pub orig_iat: i64,
}

/// Public part of the claims, echoed back to the client after sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub email: String,
    pub exp: i64,
    #[serde(rename = "origIat")]
    pub orig_iat: i64,
}

impl From<&TokenClaims> for TokenPayload {
    fn from(claims: &TokenClaims) -> Self {
        Self {
            email: claims.email.clone(),
            exp: claims.exp,
            orig_iat: claims.orig_iat,
        }
    }
}

// ============================================================================
// Auth Types
// ============================================================================

/// Account creation input
#[derive(Debug, Clone, Validate)]
pub struct NewAccount {
    #[validate(length(min = 1, max = 20, message = "Ensure this field has between 1 and 20 characters."))]
    pub first_name: String,
    #[validate(length(max = 20, message = "Ensure this field has no more than 20 characters."))]
    pub last_name: Option<String>,
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 40, message = "Ensure this field has no more than 40 characters.")
    )]
    pub email: String,
    #[validate(length(min = 1, max = 150, message = "Ensure this field has between 1 and 150 characters."))]
    pub username: String,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: String,
}

/// Result of a successful sign-in
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub payload: TokenPayload,
    /// Token lifetime in seconds
    pub refresh_expires_in: i64,
    pub user: UserRecord,
}

// ============================================================================
// Configuration
// ============================================================================

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// Token lifetime in seconds (default: 5 minutes)
    pub token_lifetime: i64,
    /// Bcrypt cost factor
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            token_lifetime: 5 * 60,
            bcrypt_cost: DEFAULT_COST,
        }
    }
}

// ============================================================================
// Auth Service
// ============================================================================

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    config: AuthConfig,
}

impl AuthService {
    /// Create a new auth service
    pub fn new(db: Database, config: AuthConfig) -> Self {
        Self { db, config }
    }

    // ========================================================================
    // Account Creation
    // ========================================================================

    /// Create a regular (non-staff) account.
    ///
    /// The password is stored as a bcrypt hash only.
    pub async fn create_account(&self, input: NewAccount) -> Result<UserRecord> {
        input.validate()?;

        let users = self.db.users();

        if users.get_by_email(&input.email).await?.is_some() {
            return Err(LibraryError::conflict(
                "email",
                format!("{} email exists", input.email),
            ));
        }

        if users.get_by_username(&input.username).await?.is_some() {
            return Err(LibraryError::conflict(
                "username",
                format!("{} username exists", input.username),
            ));
        }

        let password_hash = self.hash_password(&input.password)?;

        users
            .create(CreateUser {
                email: input.email,
                username: input.username,
                first_name: input.first_name,
                last_name: input.last_name,
                password_hash,
                is_admin: false,
                is_staff: false,
            })
            .await
    }

    /// Make sure a staff+admin account exists for `email`.
    ///
    /// Creates it when missing; otherwise promotes and re-activates the
    /// existing account without touching its password.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<UserRecord> {
        let users = self.db.users();

        if let Some(existing) = users.get_by_email(email).await? {
            if existing.is_staff && existing.is_admin && existing.is_active {
                return Ok(existing);
            }
            tracing::info!(user_id = %existing.id, "Promoting existing account to admin");
            return users
                .update_flags(
                    &existing.id,
                    UpdateUserFlags {
                        is_admin: Some(true),
                        is_staff: Some(true),
                        is_active: Some(true),
                    },
                )
                .await?
                .ok_or_else(|| LibraryError::not_found("User", existing.id));
        }

        tracing::info!("Creating bootstrap admin account: {}", email);
        let password_hash = self.hash_password(password)?;
        users
            .create(CreateUser {
                email: email.to_string(),
                username: email.to_string(),
                first_name: "Admin".to_string(),
                last_name: None,
                password_hash,
                is_admin: true,
                is_staff: true,
            })
            .await
    }

    // ========================================================================
    // Sign-in
    // ========================================================================

    /// Check credentials and issue a token.
    ///
    /// Unknown email is `UnknownUser`, a wrong password is `InvalidCredentials`;
    /// neither issues a token.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedToken> {
        let users = self.db.users();

        let user = users
            .get_by_email(email)
            .await?
            .ok_or(LibraryError::UnknownUser)?;

        if !self.verify_password(password, &user.password_hash)? {
            return Err(LibraryError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(LibraryError::AccountDisabled);
        }

        let (token, claims) = self.generate_token(&user)?;

        users.update_last_login(&user.id).await?;
        let user = users.get_by_id(&user.id).await?.unwrap_or(user);

        Ok(IssuedToken {
            token,
            payload: TokenPayload::from(&claims),
            refresh_expires_in: self.config.token_lifetime,
            user,
        })
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Decode and validate a token
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        // Clients refresh on expiry; no grace period
        validation.leeway = 0;

        let token_data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )?;

        Ok(token_data.claims)
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    /// Hash a password with bcrypt
    fn hash_password(&self, password: &str) -> Result<String> {
        hash(password, self.config.bcrypt_cost)
            .map_err(|e| LibraryError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Verify a password against a hash
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        verify(password, hash)
            .map_err(|e| LibraryError::Internal(format!("Failed to verify password: {}", e)))
    }

    /// Generate a signed token for a user
    fn generate_token(&self, user: &UserRecord) -> Result<(String, TokenClaims)> {
        let now = Utc::now();
        let exp = Duration::try_seconds(self.config.token_lifetime)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                LibraryError::Internal(format!(
                    "Token lifetime of {} seconds is out of range",
                    self.config.token_lifetime
                ))
            })?;

        let claims = TokenClaims {
            sub: user.id.clone(),
            email: user.email.clone(),
            exp: exp.timestamp(),
            orig_iat: now.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )?;

        Ok((token, claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    async fn service() -> AuthService {
        let db = Database::connect_in_memory().await.unwrap();
        AuthService::new(
            db,
            AuthConfig {
                bcrypt_cost: 4,
                ..Default::default()
            },
        )
    }

    fn account(email: &str, username: &str) -> NewAccount {
        NewAccount {
            first_name: "Grace".to_string(),
            last_name: Some("Hopper".to_string()),
            email: email.to_string(),
            username: username.to_string(),
            password: "cobol-1959".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_account_hashes_password() {
        let auth = service().await;
        let user = auth
            .create_account(account("grace@example.com", "grace"))
            .await
            .unwrap();

        assert_ne!(user.password_hash, "cobol-1959");
        assert!(verify("cobol-1959", &user.password_hash).unwrap());
        assert!(!user.is_staff_or_admin());
    }

    #[tokio::test]
    async fn test_create_account_rejects_existing_email() {
        let auth = service().await;
        auth.create_account(account("grace@example.com", "grace"))
            .await
            .unwrap();

        let err = auth
            .create_account(account("grace@example.com", "grace2"))
            .await
            .unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.get("email"), Some("grace@example.com email exists"));
    }

    #[tokio::test]
    async fn test_create_account_validates_lengths_and_email() {
        let auth = service().await;
        let mut input = account("not-an-email", "grace");
        input.first_name = "A".repeat(21);

        let err = auth.create_account(input).await.unwrap_err();
        let errors = err.field_errors().unwrap();
        assert!(errors.get("first_name").is_some());
        assert!(errors.get("email").is_some());
    }

    #[tokio::test]
    async fn test_sign_in_with_wrong_password_issues_no_token() {
        let auth = service().await;
        auth.create_account(account("grace@example.com", "grace"))
            .await
            .unwrap();

        let err = auth
            .sign_in("grace@example.com", "wrong")
            .await
            .unwrap_err();
        assert_matches!(err, LibraryError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_sign_in_unknown_user_is_reported() {
        let auth = service().await;
        let err = auth.sign_in("nobody@example.com", "x").await.unwrap_err();
        assert_matches!(err, LibraryError::UnknownUser);
    }

    #[tokio::test]
    async fn test_sign_in_rejects_disabled_accounts() {
        let auth = service().await;
        let user = auth
            .create_account(account("grace@example.com", "grace"))
            .await
            .unwrap();
        auth.db
            .users()
            .update_flags(
                &user.id,
                UpdateUserFlags {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = auth
            .sign_in("grace@example.com", "cobol-1959")
            .await
            .unwrap_err();
        assert_matches!(err, LibraryError::AccountDisabled);
    }

    #[tokio::test]
    async fn test_issued_token_verifies_and_records_login() {
        let auth = service().await;
        let user = auth
            .create_account(account("grace@example.com", "grace"))
            .await
            .unwrap();

        let issued = auth
            .sign_in("grace@example.com", "cobol-1959")
            .await
            .unwrap();
        assert_eq!(issued.refresh_expires_in, 300);
        assert_eq!(issued.payload.email, "grace@example.com");
        assert_eq!(issued.payload.exp - issued.payload.orig_iat, 300);
        assert!(issued.user.last_login_at.is_some());

        let claims = auth.verify_token(&issued.token).unwrap();
        assert_eq!(claims.sub, user.id);
    }

    #[tokio::test]
    async fn test_tokens_signed_with_another_secret_are_rejected() {
        let auth = service().await;
        auth.create_account(account("grace@example.com", "grace"))
            .await
            .unwrap();
        let issued = auth
            .sign_in("grace@example.com", "cobol-1959")
            .await
            .unwrap();

        let other = AuthService::new(
            auth.db.clone(),
            AuthConfig {
                jwt_secret: "another-secret".to_string(),
                ..auth.config.clone()
            },
        );
        assert_matches!(other.verify_token(&issued.token), Err(LibraryError::Token(_)));
    }

    #[tokio::test]
    async fn test_out_of_range_token_lifetime_is_an_error() {
        let auth = service().await;
        auth.create_account(account("grace@example.com", "grace"))
            .await
            .unwrap();

        let unbounded = AuthService::new(
            auth.db.clone(),
            AuthConfig {
                token_lifetime: i64::MAX,
                ..auth.config.clone()
            },
        );
        let err = unbounded
            .sign_in("grace@example.com", "cobol-1959")
            .await
            .unwrap_err();
        assert_matches!(err, LibraryError::Internal(_));
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let auth = service().await;
        let first = auth.ensure_admin("root@example.com", "pw").await.unwrap();
        let second = auth.ensure_admin("root@example.com", "other").await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(second.is_staff && second.is_admin);
        assert!(verify("pw", &second.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_ensure_admin_promotes_existing_account() {
        let auth = service().await;
        let user = auth
            .create_account(account("grace@example.com", "grace"))
            .await
            .unwrap();

        let promoted = auth.ensure_admin("grace@example.com", "ignored").await.unwrap();
        assert_eq!(promoted.id, user.id);
        assert!(promoted.is_staff_or_admin());
    }
}
