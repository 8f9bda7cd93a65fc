//! GraphQL authentication and authorization
//!
//! The HTTP layer verifies the `Authorization` header and attaches an
//! [`AuthUser`] to the request data. Resolvers read it through [`AuthExt`].
//!
//! ## Guards
//!
//! Use `LoginGuard` to require a signed-in user:
//!
//! ```ignore
//! #[graphql(guard = "LoginGuard")]
//! async fn book_request(&self, ctx: &Context<'_>, id: ID) -> Result<BookRequestResult> { ... }
//! ```
//!
//! Use `StaffGuard` for catalog management and reports:
//!
//! ```ignore
//! #[graphql(guard = "StaffGuard")]
//! async fn add_new_book(&self, ctx: &Context<'_>, ...) -> Result<AddNewBookResult> { ... }
//! ```

use async_graphql::{Context, ErrorExtensions, Result};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::LibraryError;
use crate::services::TokenClaims;

pub const STAFF_REQUIRED: &str = "You have to be an admin or staff to perform this operation";

/// User context extracted from JWT, available in GraphQL resolvers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
}

impl From<TokenClaims> for AuthUser {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}

/// Extension trait to get authenticated user from GraphQL context
pub trait AuthExt {
    /// Get the authenticated user, or return an error if not authenticated
    fn auth_user(&self) -> Result<&AuthUser>;
}

impl<'a> AuthExt for Context<'a> {
    fn auth_user(&self) -> Result<&AuthUser> {
        self.data_opt::<AuthUser>()
            .ok_or_else(|| LibraryError::Unauthenticated.extend())
    }
}

/// Guard that requires a signed-in user whose account is still active.
///
/// A token issued before deactivation stops working immediately.
pub struct LoginGuard;

impl async_graphql::Guard for LoginGuard {
    fn check(&self, ctx: &Context<'_>) -> impl std::future::Future<Output = Result<()>> + Send {
        let lookup = ctx
            .auth_user()
            .map(|user| (user.user_id.clone(), ctx.data_unchecked::<Database>().clone()));

        async move {
            let (user_id, db) = lookup?;

            let user = db
                .users()
                .get_by_id(&user_id)
                .await
                .map_err(|e| e.extend())?;

            match user {
                Some(user) if user.is_active => Ok(()),
                _ => {
                    tracing::warn!(user_id = %user_id, "Token holder is missing or inactive");
                    Err(LibraryError::Unauthenticated.extend())
                }
            }
        }
    }
}

/// Guard that requires an active staff or admin account.
///
/// Privileges are re-read from the database on every call so that a
/// demotion takes effect before the token expires.
pub struct StaffGuard;

impl async_graphql::Guard for StaffGuard {
    fn check(&self, ctx: &Context<'_>) -> impl std::future::Future<Output = Result<()>> + Send {
        let lookup = ctx
            .auth_user()
            .map(|user| (user.user_id.clone(), ctx.data_unchecked::<Database>().clone()));

        async move {
            let (user_id, db) = lookup?;

            let user = db
                .users()
                .get_by_id(&user_id)
                .await
                .map_err(|e| e.extend())?;

            match user {
                Some(user) if user.is_active && user.is_staff_or_admin() => Ok(()),
                _ => {
                    tracing::warn!(user_id = %user_id, "Staff-only operation rejected");
                    Err(LibraryError::Forbidden(STAFF_REQUIRED.to_string()).extend())
                }
            }
        }
    }
}
