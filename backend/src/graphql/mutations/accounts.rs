//! Account mutations: registration and sign-in
//!
//! Neither mutation requires authentication.

use async_graphql::SimpleObject;

use super::prelude::*;
use crate::error::FieldErrors;
use crate::services::{AuthService, NewAccount};

mutation_result!(CreateAccountResult, account: Account);

/// Result of `signIn`
#[derive(Debug, Clone, SimpleObject)]
pub struct SignInResult {
    pub success: bool,
    pub errors: Option<FieldErrors>,
    pub message: Option<String>,
    /// Signed JWT, sent back as `Authorization: JWT <token>`
    pub token: Option<String>,
    pub payload: Option<JwtPayload>,
    /// Token lifetime in seconds
    pub refresh_expires_in: Option<i64>,
}

impl SignInResult {
    fn failure(errors: FieldErrors) -> Self {
        Self {
            success: false,
            errors: Some(errors),
            message: None,
            token: None,
            payload: None,
            refresh_expires_in: None,
        }
    }
}

#[derive(Default)]
pub struct AccountMutations;

#[Object]
impl AccountMutations {
    /// Register a new (non-staff) account
    async fn create_account(
        &self,
        ctx: &Context<'_>,
        first_name: String,
        last_name: Option<String>,
        email: String,
        password: String,
        username: String,
    ) -> Result<CreateAccountResult> {
        let auth = ctx.data_unchecked::<Arc<AuthService>>();

        let input = NewAccount {
            first_name,
            last_name,
            email,
            username,
            password,
        };

        match auth.create_account(input).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Account created");
                Ok(CreateAccountResult::success(
                    "Account created successfully",
                    Account::from(user),
                ))
            }
            Err(e) => Ok(CreateAccountResult::failure(into_field_errors(e)?)),
        }
    }

    /// Exchange an email and password for a JWT
    async fn sign_in(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> Result<SignInResult> {
        let auth = ctx.data_unchecked::<Arc<AuthService>>();

        match auth.sign_in(&email, &password).await {
            Ok(issued) => {
                tracing::info!(user_id = %issued.user.id, "User signed in");
                Ok(SignInResult {
                    success: true,
                    errors: None,
                    message: Some("Signed in successfully".to_string()),
                    token: Some(issued.token),
                    payload: Some(issued.payload.into()),
                    refresh_expires_in: Some(issued.refresh_expires_in),
                })
            }
            Err(e) => Ok(SignInResult::failure(into_field_errors(e)?)),
        }
    }
}
