//! Error types for Bookdesk
//!
//! Service and repository calls return [`LibraryError`]. The GraphQL layer
//! turns the user-facing variants into the field-keyed `errors` map of a
//! mutation result and everything else into a top-level error carrying a
//! `code` extension.

use std::collections::BTreeMap;

use async_graphql::ErrorExtensions;
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Field-keyed error messages, e.g. `{"email": "a@b.c email exists"}`.
///
/// Keys are stored as written by the backend (snake_case); the GraphQL
/// scalar camel-cases them on output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map holding exactly one entry
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            // Only the first failure per field is reported
            if let Some(first) = field_errors.first() {
                let message = match &first.message {
                    Some(message) => message.to_string(),
                    None => format!("invalid value ({})", first.code),
                };
                out.insert(field.to_string(), message);
            }
        }
        out
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{message}")]
    Conflict { field: &'static str, message: String },

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("User not found")]
    UnknownUser,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Invalid token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

impl LibraryError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn conflict(field: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            field,
            message: message.into(),
        }
    }

    /// Machine readable code placed in the GraphQL error extensions
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated | Self::Token(_) => "UNAUTHENTICATED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound { .. } | Self::UnknownUser => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::Validation(_) | Self::InvalidCredentials | Self::AccountDisabled => {
                "BAD_USER_INPUT"
            }
            Self::Database(_) | Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Field-keyed representation for mutation results.
    ///
    /// Returns `None` for failures that must surface as top-level errors
    /// (authentication, store and internal failures).
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            Self::NotFound { .. } | Self::Forbidden(_) => {
                Some(FieldErrors::single("id", self.to_string()))
            }
            Self::Conflict { field, message } => Some(FieldErrors::single(*field, message.clone())),
            Self::Validation(errors) => Some(errors.clone()),
            Self::UnknownUser | Self::InvalidCredentials | Self::AccountDisabled => {
                Some(FieldErrors::single("error", self.to_string()))
            }
            Self::Unauthenticated | Self::Token(_) | Self::Database(_) | Self::Internal(_) => None,
        }
    }
}

impl From<ValidationErrors> for LibraryError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors.into())
    }
}

impl ErrorExtensions for LibraryError {
    fn extend(&self) -> async_graphql::Error {
        let message = match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        let code = self.code();
        async_graphql::Error::new(message).extend_with(|_, e| e.set("code", code))
    }
}

/// Result type alias for application operations
pub type Result<T> = std::result::Result<T, LibraryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(max = 3, message = "too long"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_validation_errors_are_keyed_by_field() {
        let probe = Probe {
            name: "abcd".to_string(),
            email: "not-an-email".to_string(),
        };
        let errors: FieldErrors = probe.validate().unwrap_err().into();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name"), Some("too long"));
        assert!(errors.get("email").is_some());
    }

    #[test]
    fn test_not_found_maps_to_id_field() {
        let err = LibraryError::not_found("Book", "42");
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.get("id"), Some("Book with id 42 not found"));
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_sign_in_failures_use_error_key() {
        let errors = LibraryError::UnknownUser.field_errors().unwrap();
        assert_eq!(errors.get("error"), Some("User not found"));
        let errors = LibraryError::InvalidCredentials.field_errors().unwrap();
        assert_eq!(errors.get("error"), Some("invalid credentials"));
    }

    #[test]
    fn test_conflict_uses_its_own_field() {
        let err = LibraryError::conflict("isbn", "book with 123 exists");
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.get("isbn"), Some("book with 123 exists"));
    }

    #[test]
    fn test_store_failures_are_not_field_errors() {
        let err = LibraryError::Database(sqlx::Error::RowNotFound);
        assert!(err.field_errors().is_none());
        assert!(LibraryError::Unauthenticated.field_errors().is_none());
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = LibraryError::Internal("hash exploded".to_string()).extend();
        assert_eq!(err.message, "Internal server error");
    }
}
