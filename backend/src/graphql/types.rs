//! GraphQL type definitions
//!
//! These types mirror the database records but are decorated with
//! async-graphql attributes. Passwords never leave the db layer.

use async_graphql::{
    ComplexObject, Context, Enum, ErrorExtensions, ID, InputValueError, InputValueResult, Name,
    Result, Scalar, ScalarType, SimpleObject, Value, dataloader::DataLoader,
};
use chrono::{DateTime, Utc};
use convert_case::{Case, Casing};

use super::loaders::{BookLoader, UserLoader};
use crate::db::{BookRecord, BookRequestRecord, RequestStatus, UserRecord};
use crate::error::FieldErrors;
use crate::services::TokenPayload;

// ============================================================================
// Errors
// ============================================================================

/// Key used for errors that do not belong to a single field
const NON_FIELD_ERRORS: &str = "__all__";

fn error_key(field: &str) -> String {
    if field == NON_FIELD_ERRORS {
        "nonFieldErrors".to_string()
    } else {
        field.to_case(Case::Camel)
    }
}

/// Field-keyed error messages, e.g. `{"numberOfCopies": "..."}`
#[Scalar(name = "ErrorType")]
impl ScalarType for FieldErrors {
    fn parse(value: Value) -> InputValueResult<Self> {
        match value {
            Value::Object(map) => {
                let mut errors = FieldErrors::new();
                for (field, message) in map {
                    match message {
                        Value::String(message) => errors.insert(field.as_str(), message),
                        other => return Err(InputValueError::expected_type(other)),
                    }
                }
                Ok(errors)
            }
            other => Err(InputValueError::expected_type(other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(field, message)| (Name::new(error_key(field)), Value::String(message.to_string())))
                .collect(),
        )
    }
}

// ============================================================================
// Accounts
// ============================================================================

/// A library account
#[derive(Debug, Clone, SimpleObject)]
pub struct Account {
    pub id: ID,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub is_admin: bool,
    pub is_staff: bool,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
}

impl From<UserRecord> for Account {
    fn from(user: UserRecord) -> Self {
        Self {
            id: ID(user.id),
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_admin: user.is_admin,
            is_staff: user.is_staff,
            is_active: user.is_active,
            last_login: user.last_login_at,
            date_joined: user.created_at,
        }
    }
}

/// Public claims of an issued token
#[derive(Debug, Clone, SimpleObject)]
pub struct JwtPayload {
    pub email: String,
    pub exp: i64,
    pub orig_iat: i64,
}

impl From<TokenPayload> for JwtPayload {
    fn from(payload: TokenPayload) -> Self {
        Self {
            email: payload.email,
            exp: payload.exp,
            orig_iat: payload.orig_iat,
        }
    }
}

// ============================================================================
// Books
// ============================================================================

/// A catalog entry
#[derive(Debug, Clone, SimpleObject)]
pub struct Book {
    pub id: ID,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub number_of_copies: i32,
    pub isbn: String,
}

impl From<BookRecord> for Book {
    fn from(book: BookRecord) -> Self {
        Self {
            id: ID(book.id),
            title: book.title,
            author: book.author,
            genre: book.genre,
            number_of_copies: book.number_of_copies,
            isbn: book.isbn,
        }
    }
}

// ============================================================================
// Book Requests
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum BookRequestStatus {
    Pending,
    Cancel,
    Approve,
}

impl From<RequestStatus> for BookRequestStatus {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Pending => BookRequestStatus::Pending,
            RequestStatus::Cancel => BookRequestStatus::Cancel,
            RequestStatus::Approve => BookRequestStatus::Approve,
        }
    }
}

/// A borrow request of a book by a user
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct BookRequest {
    pub id: ID,
    pub book_request_status: BookRequestStatus,
    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
    #[graphql(skip)]
    pub user_id: String,
    #[graphql(skip)]
    pub book_id: String,
}

#[ComplexObject]
impl BookRequest {
    /// The account that made the request
    async fn library_user(&self, ctx: &Context<'_>) -> Result<Option<Account>> {
        let loader = ctx.data_unchecked::<DataLoader<UserLoader>>();
        let user = loader
            .load_one(self.user_id.clone())
            .await
            .map_err(|e| e.as_ref().extend())?;
        Ok(user.map(Account::from))
    }

    /// The requested book
    async fn book(&self, ctx: &Context<'_>) -> Result<Option<Book>> {
        let loader = ctx.data_unchecked::<DataLoader<BookLoader>>();
        let book = loader
            .load_one(self.book_id.clone())
            .await
            .map_err(|e| e.as_ref().extend())?;
        Ok(book.map(Book::from))
    }
}

impl From<BookRequestRecord> for BookRequest {
    fn from(request: BookRequestRecord) -> Self {
        Self {
            id: ID(request.id),
            book_request_status: request.status.into(),
            created_time: request.created_at,
            updated_time: request.updated_at,
            user_id: request.user_id,
            book_id: request.book_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_keys_are_camel_cased() {
        let mut errors = FieldErrors::new();
        errors.insert("number_of_copies", "Ensure this value is greater than or equal to 0.");
        errors.insert("__all__", "Something went wrong");
        errors.insert("isbn", "book with 1 exists");

        let value = errors.to_value().into_json().unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "numberOfCopies": "Ensure this value is greater than or equal to 0.",
                "nonFieldErrors": "Something went wrong",
                "isbn": "book with 1 exists",
            })
        );
    }

    #[test]
    fn test_error_scalar_rejects_non_objects() {
        assert!(<FieldErrors as ScalarType>::parse(Value::from(3)).is_err());
    }
}
