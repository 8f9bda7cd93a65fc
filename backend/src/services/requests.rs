//! Book request workflows and the daily request reports

use chrono::NaiveDate;

use crate::db::{BookRecord, BookRequestRecord, Database, RequestStatus};
use crate::error::{LibraryError, Result};

#[derive(Clone)]
pub struct RequestService {
    db: Database,
}

impl RequestService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Record a PENDING request of `book_id` by `user_id`
    pub async fn request_book(&self, user_id: &str, book_id: &str) -> Result<BookRequestRecord> {
        if self.db.books().get_by_id(book_id).await?.is_none() {
            return Err(LibraryError::not_found("Book", book_id));
        }

        let request = self.db.book_requests().create(user_id, book_id).await?;
        tracing::info!(
            request_id = %request.id,
            user_id = %user_id,
            book_id = %book_id,
            "Book requested"
        );
        Ok(request)
    }

    /// Cancel one of the caller's own requests
    pub async fn cancel_request(&self, user_id: &str, request_id: &str) -> Result<BookRequestRecord> {
        let requests = self.db.book_requests();

        let request = requests
            .get_by_id(request_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("BookRequest", request_id))?;

        if request.user_id != user_id {
            tracing::warn!(
                request_id = %request_id,
                user_id = %user_id,
                "Attempt to cancel another user's book request"
            );
            return Err(LibraryError::Forbidden(
                "You can only cancel your own book requests".to_string(),
            ));
        }

        let cancelled = requests
            .update_status(request_id, RequestStatus::Cancel)
            .await?
            .ok_or_else(|| LibraryError::not_found("BookRequest", request_id))?;

        tracing::info!(request_id = %request_id, "Book request cancelled");
        Ok(cancelled)
    }

    /// Approve a PENDING request
    pub async fn approve_request(&self, request_id: &str) -> Result<BookRequestRecord> {
        let requests = self.db.book_requests();

        let request = requests
            .get_by_id(request_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("BookRequest", request_id))?;

        if request.status != RequestStatus::Pending {
            return Err(LibraryError::conflict(
                "status",
                format!("Only PENDING requests can be approved, this one is {}", request.status),
            ));
        }

        let approved = requests
            .update_status(request_id, RequestStatus::Approve)
            .await?
            .ok_or_else(|| LibraryError::not_found("BookRequest", request_id))?;

        tracing::info!(request_id = %request_id, "Book request approved");
        Ok(approved)
    }

    /// Requests created on `day`, newest first
    pub async fn requests_on(&self, day: NaiveDate) -> Result<Vec<BookRequestRecord>> {
        self.db.book_requests().list_created_on(day).await
    }

    /// Books tied for the most requests on `day`; `None` if nothing was requested
    pub async fn most_requested_on(&self, day: NaiveDate) -> Result<Option<Vec<BookRecord>>> {
        let books = self.db.book_requests().most_requested_on(day).await?;
        Ok((!books.is_empty()).then_some(books))
    }

    /// Requests made by `user_id`, newest first
    pub async fn requests_for_user(&self, user_id: &str) -> Result<Vec<BookRequestRecord>> {
        self.db.book_requests().list_by_user(user_id).await
    }
}
