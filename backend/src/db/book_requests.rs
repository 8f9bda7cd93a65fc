//! Book requests repository (the borrow ledger) and its daily reports

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::books::BookRecord;
use super::sqlite_helpers::{day_key, new_id, now_iso8601};
use crate::error::{LibraryError, Result};

const REQUEST_COLUMNS: &str = "id, user_id, book_id, status, created_at, updated_at";

/// Lifecycle state of a borrow request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RequestStatus {
    #[default]
    Pending,
    Cancel,
    Approve,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Cancel => "CANCEL",
            RequestStatus::Approve => "APPROVE",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RequestStatus::Pending),
            "CANCEL" => Ok(RequestStatus::Cancel),
            "APPROVE" => Ok(RequestStatus::Approve),
            other => Err(format!("unknown book request status '{}'", other)),
        }
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BookRequestRecord {
    pub id: String,
    pub user_id: String,
    pub book_id: String,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct BookRequestRepository {
    pool: SqlitePool,
}

impl BookRequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a new PENDING request of `book_id` by `user_id`
    pub async fn create(&self, user_id: &str, book_id: &str) -> Result<BookRequestRecord> {
        let id = new_id();
        let now = now_iso8601();

        sqlx::query(
            r#"
            INSERT INTO book_requests (id, user_id, book_id, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(book_id)
        .bind(RequestStatus::Pending.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| LibraryError::Internal("Failed to create book request".to_string()))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<BookRequestRecord>> {
        let request = sqlx::query_as::<_, BookRequestRecord>(&format!(
            "SELECT {} FROM book_requests WHERE id = ?",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    /// Set the status and refresh `updated_at`. `None` if the id is unknown.
    pub async fn update_status(
        &self,
        id: &str,
        status: RequestStatus,
    ) -> Result<Option<BookRequestRecord>> {
        let result = sqlx::query("UPDATE book_requests SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now_iso8601())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    /// Requests created on `day` (UTC), newest first
    pub async fn list_created_on(&self, day: NaiveDate) -> Result<Vec<BookRequestRecord>> {
        let requests = sqlx::query_as::<_, BookRequestRecord>(&format!(
            "SELECT {} FROM book_requests WHERE substr(created_at, 1, 10) = ? \
             ORDER BY created_at DESC, rowid DESC",
            REQUEST_COLUMNS
        ))
        .bind(day_key(day))
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    /// Requests made by `user_id`, newest first
    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<BookRequestRecord>> {
        let requests = sqlx::query_as::<_, BookRequestRecord>(&format!(
            "SELECT {} FROM book_requests WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
            REQUEST_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    /// Books requested most often on `day`.
    ///
    /// Every book tied at the highest per-book count is returned, ordered by
    /// title. Requests count regardless of status. Empty when nothing was
    /// requested that day.
    pub async fn most_requested_on(&self, day: NaiveDate) -> Result<Vec<BookRecord>> {
        let books = sqlx::query_as::<_, BookRecord>(
            r#"
            WITH tally AS (
                SELECT book_id, COUNT(*) AS requests
                FROM book_requests
                WHERE substr(created_at, 1, 10) = ?
                GROUP BY book_id
            )
            SELECT b.id, b.title, b.author, b.genre, b.number_of_copies, b.isbn,
                   b.created_at, b.updated_at
            FROM tally t
            JOIN books b ON b.id = t.book_id
            WHERE t.requests = (SELECT MAX(requests) FROM tally)
            ORDER BY b.title, b.id
            "#,
        )
        .bind(day_key(day))
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite_helpers::{datetime_to_str, today_utc};
    use crate::db::{CreateBook, CreateUser, Database};
    use pretty_assertions::assert_eq;

    async fn seed_user(db: &Database, name: &str) -> String {
        db.users()
            .create(CreateUser {
                email: format!("{}@example.com", name),
                username: name.to_string(),
                first_name: name.to_string(),
                last_name: None,
                password_hash: "x".to_string(),
                is_admin: false,
                is_staff: false,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_book(db: &Database, title: &str) -> String {
        db.books()
            .create(CreateBook {
                title: title.to_string(),
                author: "Anon".to_string(),
                genre: "Misc".to_string(),
                number_of_copies: 1,
                isbn: format!("isbn-{}", title),
            })
            .await
            .unwrap()
            .id
    }

    async fn backdate(db: &Database, request_id: &str, days: i64) {
        let when = Utc::now() - chrono::Duration::days(days);
        sqlx::query("UPDATE book_requests SET created_at = ? WHERE id = ?")
            .bind(datetime_to_str(when))
            .bind(request_id)
            .execute(db.pool())
            .await
            .unwrap();
    }

    #[test]
    fn test_status_parses_stored_values() {
        for status in [RequestStatus::Pending, RequestStatus::Cancel, RequestStatus::Approve] {
            assert_eq!(status.as_str().parse::<RequestStatus>().unwrap(), status);
        }
        assert!("pending".parse::<RequestStatus>().is_err());
        assert_eq!(RequestStatus::default(), RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_new_requests_are_pending() {
        let db = Database::connect_in_memory().await.unwrap();
        let user = seed_user(&db, "reader").await;
        let book = seed_book(&db, "Dune").await;

        let request = db.book_requests().create(&user, &book).await.unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.created_at, request.updated_at);
    }

    #[tokio::test]
    async fn test_update_status_refreshes_updated_at() {
        let db = Database::connect_in_memory().await.unwrap();
        let user = seed_user(&db, "reader").await;
        let book = seed_book(&db, "Dune").await;
        let request = db.book_requests().create(&user, &book).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let updated = db
            .book_requests()
            .update_status(&request.id, RequestStatus::Cancel)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, RequestStatus::Cancel);
        assert_eq!(updated.created_at, request.created_at);
        assert!(updated.updated_at > request.updated_at);

        let missing = db
            .book_requests()
            .update_status("missing", RequestStatus::Cancel)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_list_created_on_excludes_other_days_and_is_newest_first() {
        let db = Database::connect_in_memory().await.unwrap();
        let user = seed_user(&db, "reader").await;
        let book = seed_book(&db, "Dune").await;

        let old = db.book_requests().create(&user, &book).await.unwrap();
        backdate(&db, &old.id, 1).await;
        let first = db.book_requests().create(&user, &book).await.unwrap();
        let second = db.book_requests().create(&user, &book).await.unwrap();

        let ids: Vec<String> = db
            .book_requests()
            .list_created_on(today_utc())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_most_requested_returns_every_tied_book() {
        let db = Database::connect_in_memory().await.unwrap();
        let user = seed_user(&db, "reader").await;
        let a = seed_book(&db, "A").await;
        let b = seed_book(&db, "B").await;
        let c = seed_book(&db, "C").await;

        for book in [&a, &a, &a, &b, &b, &b, &c] {
            db.book_requests().create(&user, book).await.unwrap();
        }
        // Yesterday's requests do not count toward today
        for _ in 0..5 {
            let old = db.book_requests().create(&user, &c).await.unwrap();
            backdate(&db, &old.id, 1).await;
        }

        let titles: Vec<String> = db
            .book_requests()
            .most_requested_on(today_utc())
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["A".to_string(), "B".to_string()]);
    }

    #[tokio::test]
    async fn test_most_requested_is_empty_without_requests() {
        let db = Database::connect_in_memory().await.unwrap();
        seed_book(&db, "A").await;

        let books = db.book_requests().most_requested_on(today_utc()).await.unwrap();
        assert!(books.is_empty());
    }
}
