//! Books repository (the catalog)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::sqlite_helpers::{new_id, now_iso8601, placeholders};
use super::{is_foreign_key_violation, unique_violation_column};
use crate::error::{LibraryError, Result};

const BOOK_COLUMNS: &str =
    "id, title, author, genre, number_of_copies, isbn, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub number_of_copies: i32,
    pub isbn: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub number_of_copies: i32,
    pub isbn: String,
}

pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a book. A duplicate ISBN is a conflict on `isbn`.
    pub async fn create(&self, book: CreateBook) -> Result<BookRecord> {
        let id = new_id();
        let now = now_iso8601();

        sqlx::query(
            r#"
            INSERT INTO books (id, title, author, genre, number_of_copies, isbn, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.genre)
        .bind(book.number_of_copies)
        .bind(&book.isbn)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| match unique_violation_column(&e).as_deref() {
            Some("books.isbn") => {
                LibraryError::conflict("isbn", format!("book with {} exists", book.isbn))
            }
            _ => e.into(),
        })?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| LibraryError::Internal("Failed to create book".to_string()))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<BookRecord>> {
        let book = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {} FROM books WHERE id = ?",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    pub async fn get_by_isbn(&self, isbn: &str) -> Result<Option<BookRecord>> {
        let book = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {} FROM books WHERE isbn = ?",
            BOOK_COLUMNS
        ))
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    /// Fetch every book whose id is in `ids`, ordered by title
    pub async fn get_many(&self, ids: &[String]) -> Result<Vec<BookRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM books WHERE id IN ({}) ORDER BY title, id",
            BOOK_COLUMNS,
            placeholders(ids.len())
        );
        let mut query = sqlx::query_as::<_, BookRecord>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Whole catalog ordered by title
    pub async fn list(&self) -> Result<Vec<BookRecord>> {
        let books = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {} FROM books ORDER BY title, id",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Number of catalog entries
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Number of requests (any status) referencing the book
    pub async fn request_count(&self, id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_requests WHERE book_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Delete a book. Returns `false` if no such book exists.
    ///
    /// Books referenced by requests are protected by `ON DELETE RESTRICT`;
    /// that failure is a conflict on `id`.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    restricted_delete(id)
                } else {
                    e.into()
                }
            })?;
        Ok(result.rows_affected() > 0)
    }
}

pub(crate) fn restricted_delete(id: &str) -> LibraryError {
    LibraryError::conflict(
        "id",
        format!("Book with id {} has book requests and cannot be deleted", id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CreateUser, Database};
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn new_book(title: &str, isbn: &str) -> CreateBook {
        CreateBook {
            title: title.to_string(),
            author: "Frank Herbert".to_string(),
            genre: "Science fiction".to_string(),
            number_of_copies: 2,
            isbn: isbn.to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_isbn_never_creates_second_record() {
        let db = Database::connect_in_memory().await.unwrap();
        db.books().create(new_book("Dune", "9780441013593")).await.unwrap();

        let err = db
            .books()
            .create(new_book("Dune (reprint)", "9780441013593"))
            .await
            .unwrap_err();
        assert_matches!(err, LibraryError::Conflict { field: "isbn", .. });
        assert_eq!(db.books().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_by_isbn_finds_only_that_book() {
        let db = Database::connect_in_memory().await.unwrap();
        let dune = db.books().create(new_book("Dune", "9780441013593")).await.unwrap();

        let found = db.books().get_by_isbn("9780441013593").await.unwrap().unwrap();
        assert_eq!(found.id, dune.id);
        assert!(db.books().get_by_isbn("0000000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_title() {
        let db = Database::connect_in_memory().await.unwrap();
        db.books().create(new_book("Emma", "2")).await.unwrap();
        db.books().create(new_book("Beloved", "1")).await.unwrap();

        let titles: Vec<String> = db
            .books()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Beloved".to_string(), "Emma".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_missing_book_reports_false() {
        let db = Database::connect_in_memory().await.unwrap();
        assert!(!db.books().delete("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_is_restricted_while_requested() {
        let db = Database::connect_in_memory().await.unwrap();
        let book = db.books().create(new_book("Dune", "1")).await.unwrap();
        let user = db
            .users()
            .create(CreateUser {
                email: "reader@example.com".to_string(),
                username: "reader".to_string(),
                first_name: "Reader".to_string(),
                last_name: None,
                password_hash: "x".to_string(),
                is_admin: false,
                is_staff: false,
            })
            .await
            .unwrap();
        db.book_requests().create(&user.id, &book.id).await.unwrap();

        let err = db.books().delete(&book.id).await.unwrap_err();
        assert_matches!(err, LibraryError::Conflict { field: "id", .. });
        assert!(db.books().get_by_id(&book.id).await.unwrap().is_some());
        assert_eq!(db.books().request_count(&book.id).await.unwrap(), 1);
    }
}
