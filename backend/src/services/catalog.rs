//! Catalog service: adding, removing and listing books

use validator::Validate;

use crate::db::books::restricted_delete;
use crate::db::{BookRecord, CreateBook, Database};
use crate::error::{LibraryError, Result};

/// Input for a new catalog entry
#[derive(Debug, Clone, Validate)]
pub struct NewBook {
    #[validate(length(min = 1, max = 255, message = "Ensure this field has between 1 and 255 characters."))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "Ensure this field has between 1 and 255 characters."))]
    pub author: String,
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub genre: String,
    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub number_of_copies: i32,
    #[validate(length(min = 1, max = 100, message = "Ensure this field has between 1 and 100 characters."))]
    pub isbn: String,
}

#[derive(Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Add a book to the catalog. ISBNs are unique.
    pub async fn add_book(&self, input: NewBook) -> Result<BookRecord> {
        input.validate()?;

        let books = self.db.books();

        if books.get_by_isbn(&input.isbn).await?.is_some() {
            tracing::warn!(isbn = %input.isbn, "Refusing to add a duplicate ISBN");
            return Err(LibraryError::conflict(
                "isbn",
                format!("book with {} exists", input.isbn),
            ));
        }

        // A concurrent insert of the same ISBN still loses on the UNIQUE constraint
        let book = books
            .create(CreateBook {
                title: input.title,
                author: input.author,
                genre: input.genre,
                number_of_copies: input.number_of_copies,
                isbn: input.isbn,
            })
            .await?;

        tracing::info!(book_id = %book.id, isbn = %book.isbn, "Book added to catalog");
        Ok(book)
    }

    /// Remove a book and return the removed record.
    ///
    /// Books that still have requests stay in the catalog.
    pub async fn delete_book(&self, id: &str) -> Result<BookRecord> {
        let books = self.db.books();

        let book = books
            .get_by_id(id)
            .await?
            .ok_or_else(|| LibraryError::not_found("Book", id))?;

        if books.request_count(id).await? > 0 {
            tracing::warn!(book_id = %id, "Refusing to delete a requested book");
            return Err(restricted_delete(id));
        }

        // A request may slip in between the check and the delete; the
        // foreign key catches that case.
        if !books.delete(id).await? {
            return Err(LibraryError::not_found("Book", id));
        }

        tracing::info!(book_id = %id, isbn = %book.isbn, "Book deleted from catalog");
        Ok(book)
    }

    pub async fn get(&self, id: &str) -> Result<Option<BookRecord>> {
        self.db.books().get_by_id(id).await
    }

    /// Whole catalog ordered by title
    pub async fn list(&self) -> Result<Vec<BookRecord>> {
        self.db.books().list().await
    }

    /// Number of books in the catalog
    pub async fn count(&self) -> Result<i64> {
        self.db.books().count().await
    }
}
