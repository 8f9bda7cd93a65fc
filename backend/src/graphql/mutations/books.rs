//! Catalog mutations (staff only)

use super::prelude::*;
use crate::services::{CatalogService, NewBook};

mutation_result!(AddNewBookResult, book: Book);
mutation_result!(DeleteBookResult, book: Book);

#[derive(Default)]
pub struct BookMutations;

#[Object]
impl BookMutations {
    /// Add a book to the catalog
    #[graphql(guard = "StaffGuard")]
    async fn add_new_book(
        &self,
        ctx: &Context<'_>,
        title: String,
        author: String,
        genre: String,
        number_of_copies: i32,
        isbn: String,
    ) -> Result<AddNewBookResult> {
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>();

        let input = NewBook {
            title,
            author,
            genre,
            number_of_copies,
            isbn,
        };

        match catalog.add_book(input).await {
            Ok(book) => Ok(AddNewBookResult::success(
                "Book added successfully",
                Book::from(book),
            )),
            Err(e) => Ok(AddNewBookResult::failure(into_field_errors(e)?)),
        }
    }

    /// Remove a book from the catalog; returns the removed record
    #[graphql(guard = "StaffGuard")]
    async fn delete_book(&self, ctx: &Context<'_>, id: ID) -> Result<DeleteBookResult> {
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>();

        match catalog.delete_book(&id).await {
            Ok(book) => Ok(DeleteBookResult::success(
                format!("Book with id {} deleted", book.id),
                Book::from(book),
            )),
            Err(e) => Ok(DeleteBookResult::failure(into_field_errors(e)?)),
        }
    }
}
