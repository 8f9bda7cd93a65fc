use super::prelude::*;
use crate::services::CatalogService;

#[derive(Default)]
pub struct BookQueries;

#[Object]
impl BookQueries {
    /// The whole catalog ordered by title
    #[graphql(guard = "LoginGuard")]
    async fn books(&self, ctx: &Context<'_>) -> Result<Vec<Book>> {
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>();
        let books = catalog.list().await.map_err(|e| e.extend())?;
        Ok(books.into_iter().map(Book::from).collect())
    }

    /// A single book by id
    #[graphql(guard = "LoginGuard")]
    async fn book(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Book>> {
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>();
        let book = catalog.get(&id).await.map_err(|e| e.extend())?;
        Ok(book.map(Book::from))
    }

    /// Number of books in the catalog
    #[graphql(guard = "StaffGuard")]
    async fn book_count_in_the_library(&self, ctx: &Context<'_>) -> Result<i64> {
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>();
        catalog.count().await.map_err(|e| e.extend())
    }
}
