//! Daily request reports (staff only)
//!
//! "Today" is the current UTC calendar day.

use super::prelude::*;
use crate::db::sqlite_helpers::today_utc;
use crate::services::RequestService;

#[derive(Default)]
pub struct ReportQueries;

#[Object]
impl ReportQueries {
    /// Book requests created today, newest first
    #[graphql(guard = "StaffGuard")]
    async fn book_requests_today(&self, ctx: &Context<'_>) -> Result<Vec<BookRequest>> {
        let requests = ctx.data_unchecked::<Arc<RequestService>>();

        let records = requests
            .requests_on(today_utc())
            .await
            .map_err(|e| e.extend())?;

        Ok(records.into_iter().map(BookRequest::from).collect())
    }

    /// Every book tied for the most requests today; null if nothing was requested
    #[graphql(guard = "StaffGuard")]
    async fn book_with_most_requests_today(&self, ctx: &Context<'_>) -> Result<Option<Vec<Book>>> {
        let requests = ctx.data_unchecked::<Arc<RequestService>>();

        let books = requests
            .most_requested_on(today_utc())
            .await
            .map_err(|e| e.extend())?;

        Ok(books.map(|books| books.into_iter().map(Book::from).collect()))
    }
}
