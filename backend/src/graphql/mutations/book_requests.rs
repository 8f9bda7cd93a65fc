//! Book request mutations

use super::prelude::*;
use crate::services::RequestService;

mutation_result!(BookRequestResult, book_request: BookRequest);

#[derive(Default)]
pub struct BookRequestMutations;

#[Object]
impl BookRequestMutations {
    /// Request to borrow the book with the given id
    #[graphql(guard = "LoginGuard")]
    async fn book_request(&self, ctx: &Context<'_>, id: ID) -> Result<BookRequestResult> {
        let user = ctx.auth_user()?;
        let requests = ctx.data_unchecked::<Arc<RequestService>>();

        match requests.request_book(&user.user_id, &id).await {
            Ok(request) => Ok(BookRequestResult::success(
                "Book requested successfully",
                BookRequest::from(request),
            )),
            Err(e) => Ok(BookRequestResult::failure(into_field_errors(e)?)),
        }
    }

    /// Cancel one of your own book requests
    #[graphql(guard = "LoginGuard")]
    async fn cancel_book_request(&self, ctx: &Context<'_>, id: ID) -> Result<BookRequestResult> {
        let user = ctx.auth_user()?;
        let requests = ctx.data_unchecked::<Arc<RequestService>>();

        match requests.cancel_request(&user.user_id, &id).await {
            Ok(request) => Ok(BookRequestResult::success(
                "Book request cancelled",
                BookRequest::from(request),
            )),
            Err(e) => Ok(BookRequestResult::failure(into_field_errors(e)?)),
        }
    }

    /// Approve a pending book request
    #[graphql(guard = "StaffGuard")]
    async fn approve_book_request(&self, ctx: &Context<'_>, id: ID) -> Result<BookRequestResult> {
        let requests = ctx.data_unchecked::<Arc<RequestService>>();

        match requests.approve_request(&id).await {
            Ok(request) => Ok(BookRequestResult::success(
                "Book request approved",
                BookRequest::from(request),
            )),
            Err(e) => Ok(BookRequestResult::failure(into_field_errors(e)?)),
        }
    }
}
