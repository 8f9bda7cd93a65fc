use super::prelude::*;
use crate::db::Database;
use crate::error::LibraryError;
use crate::services::RequestService;

#[derive(Default)]
pub struct AccountQueries;

#[Object]
impl AccountQueries {
    /// The signed-in account
    #[graphql(guard = "LoginGuard")]
    async fn me(&self, ctx: &Context<'_>) -> Result<Account> {
        let user = ctx.auth_user()?;
        let db = ctx.data_unchecked::<Database>();

        let record = db
            .users()
            .get_by_id(&user.user_id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| LibraryError::not_found("User", user.user_id.clone()).extend())?;

        Ok(Account::from(record))
    }

    /// Book requests made by the signed-in account, newest first
    #[graphql(guard = "LoginGuard")]
    async fn my_book_requests(&self, ctx: &Context<'_>) -> Result<Vec<BookRequest>> {
        let user = ctx.auth_user()?;
        let requests = ctx.data_unchecked::<Arc<RequestService>>();

        let records = requests
            .requests_for_user(&user.user_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(records.into_iter().map(BookRequest::from).collect())
    }
}
