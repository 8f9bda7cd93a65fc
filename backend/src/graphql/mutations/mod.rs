pub mod accounts;
pub mod book_requests;
pub mod books;

pub use accounts::AccountMutations;
pub use book_requests::BookRequestMutations;
pub use books::BookMutations;

use async_graphql::ErrorExtensions;

use crate::error::{FieldErrors, LibraryError};

/// Split a service failure into the `errors` map of a mutation result.
///
/// Authentication and store failures are not user input problems; they are
/// returned as top-level GraphQL errors instead.
pub(crate) fn into_field_errors(err: LibraryError) -> async_graphql::Result<FieldErrors> {
    match err.field_errors() {
        Some(errors) => {
            tracing::warn!(error = %err, "Mutation rejected");
            Ok(errors)
        }
        None => {
            tracing::error!(error = %err, "Mutation failed");
            Err(err.extend())
        }
    }
}

pub(crate) mod prelude {
    pub(crate) use std::sync::Arc;

    pub(crate) use async_graphql::{Context, ID, Object, Result};
    pub(crate) use bookdesk_macros::mutation_result;

    pub(crate) use super::into_field_errors;
    pub(crate) use crate::graphql::auth::{AuthExt, LoginGuard, StaffGuard};
    pub(crate) use crate::graphql::types::*;
}
