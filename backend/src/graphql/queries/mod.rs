pub mod accounts;
pub mod books;
pub mod reports;

pub use accounts::AccountQueries;
pub use books::BookQueries;
pub use reports::ReportQueries;

pub(crate) mod prelude {
    pub(crate) use std::sync::Arc;

    pub(crate) use async_graphql::{Context, ErrorExtensions, ID, Object, Result};

    pub(crate) use crate::graphql::auth::{AuthExt, LoginGuard, StaffGuard};
    pub(crate) use crate::graphql::types::*;
}
