//! GraphQL API
//!
//! This is the single API surface for Bookdesk. Accounts are created and
//! signed in without authentication; everything else requires a token and
//! catalog management and reports additionally require a staff or admin
//! account.

pub mod auth;
pub mod loaders;
pub mod mutations;
pub mod queries;
mod schema;
pub mod types;

pub use crate::error::FieldErrors;
pub use auth::{AuthUser, LoginGuard, STAFF_REQUIRED, StaffGuard};
pub use schema::{BookdeskSchema, MutationRoot, QueryRoot, build_schema};
