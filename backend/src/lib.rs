//! Bookdesk - GraphQL backend for a lending library
//!
//! Accounts, a book catalog and book borrow requests, exposed at `/graphql`.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod services;

pub use app::{AppState, build_app};
pub use error::{LibraryError, Result};
