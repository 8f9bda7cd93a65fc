//! GraphQL DataLoaders for batching database queries
//!
//! Listing requests resolves `libraryUser` and `book` for every row. The
//! loaders collect those lookups within one tick and issue a single
//! `WHERE id IN (...)` query per table.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::dataloader::Loader;

use crate::db::{BookRecord, Database, UserRecord};
use crate::error::LibraryError;

/// Loads accounts by id
pub struct UserLoader {
    db: Database,
}

impl UserLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<String> for UserLoader {
    type Value = UserRecord;
    type Error = Arc<LibraryError>;

    async fn load(&self, keys: &[String]) -> Result<HashMap<String, Self::Value>, Self::Error> {
        tracing::debug!(count = keys.len(), "Batch loading users");

        let users = self.db.users().get_many(keys).await.map_err(Arc::new)?;
        Ok(users.into_iter().map(|u| (u.id.clone(), u)).collect())
    }
}

/// Loads books by id
pub struct BookLoader {
    db: Database,
}

impl BookLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<String> for BookLoader {
    type Value = BookRecord;
    type Error = Arc<LibraryError>;

    async fn load(&self, keys: &[String]) -> Result<HashMap<String, Self::Value>, Self::Error> {
        tracing::debug!(count = keys.len(), "Batch loading books");

        let books = self.db.books().get_many(keys).await.map_err(Arc::new)?;
        Ok(books.into_iter().map(|b| (b.id.clone(), b)).collect())
    }
}
