//! GraphQL schema definition
//!
//! Queries and mutations live in domain-specific modules under `queries/`
//! and `mutations/` and are combined here with `MergedObject`.

use std::sync::Arc;

use async_graphql::dataloader::DataLoader;
use async_graphql::{EmptySubscription, MergedObject, Schema};

use super::loaders::{BookLoader, UserLoader};
use super::mutations::{AccountMutations, BookMutations, BookRequestMutations};
use super::queries::{AccountQueries, BookQueries, ReportQueries};
use crate::db::Database;
use crate::services::{AuthConfig, AuthService, CatalogService, RequestService};

/// The GraphQL schema type
pub type BookdeskSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(AccountQueries, BookQueries, ReportQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(AccountMutations, BookMutations, BookRequestMutations);

/// Build the GraphQL schema with all resolvers and their shared services
pub fn build_schema(db: Database, auth_config: AuthConfig) -> BookdeskSchema {
    let auth_service = Arc::new(AuthService::new(db.clone(), auth_config));
    let catalog_service = Arc::new(CatalogService::new(db.clone()));
    let request_service = Arc::new(RequestService::new(db.clone()));

    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(DataLoader::new(UserLoader::new(db.clone()), tokio::spawn))
    .data(DataLoader::new(BookLoader::new(db.clone()), tokio::spawn))
    .data(auth_service)
    .data(catalog_service)
    .data(request_service)
    .data(db)
    .finish()
}
