//! Business services sitting between the GraphQL layer and the repositories

pub mod auth;
pub mod catalog;
pub mod requests;

pub use auth::{AuthConfig, AuthService, IssuedToken, NewAccount, TokenClaims, TokenPayload};
pub use catalog::{CatalogService, NewBook};
pub use requests::RequestService;
