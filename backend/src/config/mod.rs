//! Application configuration management

use std::env;

use anyhow::{Context, Result};
use base64::Engine;

use crate::services::AuthConfig;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// SQLite connection URL (e.g. `sqlite://./data/bookdesk.db` or `sqlite::memory:`)
    pub database_url: String,

    /// Maximum number of pooled database connections
    pub database_max_connections: u32,

    /// JWT secret for token signing and verification
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    pub jwt_expiration_seconds: i64,

    /// Bcrypt cost factor
    pub bcrypt_cost: u32,

    /// Email of the staff/admin account created at startup, if any
    pub bootstrap_admin_email: Option<String>,

    /// Password of the bootstrap account
    pub bootstrap_admin_password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret.trim().to_string(),
            _ => {
                tracing::warn!("JWT_SECRET not set; tokens will not survive a restart");
                generate_jwt_secret()
            }
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://./data/bookdesk.db".to_string()),

            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,

            jwt_secret,

            jwt_expiration_seconds: parse_token_lifetime(
                &env::var("JWT_EXPIRATION_SECONDS").unwrap_or_else(|_| "300".to_string()),
            )?,

            bcrypt_cost: match env::var("BCRYPT_COST") {
                Ok(v) => v.parse().context("Invalid BCRYPT_COST")?,
                Err(_) => bcrypt::DEFAULT_COST,
            },

            bootstrap_admin_email: env::var("BOOTSTRAP_ADMIN_EMAIL").ok(),
            bootstrap_admin_password: env::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),
        })
    }

    /// Settings consumed by [AuthService](crate::services::AuthService)
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            jwt_secret: self.jwt_secret.clone(),
            token_lifetime: self.jwt_expiration_seconds,
            bcrypt_cost: self.bcrypt_cost,
        }
    }
}

/// Longest accepted token lifetime (one year)
const MAX_TOKEN_LIFETIME_SECONDS: i64 = 365 * 24 * 60 * 60;

fn parse_token_lifetime(value: &str) -> Result<i64> {
    let seconds: i64 = value
        .trim()
        .parse()
        .context("Invalid JWT_EXPIRATION_SECONDS")?;
    anyhow::ensure!(
        (1..=MAX_TOKEN_LIFETIME_SECONDS).contains(&seconds),
        "JWT_EXPIRATION_SECONDS must be between 1 and {}, got {}",
        MAX_TOKEN_LIFETIME_SECONDS,
        seconds
    );
    Ok(seconds)
}

fn generate_jwt_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_secrets_differ() {
        let a = generate_jwt_secret();
        let b = generate_jwt_secret();
        assert_ne!(a, b);
        assert_eq!(a.len(), 44);
    }

    #[test]
    fn test_token_lifetime_must_be_positive_and_bounded() {
        assert_eq!(parse_token_lifetime("300").unwrap(), 300);
        assert!(parse_token_lifetime("0").is_err());
        assert!(parse_token_lifetime("-60").is_err());
        assert!(parse_token_lifetime(&i64::MAX.to_string()).is_err());
        assert!(parse_token_lifetime("soon").is_err());
    }

    #[test]
    fn test_auth_config_carries_token_settings() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8000,
            database_url: "sqlite::memory:".to_string(),
            database_max_connections: 1,
            jwt_secret: "secret".to_string(),
            jwt_expiration_seconds: 60,
            bcrypt_cost: 4,
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
        };

        let auth = config.auth_config();
        assert_eq!(auth.jwt_secret, "secret");
        assert_eq!(auth.token_lifetime, 60);
        assert_eq!(auth.bcrypt_cost, 4);
    }
}
