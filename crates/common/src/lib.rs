//! WOF Common Library
//!
//! Shared code for the WOF catalog services including:
//! - Database models, migrations and the catalog repository
//! - Error types and handling
//! - Configuration management
//! - Password hashing and session tokens
//! - Outbound mail
//! - Metrics and observability

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod mail;
pub mod metrics;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};
pub use mail::{LogMailer, MailMessage, Mailer};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
