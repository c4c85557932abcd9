//! # mediakey-core
//!
//! Core types, traits, configuration and pure policy for mediakey.
//!
//! This crate provides the data structures, collaborator traits, upload quota
//! resolution and file naming that the store and engine crates depend on.

pub mod config;
pub mod defaults;
pub mod error;
pub mod models;
pub mod naming;
pub mod quota;
pub mod traits;

// Re-export commonly used types at crate root
pub use config::{
    ConfigError, ConfigResult, EngineConfig, LimitValue, MissingTargetPolicy, QuotaConfig,
    QuotaRule,
};
pub use error::{Error, Result};
pub use models::*;
pub use naming::{extension_for, render_filename, sanitize_filename, NamingContext};
pub use quota::{resolve_quota, QuotaDecision, QuotaSource};
pub use traits::*;
