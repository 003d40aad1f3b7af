//! Shared types, error model, and configuration for nizam-docs.
//!
//! This crate is the foundation depended on by all other nizam-docs crates.
//! It provides:
//! - [`DocsError`], the unified error type
//! - Domain types ([`ManifestEntry`], [`Document`], [`Catalog`])
//! - Configuration ([`AppConfig`], [`SiteConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, OutputConfig, SiteConfig, SourceConfig, Theme, default_manifest,
    init_config, load_config, load_config_from, validate_config,
};
pub use error::{DocsError, Result};
pub use types::{Catalog, DEFAULT_CATEGORY, DEFAULT_ORDER, Document, ManifestEntry};
