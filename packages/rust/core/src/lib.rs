//! Catalog building and documentation display for nizam-docs.
//!
//! This crate ties the fetcher and the Markdown crate together: the build
//! pipeline turns the manifest into a persisted catalog, and the view layer
//! renders single documents with anchor navigation.

pub mod catalog;
pub mod navigator;
pub mod pipeline;
pub mod view;

pub use navigator::{AnchorNavigator, LinkAction, PageIndex, ScrollRequest};
pub use pipeline::{
    BuildReport, BuiltCatalog, ProgressReporter, SilentProgress, SkippedEntry, build_catalog,
    run_build, validate_manifest,
};
pub use view::{DocumentView, SiteContext, ViewState, load_overview};
