//! Application configuration for nizam-docs.
//!
//! Project config lives at `./nizam-docs.toml` (or wherever `--config` points).
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DocsError, Result};
use crate::types::ManifestEntry;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "nizam-docs.toml";

// ---------------------------------------------------------------------------
// Config structs (matching nizam-docs.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote content host.
    #[serde(default)]
    pub source: SourceConfig,

    /// Where build artifacts go.
    #[serde(default)]
    pub output: OutputConfig,

    /// Live documentation view settings.
    #[serde(default)]
    pub site: SiteConfig,

    /// Ordered list of files to ingest.
    #[serde(default = "default_manifest")]
    pub manifest: Vec<ManifestEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            output: OutputConfig::default(),
            site: SiteConfig::default(),
            manifest: default_manifest(),
        }
    }
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL every manifest path is appended to.
    #[serde(default = "default_source_base_url")]
    pub base_url: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_source_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_source_base_url() -> String {
    "https://raw.githubusercontent.com/abdultolba/nizam/main".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Location of the persisted catalog artifact.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
        }
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("./public/docs.json")
}

/// Colour scheme applied to every rendered page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Class put on the page root.
    pub fn root_class(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Page theme, fixed once at startup.
    #[serde(default)]
    pub theme: Theme,

    /// Public base URL the site is served from.
    #[serde(default = "default_site_base_url")]
    pub base_url: String,

    /// Markdown file the live documentation view loads, relative to `base_url`.
    #[serde(default = "default_overview_doc")]
    pub overview_doc: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            base_url: default_site_base_url(),
            overview_doc: default_overview_doc(),
        }
    }
}

impl SiteConfig {
    /// Absolute URL of the overview document.
    pub fn overview_url(&self) -> Result<Url> {
        let base = Url::parse(&self.base_url).map_err(|e| {
            DocsError::config(format!("invalid site base_url '{}': {e}", self.base_url))
        })?;
        base.join(&self.overview_doc).map_err(|e| {
            DocsError::config(format!("invalid overview_doc '{}': {e}", self.overview_doc))
        })
    }
}

fn default_site_base_url() -> String {
    "https://abdultolba.github.io/nizam_website/".into()
}
fn default_overview_doc() -> String {
    "nizam-overview.md".into()
}

/// The built-in manifest used when the config file declares none.
pub fn default_manifest() -> Vec<ManifestEntry> {
    vec![
        ManifestEntry::new("README.md", "Overview", 1),
        ManifestEntry::new("docs/README.md", "Documentation", 2).with_title("Documentation Index"),
        ManifestEntry::new("docs/COMMANDS.md", "Reference", 3),
        ManifestEntry::new("docs/DATA_LIFECYCLE.md", "Features", 4),
        ManifestEntry::new("docs/DOCTOR.md", "Features", 5),
        ManifestEntry::new("docs/HOST_BINARY_DETECTION.md", "Features", 6),
        ManifestEntry::new("docs/MONGODB_SUPPORT.md", "Features", 7),
        ManifestEntry::new("examples/interactive-demo.md", "Examples", 8)
            .with_title("Interactive Demo"),
    ]
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Resolve and load the config.
///
/// An explicit path must exist. Without one, `./nizam-docs.toml` is used when
/// present and defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    let path = PathBuf::from(CONFIG_FILE_NAME);
    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocsError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| DocsError::config(format!("failed to parse {}: {e}", path.display())))?;

    validate_config(&config)?;
    Ok(config)
}

/// Write a default config file at `path`. Refuses to overwrite.
pub fn init_config(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Err(DocsError::config(format!(
            "{} already exists, not overwriting",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DocsError::io(parent, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| DocsError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| DocsError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path.to_path_buf())
}

/// Check the values serde cannot check on its own.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    Url::parse(&config.source.base_url).map_err(|e| {
        DocsError::config(format!(
            "invalid source base_url '{}': {e}",
            config.source.base_url
        ))
    })?;

    if config.source.timeout_secs == 0 {
        return Err(DocsError::config("source timeout_secs must be greater than 0"));
    }

    config.site.overview_url()?;

    if let Some(entry) = config.manifest.iter().find(|e| e.path.trim().is_empty()) {
        return Err(DocsError::config(format!(
            "manifest entry with order {} has an empty path",
            entry.order
        )));
    }

    Ok(())
}
