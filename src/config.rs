//! Site configuration module.
//!
//! Handles loading and validating the project's `config.toml`. The file is
//! optional and sparse: stock defaults are the base layer and any keys the
//! user sets are merged on top.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! name = "verse"            # Machine slug for the site
//! display_name = "Verse"    # Human-readable site name
//! author = ""
//! tagline = ""
//! footer = ""               # May contain HTML; themes emit it unescaped
//!
//! [build]
//! content_dir = "content"   # Content root (holds about.md and posts/)
//! posts_dir = "posts"       # Relative to content_dir
//! about_file = "about.md"   # Relative to content_dir; always built to about/index.html
//! output_dir = "public"     # Cleared and rebuilt on every build
//! themes_dir = "themes"
//! theme = "poetry"          # Directory name under themes_dir
//! order = "date"            # List page order: "date", "name" or "listing"
//!
//! [serve]
//! interface = "127.0.0.1"
//! port = 8000
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! The resolved [`SiteConfig`] is built once at startup and passed by
//! reference into every component; nothing reads configuration from ambient
//! state.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site-wide values handed to every template.
    pub site: SiteSettings,
    /// Source, theme and output locations.
    pub build: BuildConfig,
    /// Preview server binding.
    pub serve: ServeConfig,
}

/// Site identity and chrome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSettings {
    pub name: String,
    pub display_name: String,
    pub author: String,
    pub tagline: String,
    /// Rendered verbatim by themes, so it may embed markup.
    pub footer: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            name: "verse".to_string(),
            display_name: "Verse".to_string(),
            author: String::new(),
            tagline: String::new(),
            footer: String::new(),
        }
    }
}

/// Ordering of posts on the list page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostOrder {
    /// Newest first, comparing the opaque `date` strings; ties broken by slug.
    #[default]
    Date,
    /// Slug ascending.
    Name,
    /// Whatever order the filesystem lists the posts directory in.
    Listing,
}

/// Build locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub content_dir: PathBuf,
    /// Relative to `content_dir`.
    pub posts_dir: PathBuf,
    /// Relative to `content_dir`.
    pub about_file: PathBuf,
    pub output_dir: PathBuf,
    pub themes_dir: PathBuf,
    pub theme: String,
    pub order: PostOrder,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            posts_dir: PathBuf::from("posts"),
            about_file: PathBuf::from("about.md"),
            output_dir: PathBuf::from("public"),
            themes_dir: PathBuf::from("themes"),
            theme: "poetry".to_string(),
            order: PostOrder::default(),
        }
    }
}

impl BuildConfig {
    pub fn posts_path(&self) -> PathBuf {
        self.content_dir.join(&self.posts_dir)
    }

    pub fn about_path(&self) -> PathBuf {
        self.content_dir.join(&self.about_file)
    }

    pub fn theme_path(&self) -> PathBuf {
        self.themes_dir.join(&self.theme)
    }

    /// Template directory of the active theme.
    pub fn layouts_path(&self) -> PathBuf {
        self.theme_path().join("layouts")
    }

    /// Static asset directory of the active theme, copied to `<output>/assets`.
    pub fn theme_assets_path(&self) -> PathBuf {
        self.theme_path().join("assets")
    }
}

/// Preview server binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    pub interface: String,
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    ///
    /// The output directory is wiped on every build, so it must never be the
    /// working directory itself or overlap the content and theme sources.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.build.theme.trim().is_empty() {
            return Err(ConfigError::Validation("build.theme must not be empty".into()));
        }
        if self.serve.port == 0 {
            return Err(ConfigError::Validation("serve.port must be non-zero".into()));
        }

        let output = normalize(&self.build.output_dir);
        if output.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "build.output_dir must not be the project directory".into(),
            ));
        }
        for (key, source) in [
            ("build.content_dir", &self.build.content_dir),
            ("build.themes_dir", &self.build.themes_dir),
        ] {
            let source = normalize(source);
            if source.starts_with(&output) {
                return Err(ConfigError::Validation(format!(
                    "build.output_dir '{}' would clear {key} '{}'",
                    self.build.output_dir.display(),
                    source.display()
                )));
            }
        }
        Ok(())
    }
}

/// Drop `.` components so `./public` and `public` compare equal.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load the config file at `path`, falling back to stock defaults when it
/// is absent. User values are merged over the defaults, unknown keys are
/// rejected and the result is validated.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let merged = match load_raw_config(path)? {
        Some(overlay) => merge_toml(stock_defaults_value()?, overlay),
        None => stock_defaults_value()?,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# sen configuration
# =================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity (available to templates as `site`)
# ---------------------------------------------------------------------------
[site]
name = "verse"
display_name = "Verse"
author = ""
tagline = ""
# Emitted unescaped by themes, so it may contain links.
footer = ""

# ---------------------------------------------------------------------------
# Build locations
# ---------------------------------------------------------------------------
[build]
content_dir = "content"
# Relative to content_dir. Each file directly inside is a post; a directory
# named after a post's slug holds that post's images and other assets.
posts_dir = "posts"
# Relative to content_dir. Rendered to <output_dir>/about/index.html.
about_file = "about.md"
# Deleted and recreated on every build.
output_dir = "public"
themes_dir = "themes"
# Directory under themes_dir with layouts/{index,post,about}.html and assets/.
theme = "poetry"
# List page ordering: "date" (newest first), "name" (slug) or "listing"
# (filesystem order).
order = "date"

# ---------------------------------------------------------------------------
# Preview server (`sen serve`)
# ---------------------------------------------------------------------------
[serve]
interface = "127.0.0.1"
port = 8000
"##
}
