//! Shared test utilities for the sen test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = setup_fixtures();
//! let config = fixture_config(site.path());
//! build_site(&config, &StubRenderer::default(), None).unwrap();
//!
//! let page = rendered(&config.build.output_dir.join("trip/index.html"));
//! assert_eq!(page.template, "post.html");
//! assert_eq!(page.context["post"]["title"], "A Trip");
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::render::{RenderError, Renderer, TemplateId};
use crate::types::PageContext;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// The fixture holds `content/` (four posts, two of them drafts, plus
/// `about.md` and the `trip/` asset bundle) and `themes/poetry/`.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Config pointing every build path into a fixture copy.
pub fn fixture_config(root: &Path) -> SiteConfig {
    let mut config = SiteConfig::default();
    config.site.display_name = "Fixture Site".to_string();
    config.build.content_dir = root.join("content");
    config.build.themes_dir = root.join("themes");
    config.build.output_dir = root.join("public");
    config
}

// =========================================================================
// Stub renderer
// =========================================================================

/// Renders `<template file name>\n<context as pretty JSON>` so tests can
/// assert on exactly what a template would have received.
#[derive(Default)]
pub struct StubRenderer {
    fail_slug: Option<String>,
}

impl StubRenderer {
    /// Fail detail pages for `slug`; everything else renders normally.
    pub fn failing_for(slug: &str) -> Self {
        Self {
            fail_slug: Some(slug.to_string()),
        }
    }
}

impl Renderer for StubRenderer {
    fn render(&self, template: TemplateId, context: &PageContext) -> Result<String, RenderError> {
        if let (Some(fail), PageContext::Detail { post, .. }) = (&self.fail_slug, context) {
            if post.slug == *fail {
                return Err(RenderError::Template {
                    template: template.file_name().to_string(),
                    message: format!("stub failure for {fail}"),
                });
            }
        }
        let json = serde_json::to_string_pretty(context).unwrap();
        Ok(format!("{}\n{}", template.file_name(), json))
    }
}

/// A page written by [`StubRenderer`], read back from disk.
pub struct Rendered {
    pub template: String,
    pub context: serde_json::Value,
}

/// Read a page produced by [`StubRenderer`]. Panics with the path on failure.
pub fn rendered(path: &Path) -> Rendered {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read rendered page {}: {e}", path.display()));
    let (template, json) = text
        .split_once('\n')
        .unwrap_or_else(|| panic!("{} is not stub output", path.display()));
    Rendered {
        template: template.to_string(),
        context: serde_json::from_str(json).unwrap(),
    }
}

// =========================================================================
// Output tree inspection
// =========================================================================

/// Names of the directories directly inside `dir`, sorted.
pub fn output_dirs(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Every file under `dir` keyed by its relative path, with its bytes.
pub fn snapshot_tree(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(dir).unwrap().to_path_buf();
            (rel, std::fs::read(e.path()).unwrap())
        })
        .collect()
}
