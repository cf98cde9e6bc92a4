//! Shared types handed between the loader, the assembler and the renderer.
//!
//! Everything here is build-scoped: created at the start of a build, held in
//! memory and dropped at exit.

use crate::config::SiteSettings;
use serde::Serialize;
use std::path::PathBuf;

/// Site-wide values available to every template as `site`.
///
/// Built once per build from the configuration and passed by reference into
/// every render call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteContext {
    /// Machine slug.
    pub name: String,
    pub display_name: String,
    pub author: String,
    pub tagline: String,
    /// May embed markup; themes emit it with `| safe`.
    pub footer: String,
}

impl From<&SiteSettings> for SiteContext {
    fn from(settings: &SiteSettings) -> Self {
        Self {
            name: settings.name.clone(),
            display_name: settings.display_name.clone(),
            author: settings.author.clone(),
            tagline: settings.tagline.clone(),
            footer: settings.footer.clone(),
        }
    }
}

/// One content entry after front matter has been resolved and the body
/// rendered to HTML.
///
/// `slug` is a pure function of `source_path`: the file name without its
/// extension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub title: String,
    /// Opaque display string, never parsed.
    pub date: String,
    pub draft: bool,
    pub slug: String,
    pub body_html: String,
    #[serde(skip)]
    pub source_path: PathBuf,
}

/// The context a template is rendered with.
///
/// Serialized untagged, so list templates see `site` and `posts` and detail
/// templates see `site` and `post`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PageContext<'a> {
    List {
        site: &'a SiteContext,
        posts: &'a [PostRecord],
    },
    Detail {
        site: &'a SiteContext,
        post: &'a PostRecord,
    },
}
