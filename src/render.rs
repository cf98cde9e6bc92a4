//! Template rendering and the Markdown transform.
//!
//! The site assembler only knows the [`Renderer`] trait: a template
//! identifier plus a typed [`PageContext`] in, rendered text out. The
//! production implementation is [`ThemeRenderer`], which loads a theme's
//! `layouts/` directory into [Tera](https://keats.github.io/tera/).
//!
//! ## Theme Layout
//!
//! ```text
//! themes/poetry/
//! ├── layouts/
//! │   ├── index.html    # List page: `site`, `posts`
//! │   ├── post.html     # Post detail: `site`, `post`
//! │   └── about.html    # About page: `site`, `post`
//! └── assets/           # Copied verbatim to <output>/assets
//! ```
//!
//! Autoescaping is on for all three templates. `site.footer` and
//! `post.body_html` are trusted markup and must be emitted with `| safe`.

use crate::types::PageContext;
use pulldown_cmark::{Options, Parser, html};
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("theme layouts not found: {0}")]
    MissingLayouts(PathBuf),
    #[error("template {template} failed: {message}")]
    Template { template: String, message: String },
}

impl RenderError {
    fn template(template: &str, err: &tera::Error) -> Self {
        Self::Template {
            template: template.to_string(),
            message: error_chain(err).join(": "),
        }
    }
}

/// Tera's top-level message rarely names the real cause, which sits further
/// down the source chain.
fn error_chain(err: &dyn std::error::Error) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut source = err.source();
    while let Some(err) = source {
        chain.push(err.to_string());
        source = err.source();
    }
    chain
}

/// The fixed set of templates a theme provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    Index,
    Post,
    About,
}

impl TemplateId {
    pub const ALL: [TemplateId; 3] = [TemplateId::Index, TemplateId::Post, TemplateId::About];

    /// File name under the theme's `layouts/` directory, also used as the
    /// template's registered name.
    pub fn file_name(self) -> &'static str {
        match self {
            TemplateId::Index => "index.html",
            TemplateId::Post => "post.html",
            TemplateId::About => "about.html",
        }
    }
}

/// Renders a page from a template and a structured context.
///
/// Implementations must be free of side effects: the same inputs always
/// produce the same text.
pub trait Renderer {
    fn render(&self, template: TemplateId, context: &PageContext) -> Result<String, RenderError>;
}

/// Tera-backed renderer for an on-disk theme.
pub struct ThemeRenderer {
    tera: Tera,
}

impl ThemeRenderer {
    /// Load and parse all three layouts from `layouts_dir`.
    ///
    /// A missing or unparsable template fails here, before any build step
    /// touches the output directory.
    pub fn load(layouts_dir: &Path) -> Result<Self, RenderError> {
        if !layouts_dir.is_dir() {
            return Err(RenderError::MissingLayouts(layouts_dir.to_path_buf()));
        }
        let files: Vec<(PathBuf, Option<&str>)> = TemplateId::ALL
            .iter()
            .map(|id| (layouts_dir.join(id.file_name()), Some(id.file_name())))
            .collect();

        let mut tera = Tera::default();
        tera.add_template_files(files)
            .map_err(|e| RenderError::template(&layouts_dir.display().to_string(), &e))?;
        Ok(Self { tera })
    }
}

impl Renderer for ThemeRenderer {
    fn render(&self, template: TemplateId, context: &PageContext) -> Result<String, RenderError> {
        let name = template.file_name();
        let context = Context::from_serialize(context).map_err(|e| RenderError::template(name, &e))?;
        self.tera
            .render(name, &context)
            .map_err(|e| RenderError::template(name, &e))
    }
}

/// Convert a Markdown body to HTML.
///
/// Tables, strikethrough and footnotes are enabled on top of CommonMark.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markdown, options);
    let mut body_html = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body_html, parser);
    body_html
}
