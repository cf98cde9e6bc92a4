//! # sen
//!
//! A simple static site generator for Markdown blogs. Posts are Markdown
//! files with YAML front matter, pages are rendered through a theme's Tera
//! templates, and the result is a directory of plain HTML plus copied assets.
//!
//! # Project Layout
//!
//! ```text
//! config.toml                  # Optional, see `sen gen-config`
//! content/
//! ├── about.md                 # Rendered to about/index.html
//! └── posts/
//!     ├── hello-world.md       # One page per post with `draft: false`
//!     ├── trip.md
//!     └── trip/                # Copied next to trip/index.html
//!         └── photo.jpg
//! themes/poetry/
//! ├── layouts/                 # index.html, post.html, about.html
//! └── assets/                  # Copied to public/assets
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`site`] | The build pipeline: prepare, discover, load, render, copy |
//! | [`content`] | Front-matter splitting and lenient parsing into [`types::PostRecord`] |
//! | [`fsutil`] | Clearing, copying and existence checks with per-entry failure reporting |
//! | [`render`] | The [`render::Renderer`] seam, the Tera theme renderer and Markdown |
//! | [`scaffold`] | `sen new`: front-matter-only post files with a local timestamp |
//! | [`serve`] | `sen serve`: static preview server for the output directory |
//! | [`config`] | `config.toml` loading and validation |
//! | [`types`] | Build-scoped records and template contexts |
//! | [`output`] | CLI status line formatting |
//!
//! # Design Decisions
//!
//! ## Clean Rebuilds Only
//!
//! Every build empties the output directory and writes everything again.
//! There is no cache and no incremental mode, so two builds of unchanged
//! content produce identical trees.
//!
//! ## Drafts by Default
//!
//! A post is published only when its front matter says `draft: false`. A
//! missing field, a missing block, or an unreadable block all mean draft.
//!
//! ## Best-Effort Batches
//!
//! One broken post never hides the rest of the site. Per-post failures are
//! collected into [`site::BuildReport`] and listed after the build; only an
//! unusable output directory, an unreadable posts directory, the about page
//! and the list page stop a build.

pub mod config;
pub mod content;
pub mod fsutil;
pub mod output;
pub mod render;
pub mod scaffold;
pub mod serve;
pub mod site;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
