//! Site assembly: the build pipeline.
//!
//! A build is a strictly sequential batch over a freshly cleared output
//! directory:
//!
//! ```text
//! 1. Prepare    ensure <output>/ exists and is empty        (fatal on failure)
//! 2. Discover   regular files directly inside posts/        (fatal on failure)
//! 3. Load       front matter + Markdown, drop drafts        (per-post isolation)
//! 4. Posts      copy posts/<slug>/ assets, render post.html (per-post isolation)
//! 5. About      render about.md with about.html             (fatal on failure)
//! 6. Index      render index.html with the surviving posts  (fatal on failure)
//! 7. Assets     copy the theme's assets/ to <output>/assets (reported)
//! ```
//!
//! ## Output Structure
//!
//! ```text
//! public/
//! ├── index.html              # List page
//! ├── about/index.html        # About page
//! ├── trip/
//! │   ├── index.html          # One per non-draft post
//! │   └── photo.jpg           # Copied from content/posts/trip/
//! └── assets/                 # Copied from themes/<theme>/assets/
//! ```
//!
//! ## Failure Handling
//!
//! Nothing is rolled back: a build that stops partway leaves whatever was
//! already written. Per-post problems (unreadable file, template error,
//! asset copy failure) and per-file filesystem problems don't stop the
//! build; they are collected as [`BuildIssue`]s in the returned
//! [`BuildReport`] so they can be shown together at the end.
//!
//! ## Slugs
//!
//! A post's slug is its file name without the extension. Two posts with the
//! same slug write to the same directory and the one processed last wins;
//! the overlap is reported as [`BuildIssue::SlugCollision`].
//!
//! The about page always lands at `about/index.html`, whatever the about
//! file is called, and takes part in the same collision check. The slug
//! `assets` belongs to the theme assets, so a post with that slug is not
//! published and is reported as [`BuildIssue::ReservedSlug`].

use crate::config::{PostOrder, SiteConfig};
use crate::content::{self, ContentError};
use crate::fsutil::{self, CopyReport, FsError};
use crate::render::{RenderError, Renderer, TemplateId};
use crate::types::{PageContext, PostRecord, SiteContext};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Output directory of the about page.
pub const ABOUT_SLUG: &str = "about";
/// Output directory of the theme assets.
pub const ASSETS_DIR: &str = "assets";

/// Conditions that stop the build.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("cannot prepare output directory: {0}")]
    Prepare(#[source] FsError),
    #[error("cannot list posts in {path}: {source}")]
    Discover { path: PathBuf, source: io::Error },
    #[error("about page {path}: {error}")]
    About { path: PathBuf, error: PageError },
    #[error("cannot render list page: {0}")]
    Index(#[source] RenderError),
    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Why a single page could not be produced.
#[derive(Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    Load(#[from] ContentError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Assets(#[from] FsError),
    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// A problem that was recorded while the build carried on.
#[derive(Error, Debug)]
pub enum BuildIssue {
    #[error("post {path}: {error}")]
    Post { path: PathBuf, error: PageError },
    #[error("{0}")]
    Filesystem(FsError),
    #[error("theme assets: {0}")]
    ThemeAssets(FsError),
    #[error("post {path}: slug '{slug}' is reserved, not published")]
    ReservedSlug { slug: String, path: PathBuf },
    #[error("slug '{slug}' is produced by both {first} and {second}; the later one wins")]
    SlugCollision {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Progress events, one per major step.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    OutputPrepared {
        path: PathBuf,
        created: bool,
        removed: usize,
    },
    PostsDiscovered {
        path: PathBuf,
        count: usize,
    },
    DraftSkipped {
        slug: String,
        source: PathBuf,
    },
    AssetsCopied {
        from: PathBuf,
        to: PathBuf,
        files: usize,
    },
    /// `path` is relative to the output directory.
    PageWritten {
        path: PathBuf,
        title: String,
    },
    SlugCollision {
        slug: String,
    },
    ReservedSlugSkipped {
        slug: String,
        source: PathBuf,
    },
}

/// Everything a finished build produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Slugs on the list page, in list order.
    pub listed: Vec<String>,
    /// Slugs skipped as drafts.
    pub drafts: Vec<String>,
    /// Pages written, relative to the output directory.
    pub pages: Vec<PathBuf>,
    pub issues: Vec<BuildIssue>,
}

/// Where a page comes from and where it goes.
struct PageTarget<'a> {
    post: &'a PostRecord,
    template: TemplateId,
}

struct Assembler<'a> {
    config: &'a SiteConfig,
    site: SiteContext,
    output: PathBuf,
    renderer: &'a dyn Renderer,
    events: Option<Sender<BuildEvent>>,
    report: BuildReport,
}

/// Run the full build described by `config`.
///
/// `events` receives a [`BuildEvent`] as each step completes. Returns the
/// report on success, including any per-item issues; returns `Err` only for
/// the fatal conditions listed in the module docs.
pub fn build_site(
    config: &SiteConfig,
    renderer: &dyn Renderer,
    events: Option<Sender<BuildEvent>>,
) -> Result<BuildReport, BuildError> {
    let mut assembler = Assembler {
        config,
        site: SiteContext::from(&config.site),
        output: config.build.output_dir.clone(),
        renderer,
        events,
        report: BuildReport::default(),
    };
    assembler.run()?;
    Ok(assembler.report)
}

impl Assembler<'_> {
    fn run(&mut self) -> Result<(), BuildError> {
        self.prepare()?;
        let sources = self.discover()?;
        let posts = self.load(&sources);

        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        for post in &posts {
            self.note_slug(&mut seen, post);
            if let Err(error) = self.write_page(PageTarget {
                post,
                template: TemplateId::Post,
            }) {
                self.report.issues.push(BuildIssue::Post {
                    path: post.source_path.clone(),
                    error,
                });
            }
        }

        self.about(&mut seen)?;
        self.index(&posts)?;
        self.theme_assets();
        Ok(())
    }

    fn emit(&self, event: BuildEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is printing.
            let _ = tx.send(event);
        }
    }

    fn prepare(&mut self) -> Result<(), BuildError> {
        let cleared = fsutil::ensure_empty_directory(&self.output).map_err(BuildError::Prepare)?;
        self.emit(BuildEvent::OutputPrepared {
            path: self.output.clone(),
            created: cleared.created,
            removed: cleared.removed.len(),
        });
        self.report
            .issues
            .extend(cleared.failures.into_iter().map(BuildIssue::Filesystem));
        Ok(())
    }

    /// Regular, non-hidden files directly inside the posts directory, in
    /// directory listing order. Subdirectories are asset bundles.
    fn discover(&mut self) -> Result<Vec<PathBuf>, BuildError> {
        let posts_dir = self.config.build.posts_path();
        let entries = fs::read_dir(&posts_dir).map_err(|source| BuildError::Discover {
            path: posts_dir.clone(),
            source,
        })?;

        let mut sources = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    self.report
                        .issues
                        .push(BuildIssue::Filesystem(FsError::ReadDir {
                            path: posts_dir.clone(),
                            source,
                        }));
                    continue;
                }
            };
            let path = entry.path();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if !hidden && path.is_file() {
                sources.push(path);
            }
        }

        self.emit(BuildEvent::PostsDiscovered {
            path: posts_dir,
            count: sources.len(),
        });
        Ok(sources)
    }

    /// Load every source, drop drafts and order the survivors for the list
    /// page. Unreadable posts are recorded and skipped.
    fn load(&mut self, sources: &[PathBuf]) -> Vec<PostRecord> {
        let mut posts = Vec::new();
        for path in sources {
            match content::load_post(path) {
                Ok(post) if post.draft => {
                    self.emit(BuildEvent::DraftSkipped {
                        slug: post.slug.clone(),
                        source: path.clone(),
                    });
                    self.report.drafts.push(post.slug);
                }
                Ok(post) if post.slug == ASSETS_DIR => {
                    self.emit(BuildEvent::ReservedSlugSkipped {
                        slug: post.slug.clone(),
                        source: path.clone(),
                    });
                    self.report.issues.push(BuildIssue::ReservedSlug {
                        slug: post.slug,
                        path: path.clone(),
                    });
                }
                Ok(post) => posts.push(post),
                Err(error) => self.report.issues.push(BuildIssue::Post {
                    path: path.clone(),
                    error: error.into(),
                }),
            }
        }
        order_posts(&mut posts, self.config.build.order);
        self.report.listed = posts.iter().map(|p| p.slug.clone()).collect();
        posts
    }

    fn note_slug(&mut self, seen: &mut HashMap<String, PathBuf>, post: &PostRecord) {
        if let Some(first) = seen.insert(post.slug.clone(), post.source_path.clone()) {
            self.emit(BuildEvent::SlugCollision {
                slug: post.slug.clone(),
            });
            self.report.issues.push(BuildIssue::SlugCollision {
                slug: post.slug.clone(),
                first,
                second: post.source_path.clone(),
            });
        }
    }

    /// Copy co-located assets, then render and write `<output>/<slug>/index.html`.
    ///
    /// A failed asset copy is recorded and the page is still rendered.
    fn write_page(&mut self, target: PageTarget) -> Result<(), PageError> {
        let post = target.post;
        let page_dir = self.output.join(&post.slug);

        if let Some(assets) = asset_dir(&post.source_path) {
            match fsutil::copy_tree_contents_into(&assets, &page_dir) {
                Ok(copied) => self.record_copy(&assets, &page_dir, copied, BuildIssue::Filesystem),
                Err(error) => self.report.issues.push(BuildIssue::Post {
                    path: post.source_path.clone(),
                    error: error.into(),
                }),
            }
        }

        let html = self.renderer.render(
            target.template,
            &PageContext::Detail {
                site: &self.site,
                post,
            },
        )?;

        let relative = PathBuf::from(&post.slug).join("index.html");
        write_file(&self.output.join(&relative), &html)
            .map_err(|(path, source)| PageError::Write { path, source })?;
        self.page_written(relative, &post.title);
        Ok(())
    }

    /// The about page is not optional: any failure ends the build.
    fn about(&mut self, seen: &mut HashMap<String, PathBuf>) -> Result<(), BuildError> {
        let path = self.config.build.about_path();
        let mut about = content::load_post(&path).map_err(|e| BuildError::About {
            path: path.clone(),
            error: e.into(),
        })?;
        about.slug = ABOUT_SLUG.to_string();
        self.note_slug(seen, &about);
        self.write_page(PageTarget {
            post: &about,
            template: TemplateId::About,
        })
        .map_err(|error| BuildError::About { path, error })
    }

    fn index(&mut self, posts: &[PostRecord]) -> Result<(), BuildError> {
        let html = self
            .renderer
            .render(
                TemplateId::Index,
                &PageContext::List {
                    site: &self.site,
                    posts,
                },
            )
            .map_err(BuildError::Index)?;

        let relative = PathBuf::from("index.html");
        write_file(&self.output.join(&relative), &html)
            .map_err(|(path, source)| BuildError::Write { path, source })?;
        let title = self.site.display_name.clone();
        self.page_written(relative, &title);
        Ok(())
    }

    fn theme_assets(&mut self) {
        let from = self.config.build.theme_assets_path();
        let to = self.output.join(ASSETS_DIR);
        match fsutil::copy_tree(&from, &to) {
            Ok(copied) => self.record_copy(&from, &to, copied, BuildIssue::ThemeAssets),
            Err(e) => self.report.issues.push(BuildIssue::ThemeAssets(e)),
        }
    }

    fn record_copy(
        &mut self,
        from: &Path,
        to: &Path,
        copied: CopyReport,
        issue: fn(FsError) -> BuildIssue,
    ) {
        self.emit(BuildEvent::AssetsCopied {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            files: copied.files.len(),
        });
        self.report
            .issues
            .extend(copied.failures.into_iter().map(issue));
    }

    fn page_written(&mut self, relative: PathBuf, title: &str) {
        self.emit(BuildEvent::PageWritten {
            path: relative.clone(),
            title: title.to_string(),
        });
        self.report.pages.push(relative);
    }
}

/// `content/posts/trip.md` → `content/posts/trip/`, if that directory exists.
fn asset_dir(source: &Path) -> Option<PathBuf> {
    let dir = source.with_extension("");
    (dir != source && dir.is_dir()).then_some(dir)
}

/// Sort posts for the list page. Every ordering is stable.
pub fn order_posts(posts: &mut [PostRecord], order: PostOrder) {
    match order {
        PostOrder::Listing => {}
        PostOrder::Name => posts.sort_by(|a, b| a.slug.cmp(&b.slug)),
        PostOrder::Date => {
            posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)))
        }
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), (PathBuf, io::Error)> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| (parent.to_path_buf(), e))?;
    }
    fs::write(path, content).map_err(|e| (path.to_path_buf(), e))
}
