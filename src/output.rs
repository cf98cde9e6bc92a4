//! CLI output formatting.
//!
//! Each concern has a `format_*` function returning `Vec<String>` for
//! testability, and the binary prints the lines. Format functions are pure:
//! no I/O, no side effects.
//!
//! # Build Output
//!
//! ```text
//! Cleared public/ (4 entries removed)
//! Found 4 files in content/posts
//! Skipped draft wip (content/posts/wip.md)
//! Copied 1 file content/posts/trip → public/trip
//! A Trip → trip/index.html
//! Hello World → hello-world/index.html
//! About → about/index.html
//! Verse → index.html
//! Copied 2 files themes/poetry/assets → public/assets
//!
//! Built 4 pages, 2 posts listed, 1 draft skipped
//! ```
//!
//! Problems that did not stop the build are listed after the summary.

use crate::scaffold::ScaffoldOutcome;
use crate::site::{BuildEvent, BuildReport};

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Format a single build progress event as display lines.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    let line = match event {
        BuildEvent::OutputPrepared {
            path,
            created: true,
            ..
        } => format!("Created {}/", path.display()),
        BuildEvent::OutputPrepared { path, removed, .. } => format!(
            "Cleared {}/ ({} removed)",
            path.display(),
            plural(*removed, "entry", "entries")
        ),
        BuildEvent::PostsDiscovered { path, count } => {
            format!("Found {} in {}", plural(*count, "file", "files"), path.display())
        }
        BuildEvent::DraftSkipped { slug, source } => {
            format!("Skipped draft {} ({})", slug, source.display())
        }
        BuildEvent::AssetsCopied { from, to, files } => format!(
            "Copied {} {} \u{2192} {}",
            plural(*files, "file", "files"),
            from.display(),
            to.display()
        ),
        BuildEvent::PageWritten { path, title } => {
            format!("{} \u{2192} {}", title, path.display())
        }
        BuildEvent::SlugCollision { slug } => {
            format!("Warning: slug '{slug}' written more than once")
        }
        BuildEvent::ReservedSlugSkipped { slug, source } => {
            format!("Skipped {}: slug '{}' is reserved", source.display(), slug)
        }
    };
    vec![line]
}

/// Format the end-of-build summary, followed by any recorded issues.
pub fn format_build_summary(report: &BuildReport) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!(
            "Built {}, {} listed, {} skipped",
            plural(report.pages.len(), "page", "pages"),
            plural(report.listed.len(), "post", "posts"),
            plural(report.drafts.len(), "draft", "drafts"),
        ),
    ];

    if !report.issues.is_empty() {
        lines.push(format!(
            "{}:",
            plural(report.issues.len(), "problem", "problems")
        ));
        for issue in &report.issues {
            lines.push(format!("    {issue}"));
        }
    }
    lines
}

/// Format the result of `sen new`.
pub fn format_scaffold_outcome(outcome: &ScaffoldOutcome) -> Vec<String> {
    match outcome {
        ScaffoldOutcome::Created(path) => vec![format!("Created {}", path.display())],
        ScaffoldOutcome::AlreadyExists(path) => {
            vec![format!("{} already exists, left untouched", path.display())]
        }
    }
}
