//! Content file loading.
//!
//! A content file is an optional YAML front-matter block fenced by `---`
//! lines, followed by a Markdown body:
//!
//! ```text
//! ---
//! title: "Hello World"
//! date: 2023-12-03T09:30:00+05:30
//! draft: false
//! ---
//! Body in *Markdown*.
//! ```
//!
//! ## Defaults
//!
//! Front matter is lenient. Whatever can't be read falls back to a default
//! instead of failing the build:
//!
//! | Key     | Default      | Notes                                       |
//! |---------|--------------|---------------------------------------------|
//! | `title` | `"Untitled"` | Numbers and booleans are stringified        |
//! | `date`  | `"Undated"`  | Opaque display string, never parsed         |
//! | `draft` | `true`       | A post without `draft: false` is a draft    |
//!
//! A block that opens but never closes is not front matter: the whole file
//! becomes the body. Invalid YAML inside a closed block yields all defaults.

use crate::render::markdown_to_html;
use crate::types::PostRecord;
use serde_yaml::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_DATE: &str = "Undated";

const FENCE: &str = "---";

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot derive a slug from {0}")]
    InvalidFileName(PathBuf),
}

/// Resolved front matter. Always complete; missing values are defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    pub title: String,
    pub date: String,
    pub draft: bool,
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            date: DEFAULT_DATE.to_string(),
            draft: true,
        }
    }
}

/// Split a leading fenced metadata block from the body.
///
/// Returns `(Some(metadata), body)` when the first line is `---` and a later
/// line closes the block, otherwise `(None, input)`.
pub fn split_front_matter(input: &str) -> (Option<&str>, &str) {
    let text = input.strip_prefix('\u{feff}').unwrap_or(input);

    let (first, rest) = match text.find('\n') {
        Some(i) => (&text[..i], &text[i + 1..]),
        None => (text, ""),
    };
    if !is_fence(first) {
        return (None, text);
    }

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if is_fence(line) {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, text)
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == FENCE
}

/// Parse a metadata block, defaulting anything absent or unreadable.
pub fn parse_front_matter(block: &str) -> FrontMatter {
    let mut front = FrontMatter::default();
    let Ok(value) = serde_yaml::from_str::<Value>(block) else {
        return front;
    };

    if let Some(title) = value.get("title").and_then(scalar_to_string) {
        front.title = title;
    }
    if let Some(date) = value.get("date").and_then(scalar_to_string) {
        front.date = date;
    }
    if let Some(draft) = value.get("draft").and_then(as_bool) {
        front.draft = draft;
    }
    front
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// File name without its extension: `content/posts/trip.md` → `trip`.
pub fn slug_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
}

/// Build a [`PostRecord`] from file contents that have already been read.
pub fn parse_post(source_path: &Path, input: &str) -> Result<PostRecord, ContentError> {
    let slug = slug_from_path(source_path)
        .ok_or_else(|| ContentError::InvalidFileName(source_path.to_path_buf()))?;
    let (block, body) = split_front_matter(input);
    let front = block.map(parse_front_matter).unwrap_or_default();

    Ok(PostRecord {
        title: front.title,
        date: front.date,
        draft: front.draft,
        slug,
        body_html: markdown_to_html(body),
        source_path: source_path.to_path_buf(),
    })
}

/// Read and parse one content file.
pub fn load_post(path: &Path) -> Result<PostRecord, ContentError> {
    let input = fs::read_to_string(path).map_err(|source| ContentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_post(path, &input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // =========================================================================
    // split_front_matter
    // =========================================================================

    #[test]
    fn split_separates_block_and_body() {
        let (meta, body) = split_front_matter("---\ntitle: A\n---\nHello\n");
        assert_eq!(meta, Some("title: A\n"));
        assert_eq!(body, "Hello\n");
    }

    #[test]
    fn split_without_block_returns_whole_input() {
        let input = "# Just markdown\n";
        assert_eq!(split_front_matter(input), (None, input));
    }

    #[test]
    fn split_unclosed_block_is_body() {
        let input = "---\ntitle: A\nno closing fence\n";
        assert_eq!(split_front_matter(input), (None, input));
    }

    #[test]
    fn split_handles_crlf_and_bom() {
        let (meta, body) = split_front_matter("\u{feff}---\r\ntitle: A\r\n---\r\nBody");
        assert_eq!(meta, Some("title: A\r\n"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn split_empty_block() {
        assert_eq!(split_front_matter("---\n---\n"), (Some(""), ""));
    }

    #[test]
    fn split_only_first_closing_fence_counts() {
        let (meta, body) = split_front_matter("---\na: 1\n---\ntext\n---\nmore\n");
        assert_eq!(meta, Some("a: 1\n"));
        assert_eq!(body, "text\n---\nmore\n");
    }

    #[test]
    fn split_requires_fence_on_first_line() {
        let input = "intro\n---\ntitle: A\n---\n";
        assert_eq!(split_front_matter(input).0, None);
    }

    // =========================================================================
    // parse_front_matter
    // =========================================================================

    #[test]
    fn parse_reads_all_keys() {
        let front = parse_front_matter(
            "title: \"Hello World\"\ndate: 2023-12-03T09:30:00+05:30\ndraft: false\n",
        );
        assert_eq!(front.title, "Hello World");
        assert_eq!(front.date, "2023-12-03T09:30:00+05:30");
        assert!(!front.draft);
    }

    #[test]
    fn parse_missing_keys_use_defaults() {
        let front = parse_front_matter("title: Only a title\n");
        assert_eq!(front.title, "Only a title");
        assert_eq!(front.date, DEFAULT_DATE);
        assert!(front.draft);
    }

    #[test]
    fn parse_invalid_yaml_is_all_defaults() {
        assert_eq!(parse_front_matter("title: [unclosed\n"), FrontMatter::default());
    }

    #[test]
    fn parse_non_mapping_is_all_defaults() {
        assert_eq!(parse_front_matter("- a\n- b\n"), FrontMatter::default());
        assert_eq!(parse_front_matter(""), FrontMatter::default());
    }

    #[test]
    fn parse_stringifies_scalar_values() {
        let front = parse_front_matter("title: 1984\ndate: 2023\n");
        assert_eq!(front.title, "1984");
        assert_eq!(front.date, "2023");
    }

    #[test]
    fn parse_unusable_values_fall_back() {
        let front = parse_front_matter("title: [a, b]\ndraft: maybe\n");
        assert_eq!(front.title, DEFAULT_TITLE);
        assert!(front.draft);
    }

    #[test]
    fn parse_draft_accepts_string_booleans() {
        assert!(!parse_front_matter("draft: \"false\"\n").draft);
        assert!(parse_front_matter("draft: \"TRUE\"\n").draft);
    }

    // =========================================================================
    // parse_post / load_post
    // =========================================================================

    #[test]
    fn slug_strips_extension() {
        assert_eq!(slug_from_path(Path::new("content/posts/trip.md")).as_deref(), Some("trip"));
        assert_eq!(slug_from_path(Path::new("notes")).as_deref(), Some("notes"));
    }

    #[test]
    fn parse_post_builds_record() {
        let post = parse_post(
            Path::new("content/posts/hello.md"),
            "---\ntitle: \"Hello World\"\ndate: today\ndraft: false\n---\nSome *words*.\n",
        )
        .unwrap();

        assert_eq!(post.slug, "hello");
        assert_eq!(post.title, "Hello World");
        assert_eq!(post.date, "today");
        assert!(!post.draft);
        assert_eq!(post.body_html, "<p>Some <em>words</em>.</p>\n");
        assert_eq!(post.source_path, PathBuf::from("content/posts/hello.md"));
    }

    #[test]
    fn parse_post_without_front_matter_is_draft() {
        let post = parse_post(Path::new("loose.md"), "Just text").unwrap();
        assert_eq!(post.title, DEFAULT_TITLE);
        assert_eq!(post.date, DEFAULT_DATE);
        assert!(post.draft);
        assert!(post.body_html.contains("Just text"));
    }

    #[test]
    fn load_post_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("first.md");
        fs::write(&path, "---\ntitle: First\ndraft: false\n---\nbody\n").unwrap();

        let post = load_post(&path).unwrap();
        assert_eq!(post.slug, "first");
        assert_eq!(post.title, "First");
    }

    #[test]
    fn load_post_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_post(&tmp.path().join("gone.md"));
        assert!(matches!(result, Err(ContentError::Read { .. })));
    }
}
