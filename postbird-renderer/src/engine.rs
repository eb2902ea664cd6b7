//! Tera rendering engine — front-matter + markdown assembly and slugging.
//!
//! # Output shape
//!
//! ```text
//! ---
//! title: "Cardinals Visit"
//! date: 2025-03-01T08:30:00Z
//! draft: false
//! author: "Backyard Bird AI"
//! description: "..."
//! tags: ["birds", "wildlife"]
//! categories: ["Daily Updates"]
//! ---
//!
//! <body>
//! ```
//!
//! The file name is `<YYYY-MM-DD>-<slugged-title>.md`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tera::Tera;

use postbird_core::types::{Artifact, RenderedFile};

use crate::context::FrontMatterContext;
use crate::error::{io_err, RenderError};

/// Name the post template is registered under. A user template directory may
/// override it by providing a file with this name.
pub const POST_TEMPLATE: &str = "post.md.tera";

const EMBEDDED_POST: &str = include_str!("templates/post.md.tera");

// ---------------------------------------------------------------------------
// Slugging
// ---------------------------------------------------------------------------

/// URL-friendly slug: date prefix plus the lowercased title with everything
/// but alphanumerics and whitespace dropped, words joined by `-`.
///
/// `slug("A Day in the Life!", 2025-03-01)` → `2025-03-01-a-day-in-the-life`.
pub fn slug(title: &str, date: DateTime<Utc>) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    let stem = if words.is_empty() {
        "untitled".to_string()
    } else {
        words.join("-")
    };
    format!("{}-{stem}", date.format("%Y-%m-%d"))
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Tera-based post renderer. Create once with [`Renderer::new`] and reuse.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Construct a [`Renderer`] with the embedded post template.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_template_dir(None)
    }

    /// Like [`Renderer::new`], but a `post.md.tera` found in
    /// `user_template_dir` replaces the embedded template.
    pub fn with_template_dir(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let mut source = EMBEDDED_POST.to_string();
        if let Some(dir) = user_template_dir {
            let candidate = dir.join(POST_TEMPLATE);
            if candidate.is_file() {
                source =
                    std::fs::read_to_string(&candidate).map_err(|e| io_err(&candidate, e))?;
                tracing::debug!("using post template override {}", candidate.display());
            }
        }
        let mut tera = Tera::default();
        tera.add_raw_template(POST_TEMPLATE, &source)?;
        Ok(Renderer { tera })
    }

    /// Render an artifact into a [`RenderedFile`] named `<slug>.md`.
    pub fn render(&self, artifact: &Artifact) -> Result<RenderedFile, RenderError> {
        let ctx = FrontMatterContext::from_artifact(artifact);
        let rendered = self.tera.render(POST_TEMPLATE, &ctx.to_tera_context()?)?;

        // Normalise line endings and end with exactly one newline.
        let mut content = rendered.replace("\r\n", "\n").trim_end().to_string();
        content.push('\n');

        Ok(RenderedFile {
            path: PathBuf::from(format!("{}.md", slug(&artifact.title, artifact.date))),
            bytes: content.into_bytes(),
        })
    }
}

/// Write `file` into `dir` atomically (`<name>.postbird.tmp` + rename).
///
/// Returns the final path.
pub fn write_rendered(dir: &Path, file: &RenderedFile) -> Result<PathBuf, RenderError> {
    let name = file.file_name().unwrap_or(file.path.as_path());
    let path = dir.join(name);
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let tmp = PathBuf::from(format!("{}.postbird.tmp", path.display()));
    std::fs::write(&tmp, &file.bytes).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, e));
    }
    tracing::info!("rendered {}", path.display());
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
