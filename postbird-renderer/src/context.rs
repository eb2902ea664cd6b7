//! Template context — serializable front-matter payload built from [`Artifact`].

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use postbird_core::types::Artifact;

use crate::error::RenderError;

/// Flat rendering payload for the post template.
///
/// String values are pre-escaped for use inside double-quoted YAML scalars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontMatterContext {
    pub title: String,
    /// RFC 3339, second precision, `Z` suffix.
    pub date: String,
    pub draft: bool,
    pub author: String,
    pub description: String,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    /// Markdown body, trimmed. Not escaped.
    pub body: String,
}

impl FrontMatterContext {
    pub fn from_artifact(artifact: &Artifact) -> Self {
        let meta = &artifact.metadata;
        Self {
            title: escape_quoted(&artifact.title),
            date: artifact.date.to_rfc3339_opts(SecondsFormat::Secs, true),
            draft: meta.draft,
            author: escape_quoted(&meta.author),
            description: escape_quoted(&meta.description),
            tags: artifact.tags.iter().map(|t| escape_quoted(t)).collect(),
            categories: meta.categories.iter().map(|c| escape_quoted(c)).collect(),
            body: artifact.body.trim().replace("\r\n", "\n"),
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

/// Escape a value for a double-quoted YAML scalar on a single line.
pub(crate) fn escape_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' | '\r' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}
