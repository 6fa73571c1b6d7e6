//! Defines the [`Post`] type and the front-matter schema it is parsed from.

use crate::date::DateInput;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// Title used when a post's front-matter doesn't declare one.
pub const UNTITLED: &str = "Untitled";

/// Number of characters of the raw body used for a derived excerpt.
pub const EXCERPT_CHARS: usize = 200;

/// Represents a blog post. Built once per build from a source file and not
/// modified afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The file name without its extension. Unique across a build and used
    /// for the output file name (`posts/{slug}.html`).
    pub slug: String,

    /// The title of the post.
    pub title: String,

    /// The normalized date of the post.
    pub date: DateTime<FixedOffset>,

    /// The tags of the post, without duplicates, in declaration order.
    pub tags: Vec<String>,

    /// The series the post belongs to, if any.
    pub series: Option<String>,

    /// The social-preview image declared by the post, if any.
    pub image: Option<String>,

    /// The author-supplied excerpt, or the first [`EXCERPT_CHARS`] characters
    /// of the raw body followed by `...`.
    pub excerpt: String,

    /// The rendered HTML body.
    pub body: String,

    /// The source file the post was read from.
    pub source_path: PathBuf,
}

impl Post {
    /// The site-relative URL of the post page under `base_path` (e.g.,
    /// `/TIL/posts/hello.html`).
    pub fn href(&self, base_path: &str) -> String {
        format!("{}/posts/{}.html", base_path, self.slug)
    }
}

/// Derives the default excerpt from a raw (un-rendered) body.
pub fn derive_excerpt(raw_body: &str) -> String {
    let mut excerpt: String = raw_body.chars().take(EXCERPT_CHARS).collect();
    excerpt.push_str("...");
    excerpt
}

/// The recognized front-matter keys. Unknown keys are ignored.
#[derive(Deserialize, Default, Debug)]
pub struct Frontmatter {
    /// The title of the post.
    #[serde(default)]
    pub title: Option<String>,

    /// The date of the post, in any form [`crate::date::normalize`] accepts.
    #[serde(default)]
    pub date: Option<DateInput>,

    /// The tags associated with the post; a sequence or a single string.
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,

    /// The series the post belongs to.
    #[serde(default)]
    pub series: Option<String>,

    /// An explicit excerpt.
    #[serde(default)]
    pub excerpt: Option<String>,

    /// A social-preview image URL.
    #[serde(default)]
    pub image: Option<String>,

    /// The draft flag. Kept as a raw value because only a literal boolean
    /// `true` marks a draft; `"true"` or `yes` do not.
    #[serde(default)]
    pub draft: serde_yaml::Value,
}

impl Frontmatter {
    /// Reports whether the draft flag is exactly `true`.
    pub fn is_draft(&self) -> bool {
        self.draft == serde_yaml::Value::Bool(true)
    }
}

/// Accepts a sequence of scalars or a single scalar. Numbers and booleans
/// (`tags: [go, 1.21]`) become their textual form.
fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let values = match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Sequence(values) => values,
        scalar => vec![scalar],
    };

    let mut tags = Vec::with_capacity(values.len());
    for value in values {
        tags.push(match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => continue,
            other => {
                return Err(D::Error::custom(format!(
                    "expected a tag scalar, found {:?}",
                    other
                )))
            }
        });
    }

    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !unique.iter().any(|t| t == tag) {
            unique.push(tag.to_owned());
        }
    }
    Ok(unique)
}
