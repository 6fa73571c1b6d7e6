//! Builds the client-side search index. The token index itself comes from
//! `elasticlunr`; alongside it we store the query-time field boosts and a
//! slug-keyed table of titles and excerpts the client uses to render hits.

use std::{collections::BTreeMap, sync::LazyLock};

use elasticlunr::Index;
use regex::Regex;
use serde::Serialize;

use crate::post::Post;

/// Indexed fields, in the order their values are passed to
/// [`Index::add_doc`].
pub const FIELDS: [&str; 3] = ["title", "content", "tags"];

const TITLE_BOOST: u32 = 10;
const CONTENT_BOOST: u32 = 1;
const TAGS_BOOST: u32 = 5;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// The boost a field receives when the client runs a query.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldConfig {
    pub boost: u32,
}

/// What a search hit shows for a post.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    pub title: String,
    pub excerpt: String,
}

/// The complete search document written to `search-index.json` and embedded
/// in the index page.
#[derive(Serialize)]
pub struct SearchIndex {
    /// The serialized inverted index; document refs are post slugs.
    pub index: Index,

    /// Field boosts to pass along with each query.
    pub fields: BTreeMap<&'static str, FieldConfig>,

    /// Slug to title/excerpt lookup for rendering results.
    pub posts: BTreeMap<String, SearchEntry>,
}

impl SearchIndex {
    /// Serializes the document as compact JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serializes the document for embedding in an inline `<script>`: a
    /// literal `</` would close the script element early.
    pub fn to_inline_json(&self) -> serde_json::Result<String> {
        Ok(self.to_json()?.replace("</", "<\\/"))
    }
}

/// Replaces HTML tags with spaces, leaving the text content.
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, " ").into_owned()
}

/// Indexes `posts` by title, tag-stripped body, and space-joined tags.
pub fn build_index(posts: &[Post]) -> SearchIndex {
    let mut index = Index::new(&FIELDS);
    let mut entries = BTreeMap::new();
    for post in posts {
        let content = strip_tags(&post.body);
        let tags = post.tags.join(" ");
        index.add_doc(&post.slug, [post.title.as_str(), content.as_str(), tags.as_str()]);
        entries.insert(
            post.slug.clone(),
            SearchEntry {
                title: post.title.clone(),
                excerpt: post.excerpt.clone(),
            },
        );
    }

    let fields = [
        ("title", TITLE_BOOST),
        ("content", CONTENT_BOOST),
        ("tags", TAGS_BOOST),
    ]
    .into_iter()
    .map(|(name, boost)| (name, FieldConfig { boost }))
    .collect();

    SearchIndex {
        index,
        fields,
        posts: entries,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::series::test::post;
    use serde_json::Value;

    #[test]
    fn test_strip_tags() {
        assert_eq!(" hello  world  ", strip_tags("<p>hello <em>world</em></p>"));
    }

    #[test]
    fn test_build_index() -> serde_json::Result<()> {
        let mut a = post("ownership", "2025-11-12", None);
        a.title = "Ownership".to_owned();
        a.tags = vec!["rust".to_owned(), "memory".to_owned()];
        let b = post("goroutines", "2025-11-11", None);

        let search = build_index(&[a, b]);
        let json: Value = serde_json::from_str(&search.to_json()?)?;

        assert_eq!("Ownership", json["posts"]["ownership"]["title"]);
        assert_eq!("Excerpt of ownership", json["posts"]["ownership"]["excerpt"]);
        assert_eq!("Title of goroutines", json["posts"]["goroutines"]["title"]);
        assert_eq!(10, json["fields"]["title"]["boost"]);
        assert_eq!(5, json["fields"]["tags"]["boost"]);
        assert_eq!(1, json["fields"]["content"]["boost"]);
        assert!(json["index"].is_object());
        Ok(())
    }

    #[test]
    fn test_inline_json_cannot_close_script() -> serde_json::Result<()> {
        let mut p = post("x", "2025-11-12", None);
        p.excerpt = "</script><script>alert(1)</script>".to_owned();
        let inline = build_index(&[p]).to_inline_json()?;
        assert!(!inline.contains("</script>"));
        assert!(inline.contains(r"<\/script>"));
        Ok(())
    }
}
