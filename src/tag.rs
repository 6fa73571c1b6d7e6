//! Defines the [`TagCount`] type and the tag index shown in the index page
//! sidebar.

use crate::post::Post;

/// A tag and the number of posts carrying it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagCount {
    /// The tag as written in front-matter.
    pub name: String,

    /// The number of posts tagged with `name`.
    pub count: usize,
}

/// Counts tag occurrences across `posts`, most frequent first. Tags with equal
/// counts keep the order in which they were first seen.
pub fn tag_counts(posts: &[Post]) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = Vec::new();
    for post in posts {
        for tag in &post.tags {
            match counts.iter_mut().find(|c| &c.name == tag) {
                Some(c) => c.count += 1,
                None => counts.push(TagCount {
                    name: tag.clone(),
                    count: 1,
                }),
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::series::test::post;

    fn tagged(slug: &str, tags: &[&str]) -> Post {
        let mut p = post(slug, "2025-11-12", None);
        p.tags = tags.iter().map(|t| t.to_string()).collect();
        p
    }

    #[test]
    fn test_tag_counts() {
        let posts = vec![
            tagged("a", &["rust", "go"]),
            tagged("b", &["go"]),
            tagged("c", &["go", "web"]),
        ];
        assert_eq!(
            vec![
                TagCount { name: "go".to_owned(), count: 3 },
                TagCount { name: "rust".to_owned(), count: 1 },
                TagCount { name: "web".to_owned(), count: 1 },
            ],
            tag_counts(&posts)
        );
    }

    #[test]
    fn test_no_tags() {
        assert!(tag_counts(&[tagged("a", &[])]).is_empty());
    }
}
