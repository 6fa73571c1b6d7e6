//! Groups posts into series. A series is read front to back, so its members
//! are ordered oldest first, the reverse of the main listing.

use crate::post::Post;
use std::collections::BTreeMap;

/// A named, date-ordered sequence of posts sharing a `series` attribute.
#[derive(Debug)]
pub struct Series<'a> {
    /// The series name as written in front-matter.
    pub name: String,

    /// The URL-safe name used for the series page file.
    pub slug: String,

    /// Members, oldest first. Members with equal dates keep the order they
    /// had in the post list the series was grouped from.
    pub posts: Vec<&'a Post>,
}

/// The previous and next posts around a given post within a sequence.
#[derive(Debug, Default, PartialEq)]
pub struct Neighbors<'a> {
    pub prev: Option<&'a Post>,
    pub next: Option<&'a Post>,
}

impl<'a> Series<'a> {
    /// Returns the zero-based position of `slug` in the series.
    pub fn position(&self, slug: &str) -> Option<usize> {
        self.posts.iter().position(|p| p.slug == slug)
    }

    /// Returns the members before and after `slug`. A slug that isn't a
    /// member has neither.
    pub fn neighbors(&self, slug: &str) -> Neighbors<'a> {
        match self.position(slug) {
            None => Neighbors::default(),
            Some(i) => Neighbors {
                prev: i.checked_sub(1).map(|j| self.posts[j]),
                next: self.posts.get(i + 1).copied(),
            },
        }
    }

    /// The chronologically latest member.
    pub fn latest(&self) -> Option<&'a Post> {
        self.posts.last().copied()
    }
}

/// Series keyed by name. Iteration is alphabetical by name.
pub type SeriesMap<'a> = BTreeMap<String, Series<'a>>;

/// Groups `posts` by their `series` attribute. Posts without one belong to no
/// group.
pub fn group_series(posts: &[Post]) -> SeriesMap<'_> {
    let mut map = SeriesMap::new();
    for post in posts {
        if let Some(name) = &post.series {
            map.entry(name.clone())
                .or_insert_with(|| Series {
                    name: name.clone(),
                    slug: series_slug(name),
                    posts: Vec::new(),
                })
                .posts
                .push(post);
        }
    }
    for series in map.values_mut() {
        series.posts.sort_by(|a, b| a.date.cmp(&b.date));
    }
    map
}

/// Derives the file name (without extension) of a series page.
pub fn series_slug(name: &str) -> String {
    slug::slugify(name)
}
