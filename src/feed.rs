//! Support for creating RSS feeds from a list of posts.

use crate::config::Config;
use crate::date;
use crate::post::Post;
use chrono::{DateTime, FixedOffset};
use rss::validation::{Validate, ValidationError};
use rss::{CategoryBuilder, Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use std::io::Write;

/// The number of most recent posts a feed carries.
pub const FEED_SIZE: usize = 20;

/// Bundled configuration for creating a feed.
pub struct FeedConfig {
    pub title: String,
    pub description: String,
    pub link: String,
    pub language: String,

    /// Stamped on the channel as its publication date.
    pub build_time: DateTime<FixedOffset>,
}

impl FeedConfig {
    /// Feed metadata for the site described by `config`, built at
    /// `build_time`.
    pub fn from_config(config: &Config, build_time: DateTime<FixedOffset>) -> FeedConfig {
        FeedConfig {
            title: config.site.title.clone(),
            description: config.site.description.clone(),
            link: config.site.url.to_string(),
            language: config.site.language.clone(),
            build_time,
        }
    }
}

/// Creates a feed from a [`FeedConfig`] and the newest [`FEED_SIZE`] of
/// `posts` (which must already be sorted newest first), validates it, and
/// writes the result to `w`. `post_url` maps a slug to the canonical URL of
/// its page.
pub fn write_feed<W: Write>(
    config: FeedConfig,
    posts: &[Post],
    post_url: impl Fn(&str) -> String,
    w: W,
) -> Result<()> {
    let channel = feed(config, posts, post_url);
    channel.validate()?;
    channel.write_to(w)?;
    Ok(())
}

fn feed(config: FeedConfig, posts: &[Post], post_url: impl Fn(&str) -> String) -> Channel {
    ChannelBuilder::default()
        .title(config.title)
        .link(config.link)
        .description(config.description)
        .language(Some(config.language))
        .pub_date(Some(config.build_time.to_rfc2822()))
        .generator(Some(String::from("tilgen")))
        .items(feed_items(posts, post_url))
        .build()
}

fn feed_items(posts: &[Post], post_url: impl Fn(&str) -> String) -> Vec<Item> {
    posts
        .iter()
        .take(FEED_SIZE)
        .map(|post| {
            let link = post_url(&post.slug);
            ItemBuilder::default()
                .title(Some(post.title.clone()))
                .link(Some(link.clone()))
                .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
                .description(Some(post.excerpt.clone()))
                .pub_date(Some(post.date.with_timezone(&date::offset()).to_rfc2822()))
                .categories(
                    post.tags
                        .iter()
                        .map(|tag| CategoryBuilder::default().name(tag.clone()).build())
                        .collect::<Vec<_>>(),
                )
                .build()
        })
        .collect()
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the assembled channel isn't a valid RSS document.
    #[error("invalid feed: {0}")]
    Invalid(#[from] ValidationError),

    /// Returned when the feed can't be serialized or written.
    #[error("writing feed: {0}")]
    Rss(#[from] rss::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::series::test::post;

    fn config() -> FeedConfig {
        FeedConfig {
            title: "TIL".to_owned(),
            description: "Today I Learned".to_owned(),
            link: "https://example.github.io/TIL/".to_owned(),
            language: "ko".to_owned(),
            build_time: date::now(),
        }
    }

    fn url(slug: &str) -> String {
        format!("https://example.github.io/TIL/posts/{}.html", slug)
    }

    #[test]
    fn test_feed_items() {
        let mut p = post("ownership", "2025-11-12 09:30", None);
        p.tags = vec!["rust".to_owned(), "memory".to_owned()];
        let channel = feed(config(), &[p], url);

        assert_eq!("TIL", channel.title());
        assert_eq!(Some("ko"), channel.language());
        let item = &channel.items()[0];
        assert_eq!(Some("Title of ownership"), item.title());
        assert_eq!(Some(url("ownership").as_str()), item.link());
        assert_eq!(Some("Excerpt of ownership"), item.description());
        assert_eq!(Some("Wed, 12 Nov 2025 09:30:00 +0900"), item.pub_date());
        let categories: Vec<&str> = item.categories().iter().map(|c| c.name()).collect();
        assert_eq!(vec!["rust", "memory"], categories);
        assert!(item.guid().unwrap().is_permalink());
    }

    #[test]
    fn test_feed_is_capped() {
        let posts: Vec<Post> = (0..25)
            .map(|i| post(&format!("p{}", i), "2025-11-12", None))
            .collect();
        assert_eq!(FEED_SIZE, feed(config(), &posts, url).items().len());
    }

    #[test]
    fn test_write_feed() -> Result<()> {
        let mut out = Vec::new();
        write_feed(config(), &[post("a", "2025-11-12", None)], url, &mut out)?;
        let xml = String::from_utf8(out).unwrap();
        assert!(xml.contains("<rss"));
        assert!(xml.contains("<link>https://example.github.io/TIL/posts/a.html</link>"));
        Ok(())
    }
}
