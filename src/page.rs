//! Assembles finished HTML pages. Each page kind is a [`View`] that knows its
//! template and computes the fragments that template needs; [`assemble`]
//! adds the shared header and footer, renders, and applies the local-mode
//! base-path rewrite.

use crate::config::Config;
use crate::date;
use crate::fragment::{self, SharePlacement};
use crate::post::Post;
use crate::series::{Series, SeriesMap};
use crate::tag::tag_counts;
use crate::template::{Fragments, Result, Template, Templates};

/// The header navigation tab highlighted on a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nav {
    Post,
    Series,
    About,
}

impl Nav {
    fn fragments(self) -> Fragments {
        let active = |tab: Nav| if tab == self { "active" } else { "" };
        Fragments::new()
            .with("navActivePost", active(Nav::Post))
            .with("navActiveSeries", active(Nav::Series))
            .with("navActiveAbout", active(Nav::About))
    }
}

/// A page kind: the template it renders with and the fragments it fills the
/// template with. `header` and `footer` are supplied by [`assemble`].
pub trait View {
    /// The header tab this page highlights.
    const NAV: Nav;

    fn template<'t>(&self, templates: &'t Templates) -> &'t Template;

    fn fragments(&self, config: &Config) -> Fragments;
}

/// Renders `view` into a complete page.
pub fn assemble<V: View>(view: &V, templates: &Templates, config: &Config) -> Result<String> {
    let header = templates.header.render(&V::NAV.fragments())?;
    let footer = templates.footer.render(&Fragments::new())?;
    let fragments = view
        .fragments(config)
        .with("header", header)
        .with("footer", footer);
    let html = view.template(templates).render(&fragments)?;
    Ok(config.rewrite_base_path(html))
}

/// The page for `posts[index]`. `posts` is the full listing, newest first.
pub struct PostView<'a> {
    pub posts: &'a [Post],
    pub index: usize,
    pub series: &'a SeriesMap<'a>,
}

impl<'a> PostView<'a> {
    pub fn post(&self) -> &'a Post {
        &self.posts[self.index]
    }

    fn series_position(&self) -> Option<(&'a Series<'a>, usize)> {
        let post = self.post();
        let series = self.series.get(post.series.as_ref()?)?;
        Some((series, series.position(&post.slug)?))
    }
}

impl View for PostView<'_> {
    const NAV: Nav = Nav::Post;

    fn template<'t>(&self, templates: &'t Templates) -> &'t Template {
        &templates.post
    }

    fn fragments(&self, config: &Config) -> Fragments {
        let post = self.post();
        let base = config.base_path();
        let url = config.post_url(&post.slug);
        let description = match post.excerpt.is_empty() {
            true => &post.title,
            false => &post.excerpt,
        };
        let image = post
            .image
            .as_deref()
            .or(config.site.default_image.as_deref())
            .unwrap_or_default();

        let mut fragments = Fragments::new()
            .with("title", fragment::escape(&post.title))
            .with("content", post.body.as_str())
            .with("date", date::display(post.date))
            .with("tags", fragment::tag_spans(&post.tags))
            .with("description", fragment::escape(description))
            .with("url", fragment::escape(&url))
            .with("image", fragment::escape(image))
            .with("encodedTitle", urlencoding::encode(&post.title))
            .with("encodedUrl", urlencoding::encode(&url));

        match self.series_position() {
            Some((series, position)) => {
                let neighbors = series.neighbors(&post.slug);
                fragments.insert("seriesInfo", fragment::series_info(series, position, base));
                fragments.insert(
                    "seriesShare",
                    fragment::share_block(SharePlacement::Series, &post.title, &url),
                );
                fragments.insert(
                    "seriesNavigation",
                    fragment::series_navigation(neighbors.prev, neighbors.next, base),
                );
                fragments.insert("footerShare", "");
                fragments.insert("prevPost", "");
                fragments.insert("nextPost", "");
            }
            None => {
                let prev = self.index.checked_sub(1).and_then(|i| self.posts.get(i));
                let next = self.posts.get(self.index + 1);
                fragments.insert("seriesInfo", "");
                fragments.insert("seriesShare", "");
                fragments.insert("seriesNavigation", "");
                fragments.insert(
                    "footerShare",
                    fragment::share_block(SharePlacement::Footer, &post.title, &url),
                );
                fragments.insert("prevPost", fragment::prev_link(prev, base));
                fragments.insert("nextPost", fragment::next_link(next, base));
            }
        }
        fragments
    }
}

/// The home page: tag sidebar, every post preview, and the inline search
/// index.
pub struct IndexView<'a> {
    pub posts: &'a [Post],

    /// The search document, already escaped for an inline `<script>`.
    pub search_json: &'a str,
}

impl View for IndexView<'_> {
    const NAV: Nav = Nav::Post;

    fn template<'t>(&self, templates: &'t Templates) -> &'t Template {
        &templates.index
    }

    fn fragments(&self, config: &Config) -> Fragments {
        let base = config.base_path();
        let tags = tag_counts(self.posts);
        let posts: String = self
            .posts
            .iter()
            .map(|p| fragment::post_preview(p, base))
            .collect();
        Fragments::new()
            .with("tagsSidebar", fragment::tags_sidebar(&tags, self.posts.len()))
            .with("posts", posts)
            .with("searchIndex", self.search_json)
    }
}

/// The detail page of one series.
pub struct SeriesView<'a> {
    pub series: &'a Series<'a>,
}

impl View for SeriesView<'_> {
    const NAV: Nav = Nav::Series;

    fn template<'t>(&self, templates: &'t Templates) -> &'t Template {
        &templates.series
    }

    fn fragments(&self, config: &Config) -> Fragments {
        let base = config.base_path();
        let posts: String = self
            .series
            .posts
            .iter()
            .enumerate()
            .map(|(i, p)| fragment::series_post_item(p, i + 1, base))
            .collect();
        Fragments::new()
            .with("series", fragment::escape(&self.series.name))
            .with("seriesSlug", self.series.slug.as_str())
            .with("postCount", self.series.posts.len().to_string())
            .with("posts", posts)
    }
}

/// The list of every series, alphabetical by name.
pub struct SeriesListView<'a> {
    pub series: &'a SeriesMap<'a>,
}

impl View for SeriesListView<'_> {
    const NAV: Nav = Nav::Series;

    fn template<'t>(&self, templates: &'t Templates) -> &'t Template {
        &templates.series_list
    }

    fn fragments(&self, config: &Config) -> Fragments {
        let base = config.base_path();
        let list = match self.series.is_empty() {
            true => fragment::NO_SERIES.to_owned(),
            false => self
                .series
                .values()
                .map(|s| fragment::series_list_item(s, base))
                .collect(),
        };
        Fragments::new().with("seriesList", list)
    }
}

/// The about page. Without rendered content the page shows a generic
/// introduction built from the site configuration.
pub struct AboutView {
    pub content: Option<String>,
}

impl View for AboutView {
    const NAV: Nav = Nav::About;

    fn template<'t>(&self, templates: &'t Templates) -> &'t Template {
        &templates.about
    }

    fn fragments(&self, config: &Config) -> Fragments {
        let content = match &self.content {
            Some(content) => content.clone(),
            None => fragment::about_fallback(
                &config.site.title,
                config.site.profile_image.as_deref(),
                config.base_path(),
            ),
        };
        Fragments::new().with("content", content)
    }
}
