use crate::config::Config;
use crate::page::{assemble, AboutView, IndexView, PostView, SeriesListView, SeriesView, View};
use crate::post::Post;
use crate::series::SeriesMap;
use crate::template::{Error as TemplateError, Templates};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Responsible for assembling pages from their views and writing them to disk
/// under the configured output directories.
pub struct Writer<'a> {
    pub templates: &'a Templates,
    pub config: &'a Config,
}

impl Writer<'_> {
    /// Assembles a single view and writes it to `file_path`, creating parent
    /// directories as needed.
    fn write_page<V: View>(&self, view: &V, file_path: &Path) -> Result<()> {
        let html = assemble(view, self.templates, self.config).map_err(|err| Error::Template {
            path: file_path.to_owned(),
            err,
        })?;
        if let Some(dir) = file_path.parent() {
            std::fs::create_dir_all(dir).map_err(|err| Error::Io {
                path: dir.to_owned(),
                err,
            })?;
        }
        std::fs::write(file_path, html).map_err(|err| Error::Io {
            path: file_path.to_owned(),
            err,
        })?;
        debug!("Wrote {}", file_path.display());
        Ok(())
    }

    /// Writes a page for every post. `posts` must be sorted newest first.
    pub fn write_posts(&self, posts: &[Post], series: &SeriesMap) -> Result<()> {
        for (index, post) in posts.iter().enumerate() {
            let view = PostView {
                posts,
                index,
                series,
            };
            let file_path = self
                .config
                .posts_output_directory
                .join(format!("{}.html", post.slug));
            self.write_page(&view, &file_path)?;
        }
        Ok(())
    }

    /// Writes a detail page for every series.
    pub fn write_series(&self, series: &SeriesMap) -> Result<()> {
        for s in series.values() {
            let file_path = self
                .config
                .series_output_directory
                .join(format!("{}.html", s.slug));
            self.write_page(&SeriesView { series: s }, &file_path)?;
            info!("Wrote series page `{}` ({} posts)", s.name, s.posts.len());
        }
        Ok(())
    }

    /// Writes `index.html`. `search_json` is embedded as-is.
    pub fn write_index(&self, posts: &[Post], search_json: &str) -> Result<()> {
        self.write_page(
            &IndexView { posts, search_json },
            &self.config.root_output_directory.join("index.html"),
        )
    }

    /// Writes `series.html`.
    pub fn write_series_list(&self, series: &SeriesMap) -> Result<()> {
        self.write_page(
            &SeriesListView { series },
            &self.config.root_output_directory.join("series.html"),
        )
    }

    /// Writes `about.html`.
    pub fn write_about(&self, content: Option<String>) -> Result<()> {
        self.write_page(
            &AboutView { content },
            &self.config.root_output_directory.join("about.html"),
        )
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error during templating.
    #[error("rendering `{}`: {err}", path.display())]
    Template { path: PathBuf, err: TemplateError },

    /// An error writing the output files.
    #[error("writing `{}`: {err}", path.display())]
    Io { path: PathBuf, err: std::io::Error },
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Mode;
    use crate::series::{group_series, test::post};
    use crate::template::Template;
    use tempfile::TempDir;

    fn templates() -> Templates {
        let t = |name: &str, src: &str| Template::parse(name, src.to_owned());
        Templates {
            header: t("header.html", ""),
            footer: t("footer.html", ""),
            post: t("post.html", "{{title}}"),
            index: t("index.html", "{{posts}}"),
            series: t("series.html", "{{series}}"),
            series_list: t("series-list.html", "{{seriesList}}"),
            about: t("about.html", "{{content}}"),
        }
    }

    #[test]
    fn test_write_pages() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let config = Config::with_defaults(dir.path(), Mode::Published);
        let templates = templates();
        let writer = Writer {
            templates: &templates,
            config: &config,
        };
        let posts = vec![
            post("b", "2025-11-11", Some("Rust Basics")),
            post("a", "2025-11-10", None),
        ];
        let series = group_series(&posts);

        writer.write_posts(&posts, &series)?;
        writer.write_series(&series)?;
        writer.write_about(Some("hi".to_owned()))?;

        let out = dir.path().join("dist");
        assert_eq!("Title of a", std::fs::read_to_string(out.join("posts/a.html"))?);
        assert_eq!("Rust Basics", std::fs::read_to_string(out.join("series/rust-basics.html"))?);
        assert_eq!("hi", std::fs::read_to_string(out.join("about.html"))?);
        Ok(())
    }

    #[test]
    fn test_template_error_names_page() {
        let dir = TempDir::new().unwrap();
        let config = Config::with_defaults(dir.path(), Mode::Published);
        let mut templates = templates();
        templates.about = Template::parse("about.html", "{{bogus}}".to_owned());
        let writer = Writer {
            templates: &templates,
            config: &config,
        };
        match writer.write_about(None) {
            Err(Error::Template { path, .. }) => assert!(path.ends_with("about.html")),
            other => panic!("expected template error, got {:?}", other),
        }
    }
}
