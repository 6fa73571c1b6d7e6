//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing the posts
//! ([`crate::parser`]), grouping them into series ([`crate::series`]), writing
//! the search index and RSS feed, rendering every page ([`crate::write`]), and
//! copying the static source trees into the output directory.

use crate::config::Config;
use crate::date;
use crate::feed::{write_feed, Error as FeedError, FeedConfig};
use crate::parser::{render_page, Error as ParseError, Parser as PostParser};
use crate::post::Post;
use crate::search::build_index;
use crate::series::{group_series, SeriesMap};
use crate::template::{Error as TemplateError, Templates};
use crate::write::{Error as WriteError, Writer};
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a finished build produced.
#[derive(Debug)]
pub struct BuildSummary {
    pub post_count: usize,

    /// Series names, alphabetically.
    pub series: Vec<String>,

    /// The most recent post, if there are any posts.
    pub latest: Option<Post>,
}

/// Builds the site from a [`Config`] object. This calls into
/// [`PostParser::parse_posts`], [`Writer`], [`build_index`] and
/// [`write_feed`] which do the heavy-lifting. This function also copies the
/// static trees from their source directories to the output directory.
pub fn build_site(config: &Config) -> Result<BuildSummary> {
    info!("Building site into {}", config.root_output_directory.display());

    if let Some((output, source)) = config.output_overlap() {
        return Err(Error::OutputOverlapsSource {
            output: output.to_owned(),
            source_path: source.to_owned(),
        });
    }

    // Blow away the generated page directories so pages of deleted or
    // newly-drafted posts don't linger. The root output directory may hold
    // files we didn't create, so it is only ever written into.
    rmdir(&config.posts_output_directory)?;
    rmdir(&config.series_output_directory)?;
    mkdir(&config.root_output_directory)?;
    mkdir(&config.posts_output_directory)?;
    mkdir(&config.series_output_directory)?;

    // collect all posts
    let parser = PostParser::with_fallback_date(date::now());
    let posts = parser.parse_posts(&config.posts_source_directory)?;
    info!("Found {} posts", posts.len());

    let series = group_series(&posts);
    check_series_slugs(&series)?;
    let names: Vec<String> = series.keys().cloned().collect();
    info!("Found {} series: {}", names.len(), names.join(", "));

    let templates = Templates::load(&config.templates_directory)?;

    // search index
    let search = build_index(&posts);
    let search_path = config.root_output_directory.join("search-index.json");
    std::fs::write(&search_path, search.to_json()?).map_err(|err| Error::Io {
        path: search_path.clone(),
        err,
    })?;
    let inline_search = search.to_inline_json()?;

    // feed
    let feed_path = config.root_output_directory.join("rss.xml");
    write_feed(
        FeedConfig::from_config(config, date::now()),
        &posts,
        |slug| config.post_url(slug),
        BufWriter::new(File::create(&feed_path).map_err(|err| Error::Io {
            path: feed_path.clone(),
            err,
        })?),
    )?;

    // pages
    let writer = Writer {
        templates: &templates,
        config,
    };
    writer.write_posts(&posts, &series)?;
    writer.write_series(&series)?;
    writer.write_index(&posts, &inline_search)?;
    writer.write_series_list(&series)?;
    let about = match config.about_source_file.is_file() {
        true => Some(render_page(&config.about_source_file)?),
        false => None,
    };
    writer.write_about(about)?;

    // static trees
    let root = &config.root_output_directory;
    copy_dir(&config.assets_source_directory, &root.join("assets"))?;
    let scripts = root.join("scripts");
    if config.search_runtime_file.is_file() {
        if let Some(name) = config.search_runtime_file.file_name() {
            mkdir(&scripts)?;
            copy_file(&config.search_runtime_file, &scripts.join(name))?;
        }
    }
    copy_dir(&config.styles_source_directory, &root.join("styles"))?;
    copy_dir(&config.scripts_source_directory, &scripts)?;

    info!("Build complete");
    Ok(BuildSummary {
        post_count: posts.len(),
        series: names,
        latest: posts.into_iter().next(),
    })
}

/// Fails when two series names map to the same page file.
fn check_series_slugs(series: &SeriesMap) -> Result<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for s in series.values() {
        if let Some(first) = seen.insert(&s.slug, &s.name) {
            return Err(Error::SeriesSlugCollision {
                slug: s.slug.clone(),
                first: first.to_owned(),
                second: s.name.clone(),
            });
        }
    }
    Ok(())
}

/// Recursively copies `src` into `dst`, merging with whatever `dst` already
/// holds. A missing `src` is skipped.
fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        debug!("Skipping missing directory {}", src.display());
        return Ok(());
    }
    for entry in WalkDir::new(src) {
        let entry = entry?;
        // `WalkDir` yields paths under `src`, so this can't fail.
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            mkdir(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    std::fs::copy(src, dst).map_err(|err| Error::Copy {
        src: src.to_owned(),
        dst: dst.to_owned(),
        err,
    })?;
    Ok(())
}

fn mkdir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|err| Error::Io {
        path: dir.to_owned(),
        err,
    })
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing,
/// templating, writing, cleaning output directories, and other I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for errors during parsing.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Returned when a template file can't be loaded.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Returned for errors writing pages to disk.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Returned for errors writing the feed.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// Returned when the search index can't be serialized.
    #[error("serializing search index: {0}")]
    Search(#[from] serde_json::Error),

    /// Returned when two series names produce the same page file name.
    #[error("series `{first}` and `{second}` both map to `series/{slug}.html`")]
    SeriesSlugCollision {
        slug: String,
        first: String,
        second: String,
    },

    /// Returned when a generated page directory overlaps a source location;
    /// cleaning it would delete sources.
    #[error(
        "output directory `{}` overlaps source `{}`",
        output.display(),
        source_path.display()
    )]
    OutputOverlapsSource {
        output: PathBuf,
        source_path: PathBuf,
    },

    /// Returned for I/O problems while cleaning output directories.
    #[error("cleaning directory `{}`: {err}", path.display())]
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for errors walking a source tree.
    #[error("walking source tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// Returned when a static file can't be copied.
    #[error("copying `{}` to `{}`: {err}", src.display(), dst.display())]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        err: std::io::Error,
    },

    /// Returned for other I/O errors.
    #[error("`{}`: {err}", path.display())]
    Io { path: PathBuf, err: std::io::Error },
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::series::test::post;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_series_slug_collision() {
        let posts = vec![
            post("a", "2025-11-12", Some("Rust Basics")),
            post("b", "2025-11-11", Some("rust basics")),
        ];
        match check_series_slugs(&group_series(&posts)) {
            Err(Error::SeriesSlugCollision { slug, .. }) => assert_eq!("rust-basics", slug),
            other => panic!("expected collision, got {:?}", other),
        }
    }

    #[test]
    fn test_copy_dir_merges_and_skips_missing() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("images/profile")).unwrap();
        fs::write(src.join("images/profile/me.jpg"), "jpg").unwrap();
        fs::write(src.join("main.js"), "js").unwrap();
        let dst = dir.path().join("dst");
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("keep.js"), "keep").unwrap();

        copy_dir(&src, &dst)?;
        copy_dir(&dir.path().join("missing"), &dst)?;

        assert_eq!("jpg", fs::read_to_string(dst.join("images/profile/me.jpg")).unwrap());
        assert_eq!("js", fs::read_to_string(dst.join("main.js")).unwrap());
        assert_eq!("keep", fs::read_to_string(dst.join("keep.js")).unwrap());
        Ok(())
    }

    #[test]
    fn test_rmdir_missing_is_ok() -> Result<()> {
        let dir = TempDir::new().unwrap();
        rmdir(&dir.path().join("nope"))
    }
}
