//! Defines the [`Parser`] and [`Error`] types: the logic for reading post
//! source files from disk into [`Post`] records. Drafts are dropped here so
//! nothing downstream ever sees them.

use std::{
    collections::HashMap,
    fs::{read_dir, File},
    io::Read,
    path::{Path, PathBuf},
};

use chrono::{DateTime, FixedOffset};
use log::{debug, warn};

use crate::{
    date::{self, DateInput},
    markdown,
    post::{derive_excerpt, Frontmatter, Post, UNTITLED},
};

/// Extensions recognized as post sources.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Parses [`Post`] objects from source files.
pub struct Parser {
    /// The instant substituted for missing or unrecognized dates. Captured
    /// once so that every fallback in a build agrees.
    fallback_date: DateTime<FixedOffset>,
}

impl Parser {
    /// Constructs a parser whose date fallback is the current instant.
    pub fn new() -> Parser {
        Parser::with_fallback_date(date::now())
    }

    /// Constructs a parser with an explicit date fallback.
    pub fn with_fallback_date(fallback_date: DateTime<FixedOffset>) -> Parser {
        Parser { fallback_date }
    }

    /// Reads every post source in `source_directory` (non-recursively) and
    /// returns the non-draft posts sorted by date, most recent first. Each
    /// source file is structured as follows:
    ///
    /// 1. Optional frontmatter between two `---` lines, with the keys
    ///    `title`, `date`, `tags`, `series`, `excerpt`, `image`, `draft`
    /// 2. Post body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: 러스트 소유권
    /// date: 2025-11-12 08:30
    /// tags: [rust]
    /// series: Rust 입문
    /// ---
    /// # 소유권
    ///
    /// [완료] 빌림 규칙 정리
    /// ```
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Vec<Post>> {
        let mut sources: Vec<(String, PathBuf)> = Vec::new();
        for result in read_dir(source_directory).map_err(|err| Error::ReadDir {
            path: source_directory.to_owned(),
            err,
        })? {
            let path = result?.path();
            if !path.is_file() {
                continue;
            }
            if let Some(slug) = slug_of(&path) {
                sources.push((slug, path));
            }
        }
        // `read_dir` order is platform-dependent; fix it so that posts with
        // equal dates always come out in the same order.
        sources.sort_by(|a, b| a.1.cmp(&b.1));

        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        let mut posts = Vec::with_capacity(sources.len());
        for (slug, path) in sources {
            // drafts never claim a slug
            let post = match self.parse_post(&slug, &path)? {
                Some(post) => post,
                None => continue,
            };
            if let Some(first) = seen.get(&slug) {
                return Err(Error::DuplicateSlug {
                    slug,
                    first: first.clone(),
                    second: path,
                });
            }
            seen.insert(slug, path);
            posts.push(post);
        }

        posts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(posts)
    }

    /// Parses a single post. Returns `None` for drafts.
    pub fn parse_post(&self, slug: &str, path: &Path) -> Result<Option<Post>> {
        match self._parse_post(slug, path) {
            Ok(p) => Ok(p),
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_post(&self, slug: &str, path: &Path) -> Result<Option<Post>> {
        let contents = read_to_string(path)?;
        let (frontmatter, body) = split_frontmatter(&contents)?;

        if frontmatter.is_draft() {
            debug!("skipping draft `{}`", slug);
            return Ok(None);
        }

        let date = self.resolve_date(slug, frontmatter.date.as_ref());
        Ok(Some(Post {
            slug: slug.to_owned(),
            title: frontmatter.title.unwrap_or_else(|| UNTITLED.to_owned()),
            date,
            tags: frontmatter.tags,
            series: frontmatter.series.filter(|s| !s.trim().is_empty()),
            image: frontmatter.image,
            excerpt: frontmatter
                .excerpt
                .unwrap_or_else(|| derive_excerpt(body)),
            body: markdown::render(body),
            source_path: path.to_owned(),
        }))
    }

    fn resolve_date(
        &self,
        slug: &str,
        input: Option<&DateInput>,
    ) -> DateTime<FixedOffset> {
        match input {
            None => {
                warn!(
                    "post `{}` has no date; using build time {}",
                    slug, self.fallback_date
                );
                self.fallback_date
            }
            Some(input) => date::normalize(input).unwrap_or_else(|e| {
                warn!(
                    "post `{}`: {}; using build time {}",
                    slug, e, self.fallback_date
                );
                self.fallback_date
            }),
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new()
    }
}

/// Returns the slug for a post source path, or `None` if the extension isn't
/// a recognized Markdown extension.
pub fn slug_of(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?;
    if !MARKDOWN_EXTENSIONS.contains(&extension) {
        return None;
    }
    Some(path.file_stem()?.to_str()?.to_owned())
}

/// Reads a Markdown file that may carry frontmatter and renders its body.
/// Used for standalone pages such as the about page.
pub fn render_page(path: &Path) -> Result<String> {
    let contents = read_to_string(path)?;
    let (_, body) = split_frontmatter(&contents)?;
    Ok(markdown::render(body))
}

fn read_to_string(path: &Path) -> Result<String> {
    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Splits `input` into its parsed frontmatter and its body. Input that doesn't
/// open with a `---` line has no frontmatter.
pub fn split_frontmatter(input: &str) -> Result<(Frontmatter, &str)> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    match frontmatter_indices(input)? {
        None => Ok((Frontmatter::default(), input)),
        Some((yaml_start, yaml_stop, body_start)) => {
            let yaml = &input[yaml_start..yaml_stop];
            let frontmatter = if yaml.trim().is_empty() {
                Frontmatter::default()
            } else {
                serde_yaml::from_str(yaml)?
            };
            Ok((frontmatter, &input[body_start..]))
        }
    }
}

fn frontmatter_indices(input: &str) -> Result<Option<(usize, usize, usize)>> {
    const FENCE: &str = "---";

    let mut lines = input.split_inclusive('\n');
    match lines.next() {
        Some(first) if first.trim_end() == FENCE => {
            let yaml_start = first.len();
            let mut offset = yaml_start;
            for line in lines {
                if line.trim_end() == FENCE {
                    return Ok(Some((
                        yaml_start,         // yaml_start
                        offset,             // yaml_stop
                        offset + line.len(), // body_start
                    )));
                }
                offset += line.len();
            }
            Err(Error::FrontmatterMissingEndFence)
        }
        _ => Ok(None),
    }
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a post source file opens a frontmatter block with `---`
    /// but never closes it.
    #[error("missing closing `---` for frontmatter")]
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    #[error("{0}")]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned when two source files map to the same slug.
    #[error(
        "duplicate slug `{slug}`: `{}` and `{}`",
        first.display(),
        second.display()
    )]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Returned when the posts directory can't be listed.
    #[error("reading posts directory `{}`: {err}", path.display())]
    ReadDir { path: PathBuf, err: std::io::Error },

    /// Returned for other I/O errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// An error with an annotation.
    #[error("{0}: {1}")]
    Annotated(String, Box<Error>),
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    fn fallback() -> DateTime<FixedOffset> {
        date::normalize(&DateInput::from("2030-01-01")).unwrap()
    }

    #[test]
    fn test_parse_posts() -> Result<()> {
        let dir = TempDir::new()?;
        write(
            dir.path(),
            "older.md",
            "---\ntitle: Older\ndate: 2025-11-10\ntags: [go]\n---\nfirst line\n",
        );
        write(
            dir.path(),
            "newer.markdown",
            "---\ntitle: Newer\ndate: 2025-11-12 08:30\nexcerpt: 직접 쓴 요약\n---\n[완료] done\n",
        );
        write(
            dir.path(),
            "hidden.md",
            "---\ntitle: Hidden\ndate: 2025-11-13\ndraft: true\n---\nsecret\n",
        );
        write(dir.path(), "notes.txt", "not a post");

        let posts = Parser::with_fallback_date(fallback()).parse_posts(dir.path())?;
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(vec!["newer", "older"], slugs);

        assert_eq!("Newer", posts[0].title);
        assert_eq!("직접 쓴 요약", posts[0].excerpt);
        assert!(posts[0].body.contains(r#"data-status="완료""#));

        assert_eq!("first line\n...", posts[1].excerpt);
        assert_eq!(vec!["go"], posts[1].tags);
        assert_eq!("<p>first line</p>\n", posts[1].body);
        Ok(())
    }

    #[test]
    fn test_missing_or_bad_date_uses_fallback() -> Result<()> {
        let dir = TempDir::new()?;
        write(dir.path(), "a.md", "---\ntitle: A\n---\nbody\n");
        write(dir.path(), "b.md", "---\ntitle: B\ndate: someday\n---\nbody\n");
        let posts = Parser::with_fallback_date(fallback()).parse_posts(dir.path())?;
        assert_eq!(2, posts.len());
        assert!(posts.iter().all(|p| p.date == fallback()));
        // equal dates keep file-name order
        assert_eq!("a", posts[0].slug);
        Ok(())
    }

    #[test]
    fn test_no_frontmatter() -> Result<()> {
        let (fm, body) = split_frontmatter("# Title\n\ntext\n")?;
        assert_eq!(None, fm.title);
        assert_eq!("# Title\n\ntext\n", body);
        Ok(())
    }

    #[test]
    fn test_empty_frontmatter() -> Result<()> {
        let (fm, body) = split_frontmatter("---\n---\nbody")?;
        assert_eq!(None, fm.title);
        assert_eq!("body", body);
        Ok(())
    }

    #[test]
    fn test_crlf_frontmatter() -> Result<()> {
        let (fm, body) = split_frontmatter("---\r\ntitle: A\r\n---\r\nbody")?;
        assert_eq!(Some("A".to_owned()), fm.title);
        assert_eq!("body", body);
        Ok(())
    }

    #[test]
    fn test_missing_end_fence() {
        assert!(matches!(
            split_frontmatter("---\ntitle: A\nbody"),
            Err(Error::FrontmatterMissingEndFence)
        ));
    }

    #[test]
    fn test_bad_yaml_is_annotated() -> Result<()> {
        let dir = TempDir::new()?;
        write(dir.path(), "bad.md", "---\ntitle: [unclosed\n---\nbody\n");
        match Parser::new().parse_posts(dir.path()) {
            Err(Error::Annotated(annotation, inner)) => {
                assert!(annotation.contains("bad.md"));
                assert!(matches!(*inner, Error::DeserializeYaml(_)));
            }
            other => panic!("expected annotated error, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_duplicate_slug() -> Result<()> {
        let dir = TempDir::new()?;
        write(dir.path(), "same.md", "---\ntitle: A\n---\n");
        write(dir.path(), "same.markdown", "---\ntitle: B\n---\n");
        assert!(matches!(
            Parser::new().parse_posts(dir.path()),
            Err(Error::DuplicateSlug { slug, .. }) if slug == "same"
        ));
        Ok(())
    }

    #[test]
    fn test_draft_shares_slug_with_post() -> Result<()> {
        let dir = TempDir::new()?;
        write(dir.path(), "a.md", "---\ntitle: Published\n---\n");
        write(dir.path(), "a.markdown", "---\ntitle: Draft\ndraft: true\n---\n");
        let posts = Parser::with_fallback_date(fallback()).parse_posts(dir.path())?;
        assert_eq!(1, posts.len());
        assert_eq!("Published", posts[0].title);
        Ok(())
    }

    #[test]
    fn test_numeric_tags_do_not_fail_the_post() -> Result<()> {
        let dir = TempDir::new()?;
        write(dir.path(), "go.md", "---\ntitle: Go\ntags: [go, 1.21]\n---\n");
        let posts = Parser::with_fallback_date(fallback()).parse_posts(dir.path())?;
        assert_eq!(vec!["go", "1.21"], posts[0].tags);
        Ok(())
    }

    #[test]
    fn test_slug_of() {
        assert_eq!(Some("hello".to_owned()), slug_of(Path::new("a/hello.md")));
        assert_eq!(None, slug_of(Path::new("a/hello.txt")));
        assert_eq!(None, slug_of(Path::new("a/README")));
    }
}
