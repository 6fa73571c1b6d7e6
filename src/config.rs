//! Build configuration. A project may carry a `tilgen.yaml` file at its root;
//! every key in it is optional. The [`Config`] built from it is fixed for the
//! lifetime of one build and handed by reference to everything that renders.

use crate::util::read;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// The project file name searched for from the working directory upward.
pub const PROJECT_FILE: &str = "tilgen.yaml";

/// Whether links are built for local preview or for the published site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Served from the root of a local server; the published prefix is
    /// stripped from every page.
    Local,

    /// Served under the published base path (e.g., `/TIL`).
    Published,
}

/// Site metadata from the `site` table of the project file.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Site {
    pub title: String,
    pub description: String,

    /// The absolute URL of the published site (e.g.,
    /// `https://example.github.io/TIL/`).
    pub url: Url,
    pub language: String,

    /// The path prefix the published site lives under (e.g., `/TIL`). Empty
    /// for a site published at the domain root.
    pub base_path: String,

    /// The preview image for posts that don't declare one.
    pub default_image: Option<String>,

    /// The profile image shown by the default about page.
    pub profile_image: Option<String>,
}

impl Default for Site {
    fn default() -> Self {
        Site {
            title: String::from("TIL - Today I Learned"),
            description: String::from("Today I Learned 블로그"),
            url: Url::parse("https://example.github.io/TIL/")
                .expect("default site URL is valid"),
            language: String::from("ko"),
            base_path: String::from("/TIL"),
            default_image: None,
            profile_image: None,
        }
    }
}

/// Source and output locations from the `paths` table of the project file,
/// relative to the project root.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
struct Paths {
    posts: PathBuf,
    about: PathBuf,
    templates: PathBuf,
    assets: PathBuf,
    styles: PathBuf,
    scripts: PathBuf,
    search_runtime: PathBuf,
    output: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            posts: PathBuf::from("src/posts"),
            about: PathBuf::from("src/about.md"),
            templates: PathBuf::from("src/templates"),
            assets: PathBuf::from("assets"),
            styles: PathBuf::from("src/styles"),
            scripts: PathBuf::from("src/scripts"),
            search_runtime: PathBuf::from("vendor/elasticlunr.min.js"),
            output: PathBuf::from("dist"),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Project {
    site: Site,
    paths: Paths,
}

pub struct Config {
    pub mode: Mode,
    pub site: Site,
    pub posts_source_directory: PathBuf,
    pub about_source_file: PathBuf,
    pub templates_directory: PathBuf,
    pub assets_source_directory: PathBuf,
    pub styles_source_directory: PathBuf,
    pub scripts_source_directory: PathBuf,
    pub search_runtime_file: PathBuf,
    pub root_output_directory: PathBuf,
    pub posts_output_directory: PathBuf,
    pub series_output_directory: PathBuf,
}

impl Config {
    /// Searches `dir` and then its ancestors for [`PROJECT_FILE`] and loads
    /// it. Without one, `dir` is the project root and every value takes its
    /// default.
    pub fn from_directory(dir: &Path, mode: Mode) -> Result<Config> {
        let mut candidate = Some(dir);
        while let Some(d) = candidate {
            let path = d.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path, mode)
                    .with_context(|| "Loading configuration");
            }
            candidate = d.parent();
        }
        Ok(Config::with_defaults(dir, mode))
    }

    /// Loads the project file at `path`; its parent directory is the project
    /// root.
    pub fn from_project_file(path: &Path, mode: Mode) -> Result<Config> {
        let project: Project = serde_yaml::from_str(&read(path, "project")?)
            .with_context(|| format!("Parsing project file `{}`", path.display()))?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Config::new(project_root, project, mode),
        }
    }

    /// The default configuration for a project rooted at `root`.
    pub fn with_defaults(root: &Path, mode: Mode) -> Config {
        let project = Project::default();
        Config::assemble(root, project.site, project.paths, mode)
    }

    fn new(root: &Path, project: Project, mode: Mode) -> Result<Config> {
        let mut site = project.site;
        site.base_path = normalize_base_path(&site.base_path)?;
        // `Url::join` treats the last segment of a URL without a trailing
        // slash as a file name and replaces it, so `https://x.io/TIL` would
        // join `posts/a.html` as `https://x.io/posts/a.html`.
        if !site.url.path().ends_with('/') {
            let path = format!("{}/", site.url.path());
            site.url.set_path(&path);
        }
        let config = Config::assemble(root, site, project.paths, mode);
        if let Some((output, source)) = config.output_overlap() {
            return Err(anyhow!(
                "output directory `{}` overlaps source `{}`",
                output.display(),
                source.display()
            ));
        }
        Ok(config)
    }

    fn assemble(root: &Path, site: Site, paths: Paths, mode: Mode) -> Config {
        let output = root.join(&paths.output);
        Config {
            mode,
            site,
            posts_source_directory: root.join(&paths.posts),
            about_source_file: root.join(&paths.about),
            templates_directory: root.join(&paths.templates),
            assets_source_directory: root.join(&paths.assets),
            styles_source_directory: root.join(&paths.styles),
            scripts_source_directory: root.join(&paths.scripts),
            search_runtime_file: root.join(&paths.search_runtime),
            posts_output_directory: output.join("posts"),
            series_output_directory: output.join("series"),
            root_output_directory: output,
        }
    }

    /// The prefix for site-relative links: empty in local mode, the
    /// published base path otherwise.
    pub fn base_path(&self) -> &str {
        match self.mode {
            Mode::Local => "",
            Mode::Published => &self.site.base_path,
        }
    }

    /// Rewrites the published prefix out of a rendered page in local mode.
    /// Templates hard-code the published prefix (e.g., `/TIL/styles/a.css`);
    /// locally those links must point at `/styles/a.css`.
    pub fn rewrite_base_path(&self, html: String) -> String {
        match self.mode {
            Mode::Local if !self.site.base_path.is_empty() => {
                html.replace(&format!("{}/", self.site.base_path), "/")
            }
            _ => html,
        }
    }

    /// The canonical, absolute URL of a post page.
    pub fn post_url(&self, slug: &str) -> String {
        format!("{}posts/{}.html", self.site.url, slug)
    }

    /// The source locations whose changes trigger a rebuild in watch mode.
    pub fn watched_paths(&self) -> Vec<&Path> {
        vec![
            self.posts_source_directory.as_path(),
            self.templates_directory.as_path(),
            self.styles_source_directory.as_path(),
            self.scripts_source_directory.as_path(),
            self.about_source_file.as_path(),
        ]
    }

    /// Returns the first generated page directory that equals, contains or
    /// sits inside a source location, paired with that source. Those
    /// directories are emptied at the start of every build.
    pub fn output_overlap(&self) -> Option<(&Path, &Path)> {
        let outputs = [
            self.posts_output_directory.as_path(),
            self.series_output_directory.as_path(),
        ];
        let sources = [
            self.posts_source_directory.as_path(),
            self.about_source_file.as_path(),
            self.templates_directory.as_path(),
            self.assets_source_directory.as_path(),
            self.styles_source_directory.as_path(),
            self.scripts_source_directory.as_path(),
            self.search_runtime_file.as_path(),
        ];
        for output in outputs {
            let o = lexical(output);
            for source in sources {
                let s = lexical(source);
                if o.starts_with(&s) || s.starts_with(&o) {
                    return Some((output, source));
                }
            }
        }
        None
    }
}

/// Resolves `.` and `..` components without touching the filesystem.
fn lexical(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !resolved.pop() {
                    resolved.push(component);
                }
            }
            c => resolved.push(c),
        }
    }
    resolved
}

fn normalize_base_path(base_path: &str) -> Result<String> {
    let trimmed = base_path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if trimmed.contains(char::is_whitespace) {
        return Err(anyhow!("base_path `{}` must not contain whitespace", base_path));
    }
    Ok(if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{}", trimmed)
    })
}
