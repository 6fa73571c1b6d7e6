//! Named-placeholder templates. A template is plain text containing
//! `{{name}}` tokens; rendering replaces every token with a fragment of the
//! same name and fails if the template names a fragment that wasn't supplied.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}").unwrap()
});

/// A parsed template.
#[derive(Clone, Debug)]
pub struct Template {
    name: String,
    source: String,
    placeholders: BTreeSet<String>,
}

impl Template {
    /// Parses `source`. `name` identifies the template in error messages.
    pub fn parse(name: &str, source: String) -> Template {
        let placeholders = PLACEHOLDER
            .captures_iter(&source)
            .map(|caps| caps[1].to_owned())
            .collect();
        Template {
            name: name.to_owned(),
            source,
            placeholders,
        }
    }

    /// Loads and parses a template file.
    pub fn load(path: &Path) -> Result<Template> {
        let source = fs::read_to_string(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Template::parse(&name, source))
    }

    /// The distinct placeholder names the template uses.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.placeholders.iter().map(String::as_str)
    }

    /// Replaces every placeholder occurrence with its fragment. Fragment text
    /// is inserted as-is and never scanned for further placeholders.
    pub fn render(&self, fragments: &Fragments) -> Result<String> {
        if let Some(missing) = self
            .placeholders
            .iter()
            .find(|p| !fragments.contains(p))
        {
            return Err(Error::Unfilled {
                template: self.name.clone(),
                placeholder: missing.clone(),
            });
        }
        Ok(PLACEHOLDER
            .replace_all(&self.source, |caps: &Captures| {
                fragments.get(&caps[1]).unwrap_or_default().to_owned()
            })
            .into_owned())
    }
}

/// The named fragments a page supplies to its template.
#[derive(Clone, Debug, Default)]
pub struct Fragments(BTreeMap<&'static str, String>);

impl Fragments {
    pub fn new() -> Fragments {
        Fragments::default()
    }

    /// Adds (or replaces) a fragment.
    pub fn insert(&mut self, name: &'static str, value: impl Into<String>) {
        self.0.insert(name, value.into());
    }

    /// Builder-style [`Fragments::insert`].
    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Fragments {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}

/// The file names of the templates a site provides, in the templates
/// directory.
pub const HEADER: &str = "header.html";
pub const FOOTER: &str = "footer.html";
pub const POST: &str = "post.html";
pub const INDEX: &str = "index.html";
pub const SERIES: &str = "series.html";
pub const SERIES_LIST: &str = "series-list.html";
pub const ABOUT: &str = "about.html";

/// Every page template of a site, loaded once per build.
#[derive(Clone, Debug)]
pub struct Templates {
    pub header: Template,
    pub footer: Template,
    pub post: Template,
    pub index: Template,
    pub series: Template,
    pub series_list: Template,
    pub about: Template,
}

impl Templates {
    /// Loads every template from `dir`. A missing file is an error.
    pub fn load(dir: &Path) -> Result<Templates> {
        Ok(Templates {
            header: Template::load(&dir.join(HEADER))?,
            footer: Template::load(&dir.join(FOOTER))?,
            post: Template::load(&dir.join(POST))?,
            index: Template::load(&dir.join(INDEX))?,
            series: Template::load(&dir.join(SERIES))?,
            series_list: Template::load(&dir.join(SERIES_LIST))?,
            about: Template::load(&dir.join(ABOUT))?,
        })
    }
}

/// The result of a fallible template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or rendering a template.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a template file can't be read.
    #[error("opening template file `{}`: {err}", path.display())]
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when a template uses a placeholder the page doesn't fill.
    #[error("template `{template}` uses `{{{{{placeholder}}}}}` but no value was provided")]
    Unfilled {
        template: String,
        placeholder: String,
    },
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_occurrence_is_replaced() -> Result<()> {
        let template = Template::parse("t", "<title>{{title}}</title><h1>{{title}}</h1>".to_owned());
        let fragments = Fragments::new().with("title", "Hi");
        assert_eq!("<title>Hi</title><h1>Hi</h1>", template.render(&fragments)?);
        Ok(())
    }

    #[test]
    fn test_unfilled_placeholder_fails() {
        let template = Template::parse("post.html", "{{title}} {{date}}".to_owned());
        match template.render(&Fragments::new().with("title", "x")) {
            Err(Error::Unfilled { template, placeholder }) => {
                assert_eq!("post.html", template);
                assert_eq!("date", placeholder);
            }
            other => panic!("expected unfilled error, got {:?}", other),
        }
    }

    #[test]
    fn test_unused_fragments_are_allowed() -> Result<()> {
        let template = Template::parse("t", "static".to_owned());
        assert_eq!("static", template.render(&Fragments::new().with("title", "x"))?);
        Ok(())
    }

    #[test]
    fn test_fragments_are_not_rescanned() -> Result<()> {
        let template = Template::parse("t", "{{content}}|{{title}}".to_owned());
        let fragments = Fragments::new()
            .with("content", "use {{title}} in templates")
            .with("title", "T");
        assert_eq!("use {{title}} in templates|T", template.render(&fragments)?);
        Ok(())
    }

    #[test]
    fn test_placeholders() {
        let template = Template::parse("t", "{{b}}{{a}}{{b}} {{ not one }}".to_owned());
        assert_eq!(vec!["a", "b"], template.placeholders().collect::<Vec<_>>());
    }

    #[test]
    fn test_missing_template_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            Templates::load(dir.path()),
            Err(Error::Open { path, .. }) if path.ends_with(HEADER)
        ));
    }
}
