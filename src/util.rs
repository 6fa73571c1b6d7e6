use anyhow::{Context, Result};
use std::path::Path;

/// Reads the whole of `path` as UTF-8, naming the `kind` of file in the error.
pub fn read(path: &Path, kind: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Reading {} file `{}`", kind, path.display()))
}
