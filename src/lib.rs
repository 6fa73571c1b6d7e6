//! The library code for the `tilgen` static site generator, which turns a
//! directory of Markdown "today I learned" posts into a static blog. A build
//! is one linear pass:
//!
//! 1. Parsing posts from source files on disk ([`crate::parser`]), which
//!    drops drafts, normalizes dates ([`crate::date`]) and renders bodies
//!    ([`crate::status`], [`crate::markdown`])
//! 2. Grouping posts into series ([`crate::series`]) and counting tags
//!    ([`crate::tag`])
//! 3. Writing the search index ([`crate::search`]) and RSS feed
//!    ([`crate::feed`])
//! 4. Assembling and writing every page ([`crate::page`], [`crate::write`])
//! 5. Copying the static trees into the output directory
//!
//! [`crate::build::build_site`] runs the pass; [`crate::watch`] re-runs it
//! whenever a source changes.
//!
//! Pages are plain-text templates with `{{name}}` placeholders
//! ([`crate::template`]). Every page kind is a typed view that must fill every
//! placeholder its template uses, so a typo in a template fails the build
//! instead of shipping a literal `{{name}}`.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod date;
pub mod feed;
pub mod fragment;
pub mod markdown;
pub mod page;
pub mod parser;
pub mod post;
pub mod search;
pub mod series;
pub mod status;
pub mod tag;
pub mod template;
pub mod util;
pub mod watch;
pub mod write;
