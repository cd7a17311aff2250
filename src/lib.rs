//! # Mori
//!
//! A small static site builder. A source directory is copied into a build
//! directory, Markdown pages are rendered into one shared HTML template, and
//! `{{NAME}}` macros embedded in the HTML are resolved.
//!
//! # Architecture: Copy, Pages, Navigation
//!
//! A build runs three passes over the build directory, strictly in order:
//!
//! ```text
//! 1. Copy   source/     →  build/        (overwrite, never delete)
//! 2. Pages  build/*.md  →  build/*.html  ({{CONTENT}}, frontmatter keys)
//! 3. Nav    build/*.html                 ({{NAV}}, in place)
//! ```
//!
//! The navigation pass reads the titles of finished pages, so it waits for
//! every page of pass 2. Pages themselves are independent and are built in
//! parallel.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`macros`] | `{{...}}` scanner and the single-pass resolver, [`macros::Resolve`] trait |
//! | [`frontmatter`] | `key: value` metadata block at the top of a Markdown file |
//! | [`markdown`] | Stateless Markdown → HTML conversion with pulldown-cmark |
//! | [`page`] | Renders one Markdown file into the template |
//! | [`nav`] | Title extraction and `{{NAV}}` list generation |
//! | [`build`] | Orchestration: copy, discovery, passes, [`build::BuildEvent`]s |
//! | [`config`] | Optional `mori.toml` loading and validation |
//! | [`output`] | CLI output formatting for build events |
//!
//! # Macros
//!
//! | Macro | Where | Value |
//! |-------|-------|-------|
//! | `{{CONTENT}}` | template, Markdown pages | converted Markdown body |
//! | `{{key}}` | template and body, Markdown pages | first value of frontmatter `key` |
//! | `{{NAV}}` | every HTML page | `<ul>` of links to the other pages |
//!
//! There are no conditionals, loops or nested macros. Anything that isn't
//! known in a pass is left exactly as written and reported as a warning, and
//! the build carries on.
//!
//! # Design Decisions
//!
//! ## Single-Pass Substitution
//!
//! Macros are resolved by walking the input once and appending to a fresh
//! buffer. Substituted values are never scanned again, so a frontmatter
//! value containing `{{...}}` stays literal instead of recursing.
//!
//! ## Deterministic Navigation
//!
//! Pages are discovered at the top level of the build directory only and
//! sorted by file name; navigation lists use that order. Whether a page
//! links to itself is a config switch (`nav.include_self`, off by default).
//!
//! ## First Value Wins
//!
//! A frontmatter key may carry several values (continuation lines), but
//! `{{key}}` always takes the first. [`frontmatter::Frontmatter::values`]
//! exposes the rest to library users.

pub mod build;
pub mod config;
pub mod frontmatter;
pub mod macros;
pub mod markdown;
pub mod nav;
pub mod output;
pub mod page;

#[cfg(test)]
pub(crate) mod test_helpers;
