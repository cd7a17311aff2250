//! `{{NAV}}` resolution for built HTML pages.
//!
//! Runs after every Markdown page has been written. For one target page and
//! the list of other pages it links to, the navigation builder:
//!
//! 1. reads each linked page's *current* file and takes its first
//!    `<title>` (falling back to the page's path when there is none),
//! 2. renders the list as `<ul><li><a href="…">Title</a></li>…</ul>`,
//! 3. rewrites the target file in place with every `{{NAV}}` replaced.
//!
//! No other macro is known here, so anything else still left in the page
//! is kept verbatim and reported.
//!
//! A page whose `{{NAV}}` was already resolved by an earlier run has no
//! macro left, so running the pass again leaves it untouched even if the
//! titles of the linked pages have changed since.

use crate::macros::{self, Resolution, Resolve, resolve_macros};
use maud::{Markup, PreEscaped, html};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the navigation macro.
pub const NAV_MACRO: &str = "NAV";

#[derive(Error, Debug)]
pub enum NavError {
    #[error("cannot read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// An HTML page that takes part in navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPage {
    /// Location on disk.
    pub path: PathBuf,
    /// Link target, `/`-separated and relative to the build directory.
    pub href: String,
}

impl NavPage {
    /// Page at `path`, linked relative to `root`.
    ///
    /// Paths outside `root` are linked as given.
    pub fn new(root: &Path, path: PathBuf) -> Self {
        let relative = path.strip_prefix(root).unwrap_or(&path);
        let href = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Self { path, href }
    }
}

/// One rendered navigation link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub href: String,
    /// Content of the page's `<title>`, already HTML. `None` when the page
    /// has no usable title; the href is shown instead.
    pub title: Option<String>,
}

/// Result of resolving one page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavOutcome {
    /// Number of links rendered, 0 if the page had no `{{NAV}}`.
    pub links: usize,
    /// Whether the file was rewritten.
    pub rewritten: bool,
    /// Macros other than `NAV` that were left in place.
    pub unresolved: Vec<String>,
}

/// Extract the trimmed text of the first `<title>` element.
///
/// Tag names match ASCII case-insensitively and the opening tag may carry
/// attributes. Returns `None` if there is no complete title element or its
/// content is blank.
pub fn extract_title(html: &str) -> Option<&str> {
    let lower = html.to_ascii_lowercase();
    let mut from = 0;
    let open_end = loop {
        let tag = from + lower[from..].find("<title")?;
        let after = tag + "<title".len();
        match lower[after..].chars().next() {
            Some('>') => break after + 1,
            Some(c) if c.is_ascii_whitespace() => break after + lower[after..].find('>')? + 1,
            _ => from = after,
        }
    };
    let close = open_end + lower[open_end..].find("</title")?;
    let title = html[open_end..close].trim();
    (!title.is_empty()).then_some(title)
}

/// Read a page and extract its title.
///
/// Invalid UTF-8 is replaced rather than rejected; only the title matters here.
pub fn read_title(path: &Path) -> Result<Option<String>, NavError> {
    let bytes = fs::read(path).map_err(|source| NavError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(extract_title(&text).map(str::to_string))
}

/// Collect links for `pages` in the given order.
pub fn nav_links(pages: &[NavPage]) -> Result<Vec<NavLink>, NavError> {
    pages
        .iter()
        .map(|page| {
            Ok(NavLink {
                href: page.href.clone(),
                title: read_title(&page.path)?,
            })
        })
        .collect()
}

/// Render the navigation list.
///
/// Titles are inserted as-is since they come from HTML already; hrefs and
/// fallback labels are escaped.
pub fn render_nav(links: &[NavLink]) -> Markup {
    html! {
        ul {
            @for link in links {
                li {
                    a href=(link.href) {
                        @match &link.title {
                            Some(title) => { (PreEscaped(title)) },
                            None => { (link.href) },
                        }
                    }
                }
            }
        }
    }
}

struct NavMacros<'a> {
    list: Option<&'a str>,
}

impl Resolve for NavMacros<'_> {
    fn resolve(&self, name: &str) -> Resolution {
        match (name, self.list) {
            (NAV_MACRO, Some(list)) => Resolution::Value(list.to_string()),
            _ => Resolution::Unknown,
        }
    }
}

/// Resolve `{{NAV}}` in `target`, linking to `others` in order.
///
/// The target file is rewritten only when its content changes. Linked
/// pages are read only if the target actually contains `{{NAV}}`.
pub fn resolve_nav(target: &Path, others: &[NavPage]) -> Result<NavOutcome, NavError> {
    let text = fs::read_to_string(target).map_err(|source| NavError::Read {
        path: target.to_path_buf(),
        source,
    })?;

    let has_nav = macros::scan(&text).any(|m| m.name == NAV_MACRO);
    let (list, links) = if has_nav {
        let links = nav_links(others)?;
        (Some(render_nav(&links).into_string()), links.len())
    } else {
        (None, 0)
    };

    let resolved = resolve_macros(
        &text,
        &NavMacros {
            list: list.as_deref(),
        },
    );

    let rewritten = resolved.text != text;
    if rewritten {
        fs::write(target, &resolved.text).map_err(|source| NavError::Write {
            path: target.to_path_buf(),
            source,
        })?;
    }

    Ok(NavOutcome {
        links,
        rewritten,
        unresolved: resolved.unresolved,
    })
}
