//! Markdown page building.
//!
//! Each `X.md` in the build directory becomes `X.html` next to it:
//!
//! 1. Read and convert the Markdown, splitting off its frontmatter.
//! 2. Read the template fresh (never cached between pages).
//! 3. Resolve the converted body against the page's frontmatter.
//! 4. Resolve the template, with `{{CONTENT}}` standing for the body.
//!
//! The body and the template are resolved separately, so a Markdown body
//! can use frontmatter macros too (`Written by {{author}}`) and every
//! unknown macro is traced back to the file it was written in
//! ([`MacroOrigin`]).
//!
//! `{{NAV}}` is left in place silently; the navigation pass fills it in
//! once every page exists. Any other name missing from the frontmatter is
//! kept verbatim and reported in [`BuiltPage::unresolved`].

use crate::config::MarkdownConfig;
use crate::frontmatter::Frontmatter;
use crate::macros::{self, Resolution, Resolve, resolve_macros};
use crate::markdown::{self, RenderedMarkdown};
use crate::nav::NAV_MACRO;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the placeholder for the converted Markdown body.
pub const CONTENT_MACRO: &str = "CONTENT";

#[derive(Error, Debug)]
pub enum PageError {
    #[error("cannot read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Where an unresolved macro was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroOrigin {
    Template,
    /// The Markdown body of the page being built.
    Body,
}

/// A macro left in place while building a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedMacro {
    pub origin: MacroOrigin,
    /// Literal macro text, delimiters included.
    pub text: String,
}

/// A filled-in template, before it is written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub text: String,
    /// Template macros first, then body macros, each in scan order.
    pub unresolved: Vec<UnresolvedMacro>,
}

/// A page written from a Markdown source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPage {
    pub source: PathBuf,
    pub output: PathBuf,
    pub unresolved: Vec<UnresolvedMacro>,
}

/// Macro context of a Markdown page: its frontmatter, with `NAV` deferred.
/// `content` is only set while resolving the template.
struct PageMacros<'a> {
    frontmatter: &'a Frontmatter,
    content: Option<&'a str>,
}

impl Resolve for PageMacros<'_> {
    fn resolve(&self, name: &str) -> Resolution {
        if let Some(value) = self.frontmatter.first(name) {
            return Resolution::Value(value.to_string());
        }
        match (name, self.content) {
            (CONTENT_MACRO, Some(content)) => Resolution::Value(content.to_string()),
            (NAV_MACRO, _) => Resolution::Defer,
            _ => Resolution::Unknown,
        }
    }
}

/// Output path for a Markdown source: same directory, `.html` extension.
pub fn output_path(source: &Path) -> PathBuf {
    source.with_extension("html")
}

/// Fill `template` with a converted Markdown document.
///
/// Pure: the same template and document always give the same result.
pub fn render_page(template: &str, rendered: &RenderedMarkdown) -> RenderedPage {
    let body = resolve_macros(
        &rendered.html,
        &PageMacros {
            frontmatter: &rendered.frontmatter,
            content: None,
        },
    );
    let page = resolve_macros(
        template,
        &PageMacros {
            frontmatter: &rendered.frontmatter,
            content: Some(&body.text),
        },
    );

    let mut unresolved: Vec<_> = tag(MacroOrigin::Template, page.unresolved).collect();
    // A body that never makes it into the page has nothing to report.
    if macros::scan(template).any(|m| m.name == CONTENT_MACRO) {
        unresolved.extend(tag(MacroOrigin::Body, body.unresolved));
    }

    RenderedPage {
        text: page.text,
        unresolved,
    }
}

fn tag(origin: MacroOrigin, texts: Vec<String>) -> impl Iterator<Item = UnresolvedMacro> {
    texts
        .into_iter()
        .map(move |text| UnresolvedMacro { origin, text })
}

/// Build one Markdown file into HTML using the template at `template_path`.
pub fn build_page(
    source: &Path,
    template_path: &Path,
    config: &MarkdownConfig,
) -> Result<BuiltPage, PageError> {
    let document = read(source)?;
    let template = read(template_path)?;

    let rendered = markdown::render(&document, config);
    let page = render_page(&template, &rendered);

    let output = output_path(source);
    fs::write(&output, &page.text).map_err(|source| PageError::Write {
        path: output.clone(),
        source,
    })?;

    Ok(BuiltPage {
        source: source.to_path_buf(),
        output,
        unresolved: page.unresolved,
    })
}

fn read(path: &Path) -> Result<String, PageError> {
    fs::read_to_string(path).map_err(|source| PageError::Read {
        path: path.to_path_buf(),
        source,
    })
}
