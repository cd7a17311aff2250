//! Site build orchestration.
//!
//! A build runs in four steps, each finishing before the next starts:
//!
//! ```text
//! 1. Check     source/ and build/ are directories, mori.toml is valid
//! 2. Copy      source/  →  build/           (overwrite, never delete)
//! 3. Pages     build/*.md  →  build/*.html  (parallel, one template)
//! 4. Nav       every build/*.html except the template: resolve {{NAV}}
//! ```
//!
//! Step 4 reads the titles of finished pages, so it only starts once every
//! page from step 3 has been written.
//!
//! ## Discovery
//!
//! Markdown and HTML files are discovered at the top level of the build
//! directory only, sorted by file name. That order is also the order of
//! every navigation list. The template is recognized by file identity, not
//! by name: any path that resolves to the same file as
//! `build/template.html` is left out of navigation.
//!
//! ## Diagnostics
//!
//! Progress and warnings are sent as [`BuildEvent`]s over an optional
//! channel; [`crate::output`] turns them into display lines. An unknown
//! macro in a Markdown-derived page is reported once, while building the
//! page. The navigation pass only reports unknown macros in HTML files that
//! were not generated in the same run.

use crate::config::{self, ConfigError, SiteConfig};
use crate::nav::{self, NavError, NavPage};
use crate::page::{self, BuiltPage, MacroOrigin, PageError};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

/// Name of the shared template at the top level of the build directory.
pub const TEMPLATE_FILE: &str = "template.html";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("source directory \"{}\" doesn't exist", .0.display())]
    SourceNotADirectory(PathBuf),
    #[error("build directory \"{}\" doesn't exist", .0.display())]
    BuildNotADirectory(PathBuf),
    #[error("source and build directory are the same (\"{}\")", .0.display())]
    SameDirectory(PathBuf),
    #[error("template \"{}\" doesn't exist", .0.display())]
    MissingTemplate(PathBuf),
    #[error("{} would overwrite the template", .0.display())]
    TemplateOverwrite(PathBuf),
    #[error("cannot copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error("cannot list {}: {source}", .path.display())]
    ReadDir { path: PathBuf, source: io::Error },
    #[error("cannot walk source tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Nav(#[from] NavError),
    #[error("cannot start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Progress and diagnostics emitted while building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// The source tree was copied into the build directory.
    Copied { files: usize },
    /// A Markdown file was written out as HTML.
    PageBuilt { source: PathBuf, output: PathBuf },
    /// `{{NAV}}` was filled in on a page.
    NavResolved { page: PathBuf, links: usize },
    /// A macro with no known value was left in place.
    ///
    /// `file` holds the macro (the template, a Markdown source, or a static
    /// page); `source` is the file being processed when it was found.
    UnresolvedMacro {
        file: PathBuf,
        source: PathBuf,
        text: String,
    },
}

impl BuildEvent {
    pub fn is_warning(&self) -> bool {
        matches!(self, BuildEvent::UnresolvedMacro { .. })
    }
}

/// What a build did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Files copied from the source tree.
    pub copied: usize,
    /// Markdown pages built, in discovery order.
    pub pages: Vec<BuiltPage>,
    /// HTML pages whose `{{NAV}}` was resolved.
    pub navigated: usize,
    /// Unresolved macro warnings.
    pub warnings: usize,
}

/// Build `source` into `build`, reading `mori.toml` from `source`.
pub fn build_site(
    source: &Path,
    build: &Path,
    events: Option<Sender<BuildEvent>>,
) -> Result<BuildSummary, BuildError> {
    check_directories(source, build)?;
    let config = config::load_config(source)?;
    build_site_with_config(source, build, &config, events)
}

/// Build `source` into `build` with an already loaded config.
pub fn build_site_with_config(
    source: &Path,
    build: &Path,
    config: &SiteConfig,
    events: Option<Sender<BuildEvent>>,
) -> Result<BuildSummary, BuildError> {
    check_directories(source, build)?;
    let mut summary = BuildSummary::default();

    summary.copied = copy_tree(source, build)?;
    emit(
        &events,
        BuildEvent::Copied {
            files: summary.copied,
        },
    );

    let template = build.join(TEMPLATE_FILE);
    let markdown = discover(build, "md")?;
    summary.pages = build_pages(&markdown, &template, config)?;

    for built in &summary.pages {
        emit(
            &events,
            BuildEvent::PageBuilt {
                source: built.source.clone(),
                output: built.output.clone(),
            },
        );
        for found in &built.unresolved {
            summary.warnings += 1;
            let file = match found.origin {
                MacroOrigin::Template => template.clone(),
                MacroOrigin::Body => built.source.clone(),
            };
            emit(
                &events,
                BuildEvent::UnresolvedMacro {
                    file,
                    source: built.source.clone(),
                    text: found.text.clone(),
                },
            );
        }
    }

    // Every page is on disk from here on; titles are final.
    let generated: HashSet<&Path> = summary.pages.iter().map(|p| p.output.as_path()).collect();
    let nav_pages: Vec<NavPage> = discover(build, "html")?
        .into_iter()
        .filter(|path| !same_file(path, &template))
        .map(|path| NavPage::new(build, path))
        .collect();

    let mut navigated = 0;
    let mut warnings = 0;
    for target in &nav_pages {
        let others = navigation_set(&nav_pages, target, config.nav.include_self);
        let outcome = nav::resolve_nav(&target.path, &others)?;

        if outcome.rewritten {
            navigated += 1;
            emit(
                &events,
                BuildEvent::NavResolved {
                    page: target.path.clone(),
                    links: outcome.links,
                },
            );
        }
        if generated.contains(target.path.as_path()) {
            continue;
        }
        for text in outcome.unresolved {
            warnings += 1;
            emit(
                &events,
                BuildEvent::UnresolvedMacro {
                    file: target.path.clone(),
                    source: target.path.clone(),
                    text,
                },
            );
        }
    }
    summary.navigated = navigated;
    summary.warnings += warnings;

    Ok(summary)
}

fn check_directories(source: &Path, build: &Path) -> Result<(), BuildError> {
    if !source.is_dir() {
        return Err(BuildError::SourceNotADirectory(source.to_path_buf()));
    }
    if !build.is_dir() {
        return Err(BuildError::BuildNotADirectory(build.to_path_buf()));
    }
    if same_file(source, build) {
        return Err(BuildError::SameDirectory(build.to_path_buf()));
    }
    Ok(())
}

fn emit(events: &Option<Sender<BuildEvent>>, event: BuildEvent) {
    if let Some(tx) = events {
        // A closed receiver only means nobody is listening.
        let _ = tx.send(event);
    }
}

/// Build every Markdown file in parallel. Results keep the input order.
fn build_pages(
    markdown: &[PathBuf],
    template: &Path,
    config: &SiteConfig,
) -> Result<Vec<BuiltPage>, BuildError> {
    if markdown.is_empty() {
        return Ok(Vec::new());
    }
    if !template.is_file() {
        return Err(BuildError::MissingTemplate(template.to_path_buf()));
    }
    // `template.md` would be written over the file every other page reads.
    if let Some(clash) = markdown.iter().find(|source| {
        let output = page::output_path(source);
        output == template || same_file(&output, template)
    }) {
        return Err(BuildError::TemplateOverwrite(clash.clone()));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config::effective_threads(&config.processing))
        .build()?;
    let pages = pool.install(|| {
        markdown
            .par_iter()
            .map(|source| page::build_page(source, template, &config.markdown))
            .collect::<Result<Vec<_>, _>>()
    })?;
    Ok(pages)
}

/// Pages linked from `target`'s navigation, in discovery order.
pub fn navigation_set(pages: &[NavPage], target: &NavPage, include_self: bool) -> Vec<NavPage> {
    pages
        .iter()
        .filter(|page| include_self || page.path != target.path)
        .cloned()
        .collect()
}

/// Recursively copy the contents of `source` into `dest`.
///
/// Existing files are overwritten and nothing in `dest` is removed. When
/// `dest` lies inside `source` it is skipped, and a file is never copied
/// onto itself. Returns the number of files copied.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<usize, BuildError> {
    let mut copied = 0;
    let walker = WalkDir::new(source)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !(entry.file_type().is_dir() && same_file(entry.path(), dest)));

    for entry in walker {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = dest.join(relative);
        if same_file(entry.path(), &target) {
            continue;
        }

        let result = if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
        } else {
            fs::copy(entry.path(), &target).map(|_| copied += 1)
        };
        result.map_err(|source| BuildError::Copy {
            from: entry.path().to_path_buf(),
            to: target.clone(),
            source,
        })?;
    }
    Ok(copied)
}

/// Files directly inside `dir` with the given extension (ASCII
/// case-insensitive), sorted by path.
pub fn discover(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, BuildError> {
    let entries = fs::read_dir(dir).map_err(|source| BuildError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| BuildError::ReadDir {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        let matches = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if matches && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Whether two paths name the same file on disk.
///
/// Missing paths are never the same file.
#[cfg(unix)]
pub fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
        _ => false,
    }
}

/// Whether two paths name the same file on disk.
///
/// Missing paths are never the same file.
#[cfg(not(unix))]
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => false,
    }
}
