//! Shared test utilities for the mori test suite.
//!
//! Every test gets its own temp directory holding a `source/` tree and an
//! empty `build/` directory, so builds can mutate freely.
//!
//! # Usage
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let site = setup_site();
//! build_site(&site.source, &site.build, None).unwrap();
//! assert!(read(&site.build.join("index.html")).contains("<h1>Welcome</h1>"));
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temp source/build directory pair. Dropping it removes both.
pub struct Site {
    _tmp: TempDir,
    pub root: PathBuf,
    pub source: PathBuf,
    pub build: PathBuf,
}

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` into a fresh `source/` next to an empty `build/`.
///
/// The fixture holds `template.html`, two Markdown pages (`index.md`,
/// `about.md`), a static `links.html`, `style.css`, and `notes/draft.md`
/// which sits below the top level and must never be built.
pub fn setup_site() -> Site {
    let site = setup_empty_site();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    crate::build::copy_tree(&fixtures, &site.source).unwrap();
    site
}

/// Empty `source/` and `build/` directories.
pub fn setup_empty_site() -> Site {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();
    let source = root.join("source");
    let build = root.join("build");
    std::fs::create_dir(&source).unwrap();
    std::fs::create_dir(&build).unwrap();
    Site {
        _tmp: tmp,
        root,
        source,
        build,
    }
}

/// Read a file to a string. Panics with the path on failure.
pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}
