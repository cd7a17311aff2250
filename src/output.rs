//! CLI output formatting.
//!
//! # Output Format
//!
//! ```text
//! Copied 6 files
//! build/about.md → build/about.html
//! build/index.md → build/index.html
//! build/about.html: 2 nav links
//! build/index.html: 2 nav links
//! build/links.html: 2 nav links
//! Built 2 pages, resolved nav in 3 pages, 0 warnings
//! ```
//!
//! Warnings name the file holding the macro and, when different, the file
//! being built from it:
//!
//! ```text
//! warning: unresolved macro {{FOO}} in build/template.html (building build/about.md)
//! warning: unresolved macro {{BAR}} in build/extra.html
//! ```
//!
//! # Architecture
//!
//! `format_*` functions return lines and do no I/O so they can be tested;
//! `print_*` wrappers write them out. Warnings go to stderr, everything
//! else to stdout.

use crate::build::{BuildEvent, BuildSummary};

/// Format a single build event as display lines.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::Copied { files } => vec![format!("Copied {} files", files)],
        BuildEvent::PageBuilt { source, output } => vec![format!(
            "{} \u{2192} {}",
            source.display(),
            output.display()
        )],
        BuildEvent::NavResolved { page, links } => {
            vec![format!("{}: {} nav links", page.display(), links)]
        }
        BuildEvent::UnresolvedMacro { file, source, text } => {
            if file == source {
                vec![format!(
                    "warning: unresolved macro {} in {}",
                    text,
                    file.display()
                )]
            } else {
                vec![format!(
                    "warning: unresolved macro {} in {} (building {})",
                    text,
                    file.display(),
                    source.display()
                )]
            }
        }
    }
}

/// Print a build event, warnings to stderr.
pub fn print_build_event(event: &BuildEvent) {
    for line in format_build_event(event) {
        if event.is_warning() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

/// Format the closing summary line.
pub fn format_summary(summary: &BuildSummary) -> Vec<String> {
    vec![format!(
        "Built {} pages, resolved nav in {} pages, {} warnings",
        summary.pages.len(),
        summary.navigated,
        summary.warnings
    )]
}

/// Print the summary to stdout.
pub fn print_summary(summary: &BuildSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
