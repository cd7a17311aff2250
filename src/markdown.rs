//! Markdown to HTML conversion.
//!
//! A thin wrapper around [pulldown-cmark](https://docs.rs/pulldown-cmark):
//! the frontmatter block is split off first (see [`crate::frontmatter`]),
//! then the body is converted. Every call builds its own parser, so no
//! state leaks from one document into the next.

use crate::config::MarkdownConfig;
use crate::frontmatter::{self, Frontmatter};
use pulldown_cmark::{Options, Parser, html};

/// Result of converting one Markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMarkdown {
    /// Converted HTML body, used for `{{CONTENT}}`.
    pub html: String,
    /// Metadata from the leading frontmatter block.
    pub frontmatter: Frontmatter,
}

/// Parser options for the extensions switched on in config.
pub fn parser_options(config: &MarkdownConfig) -> Options {
    let mut options = Options::empty();
    options.set(Options::ENABLE_TABLES, config.tables);
    options.set(Options::ENABLE_FOOTNOTES, config.footnotes);
    options.set(Options::ENABLE_STRIKETHROUGH, config.strikethrough);
    options.set(Options::ENABLE_TASKLISTS, config.tasklists);
    options.set(Options::ENABLE_SMART_PUNCTUATION, config.smart_punctuation);
    options.set(Options::ENABLE_MATH, config.math);
    options
}

/// Convert a Markdown body (no frontmatter handling) to HTML.
pub fn to_html(body: &str, options: Options) -> String {
    let parser = Parser::new_ext(body, options);
    let mut out = String::with_capacity(body.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Split off frontmatter and convert the remaining body.
pub fn render(document: &str, config: &MarkdownConfig) -> RenderedMarkdown {
    let (frontmatter, body) = frontmatter::split(document);
    RenderedMarkdown {
        html: to_html(body, parser_options(config)),
        frontmatter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_heading() {
        let out = render("# Hi", &MarkdownConfig::default());
        assert_eq!(out.html.trim(), "<h1>Hi</h1>");
        assert!(out.frontmatter.is_empty());
    }

    #[test]
    fn frontmatter_is_not_rendered() {
        let out = render("title: Hello\n\n# Hi\n", &MarkdownConfig::default());
        assert_eq!(out.frontmatter.first("title"), Some("Hello"));
        assert!(!out.html.contains("title"));
        assert!(out.html.contains("<h1>Hi</h1>"));
    }

    #[test]
    fn inline_formatting() {
        let out = render("This is **bold** and *italic*.", &MarkdownConfig::default());
        assert!(out.html.contains("<strong>bold</strong>"));
        assert!(out.html.contains("<em>italic</em>"));
    }

    #[test]
    fn tables_off_by_default() {
        let doc = "| a | b |\n|---|---|\n| 1 | 2 |\n";
        let plain = render(doc, &MarkdownConfig::default());
        assert!(!plain.html.contains("<table>"));

        let config = MarkdownConfig {
            tables: true,
            ..Default::default()
        };
        let with_tables = render(doc, &config);
        assert!(with_tables.html.contains("<table>"));
    }

    #[test]
    fn strikethrough_extension() {
        let config = MarkdownConfig {
            strikethrough: true,
            ..Default::default()
        };
        let out = render("~~gone~~", &config);
        assert!(out.html.contains("<del>gone</del>"));
    }

    #[test]
    fn options_follow_config() {
        let config = MarkdownConfig {
            footnotes: true,
            math: true,
            ..Default::default()
        };
        let options = parser_options(&config);
        assert!(options.contains(Options::ENABLE_FOOTNOTES));
        assert!(options.contains(Options::ENABLE_MATH));
        assert!(!options.contains(Options::ENABLE_TABLES));
    }

    #[test]
    fn macros_pass_through_conversion() {
        let out = render("Written by {{author}}.", &MarkdownConfig::default());
        assert!(out.html.contains("{{author}}"));
    }

    #[test]
    fn conversion_is_pure() {
        let doc = "title: T\n\n## Sub\n\n- a\n- b\n";
        let config = MarkdownConfig::default();
        assert_eq!(render(doc, &config), render(doc, &config));
    }
}
