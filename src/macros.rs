//! Macro scanning and resolution.
//!
//! A macro is a `{{NAME}}` placeholder embedded in HTML. The scanner is
//! non-greedy: a macro opens at `{{` and closes at the *nearest* following
//! `}}`, so the name may contain anything except the closing delimiter
//! (including stray braces and newlines).
//!
//! ```text
//! <title>{{title}}</title>     →  name = "title"
//! {{a}} and {{b}}              →  two macros, "a" then "b"
//! {{{x}}}                      →  name = "{x", trailing "}" left as text
//! {{unclosed                   →  no macro
//! ```
//!
//! ## Resolution
//!
//! [`resolve_macros`] makes a single forward pass over the text. Unmatched
//! spans are copied through, each macro is handed to a [`Resolve`]
//! implementation, and the result is appended to a fresh output buffer.
//! Because the scan always runs over the *input* text, an inserted value is
//! never rescanned. A value that happens to contain `{{...}}` can't trigger
//! a second substitution or loop forever.
//!
//! Three outcomes are possible per macro (see [`Resolution`]):
//!
//! | Resolver answer | Output | Reported |
//! |-----------------|--------|----------|
//! | `Value(s)` | `s` | no |
//! | `Defer` | macro text verbatim | no |
//! | `Unknown` | macro text verbatim | yes, in [`Resolved::unresolved`] |

/// Opening delimiter.
pub const OPEN: &str = "{{";
/// Closing delimiter.
pub const CLOSE: &str = "}}";

/// A located macro occurrence inside a text buffer.
///
/// Offsets are byte offsets into the buffer that was scanned; `start` is
/// inclusive, `end` exclusive. `text` spans `start..end` and includes the
/// delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Macro<'a> {
    /// Full literal text, delimiters included (`{{title}}`).
    pub text: &'a str,
    /// Inner name between the delimiters (`title`).
    pub name: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Find the next macro at or after byte offset `from`.
///
/// Returns `None` when no complete `{{...}}` region starts at or after
/// `from`, including when `from` is past the end of the text or not on a
/// character boundary.
pub fn find_macro(text: &str, from: usize) -> Option<Macro<'_>> {
    let tail = text.get(from..)?;
    let start = from + tail.find(OPEN)?;
    let name_start = start + OPEN.len();
    let name_len = text[name_start..].find(CLOSE)?;
    let name_end = name_start + name_len;
    let end = name_end + CLOSE.len();

    Some(Macro {
        text: &text[start..end],
        name: &text[name_start..name_end],
        start,
        end,
    })
}

/// Iterator over every macro in a text, left to right.
pub struct Macros<'a> {
    text: &'a str,
    cursor: usize,
}

impl<'a> Iterator for Macros<'a> {
    type Item = Macro<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let found = find_macro(self.text, self.cursor)?;
        self.cursor = found.end;
        Some(found)
    }
}

/// Scan `text` for all macros without resolving them.
pub fn scan(text: &str) -> Macros<'_> {
    Macros { text, cursor: 0 }
}

/// Answer from a [`Resolve`] implementation for one macro name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Replace the macro with this value.
    Value(String),
    /// Known name that a later pass handles; keep the macro, don't report it.
    Defer,
    /// Unknown name; keep the macro and report it.
    Unknown,
}

/// Maps a macro name to its replacement in some context.
pub trait Resolve {
    fn resolve(&self, name: &str) -> Resolution;
}

/// Output of a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolved {
    /// The text with every resolvable macro substituted.
    pub text: String,
    /// Literal text of every macro reported as unknown, in scan order.
    /// Repeated occurrences appear once per occurrence.
    pub unresolved: Vec<String>,
}

/// Substitute every macro in `text` using `resolver`.
pub fn resolve_macros(text: &str, resolver: &impl Resolve) -> Resolved {
    let mut out = String::with_capacity(text.len());
    let mut unresolved = Vec::new();
    let mut cursor = 0;

    for found in scan(text) {
        out.push_str(&text[cursor..found.start]);
        match resolver.resolve(found.name) {
            Resolution::Value(value) => out.push_str(&value),
            Resolution::Defer => out.push_str(found.text),
            Resolution::Unknown => {
                out.push_str(found.text);
                unresolved.push(found.text.to_string());
            }
        }
        cursor = found.end;
    }
    out.push_str(&text[cursor..]);

    Resolved {
        text: out,
        unresolved,
    }
}
