//! `org-parse` — parser for org-style outline documents.
//!
//! The parser turns a single text buffer into a position-annotated tree of
//! greater elements (headlines, sections, plain lists, items), elements
//! (paragraphs), and inline objects (links, text). Every element carries the
//! byte range of its contents within the source buffer, so consumers can
//! recover the original text of any node.
//!
//! # Quick start
//!
//! ```
//! let doc = org_parse::parse("* Hello\nSome text with a [[link]].\n").unwrap();
//! assert_eq!(doc.children.len(), 1);
//! match &doc.children[0] {
//!     org_parse::Element::Headline { raw_value, .. } => assert_eq!(raw_value, "Hello"),
//!     other => panic!("expected a headline, got {other:?}"),
//! }
//! ```

pub mod error;
mod object;
pub mod parse;
pub mod reader;
mod structure;
pub mod types;

pub use error::ParseError;
pub use parse::{parse, parse_with, ParseOptions};
pub use types::*;

impl OrgData {
    /// The source bytes of `[begin, end)`, the range a node's
    /// `contents_begin`/`contents_end` fields describe. Out-of-range indices
    /// are clamped.
    pub fn slice(&self, begin: usize, end: usize) -> &str {
        let end = end.min(self.source.len());
        let begin = begin.min(end);
        self.source.get(begin..end).unwrap_or("")
    }
}
