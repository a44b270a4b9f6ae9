//! List structure scanner.
//!
//! A single forward pass that, starting from an item line, catalogs every
//! item of the list and its nested sublists into flat positional descriptors.
//! The element parser then builds the nested list/item tree from the
//! descriptors without re-scanning; the scanner itself leaves the cursor
//! where it found it.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{context_snippet, ParseError};
use crate::reader::Reader;
use crate::types::{Checkbox, ListStructure, StructureItem};

/// Cheap test for a line that starts a list item. A `*` bullet needs at
/// least one column of indentation; a column-zero star line is a heading.
pub(crate) static ITEM_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)\A(?:[ \t]*[-+]|[ \t]*\d+[.)]|[ \t]+\*)(?:[ \t]|$)").unwrap()
});

/// Full item pattern: indent, bullet, optional `[@counter]` cookie, optional
/// checkbox, optional `tag ::` for descriptive items. Matched only after
/// [`ITEM_LINE`] has accepted the line.
pub(crate) static FULL_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)\A(?P<indent>[ \t]*)(?P<bullet>(?:[-+*]|\d+[.)])(?:[ \t]+|$))(?:\[@(?P<counter>\d+|[A-Za-z])\][ \t]*)?(?:(?P<checkbox>\[[ xX-]\])(?:[ \t]+|$))?(?:(?P<tag>[^\n]*)[ \t]+::(?:[ \t]+|$))?",
    )
    .unwrap()
});

/// Two consecutive blank lines end the list.
static LIST_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A[ \t]*\n[ \t]*\n").unwrap());

pub(crate) fn checkbox_of(raw: &str) -> Option<Checkbox> {
    match raw {
        "[ ]" => Some(Checkbox::Off),
        "[X]" | "[x]" => Some(Checkbox::On),
        "[-]" => Some(Checkbox::Trans),
        _ => None,
    }
}

/// An item whose end offset is not yet known.
struct OpenItem {
    begin: usize,
    indent: usize,
    bullet: String,
    counter: Option<String>,
    checkbox: Option<Checkbox>,
    tag: Option<String>,
}

impl OpenItem {
    fn close(self, end: usize) -> StructureItem {
        StructureItem {
            begin: self.begin,
            indent: self.indent,
            bullet: self.bullet,
            counter: self.counter,
            checkbox: self.checkbox,
            tag: self.tag,
            end,
        }
    }
}

/// Scan the list region beginning at the cursor (which must sit on an item
/// line) and return the descriptors of every item in it, sorted ascending by
/// `begin`. The cursor is restored before returning.
pub(crate) fn scan_list_structure(reader: &mut Reader) -> Result<ListStructure, ParseError> {
    let start = reader.offset();
    let mut open: Vec<OpenItem> = Vec::new();
    let mut closed: Vec<StructureItem> = Vec::new();

    loop {
        if reader.is_eof() || reader.find(&LIST_END).is_some() {
            break;
        }
        let line = reader.line();

        if reader.find(&ITEM_LINE).is_some() {
            let caps = reader.captures(&FULL_ITEM).ok_or_else(|| ParseError::MalformedItem {
                offset: reader.offset(),
                context: context_snippet(reader.rest()),
            })?;
            let indent = caps.name("indent").map_or(0, |m| m.as_str().len());
            while open.last().is_some_and(|item| item.indent >= indent) {
                let item = open.pop().unwrap();
                closed.push(item.close(reader.offset()));
            }
            open.push(OpenItem {
                begin: reader.offset(),
                indent,
                bullet: caps["bullet"].trim_end().to_string(),
                counter: caps.name("counter").map(|m| m.as_str().to_string()),
                checkbox: caps.name("checkbox").and_then(|m| checkbox_of(m.as_str())),
                tag: caps.name("tag").map(|m| m.as_str().to_string()),
            });
            let n = line.len();
            reader.advance(n);
        } else if line.trim().is_empty() {
            let n = line.len();
            reader.advance(n);
        } else {
            // Continuation text: close anything it out-dents past.
            let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
            while open.last().is_some_and(|item| item.indent >= indent) {
                let item = open.pop().unwrap();
                closed.push(item.close(reader.offset()));
            }
            if open.is_empty() {
                break;
            }
            let n = line.len();
            reader.advance(n);
        }
    }

    // Trailing blank lines belong to the items still open.
    while !reader.is_eof() && reader.line().trim().is_empty() {
        let n = reader.line().len();
        reader.advance(n);
    }
    let final_offset = reader.offset();
    while let Some(item) = open.pop() {
        closed.push(item.close(final_offset));
    }

    closed.sort_by_key(|item| item.begin);
    reader.set_offset(start);
    Ok(Arc::new(closed))
}
