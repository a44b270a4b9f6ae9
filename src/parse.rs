//! Entry point and the element-level recursive parser.
//!
//! [`parse`] feeds the buffer into a [`Reader`], runs the element loop in
//! `first-section` mode, and wraps the children in an [`OrgData`] root. The
//! element loop dispatches on the current parse mode and the leading
//! syntax at the cursor; on emitting a greater element it narrows the reader
//! to that element's contents and recurses, on emitting a paragraph it
//! narrows and switches to object parsing.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{context_snippet, ParseError};
use crate::object::{element_restriction, Restriction};
use crate::reader::Reader;
use crate::structure::{checkbox_of, scan_list_structure, FULL_ITEM, ITEM_LINE};
use crate::types::{Element, ListStructure, OrgData, StructureItem};

/// Options accepted by [`parse_with`].
///
/// Every knob is reserved for future use (todo keywords, affiliated keyword
/// handling); the default record is the contract.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct ParseOptions {}

/// Parse `input` into an [`OrgData`] tree with default options.
///
/// This never fails on real documents: malformed constructs degrade to
/// paragraphs and text. The `Err` arm signals a violated parser invariant
/// (see [`ParseError`]).
pub fn parse(input: &str) -> Result<OrgData, ParseError> {
    parse_with(input, &ParseOptions::default())
}

/// Parse `input` into an [`OrgData`] tree.
///
/// CRLF line endings are normalized to LF first; every offset in the result
/// indexes the normalized text stored in [`OrgData::source`].
pub fn parse_with(input: &str, _options: &ParseOptions) -> Result<OrgData, ParseError> {
    let source = input.replace("\r\n", "\n");
    let mut parser = Parser::new(&source);
    let children = parser.parse_elements(Mode::FirstSection, None)?;
    Ok(OrgData {
        contents_begin: 0,
        contents_end: source.len(),
        children,
        source,
    })
}

/// The parser's view of what kind of child is expected next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    FirstSection,
    Section,
    Planning,
    Item,
    TopComment,
    Default,
}

/// Deterministic mode transitions. With `descend` set, the result is the
/// mode for a newly emitted greater element's body; otherwise it is the mode
/// for the next sibling after emitting `element`. Transitions involving node
/// kinds the parser does not emit (inlinetask, property drawer, table,
/// planning, comment) are extension hooks and are not represented here.
fn next_mode(mode: Mode, element: &Element, descend: bool) -> Mode {
    if descend {
        match element {
            Element::Headline { .. } => Mode::Section,
            Element::Section { .. } if mode == Mode::FirstSection => Mode::TopComment,
            Element::Section { .. } => Mode::Planning,
            Element::PlainList { .. } => Mode::Item,
            _ => Mode::Default,
        }
    } else {
        match mode {
            Mode::Item => Mode::Item,
            _ => Mode::Default,
        }
    }
}

/// A heading line anywhere in the visible slice.
static HEADING_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?P<stars>\*+)[ \t]").unwrap());

/// A heading anchored at the cursor, capturing stars and the raw title.
static HEADLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A(?P<stars>\*+)[ \t]+(?P<title>[^\n]*)").unwrap());

/// Lines that terminate a paragraph: blank lines, heading lines, item lines.
static PARAGRAPH_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^(?:[ \t]*$|\*+[ \t]|[ \t]*[-+](?:[ \t]|$)|[ \t]*\d+[.)](?:[ \t]|$)|[ \t]+\*(?:[ \t]|$))",
    )
    .unwrap()
});

pub(crate) struct Parser<'a> {
    pub(crate) reader: Reader<'a>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Parser {
            reader: Reader::new(input),
        }
    }

    /// Produce element children until the visible window is exhausted.
    pub(crate) fn parse_elements(
        &mut self,
        mode: Mode,
        structure: Option<&ListStructure>,
    ) -> Result<Vec<Element>, ParseError> {
        let mut mode = mode;
        let mut elements = Vec::new();
        let mut prev_offset = usize::MAX;
        loop {
            self.skip_blank_lines();
            if self.reader.is_eof() {
                break;
            }
            let offset = self.reader.offset();
            if offset == prev_offset {
                return Err(ParseError::NoProgress {
                    offset,
                    context: context_snippet(self.reader.rest()),
                });
            }
            prev_offset = offset;

            let mut element = self.parse_element(mode, structure)?;
            let (contents_begin, contents_end) = element.contents_range();
            if element.is_greater() {
                if contents_begin < contents_end {
                    let inner_structure = element.structure();
                    self.reader.narrow(contents_begin, contents_end);
                    let children = self
                        .parse_elements(next_mode(mode, &element, true), inner_structure.as_ref())?;
                    self.reader.widen(false);
                    element.set_element_children(children);
                }
            } else if contents_begin < contents_end {
                self.reader.narrow(contents_begin, contents_end);
                let objects = self.parse_objects(element_restriction(&element))?;
                self.reader.widen(false);
                element.set_object_children(objects);
            }
            mode = next_mode(mode, &element, false);
            elements.push(element);
        }
        Ok(elements)
    }

    /// Single-dispatch on mode and leading syntax.
    fn parse_element(
        &mut self,
        mode: Mode,
        structure: Option<&ListStructure>,
    ) -> Result<Element, ParseError> {
        if mode == Mode::Item {
            let structure = structure.ok_or(ParseError::MissingStructureEntry {
                offset: self.reader.offset(),
            })?;
            return self.parse_item(structure);
        }
        if let Some(caps) = self.reader.captures(&HEADLINE) {
            return self.parse_headline(caps);
        }
        if mode == Mode::Section {
            return Ok(self.parse_section());
        }
        if mode == Mode::FirstSection {
            let end = self
                .reader
                .find(&HEADING_LINE)
                .map(|m| self.reader.offset() + m.start())
                .unwrap_or_else(|| self.reader.end_offset());
            self.reader.narrow(self.reader.offset(), end);
            let section = self.parse_section();
            self.reader.widen(true);
            return Ok(section);
        }
        if self.reader.find(&ITEM_LINE).is_some() {
            let scanned;
            let structure = match structure {
                Some(structure) => structure,
                None => {
                    scanned = scan_list_structure(&mut self.reader)?;
                    &scanned
                }
            };
            return self.parse_list(structure);
        }
        Ok(self.parse_paragraph())
    }

    /// A section spanning from the cursor to the next heading line or the
    /// window end. The caller descends into it in `section` body mode.
    fn parse_section(&mut self) -> Element {
        let contents_begin = self.reader.offset();
        let contents_end = self
            .reader
            .find(&HEADING_LINE)
            .map(|m| contents_begin + m.start())
            .unwrap_or_else(|| self.reader.end_offset());
        self.reader.set_offset(contents_end);
        Element::Section {
            contents_begin,
            contents_end,
            children: Vec::new(),
        }
    }

    /// A heading line plus its subtree, which runs until the next heading of
    /// the same or a shallower level.
    fn parse_headline(&mut self, caps: regex::Captures<'a>) -> Result<Element, ParseError> {
        let begin = self.reader.offset();
        let level = caps.name("stars").map_or(0, |m| m.as_str().len());
        let (title_begin, raw_value) = caps
            .name("title")
            .map_or((begin + level, String::new()), |m| {
                (begin + m.start(), m.as_str().trim_end().to_string())
            });

        let title = if raw_value.is_empty() {
            Vec::new()
        } else {
            self.reader
                .narrow(title_begin, title_begin + raw_value.len());
            let title = self.parse_objects(Restriction::Standard)?;
            self.reader.widen(false);
            title
        };

        // Contents start past the title line and any blank lines under it.
        let line_len = self.reader.line().len();
        self.reader.advance(line_len);
        self.skip_blank_lines();
        let contents_begin = self.reader.offset();

        let mut contents_end = self.reader.end_offset();
        for found in HEADING_LINE.captures_iter(self.reader.rest()) {
            let found_level = found.name("stars").map_or(0, |m| m.as_str().len());
            if found_level <= level {
                contents_end = contents_begin + found.get(0).map_or(0, |m| m.start());
                break;
            }
        }
        self.reader.set_offset(contents_end);
        Ok(Element::Headline {
            level,
            raw_value,
            title,
            contents_begin,
            contents_end,
            children: Vec::new(),
        })
    }

    /// A plain list assembled from the scanned structure: starting at the
    /// item under the cursor, hop through same-indent entries whose ranges
    /// tile contiguously.
    fn parse_list(&mut self, structure: &ListStructure) -> Result<Element, ParseError> {
        let contents_begin = self.reader.offset();
        let first = structure
            .iter()
            .find(|item| item.begin == contents_begin)
            .ok_or(ParseError::MissingStructureEntry {
                offset: contents_begin,
            })?;
        let indent = first.indent;
        let mut contents_end = first.end;
        while let Some(next) = structure
            .iter()
            .find(|item| item.begin == contents_end && item.indent == indent)
        {
            contents_end = next.end;
        }

        // A sublist keeps only the descriptors inside its own range; the
        // full vector stays with the outermost list.
        let owned: Vec<StructureItem> = structure
            .iter()
            .filter(|item| item.begin >= contents_begin && item.end <= contents_end)
            .cloned()
            .collect();
        let structure = if owned.len() == structure.len() {
            Arc::clone(structure)
        } else {
            Arc::new(owned)
        };

        self.reader.set_offset(contents_end);
        Ok(Element::PlainList {
            indent,
            structure,
            contents_begin,
            contents_end,
            children: Vec::new(),
        })
    }

    /// One list item; its contents run from past the bullet (and any cookie,
    /// checkbox, or tag) to the end recorded in the structure entry.
    fn parse_item(&mut self, structure: &ListStructure) -> Result<Element, ParseError> {
        let begin = self.reader.offset();
        let caps = self
            .reader
            .captures(&FULL_ITEM)
            .ok_or_else(|| ParseError::MalformedItem {
                offset: begin,
                context: context_snippet(self.reader.rest()),
            })?;
        let entry = structure
            .iter()
            .find(|item| item.begin == begin)
            .ok_or(ParseError::MissingStructureEntry { offset: begin })?;

        let contents_end = entry.end;
        let contents_begin = (begin + caps.get(0).map_or(0, |m| m.end())).min(contents_end);
        let checkbox = caps.name("checkbox").and_then(|m| checkbox_of(m.as_str()));
        self.reader.set_offset(contents_end);
        Ok(Element::Item {
            indent: entry.indent,
            bullet: entry.bullet.clone(),
            checkbox,
            structure: Arc::clone(structure),
            contents_begin,
            contents_end,
            children: Vec::new(),
        })
    }

    /// The fallback element. Always succeeds and always consumes at least
    /// the line under the cursor.
    fn parse_paragraph(&mut self) -> Element {
        let contents_begin = self.reader.offset();
        let line_len = self.reader.line().len();
        self.reader.advance(line_len);
        let end = self
            .reader
            .find(&PARAGRAPH_SEPARATOR)
            .map(|m| self.reader.offset() + m.start())
            .unwrap_or_else(|| self.reader.end_offset());

        // Trailing whitespace stays outside the contents so the text objects
        // reconstruct the range exactly.
        let contents = self.reader.substring(contents_begin, end);
        let contents_end = contents_begin + contents.trim_end().len();

        self.reader.set_offset(end);
        self.skip_blank_lines();
        Element::Paragraph {
            contents_begin,
            contents_end,
            children: Vec::new(),
        }
    }

    fn skip_blank_lines(&mut self) {
        while !self.reader.is_eof() {
            let line = self.reader.line();
            if !line.trim().is_empty() {
                break;
            }
            let n = line.len();
            self.reader.advance(n);
        }
    }
}
