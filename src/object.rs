//! Inline object parsing.
//!
//! A leaf element's contents are scanned with an alternation pattern that
//! recognizes the object-starting syntaxes permitted by the active
//! [`Restriction`]. Literal runs between matches become text nodes; a
//! candidate that fails its full parse degrades to text one character at a
//! time so the loop always advances.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{context_snippet, ParseError};
use crate::parse::Parser;
use crate::types::{Element, Object};

/// The object kinds admitted inside a container's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Restriction {
    /// Links and text.
    Standard,
    /// Text only; a bracket link's description forbids nested links.
    Link,
}

/// The restriction governing `_element`'s object contents. Paragraph
/// contents and headline titles both admit the standard set today.
pub(crate) fn element_restriction(_element: &Element) -> Restriction {
    Restriction::Standard
}

/// Starting syntaxes of the standard object set: a bracket link opener or a
/// scheme-like plain link prefix.
static OBJECT_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[|[A-Za-z][A-Za-z0-9+.-]*:[^ \t\r\n]").unwrap());

/// `[[TARGET]]` or `[[TARGET][DESCRIPTION]]`, with backslash-escaped
/// brackets allowed in both parts.
static LINK_BRACKET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\A\[\[(?P<target>(?:[^\[\]\\]|\\.)*)\](?:\[(?P<desc>(?:[^\[\]\\]|\\.)*)\])?\]")
        .unwrap()
});

/// `SCHEME:PATH` with no intervening whitespace, anchored at the cursor.
static LINK_PLAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A(?P<scheme>[A-Za-z][A-Za-z0-9+.-]*):[^ \t\r\n]+").unwrap());

fn object_start(restriction: Restriction) -> Option<&'static Regex> {
    match restriction {
        Restriction::Standard => Some(&OBJECT_START),
        Restriction::Link => None,
    }
}

impl<'a> Parser<'a> {
    /// Parse the visible window as a sequence of objects.
    pub(crate) fn parse_objects(
        &mut self,
        restriction: Restriction,
    ) -> Result<Vec<Object>, ParseError> {
        let mut objects: Vec<Object> = Vec::new();
        let mut prev_offset = usize::MAX;
        while !self.reader.is_eof() {
            let offset = self.reader.offset();
            if offset == prev_offset {
                return Err(ParseError::NoProgress {
                    offset,
                    context: context_snippet(self.reader.rest()),
                });
            }
            prev_offset = offset;

            let found = object_start(restriction).and_then(|re| self.reader.find(re));
            let Some(found) = found else {
                // No object starts in the remaining text; whitespace-only
                // trailing runs are elided.
                let rest = self.reader.rest();
                if !rest.trim().is_empty() {
                    objects.push(Object::text(rest));
                }
                let n = rest.len();
                self.reader.advance(n);
                break;
            };
            if found.start() > 0 {
                let text = self.reader.peek(found.start());
                objects.push(Object::text(text));
                self.reader.advance(found.start());
            }
            match self.parse_object()? {
                Some(object) => objects.push(object),
                None => {
                    // The candidate did not parse as an object; emit its
                    // first character as literal text to guarantee progress.
                    let n = self.reader.rest().chars().next().map_or(1, char::len_utf8);
                    objects.push(Object::text(self.reader.peek(n)));
                    self.reader.advance(n);
                }
            }
        }
        Ok(objects)
    }

    /// Dispatch on the two-byte lookahead at the cursor. Link is the only
    /// object kind with a parser today; both of its forms live there.
    fn parse_object(&mut self) -> Result<Option<Object>, ParseError> {
        self.parse_link()
    }

    fn parse_link(&mut self) -> Result<Option<Object>, ParseError> {
        let offset = self.reader.offset();

        if self.reader.peek(2) == "[[" {
            let Some(caps) = self.reader.captures(&LINK_BRACKET) else {
                return Ok(None);
            };
            let target = caps.name("target").map_or("", |m| m.as_str());
            let link_type = match target.find(':') {
                Some(colon) => target[..colon].to_string(),
                None => "fuzzy".to_string(),
            };
            let children = match caps.name("desc") {
                Some(desc) if !desc.as_str().is_empty() => {
                    self.reader.narrow(offset + desc.start(), offset + desc.end());
                    let children = self.parse_objects(Restriction::Link)?;
                    self.reader.widen(false);
                    children
                }
                _ => Vec::new(),
            };
            let len = caps.get(0).map_or(0, |m| m.end());
            self.reader.advance(len);
            return Ok(Some(Object::Link {
                link_type,
                raw_link: target.to_string(),
                children,
            }));
        }

        if let Some(caps) = self.reader.captures(&LINK_PLAIN) {
            if let Some(whole) = caps.get(0) {
                let link_type = caps["scheme"].to_string();
                let raw_link = whole.as_str().to_string();
                self.reader.advance(whole.end());
                return Ok(Some(Object::Link {
                    link_type,
                    raw_link,
                    children: Vec::new(),
                }));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn objects(input: &str) -> Vec<Object> {
        let mut parser = Parser::new(input);
        parser.parse_objects(Restriction::Standard).unwrap()
    }

    fn text_of(object: &Object) -> &str {
        match object {
            Object::Text { value } => value,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn plain_text_is_one_node() {
        let parsed = objects("just words");
        assert_eq!(parsed.len(), 1);
        assert_eq!(text_of(&parsed[0]), "just words");
    }

    #[test]
    fn whitespace_only_is_elided() {
        assert!(objects("  \t ").is_empty());
    }

    #[test]
    fn bracket_link_with_description() {
        let parsed = objects("[[link][text]]");
        assert_eq!(parsed.len(), 1);
        match &parsed[0] {
            Object::Link {
                link_type,
                raw_link,
                children,
            } => {
                assert_eq!(link_type, "fuzzy");
                assert_eq!(raw_link, "link");
                assert_eq!(children.len(), 1);
                assert_eq!(text_of(&children[0]), "text");
            }
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn bracket_link_without_description() {
        let parsed = objects("[[file:notes.org]]");
        match &parsed[0] {
            Object::Link {
                link_type,
                raw_link,
                children,
            } => {
                assert_eq!(link_type, "file");
                assert_eq!(raw_link, "file:notes.org");
                assert!(children.is_empty());
            }
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn bracket_link_target_keeps_escapes() {
        let parsed = objects(r"[[a\]b]]");
        match &parsed[0] {
            Object::Link { raw_link, .. } => assert_eq!(raw_link, r"a\]b"),
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn plain_link_between_text_runs() {
        let parsed = objects("hello http://example.com blah");
        assert_eq!(parsed.len(), 3);
        assert_eq!(text_of(&parsed[0]), "hello ");
        match &parsed[1] {
            Object::Link {
                link_type,
                raw_link,
                children,
            } => {
                assert_eq!(link_type, "http");
                assert_eq!(raw_link, "http://example.com");
                assert!(children.is_empty());
            }
            other => panic!("expected link, got {other:?}"),
        }
        assert_eq!(text_of(&parsed[2]), " blah");
    }

    #[test]
    fn description_forbids_nested_links() {
        let parsed = objects("[[x][see http://example.com]]");
        match &parsed[0] {
            Object::Link { children, .. } => {
                assert_eq!(children.len(), 1);
                assert_eq!(text_of(&children[0]), "see http://example.com");
            }
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn empty_description_yields_no_children() {
        let parsed = objects("[[x][]]");
        match &parsed[0] {
            Object::Link { children, .. } => assert!(children.is_empty()),
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_bracket_link_degrades_to_text() {
        let parsed = objects("[[broken");
        assert!(parsed
            .iter()
            .all(|object| matches!(object, Object::Text { .. })));
        let joined: String = parsed.iter().map(text_of).collect();
        assert_eq!(joined, "[[broken");
    }

    #[test]
    fn digits_before_colon_are_not_a_scheme() {
        let parsed = objects("meet at 12:30 sharp");
        assert_eq!(parsed.len(), 1);
        assert_eq!(text_of(&parsed[0]), "meet at 12:30 sharp");
    }

    #[test]
    fn text_runs_cover_the_window() {
        let input = "a [[x][y]] b https://e.org c";
        let parsed = objects(input);
        assert_eq!(parsed.len(), 5);
        assert!(matches!(&parsed[1], Object::Link { .. }));
        assert!(matches!(&parsed[3], Object::Link { .. }));
    }
}
