use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// The flat item descriptor vector produced by the list structure scanner.
///
/// Shared by reference between a plain list and all of its items; never
/// mutated after scanning.
pub type ListStructure = Arc<Vec<StructureItem>>;

/// A parsed org outline document.
///
/// `children` are at most one leading [`Element::Section`] followed by zero
/// or more [`Element::Headline`]s. All byte offsets in the tree index
/// `source`, which is the input text with CRLF line endings normalized to LF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgData {
    /// Always zero.
    pub contents_begin: usize,
    /// Length of `source` in bytes.
    pub contents_end: usize,
    /// Ordered top-level children.
    pub children: Vec<Element>,
    /// The text that was parsed.
    pub source: String,
}

/// A greater element or element of the document body.
///
/// Greater elements (headline, section, plain list, item) contain further
/// elements; the paragraph leaf contains [`Object`]s. Every variant carries
/// the byte range of its contents within the source buffer, with
/// `contents_begin <= contents_end` and children nested inside their parent's
/// range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Element {
    /// A star-prefixed outline heading and everything below it until the next
    /// sibling-or-shallower heading.
    Headline {
        /// Number of leading stars (>= 1).
        level: usize,
        /// Verbatim title text after the stars, trailing whitespace trimmed.
        raw_value: String,
        /// The title parsed as objects.
        title: Vec<Object>,
        contents_begin: usize,
        contents_end: usize,
        /// The section under the heading (if any) followed by descendant
        /// headlines strictly deeper in level.
        children: Vec<Element>,
    },
    /// A run of elements attached to a headline or the document root, ending
    /// at the next heading.
    Section {
        contents_begin: usize,
        contents_end: usize,
        children: Vec<Element>,
    },
    /// Leaf element whose contents are parsed as objects.
    Paragraph {
        contents_begin: usize,
        contents_end: usize,
        children: Vec<Object>,
    },
    /// A plain list: one or more items sharing the same bullet indentation.
    PlainList {
        /// Column of the first item's bullet.
        indent: usize,
        /// Item descriptors for this list and its sublists.
        structure: ListStructure,
        contents_begin: usize,
        contents_end: usize,
        children: Vec<Element>,
    },
    /// A single list item.
    Item {
        indent: usize,
        /// The bullet as written, e.g. `-`, `+`, `1.`, `2)`.
        bullet: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        checkbox: Option<Checkbox>,
        /// The descriptor vector shared with the enclosing list.
        structure: ListStructure,
        contents_begin: usize,
        contents_end: usize,
        children: Vec<Element>,
    },
}

/// An inline object inside a leaf element's contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Object {
    /// A bracket or plain link.
    Link {
        /// The substring of the target before the first colon, or `fuzzy`
        /// for a bracket target with no scheme.
        link_type: String,
        /// The uninterpreted link target.
        raw_link: String,
        /// Description objects of a bracket link, empty otherwise.
        children: Vec<Object>,
    },
    /// A literal span of input with no further structure.
    Text { value: String },
}

/// Checkbox state of a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Checkbox {
    /// `[ ]`
    Off,
    /// `[X]` or `[x]`
    On,
    /// `[-]`
    Trans,
}

/// A purely locational record for one list item, produced by the list
/// structure scanner. `end` is finalized at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureItem {
    pub begin: usize,
    pub indent: usize,
    pub bullet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkbox: Option<Checkbox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub end: usize,
}

impl Element {
    /// The byte range of this element's contents.
    pub fn contents_range(&self) -> (usize, usize) {
        match self {
            Element::Headline {
                contents_begin,
                contents_end,
                ..
            }
            | Element::Section {
                contents_begin,
                contents_end,
                ..
            }
            | Element::Paragraph {
                contents_begin,
                contents_end,
                ..
            }
            | Element::PlainList {
                contents_begin,
                contents_end,
                ..
            }
            | Element::Item {
                contents_begin,
                contents_end,
                ..
            } => (*contents_begin, *contents_end),
        }
    }

    /// Whether this element contains further elements (rather than objects).
    pub fn is_greater(&self) -> bool {
        !matches!(self, Element::Paragraph { .. })
    }

    /// Element children of a greater element.
    pub fn children(&self) -> &[Element] {
        match self {
            Element::Headline { children, .. }
            | Element::Section { children, .. }
            | Element::PlainList { children, .. }
            | Element::Item { children, .. } => children,
            Element::Paragraph { .. } => &[],
        }
    }

    /// The shared structure vector of a list or item.
    pub(crate) fn structure(&self) -> Option<ListStructure> {
        match self {
            Element::PlainList { structure, .. } | Element::Item { structure, .. } => {
                Some(Arc::clone(structure))
            }
            _ => None,
        }
    }

    pub(crate) fn set_element_children(&mut self, new: Vec<Element>) {
        match self {
            Element::Headline { children, .. }
            | Element::Section { children, .. }
            | Element::PlainList { children, .. }
            | Element::Item { children, .. } => *children = new,
            Element::Paragraph { .. } => debug_assert!(false, "paragraph holds objects"),
        }
    }

    pub(crate) fn set_object_children(&mut self, new: Vec<Object>) {
        match self {
            Element::Paragraph { children, .. } => *children = new,
            _ => debug_assert!(false, "only paragraphs hold objects"),
        }
    }
}

impl Object {
    pub(crate) fn text(value: &str) -> Object {
        Object::Text {
            value: value.to_string(),
        }
    }
}
