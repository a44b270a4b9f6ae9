/// Errors raised when the parser detects a violation of its own invariants.
///
/// These never occur on valid input: the element and object loops are
/// forgiving by construction, so an `Err` from [`crate::parse`] indicates a
/// bug in the parser, not in the document. Each variant carries the offending
/// offset and a truncated dump of the remaining input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("parser made no progress at offset {offset}, remaining input {context:?}")]
    NoProgress { offset: usize, context: String },

    #[error("no list structure entry begins at offset {offset}")]
    MissingStructureEntry { offset: usize },

    #[error("item pattern matched but full item pattern failed at offset {offset}, remaining input {context:?}")]
    MalformedItem { offset: usize, context: String },
}

/// Truncate `rest` for inclusion in an error message.
pub(crate) fn context_snippet(rest: &str) -> String {
    const MAX: usize = 60;
    if rest.len() <= MAX {
        return rest.to_string();
    }
    let mut end = MAX;
    while !rest.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &rest[..end])
}
