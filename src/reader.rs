//! Cursor over an immutable text buffer with a narrowing stack.
//!
//! The parser threads a single [`Reader`] through every recursive call.
//! Narrowing temporarily restricts the visible range so that a subparse can
//! only ever see the slice of text it owns; widening restores the previous
//! window and, by default, the cursor position saved when the window was
//! pushed.

use regex::{Captures, Match, Regex};

/// A window saved on the narrow stack, restored by [`Reader::widen`].
#[derive(Debug, Clone, Copy)]
struct SavedWindow {
    begin: usize,
    end: usize,
    offset: usize,
}

/// Cursor over an immutable buffer.
///
/// All regex operations run against the *visible slice* — the bytes from the
/// cursor to the current window end — so match positions are relative to the
/// cursor. Patterns that must be anchored at the cursor use `\A`.
#[derive(Debug)]
pub struct Reader<'a> {
    input: &'a str,
    offset: usize,
    window_begin: usize,
    window_end: usize,
    stack: Vec<SavedWindow>,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a str) -> Self {
        Reader {
            input,
            offset: 0,
            window_begin: 0,
            window_end: input.len(),
            stack: Vec::new(),
        }
    }

    /// Current absolute cursor position.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Start of the visible window.
    pub fn begin_offset(&self) -> usize {
        self.window_begin
    }

    /// End of the visible window (buffer length when not narrowed).
    pub fn end_offset(&self) -> usize {
        self.window_end
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.window_end
    }

    /// The visible bytes from the cursor to the window end.
    pub fn rest(&self) -> &'a str {
        let input = self.input;
        &input[self.offset..self.window_end]
    }

    /// Up to `n` visible bytes at the cursor, snapped back to a char boundary.
    pub fn peek(&self, n: usize) -> &'a str {
        let input = self.input;
        let mut end = (self.offset + n).min(self.window_end);
        while end > self.offset && !input.is_char_boundary(end) {
            end -= 1;
        }
        &input[self.offset..end]
    }

    /// Bytes from the cursor through the next newline inclusive, or through
    /// the window end if no newline remains.
    pub fn line(&self) -> &'a str {
        let rest = self.rest();
        match rest.find('\n') {
            Some(i) => &rest[..=i],
            None => rest,
        }
    }

    /// Search the visible slice. The match positions are relative to the
    /// cursor; anchored callers construct their pattern with `\A`.
    pub fn find(&self, re: &Regex) -> Option<Match<'a>> {
        re.find(self.rest())
    }

    /// Like [`Reader::find`] but with capture groups.
    pub fn captures(&self, re: &Regex) -> Option<Captures<'a>> {
        re.captures(self.rest())
    }

    /// Move the cursor forward by `n` bytes, clamped to the window end.
    pub fn advance(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.window_end);
    }

    /// Set the cursor to an absolute offset, clamped to the current window.
    pub fn set_offset(&mut self, abs: usize) {
        self.offset = abs.clamp(self.window_begin, self.window_end);
    }

    /// Bytes `[begin, end)` of the underlying buffer regardless of the window.
    pub fn substring(&self, begin: usize, end: usize) -> &'a str {
        let input = self.input;
        let end = end.min(input.len());
        let begin = begin.min(end);
        &input[begin..end]
    }

    /// Push the current window and replace it with `[begin, end)`, moving the
    /// cursor to `begin`. Every `narrow` must be paired with one `widen`.
    pub fn narrow(&mut self, begin: usize, end: usize) {
        let begin = begin.min(self.input.len());
        let end = end.clamp(begin, self.input.len());
        self.stack.push(SavedWindow {
            begin: self.window_begin,
            end: self.window_end,
            offset: self.offset,
        });
        self.window_begin = begin;
        self.window_end = end;
        self.offset = begin;
    }

    /// Pop the window pushed by the matching [`Reader::narrow`]. The cursor is
    /// restored to the position it held at narrow time unless
    /// `preserve_position` is set.
    pub fn widen(&mut self, preserve_position: bool) {
        if let Some(saved) = self.stack.pop() {
            self.window_begin = saved.begin;
            self.window_end = saved.end;
            if !preserve_position {
                self.offset = saved.offset;
            }
        }
    }
}
