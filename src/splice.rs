//! Position-stable removal and reinsertion of literal text.
//!
//! Both directions of the adapter go through the same mapping: a preserved
//! character recorded at index `i` of the input ends up at index `i` of the
//! output. While reinserting in ascending order the body cursor trails the
//! output cursor by the number of characters already reinserted, so the
//! body slot for entry `k` is `i - k` and no separate offset bookkeeping is
//! needed for decryption.
//!
//! Pattern groups are replaced one span at a time over character indices,
//! leaving the text around each span untouched.

use std::ops::Range;

/// Preserved `(index, character)` entries in ascending index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preserved {
    positions: Vec<(usize, char)>,
}

impl Preserved {
    pub fn positions(&self) -> &[(usize, char)] {
        &self.positions
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Reinsert the preserved characters into a transformed body.
    ///
    /// Entries whose index lies past the end of the text built so far are
    /// appended.
    pub fn restore(&self, body: Vec<char>) -> Vec<char> {
        let mut out = Vec::with_capacity(body.len() + self.positions.len());
        let mut body = body.into_iter();
        for &(index, c) in &self.positions {
            while out.len() < index {
                match body.next() {
                    Some(b) => out.push(b),
                    None => break,
                }
            }
            out.push(c);
        }
        out.extend(body);
        out
    }
}

/// Split `input` into the characters to transform and those to keep in place.
pub fn strip<F>(input: &[char], preserve: F) -> (Vec<char>, Preserved)
where
    F: Fn(char) -> bool,
{
    let mut body = Vec::with_capacity(input.len());
    let mut positions = Vec::new();
    for (index, &c) in input.iter().enumerate() {
        if preserve(c) {
            positions.push((index, c));
        } else {
            body.push(c);
        }
    }
    (body, Preserved { positions })
}

/// Copy of `text` with the characters in `span` replaced by `replacement`.
///
/// Everything outside `span` is left untouched.
pub fn replace_span(text: &[char], span: Range<usize>, replacement: &[char]) -> Vec<char> {
    debug_assert!(span.start <= span.end && span.end <= text.len());
    let mut out = Vec::with_capacity(text.len() - span.len() + replacement.len());
    out.extend_from_slice(&text[..span.start]);
    out.extend_from_slice(replacement);
    out.extend_from_slice(&text[span.end..]);
    out
}
