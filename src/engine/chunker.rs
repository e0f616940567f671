//! Chunk partitioner: split an oversized text into bounded, contiguous, ordered chunks.
//!
//! Bounds are in bytes. A chunk never splits a UTF-8 character, so a chunk only exceeds `max`
//! when a single character is wider than `max` (possible only for `max < 4`).

/// One contiguous slice of the source text and its position in the sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub index: usize,
    pub text: &'a str,
}

/// Lazy chunk sequence over a borrowed text. `Clone` restarts from the clone's position.
#[derive(Clone, Debug)]
pub struct Chunks<'a> {
    text: &'a str,
    max: usize,
    offset: usize,
    index: usize,
}

/// Partition `text` into chunks of at most `max` bytes. `max == 0` is treated as 1.
/// An empty text yields one empty chunk so callers always have something to analyze.
pub fn partition(text: &str, max: usize) -> Chunks<'_> {
    Chunks {
        text,
        max: max.max(1),
        offset: 0,
        index: 0,
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Chunk<'a>> {
        let len = self.text.len();
        if self.offset >= len && !(len == 0 && self.index == 0) {
            return None;
        }
        let start = self.offset;
        let mut end = (start + self.max).min(len);
        while !self.text.is_char_boundary(end) {
            end -= 1;
        }
        if end == start && start < len {
            // Single character wider than max: take it whole.
            end = start + 1;
            while !self.text.is_char_boundary(end) {
                end += 1;
            }
        }
        let chunk = Chunk {
            index: self.index,
            text: &self.text[start..end],
        };
        self.offset = end;
        self.index += 1;
        Some(chunk)
    }
}
