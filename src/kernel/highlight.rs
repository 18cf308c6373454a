//! Match locations and per-line highlights.
//!
//! Remote matches report byte ranges that may cross lines. Previews need one
//! `(line, character, length)` record per line, so ranges are decomposed
//! against the text they point into.

use serde::{Deserialize, Serialize};

/// A point in a text. `offset` and `column` are in bytes, `line` is 0-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    pub fn add(self, delta: Location) -> Self {
        Self {
            offset: self.offset + delta.offset,
            line: self.line + delta.line,
            column: self.column + delta.column,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Location,
    pub end: Location,
}

impl Range {
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }

    /// Shifts both ends, e.g. to move a range from a raw field into a
    /// document that prefixes it.
    pub fn add(self, delta: Location) -> Self {
        Self {
            start: self.start.add(delta),
            end: self.end.add(delta),
        }
    }

    pub fn add_all(ranges: &[Range], delta: Location) -> Vec<Range> {
        ranges.iter().map(|r| r.add(delta)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightedRange {
    pub line: i32,
    pub character: i32,
    pub length: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightedString {
    pub value: String,
    pub highlights: Vec<HighlightedRange>,
}

impl HighlightedString {
    pub fn new(value: impl Into<String>, ranges: &[Range]) -> Self {
        let value = value.into();
        let highlights = ranges_to_highlights(&value, ranges);
        Self { value, highlights }
    }
}

pub fn ranges_to_highlights(s: &str, ranges: &[Range]) -> Vec<HighlightedRange> {
    ranges
        .iter()
        .flat_map(|r| range_to_highlights(s, *r))
        .collect()
}

/// Splits a possibly multi-line range into one highlight per touched line.
///
/// The first line starts at `start.column`, later lines at 0. The line equal
/// to `end.line` is cut at `end.column`; lines in between keep their full
/// length. Empty results are dropped. A range that does not fit `s` yields
/// nothing.
pub fn range_to_highlights(s: &str, r: Range) -> Vec<HighlightedRange> {
    let Some(slice) = s.get(r.start.offset..r.end.offset) else {
        tracing::debug!(
            start = r.start.offset,
            end = r.end.offset,
            len = s.len(),
            "range outside of content"
        );
        return Vec::new();
    };

    let mut res = Vec::new();
    for (i, line) in slice.lines().enumerate() {
        let line_num = r.start.line + i;

        let character = if line_num == r.start.line {
            r.start.column
        } else {
            0
        };

        let length = if line_num == r.end.line {
            r.end.column as i64 - character as i64
        } else {
            line.len() as i64
        };

        if length > 0 {
            res.push(HighlightedRange {
                line: to_i32(line_num),
                character: to_i32(character),
                length: to_i32(length),
            });
        }
    }
    res
}

fn to_i32<T: TryInto<i32>>(v: T) -> i32 {
    v.try_into().unwrap_or(i32::MAX)
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/highlight.rs"]
mod tests;
