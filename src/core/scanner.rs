//! Splits game-data text into its top-level JSON objects.
//!
//! Game data files are not always a single JSON document: most are arrays of
//! objects, some are bare objects, and some concatenate several. The scanner
//! does not care about the surrounding structure. It tracks brace depth and
//! string state in one pass, and every time depth returns to zero the bytes
//! since the opening brace are parsed as one object.
//!
//! The tracker is a small state machine: string state
//! (`Outside`, `Inside`, `Escaped`) crossed with a brace-depth counter.
//! Braces and quotes only count while `Outside`.

use std::ops::Range;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::data::SourceSpan;

/// A top-level object could not be delimited or parsed.
#[derive(Debug, Error)]
pub enum MalformedObjectError {
    #[error("unexpected '}}' at byte {offset} (line {line})")]
    UnbalancedClose { offset: usize, line: usize },

    #[error("unterminated object starting at byte {offset} (line {line})")]
    UnterminatedObject { offset: usize, line: usize },

    #[error("unterminated string starting at byte {offset} (line {line})")]
    UnterminatedString { offset: usize, line: usize },

    #[error("invalid JSON object at byte {offset} (line {line}): {source}")]
    InvalidJson {
        offset: usize,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl MalformedObjectError {
    /// Byte offset the error was detected at.
    pub fn offset(&self) -> usize {
        match self {
            Self::UnbalancedClose { offset, .. }
            | Self::UnterminatedObject { offset, .. }
            | Self::UnterminatedString { offset, .. }
            | Self::InvalidJson { offset, .. } => *offset,
        }
    }

    /// Best-known 1-indexed line of the error.
    pub fn line(&self) -> usize {
        match self {
            Self::UnbalancedClose { line, .. }
            | Self::UnterminatedObject { line, .. }
            | Self::UnterminatedString { line, .. }
            | Self::InvalidJson { line, .. } => *line,
        }
    }
}

/// One top-level object found by [`scan`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedObject {
    pub object: Map<String, Value>,
    pub span: SourceSpan,
    /// Byte range of the object's text, braces included.
    pub range: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringState {
    Outside,
    Inside,
    /// Inside a string, right after an unescaped backslash.
    Escaped,
}

/// Position of an opening token: byte offset and line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mark {
    offset: usize,
    line: usize,
}

/// Byte-level boundary tracker.
#[derive(Debug)]
struct BoundaryTracker {
    state: StringState,
    depth: usize,
    line: usize,
    object_start: Option<Mark>,
    string_start: Mark,
}

impl BoundaryTracker {
    fn new() -> Self {
        Self {
            state: StringState::Outside,
            depth: 0,
            line: 1,
            object_start: None,
            string_start: Mark { offset: 0, line: 1 },
        }
    }

    /// Consume one byte. Returns the range and span of a top-level object
    /// when this byte closes one.
    fn feed(
        &mut self,
        offset: usize,
        byte: u8,
    ) -> Result<Option<(Range<usize>, SourceSpan)>, MalformedObjectError> {
        if byte == b'\n' && self.state != StringState::Escaped {
            self.line += 1;
        }

        let mut closed = None;
        self.state = match (self.state, byte) {
            (StringState::Escaped, _) => StringState::Inside,
            (StringState::Inside, b'\\') => StringState::Escaped,
            (StringState::Inside, b'"') => StringState::Outside,
            (StringState::Inside, _) => StringState::Inside,
            (StringState::Outside, b'"') => {
                self.string_start = Mark {
                    offset,
                    line: self.line,
                };
                StringState::Inside
            }
            (StringState::Outside, b'{') => {
                if self.depth == 0 {
                    self.object_start = Some(Mark {
                        offset,
                        line: self.line,
                    });
                }
                self.depth += 1;
                StringState::Outside
            }
            (StringState::Outside, b'}') => {
                if self.depth == 0 {
                    return Err(MalformedObjectError::UnbalancedClose {
                        offset,
                        line: self.line,
                    });
                }
                self.depth -= 1;
                if self.depth == 0
                    && let Some(start) = self.object_start.take()
                {
                    closed = Some((
                        start.offset..offset + 1,
                        SourceSpan::new(start.line, self.line),
                    ));
                }
                StringState::Outside
            }
            (StringState::Outside, _) => StringState::Outside,
        };

        Ok(closed)
    }

    /// Check that the input did not end inside a string or an object.
    fn finish(self) -> Result<(), MalformedObjectError> {
        if self.state != StringState::Outside {
            return Err(MalformedObjectError::UnterminatedString {
                offset: self.string_start.offset,
                line: self.string_start.line,
            });
        }
        if let Some(start) = self.object_start
            && self.depth > 0
        {
            return Err(MalformedObjectError::UnterminatedObject {
                offset: start.offset,
                line: start.line,
            });
        }
        Ok(())
    }
}

/// Split `text` into its top-level JSON objects, in document order.
///
/// Anything between objects (array brackets, commas, whitespace, even stray
/// scalars) is skipped. Input with no objects yields an empty vector.
pub fn scan(text: &str) -> Result<Vec<ScannedObject>, MalformedObjectError> {
    let mut tracker = BoundaryTracker::new();
    let mut objects = Vec::new();

    // Structural bytes are ASCII, so byte offsets always land on char boundaries.
    for (offset, byte) in text.bytes().enumerate() {
        if let Some((range, span)) = tracker.feed(offset, byte)? {
            objects.push(parse_object(text, range, span)?);
        }
    }
    tracker.finish()?;

    Ok(objects)
}

fn parse_object(
    text: &str,
    range: Range<usize>,
    span: SourceSpan,
) -> Result<ScannedObject, MalformedObjectError> {
    let object = serde_json::from_str::<Map<String, Value>>(&text[range.clone()]).map_err(
        |source| MalformedObjectError::InvalidJson {
            offset: range.start,
            line: span.start_line + source.line().saturating_sub(1),
            source,
        },
    )?;

    Ok(ScannedObject {
        object,
        span,
        range,
    })
}
