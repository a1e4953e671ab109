//! Delimited block scanning.
//!
//! A block for tag `t` starts with a line that is exactly `<t>` and ends with
//! the next line that is exactly `</t>`. Blocks are located by walking lines,
//! so a nested opening or a stray closing delimiter is reported instead of
//! being matched ambiguously.

use std::path::Path;

use crate::error::{Result, SyncError};

/// Byte offsets of one block inside its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// Start of the opening delimiter line.
    pub start: usize,
    /// End of the closing delimiter, excluding its newline.
    pub end: usize,
    body_start: usize,
    body_end: usize,
    /// 1-indexed line of the opening delimiter.
    pub line: usize,
}

impl BlockSpan {
    /// The full block, delimiters included.
    #[must_use]
    pub fn text<'a>(&self, doc: &'a str) -> &'a str {
        &doc[self.start..self.end]
    }

    /// The content between the delimiter lines, without the final newline.
    #[must_use]
    pub fn body<'a>(&self, doc: &'a str) -> &'a str {
        let body = &doc[self.body_start..self.body_end];
        body.strip_suffix('\n').unwrap_or(body)
    }
}

#[must_use]
pub fn opening(tag: &str) -> String {
    format!("<{tag}>")
}

#[must_use]
pub fn closing(tag: &str) -> String {
    format!("</{tag}>")
}

/// Iterate `(offset, line_number, line)` with the newline stripped.
fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, usize, &str)> {
    let mut offset = 0;
    text.split_inclusive('\n')
        .enumerate()
        .map(move |(idx, raw)| {
            let start = offset;
            offset += raw.len();
            (start, idx + 1, raw.strip_suffix('\n').unwrap_or(raw))
        })
}

/// Find every block for `tag`, in document order.
pub fn scan(text: &str, tag: &str) -> Result<Vec<BlockSpan>> {
    let open = opening(tag);
    let close = closing(tag);
    let mut spans = Vec::new();
    let mut current: Option<(usize, usize, usize)> = None;

    for (start, line_no, line) in lines_with_offsets(text) {
        if line == open {
            if let Some((_, _, open_line)) = current {
                return Err(malformed(tag, open_line, "nested opening delimiter"));
            }
            let body_start = (start + line.len() + 1).min(text.len());
            current = Some((start, body_start, line_no));
        } else if line == close {
            let Some((block_start, body_start, open_line)) = current.take() else {
                return Err(malformed(tag, line_no, "closing delimiter without opening"));
            };
            spans.push(BlockSpan {
                start: block_start,
                end: start + line.len(),
                body_start,
                body_end: start,
                line: open_line,
            });
        }
    }

    if let Some((_, _, open_line)) = current {
        return Err(malformed(tag, open_line, "unterminated block"));
    }
    Ok(spans)
}

fn malformed(tag: &str, line: usize, reason: &'static str) -> SyncError {
    SyncError::MalformedBlock {
        tag: tag.to_string(),
        line,
        reason,
    }
}

/// The single block for `tag`, if present. More than one is an error.
pub fn find_unique(text: &str, tag: &str, source: &Path) -> Result<Option<BlockSpan>> {
    let spans = scan(text, tag)?;
    match spans.as_slice() {
        [] => Ok(None),
        [span] => Ok(Some(*span)),
        _ => Err(SyncError::DuplicateBlock {
            tag: tag.to_string(),
            source_path: source.to_path_buf(),
        }),
    }
}

/// The text of the single block for `tag`, which must exist.
pub fn require<'a>(text: &'a str, tag: &str, source: &Path) -> Result<&'a str> {
    find_unique(text, tag, source)?
        .map(|span| span.text(text))
        .ok_or_else(|| SyncError::MissingBlock {
            tag: tag.to_string(),
            source_path: source.to_path_buf(),
        })
}

/// Byte offset just past the first line that is exactly `</tag>`.
#[must_use]
pub fn closing_line_end(text: &str, tag: &str) -> Option<usize> {
    let close = closing(tag);
    lines_with_offsets(text)
        .find(|(_, _, line)| *line == close)
        .map(|(start, _, line)| start + line.len())
}
