//! Canonical text form for skill documents.
//!
//! [`normalize`] is the only way a document is brought into canonical form.
//! Check and fix both call it; they differ only in whether frontmatter repair
//! runs before validation.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

/// Placeholder in a skill source where resolved blocks are substituted.
pub const MARKER: &str = "{{COMMON_BLOCKS}}";

const FRONTMATTER_DELIM: &str = "---";
const BOM: char = '\u{feff}';

/// How far into a document repair looks for a merged closing delimiter.
const FRONTMATTER_SCAN_LIMIT: usize = 120;

static MARKER_RUN: LazyLock<Regex> = LazyLock::new(|| {
    // Whitespace-only lines before the marker, the marker, then the rest of
    // its line and any whitespace-only lines after it.
    Regex::new(r"(?:[ \t]*\n)*[ \t]*\{\{COMMON_BLOCKS\}\}[ \t]*(?:\n(?:[ \t]*\n)*)?")
        .expect("valid regex")
});

static NEWLINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

static FIELD_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+\s*:").expect("valid regex"));

/// Whether frontmatter repair runs before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Validate only.
    Check,
    /// Repair common frontmatter malformations, then validate.
    Fix,
}

/// A frontmatter validation failure. Returned as a value, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontmatterError {
    MissingOpening,
    MissingClosing,
    InlineClosingMarker { line: usize },
}

impl fmt::Display for FrontmatterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingOpening => write!(f, "frontmatter must start with '---' on line 1"),
            Self::MissingClosing => {
                write!(f, "frontmatter missing closing '---' on its own line")
            }
            Self::InlineClosingMarker { line } => write!(
                f,
                "frontmatter contains inline closing marker on line {line}; closing '---' must be on its own line"
            ),
        }
    }
}

/// Result of [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub frontmatter_error: Option<FrontmatterError>,
}

impl Normalized {
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.frontmatter_error.is_none()
    }
}

/// Bring `text` into canonical form and validate its frontmatter.
#[must_use]
pub fn normalize(text: &str, mode: Mode) -> Normalized {
    let spaced = normalize_whitespace(&unify(text));
    // Marker lines are split out before repair inspects field lines.
    let text = match mode {
        Mode::Check => spaced,
        Mode::Fix => normalize_whitespace(&repair_frontmatter(&spaced)),
    };
    let frontmatter_error = validate_frontmatter(&text);
    Normalized {
        text,
        frontmatter_error,
    }
}

/// Line endings, marker spacing, blank-line runs and the trailing newline.
///
/// This is the frontmatter-agnostic part of [`normalize`].
#[must_use]
pub fn normalize_text(text: &str) -> String {
    normalize_whitespace(&unify(text))
}

/// `\r\n` and lone `\r` become `\n`; leading byte-order marks are dropped.
#[must_use]
pub fn unify(text: &str) -> String {
    let text = text.trim_start_matches(BOM);
    if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text.to_string()
    }
}

fn normalize_whitespace(text: &str) -> String {
    let len = text.len();
    let spaced = MARKER_RUN.replace_all(text, |caps: &Captures<'_>| {
        let Some(whole) = caps.get(0) else {
            return MARKER.to_string();
        };
        let before = if whole.start() == 0 { "" } else { "\n\n" };
        let after = if whole.end() == len { "\n" } else { "\n\n" };
        format!("{before}{MARKER}{after}")
    });
    let collapsed = NEWLINE_RUN.replace_all(&spaced, "\n\n");
    let mut out = collapsed.trim_end().to_string();
    out.push('\n');
    out
}

fn is_field_line(line: &str) -> bool {
    FIELD_LINE.is_match(line)
}

fn has_inline_delimiter(line: &str) -> bool {
    is_field_line(line) && line.trim_end().ends_with(FRONTMATTER_DELIM)
}

fn strip_inline_delimiter(line: &str) -> String {
    let mut rest = line.trim_end();
    while let Some(head) = rest.strip_suffix(FRONTMATTER_DELIM) {
        rest = head.trim_end();
    }
    rest.to_string()
}

fn repair_frontmatter(text: &str) -> String {
    let stripped = text.trim_start_matches('\n');
    let text = if stripped
        .trim_start_matches([' ', '\t'])
        .starts_with(FRONTMATTER_DELIM)
    {
        stripped
    } else {
        text
    };

    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    if lines[0].trim() == FRONTMATTER_DELIM {
        lines[0] = FRONTMATTER_DELIM.to_string();
    }
    if lines[0] != FRONTMATTER_DELIM {
        return lines.join("\n");
    }

    let closing = (1..lines.len()).find(|&idx| lines[idx].trim() == FRONTMATTER_DELIM);
    match closing {
        Some(closing) => {
            lines[closing] = FRONTMATTER_DELIM.to_string();
            // A closing line already exists, so a merged marker is simply dropped.
            for line in &mut lines[1..closing] {
                if has_inline_delimiter(line) {
                    *line = strip_inline_delimiter(line);
                }
            }
        }
        None => {
            let limit = lines.len().min(FRONTMATTER_SCAN_LIMIT);
            if let Some(idx) = (1..limit).find(|&idx| has_inline_delimiter(&lines[idx])) {
                lines[idx] = strip_inline_delimiter(&lines[idx]);
                lines.insert(idx + 1, FRONTMATTER_DELIM.to_string());
            }
        }
    }

    lines.join("\n")
}

fn validate_frontmatter(text: &str) -> Option<FrontmatterError> {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.first() != Some(&FRONTMATTER_DELIM) {
        return Some(FrontmatterError::MissingOpening);
    }

    let closing = (1..lines.len()).find(|&idx| lines[idx] == FRONTMATTER_DELIM);
    let mut field_range = match closing {
        Some(closing) => 1..closing,
        None => 1..lines.len().min(FRONTMATTER_SCAN_LIMIT),
    };
    if let Some(idx) = field_range.find(|&idx| has_inline_delimiter(lines[idx])) {
        return Some(FrontmatterError::InlineClosingMarker { line: idx + 1 });
    }

    if closing.is_none() {
        return Some(FrontmatterError::MissingClosing);
    }
    None
}
