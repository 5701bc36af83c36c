//! # Text Wrapping
//!
//! Word-wraps text against a cell budget before it enters the line
//! composer. The budget is expressed in character cells: a glyph printed
//! with a width multiplier of `w` occupies `w` cells, and the first line
//! additionally pays for the composer's current cursor position (`indent`).
//!
//! Breaking units are whitespace, soft hyphen points (`foo-` inside
//! `foo-bar`) and explicit newlines. Tokens wider than a whole line are
//! split character-wise.

use regex::Regex;
use std::sync::LazyLock;

/// Token pattern: explicit newlines, hyphen-breakable chunks, words, and
/// intra-line whitespace, tried in that order.
static TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\r\n|[\r\n]|[^\s-]+?-\b|\S+|[^\S\r\n]+").expect("token pattern is valid")
});

/// Wrapping parameters.
#[derive(Debug, Clone, Copy)]
pub struct WrapOptions {
    /// Total cell budget per line.
    pub columns: usize,
    /// Width multiplier of the active character size (1–8).
    pub width: usize,
    /// Cells already consumed on the first line.
    pub indent: usize,
}

/// Wrap `text` into lines such that every line fits the cell budget.
///
/// Trailing whitespace is stripped from every line except the last, which
/// keeps it so the composer's cursor accounts for it (right alignment
/// strips it again with multiplier awareness). Explicit empty lines are
/// preserved.
pub fn wrap(text: &str, options: &WrapOptions) -> Vec<String> {
    let width = options.width.max(1);
    let columns = options.columns;
    // Maximum glyphs a full line can hold at this multiplier.
    let glyphs_per_line = (columns / width).max(1);

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut used = options.indent;

    for token in TOKENS.find_iter(text).map(|m| m.as_str()) {
        if token == "\n" || token == "\r" || token == "\r\n" {
            lines.push(std::mem::take(&mut current));
            used = 0;
            continue;
        }

        let cells = token.chars().count() * width;

        if token.chars().all(char::is_whitespace) {
            if used + cells <= columns {
                current.push_str(token);
                used += cells;
            } else if !current.is_empty() || used > 0 {
                // Whitespace never starts the next line.
                lines.push(std::mem::take(&mut current));
                used = 0;
            }
            continue;
        }

        if used + cells <= columns {
            current.push_str(token);
            used += cells;
            continue;
        }

        if cells <= columns {
            // Fits on a line of its own.
            lines.push(std::mem::take(&mut current));
            current.push_str(token);
            used = cells;
            continue;
        }

        // Token wider than a whole line: split character-wise. A partial
        // prefix lands on the current line only when at least eight glyphs
        // worth of cells remain there.
        let chars: Vec<char> = token.chars().collect();
        let mut idx = 0;
        let remaining = columns.saturating_sub(used);
        if remaining >= 8 * width {
            idx = remaining / width;
            current.extend(chars[..idx].iter());
        }
        if !current.is_empty() || used > 0 {
            lines.push(std::mem::take(&mut current));
        }
        used = 0;

        while idx < chars.len() {
            let take = glyphs_per_line.min(chars.len() - idx);
            if idx + take < chars.len() {
                lines.push(chars[idx..idx + take].iter().collect());
            } else {
                // Final piece stays open so following tokens join it.
                current = chars[idx..].iter().collect();
                used = take * width;
            }
            idx += take;
        }
    }

    lines.push(current);

    let last = lines.len() - 1;
    for line in &mut lines[..last] {
        let trimmed = line.trim_end().len();
        line.truncate(trimmed);
    }

    lines
}
