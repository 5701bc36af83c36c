//! # Line Composition
//!
//! The stateful middle of the encoder: API calls become [`Item`]s, items
//! accumulate into a buffer with cell-accurate cursor bookkeeping, and
//! completed lines move to a queue that `encode` later linearizes.
//!
//! A line leaves [`LineComposer::fetch`] fully laid out:
//!
//! - text alignment is resolved into plain space padding, never wire
//!   commands (those exist only as payload-carrying `align` items that
//!   bracket barcodes and images);
//! - the line is bracketed by style items: deltas carried over from the
//!   previous line up front, deltas driving back to default at the end,
//!   so any single line is style-idempotent on the printer;
//! - adjacent text items sharing a codepage are merged, as are adjacent
//!   size deltas.

use crate::dialect::Alignment;
use crate::style::{StyleDelta, StyleTracker};
use crate::wrap::{self, WrapOptions};

/// What a finalized payload item is. The bytes are already wire-exact;
/// the kind survives so policy decisions (auto-flush, trailing newline
/// suppression) can look at what a line ends with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Raw,
    Image,
    Barcode,
    QrCode,
    Pdf417,
    Cut,
    Pulse,
    Initialize,
    Font,
    Codepage,
    LineSpacing,
    Flush,
}

/// One element of a composed line.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Text still awaiting codepage encoding. `codepage` is a fixed
    /// codepage name, or `None` for auto-detection at encode time.
    Text {
        value: String,
        codepage: Option<&'static str>,
    },
    /// A style delta, translated through the dialect at encode time.
    Style(StyleDelta),
    /// Layout spaces (`size` cells of 0x20).
    Space { size: usize },
    /// Alignment marker. Without payload it is layout-only and is consumed
    /// by `fetch`; with payload it is an embedded dialect emission that
    /// stays in the line (alignment bracketing around barcodes/images).
    Align {
        value: Alignment,
        payload: Option<Vec<u8>>,
    },
    /// Finalized command bytes.
    Payload { kind: CommandKind, bytes: Vec<u8> },
    /// Placeholder for a deliberately blank line.
    Empty,
}

/// A finalized line.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub items: Vec<Item>,
    /// Tallest size-style height on the line; 1 for plain lines. Callers
    /// use it to estimate paper advance.
    pub height: u8,
    /// Whether the line terminator follows this line on the wire. False
    /// for command-only flushes (cut, pulse, barcodes, images).
    pub newline: bool,
}

/// Options for [`LineComposer::flush`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FlushOptions {
    /// Emit a line even if empty (explicit newline).
    pub force_newline: bool,
    /// Emit pending zero-width items even when no cell was used.
    pub force_flush: bool,
    /// Lay the line out left-aligned regardless of the current alignment.
    pub ignore_alignment: bool,
}

impl FlushOptions {
    pub fn newline() -> Self {
        Self { force_newline: true, ..Self::default() }
    }

    pub fn flush() -> Self {
        Self { force_flush: true, ..Self::default() }
    }
}

/// The line composition engine.
#[derive(Debug)]
pub struct LineComposer {
    columns: usize,
    embedded: bool,
    cursor: usize,
    buffer: Vec<Item>,
    stored: Vec<StyleDelta>,
    align: Alignment,
    lines: Vec<Line>,
    style: StyleTracker,
}

impl LineComposer {
    pub fn new(columns: usize, embedded: bool) -> Self {
        Self {
            columns,
            embedded,
            cursor: 0,
            buffer: Vec::new(),
            stored: Vec::new(),
            align: Alignment::Left,
            lines: Vec::new(),
            style: StyleTracker::new(),
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Rescale the column budget (font changes).
    pub fn set_columns(&mut self, columns: usize) {
        self.columns = columns;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn embedded(&self) -> bool {
        self.embedded
    }

    /// The alignment in effect for the line currently being built,
    /// including not-yet-flushed layout markers.
    pub fn alignment(&self) -> Alignment {
        self.buffer
            .iter()
            .rev()
            .find_map(|item| match item {
                Item::Align { value, payload: None } => Some(*value),
                _ => None,
            })
            .unwrap_or(self.align)
    }

    /// Queue an alignment change (takes effect at the next fetch).
    pub fn set_alignment(&mut self, value: Alignment) {
        self.add(Item::Align { value, payload: None }, 0);
    }

    /// The style tracker; deltas returned by its setters must be fed back
    /// through [`LineComposer::add`].
    pub fn style_mut(&mut self) -> &mut StyleTracker {
        &mut self.style
    }

    pub fn style(&self) -> &StyleTracker {
        &self.style
    }

    /// Word-wrap `value` and queue it. Every wrapped line except the last
    /// flushes; the last stays open so subsequent items join it.
    pub fn text(&mut self, value: &str, codepage: Option<&'static str>) {
        let width = self.style.current().width as usize;
        let wrapped = wrap::wrap(
            value,
            &WrapOptions { columns: self.columns, width, indent: self.cursor },
        );
        let last = wrapped.len() - 1;
        for (index, line) in wrapped.into_iter().enumerate() {
            if !line.is_empty() {
                let length = line.chars().count() * width;
                self.add(Item::Text { value: line, codepage }, length);
            }
            if index < last {
                self.flush(FlushOptions::newline());
            }
        }
    }

    /// Queue `size` cells of whitespace.
    pub fn space(&mut self, size: usize) {
        self.add(Item::Space { size }, size);
    }

    /// Queue finalized command bytes occupying `length` cells.
    pub fn raw(&mut self, kind: CommandKind, bytes: Vec<u8>, length: usize) {
        self.add(Item::Payload { kind, bytes }, length);
    }

    /// Queue an item occupying `length` cells, breaking the line first
    /// when it does not fit.
    pub fn add(&mut self, item: Item, length: usize) {
        if length + self.cursor > self.columns {
            self.flush(FlushOptions::default());
        }
        self.buffer.push(item);
        self.cursor += length;
    }

    /// Queue a pre-composed run of items (an embedded table cell line)
    /// occupying `length` cells.
    pub fn add_items(&mut self, items: Vec<Item>, length: usize) {
        if length + self.cursor > self.columns {
            self.flush(FlushOptions::default());
        }
        self.buffer.extend(items);
        self.cursor += length;
    }

    /// Force the next add to start a fresh line.
    pub fn end(&mut self) {
        self.cursor = self.columns;
    }

    /// Finalize the pending line (if any) onto the queue.
    pub fn flush(&mut self, options: FlushOptions) {
        if let Some(line) = self.fetch(options) {
            self.lines.push(line);
        }
    }

    /// Take the queued lines, leaving the queue empty.
    pub fn take_lines(&mut self) -> Vec<Line> {
        std::mem::take(&mut self.lines)
    }

    /// Whether any queued line or pending buffer content exists.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.buffer.is_empty() && self.cursor == 0
    }

    /// Lay out the pending buffer as a finished line.
    fn fetch(&mut self, options: FlushOptions) -> Option<Line> {
        if self.cursor == 0 && !options.force_newline && !options.force_flush {
            return None;
        }

        // Layout alignment markers apply to this line in order (last
        // wins) and persist for the lines that follow.
        let mut align = self.align;
        let mut buffer: Vec<Item> = Vec::with_capacity(self.buffer.len());
        for item in self.buffer.drain(..) {
            match item {
                Item::Align { value, payload: None } => align = value,
                other => buffer.push(other),
            }
        }
        self.align = align;
        let effective = if options.ignore_alignment { Alignment::Left } else { align };

        let had_content = self.cursor > 0;
        let mut cursor = self.cursor;

        if effective == Alignment::Right && had_content {
            cursor -= self.strip_trailing_space(&mut buffer);
        }

        // Pad only lines that hold cells; embedded lines always fill the
        // full budget so table cells stay rectangular.
        let remaining = self.columns.saturating_sub(cursor);
        let pad_total = if had_content || self.embedded { remaining } else { 0 };

        let stored: Vec<Item> = self.stored.drain(..).map(Item::Style).collect();
        let closing: Vec<Item> = self.style.store().into_iter().map(Item::Style).collect();

        let mut result: Vec<Item> = Vec::with_capacity(buffer.len() + 4);
        match effective {
            Alignment::Left => {
                result.extend(stored);
                result.extend(buffer);
                result.extend(closing);
                if self.embedded && pad_total > 0 {
                    result.push(Item::Space { size: pad_total });
                }
            }
            Alignment::Right => {
                if pad_total > 0 {
                    result.push(Item::Space { size: pad_total });
                }
                result.extend(stored);
                result.extend(buffer);
                result.extend(closing);
            }
            Alignment::Center => {
                let left = pad_total / 2;
                let right = pad_total - left;
                if left > 0 {
                    result.push(Item::Space { size: left });
                }
                result.extend(stored);
                result.extend(buffer);
                result.extend(closing);
                if self.embedded && right > 0 {
                    result.push(Item::Space { size: right });
                }
            }
        }

        let mut result = merge_items(result);

        self.cursor = 0;
        self.stored = self.style.restore();

        if result.is_empty() {
            if !options.force_newline {
                return None;
            }
            result.push(Item::Empty);
        }

        let mut height = 1u8;
        for item in &result {
            if let Item::Style(StyleDelta::Size { height: h, .. }) = item {
                height = height.max(*h);
            }
        }

        Some(Line {
            items: result,
            height,
            newline: options.force_newline || had_content,
        })
    }

    /// Remove trailing whitespace from the end of the buffer for right
    /// alignment. Returns the number of cells freed.
    fn strip_trailing_space(&self, buffer: &mut Vec<Item>) -> usize {
        match buffer.last_mut() {
            Some(Item::Space { size }) => {
                let freed = *size;
                buffer.pop();
                freed
            }
            Some(Item::Text { value, .. }) => {
                let width = self.style.current().width as usize;
                let kept = value.trim_end_matches(' ').len();
                let removed = value.len() - kept;
                if removed == 0 {
                    return 0;
                }
                value.truncate(kept);
                if value.is_empty() {
                    buffer.pop();
                }
                removed * width
            }
            _ => 0,
        }
    }
}

/// Merge adjacent text items with compatible codepages and collapse
/// consecutive size deltas (the later one wins).
fn merge_items(items: Vec<Item>) -> Vec<Item> {
    let mut out: Vec<Item> = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Item::Text { value, codepage } => {
                if let Some(Item::Text { value: prev, codepage: prev_cp }) = out.last_mut()
                    && compatible_codepages(*prev_cp, codepage)
                {
                    prev.push_str(&value);
                    if prev_cp.is_none() {
                        *prev_cp = codepage;
                    }
                } else {
                    out.push(Item::Text { value, codepage });
                }
            }
            Item::Style(StyleDelta::Size { width, height }) => {
                if let Some(last @ Item::Style(StyleDelta::Size { .. })) = out.last_mut() {
                    *last = Item::Style(StyleDelta::Size { width, height });
                } else {
                    out.push(Item::Style(StyleDelta::Size { width, height }));
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn compatible_codepages(a: Option<&'static str>, b: Option<&'static str>) -> bool {
    a.is_none() || b.is_none() || a == b
}
