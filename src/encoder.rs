//! # Encoder Facade
//!
//! The fluent document API. An [`Encoder`] owns the line composer, style
//! tracker, buffer pool and codepage state for one document at a time;
//! API calls queue command items, `commands()` finalizes them into lines,
//! and `encode()` linearizes the lines into wire bytes for the active
//! dialect.
//!
//! ## Example
//!
//! ```
//! use recibo::{Encoder, EncoderOptions, CutType};
//!
//! let mut encoder = Encoder::new(EncoderOptions::new().printer_model("epson-tm-t88v"))?;
//! encoder
//!     .initialize()?
//!     .bold(true)?
//!     .line("CHURRA MART")?
//!     .bold(false)?
//!     .line("thanks for coming by")?
//!     .cut(CutType::Partial)?;
//! let bytes = encoder.encode()?;
//! # assert!(!bytes.is_empty());
//! # Ok::<(), recibo::Error>(())
//! ```
//!
//! Tables and boxes render their content through nested encoders in
//! embedded mode: width-constrained documents whose every line is padded
//! to the full cell budget, so rows concatenate into rectangles. Embedded
//! encoders refuse top-level operations (initialize, cut, pulse, codes,
//! images, font changes).

use crate::codepage;
use crate::compose::{CommandKind, FlushOptions, Item, Line, LineComposer};
use crate::dialect::{
    Alignment, BarcodeOptions, CutType, Dialect, DialectKind, Font, ImageMode, Pdf417Options,
    QrOptions, Symbology,
};
use crate::error::{Error, Result, Strictness};
use crate::image::Image;
use crate::pool::BufferPool;
use crate::printer::{self, Capabilities, Newline, mappings, mappings::CodepageMapping};
use crate::stream::{ChunkOptions, ChunkStream};
use crate::style::StyleDelta;
use log::warn;

/// Column counts accepted for top-level encoders.
const VALID_COLUMNS: &[usize] = &[32, 35, 42, 44, 48];

/// Construction options. Anything left unset falls back to the printer
/// model's capability record (or to generic ESC/POS defaults when no
/// model is named).
#[derive(Debug, Default)]
pub struct EncoderOptions {
    printer_model: Option<String>,
    dialect: Option<DialectKind>,
    columns: Option<usize>,
    newline: Option<Newline>,
    codepage_mapping: Option<String>,
    image_mode: Option<ImageMode>,
    feed_before_cut: Option<u8>,
    auto_flush: Option<bool>,
    strictness: Strictness,
}

impl EncoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure from a printer model id (see [`crate::printer::models`]).
    pub fn printer_model(mut self, id: impl Into<String>) -> Self {
        self.printer_model = Some(id.into());
        self
    }

    pub fn dialect(mut self, dialect: DialectKind) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn newline(mut self, newline: Newline) -> Self {
        self.newline = Some(newline);
        self
    }

    pub fn codepage_mapping(mut self, name: impl Into<String>) -> Self {
        self.codepage_mapping = Some(name.into());
        self
    }

    pub fn image_mode(mut self, mode: ImageMode) -> Self {
        self.image_mode = Some(mode);
        self
    }

    pub fn feed_before_cut(mut self, lines: u8) -> Self {
        self.feed_before_cut = Some(lines);
        self
    }

    pub fn auto_flush(mut self, enabled: bool) -> Self {
        self.auto_flush = Some(enabled);
        self
    }

    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }
}

/// Vertical placement of short cells inside a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlign {
    #[default]
    Top,
    Bottom,
}

/// Layout of one table column.
#[derive(Debug, Clone, Copy)]
pub struct TableColumn {
    pub width: usize,
    pub margin_left: usize,
    pub margin_right: usize,
    pub align: Alignment,
    pub vertical_align: VerticalAlign,
}

impl TableColumn {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            margin_left: 0,
            margin_right: 0,
            align: Alignment::Left,
            vertical_align: VerticalAlign::Top,
        }
    }

    pub fn margin_left(mut self, cells: usize) -> Self {
        self.margin_left = cells;
        self
    }

    pub fn margin_right(mut self, cells: usize) -> Self {
        self.margin_right = cells;
        self
    }

    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    pub fn vertical_align(mut self, vertical_align: VerticalAlign) -> Self {
        self.vertical_align = vertical_align;
        self
    }
}

/// Content of a table cell or box body: plain text, or a builder closure
/// run against a nested embedded encoder.
pub enum Cell<'a> {
    Text(String),
    Build(Box<dyn FnOnce(&mut Encoder) -> Result<()> + 'a>),
}

impl Cell<'_> {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

impl<'a> Cell<'a> {
    pub fn build(f: impl FnOnce(&mut Encoder) -> Result<()> + 'a) -> Self {
        Cell::Build(Box::new(f))
    }
}

impl From<&str> for Cell<'_> {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell<'_> {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

/// Rule and box border styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    Single,
    Double,
}

/// Options for [`Encoder::rule`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleOptions {
    pub style: BorderStyle,
    /// Defaults to the full line width.
    pub width: Option<usize>,
}

/// Box frame styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxStyle {
    #[default]
    Single,
    Double,
    /// No frame; margins and padding still apply.
    None,
}

/// Options for [`Encoder::draw_box`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxOptions {
    pub style: BoxStyle,
    /// Total box width including borders and padding; defaults to the
    /// line width minus the margin.
    pub width: Option<usize>,
    /// Cells of whitespace left of the box.
    pub margin: usize,
    /// Cells of whitespace between border and content.
    pub padding: usize,
    /// Content alignment inside the box.
    pub align: Alignment,
}

/// The document encoder.
pub struct Encoder {
    driver: Box<dyn Dialect>,
    dialect: DialectKind,
    capabilities: Capabilities,
    mapping: &'static CodepageMapping,
    newline: Newline,
    columns: usize,
    composer: LineComposer,
    pool: BufferPool,
    codepage: Option<&'static str>,
    font: Font,
    feed_before_cut: u8,
    auto_flush: bool,
    strictness: Strictness,
    embedded: bool,
    image_mode: ImageMode,
}

impl Encoder {
    /// Build an encoder from options, resolving printer-model defaults.
    pub fn new(options: EncoderOptions) -> Result<Self> {
        let capabilities = match &options.printer_model {
            Some(id) => {
                printer::lookup(id)
                    .ok_or_else(|| Error::Configuration(format!("unknown printer model: {id}")))?
                    .capabilities
            }
            None => printer::generic_capabilities(
                options.dialect.unwrap_or(DialectKind::EscPos),
            ),
        };

        let dialect = options.dialect.unwrap_or(capabilities.dialect);
        let mapping_name = options
            .codepage_mapping
            .as_deref()
            .unwrap_or(capabilities.codepage_mapping);
        let mapping = mappings::lookup(mapping_name).ok_or_else(|| {
            Error::Configuration(format!("unknown codepage mapping: {mapping_name}"))
        })?;

        let columns = options.columns.unwrap_or_else(|| capabilities.columns());
        if !VALID_COLUMNS.contains(&columns) {
            return Err(Error::Configuration(format!(
                "column count must be one of {VALID_COLUMNS:?}, got {columns}"
            )));
        }

        Ok(Self {
            driver: dialect.driver(),
            dialect,
            capabilities,
            mapping,
            newline: options.newline.unwrap_or(capabilities.newline),
            columns,
            composer: LineComposer::new(columns, false),
            pool: BufferPool::new(),
            codepage: None,
            font: Font::A,
            feed_before_cut: options.feed_before_cut.unwrap_or(capabilities.cutter_feed),
            auto_flush: options
                .auto_flush
                .unwrap_or(dialect == DialectKind::StarPrnt),
            strictness: options.strictness,
            embedded: false,
            image_mode: options.image_mode.unwrap_or(capabilities.image.mode),
        })
    }

    /// Shorthand for [`EncoderOptions::printer_model`].
    pub fn for_printer(id: &str) -> Result<Self> {
        Self::new(EncoderOptions::new().printer_model(id))
    }

    /// A fresh embedded encoder for a table cell or box body.
    fn nested(&self, columns: usize, align: Alignment) -> Encoder {
        let mut encoder = Encoder {
            driver: self.dialect.driver(),
            dialect: self.dialect,
            capabilities: self.capabilities,
            mapping: self.mapping,
            newline: self.newline,
            columns,
            composer: LineComposer::new(columns, true),
            pool: BufferPool::new(),
            codepage: self.codepage,
            font: Font::A,
            feed_before_cut: 0,
            auto_flush: false,
            strictness: self.strictness,
            embedded: true,
            image_mode: self.image_mode,
        };
        if align != Alignment::Left {
            encoder.composer.set_alignment(align);
        }
        encoder
    }

    pub fn dialect(&self) -> DialectKind {
        self.dialect
    }

    pub fn columns(&self) -> usize {
        self.composer.columns()
    }

    /// The font selected by the last [`Encoder::font`] call.
    pub fn active_font(&self) -> Font {
        self.font
    }

    /// The buffer pool handle, for tests that examine recycling.
    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    fn ensure_top_level(&self, operation: &str) -> Result<()> {
        if self.embedded {
            return Err(Error::Context(format!(
                "{operation} is not available inside an embedded document"
            )));
        }
        Ok(())
    }

    /// Strict encoders fail on capability violations; relaxed ones log
    /// and let the caller no-op.
    fn capability_gate(&self, message: String) -> Result<()> {
        match self.strictness {
            Strictness::Strict => Err(Error::Capability(message)),
            Strictness::Relaxed => {
                warn!("{message}; skipping");
                Ok(())
            }
        }
    }

    fn push_style(&mut self, delta: Option<StyleDelta>) {
        if let Some(delta) = delta {
            self.composer.add(Item::Style(delta), 0);
        }
    }

    // ------------------------------------------------------------------
    // Document content
    // ------------------------------------------------------------------

    /// Queue the printer reset sequence.
    pub fn initialize(&mut self) -> Result<&mut Self> {
        self.ensure_top_level("initialize")?;
        let bytes = self.driver.initialize();
        self.composer.raw(CommandKind::Initialize, bytes, 0);
        Ok(self)
    }

    /// Select a codepage by name, or `"auto"` to segment per text run.
    pub fn codepage(&mut self, name: &str) -> Result<&mut Self> {
        if name == "auto" {
            self.codepage = None;
            return Ok(self);
        }
        let resolved = self
            .mapping
            .entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(entry, _)| *entry)
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "codepage {name} is not in the {} mapping",
                    self.mapping.name
                ))
            })?;
        if !codepage::supports(resolved) {
            return Err(Error::Configuration(format!(
                "codepage {name} has no encoding table"
            )));
        }
        self.codepage = Some(resolved);
        Ok(self)
    }

    /// Queue text, word-wrapped to the line budget.
    pub fn text(&mut self, value: &str) -> Result<&mut Self> {
        self.composer.text(value, self.codepage);
        Ok(self)
    }

    /// End the current line.
    pub fn newline(&mut self) -> Result<&mut Self> {
        self.composer.flush(FlushOptions::newline());
        Ok(self)
    }

    /// End the current line and feed `count - 1` blank lines after it.
    pub fn newlines(&mut self, count: usize) -> Result<&mut Self> {
        for _ in 0..count {
            self.composer.flush(FlushOptions::newline());
        }
        Ok(self)
    }

    /// Text followed by a newline.
    pub fn line(&mut self, value: &str) -> Result<&mut Self> {
        self.text(value)?.newline()
    }

    // ------------------------------------------------------------------
    // Styling
    // ------------------------------------------------------------------

    pub fn bold(&mut self, enabled: bool) -> Result<&mut Self> {
        let delta = self.composer.style_mut().set_bold(enabled);
        self.push_style(delta);
        Ok(self)
    }

    pub fn italic(&mut self, enabled: bool) -> Result<&mut Self> {
        let delta = self.composer.style_mut().set_italic(enabled);
        self.push_style(delta);
        Ok(self)
    }

    pub fn underline(&mut self, enabled: bool) -> Result<&mut Self> {
        let delta = self.composer.style_mut().set_underline(enabled);
        self.push_style(delta);
        Ok(self)
    }

    pub fn invert(&mut self, enabled: bool) -> Result<&mut Self> {
        let delta = self.composer.style_mut().set_invert(enabled);
        self.push_style(delta);
        Ok(self)
    }

    /// Character width multiplier, 1–8.
    pub fn width(&mut self, multiplier: u8) -> Result<&mut Self> {
        validate_multiplier("width", multiplier)?;
        let delta = self.composer.style_mut().set_width(multiplier);
        self.push_style(delta);
        Ok(self)
    }

    /// Character height multiplier, 1–8.
    pub fn height(&mut self, multiplier: u8) -> Result<&mut Self> {
        validate_multiplier("height", multiplier)?;
        let delta = self.composer.style_mut().set_height(multiplier);
        self.push_style(delta);
        Ok(self)
    }

    /// Width and height multipliers together.
    pub fn size(&mut self, width: u8, height: u8) -> Result<&mut Self> {
        validate_multiplier("width", width)?;
        validate_multiplier("height", height)?;
        let delta = self.composer.style_mut().set_size(width, height);
        self.push_style(delta);
        Ok(self)
    }

    /// Switch fonts. Only valid at the start of a line; rescales the
    /// column budget by the font's column count.
    pub fn font(&mut self, font: Font) -> Result<&mut Self> {
        self.ensure_top_level("font change")?;
        if self.composer.cursor() > 0 {
            return Err(Error::Context("font cannot change mid-line".into()));
        }
        let Some(spec) = self.capabilities.font(font) else {
            self.capability_gate(format!("printer has no font {font:?}"))?;
            return Ok(self);
        };
        let font_a = self
            .capabilities
            .font(Font::A)
            .map_or(spec.columns, |a| a.columns);
        let scaled = self.columns * spec.columns / font_a;

        let bytes = self.driver.font(font);
        self.composer.raw(CommandKind::Font, bytes, 0);
        self.composer.set_columns(scaled);
        self.font = font;
        Ok(self)
    }

    /// Set text alignment for the current and following lines.
    pub fn align(&mut self, alignment: Alignment) -> Result<&mut Self> {
        self.composer.set_alignment(alignment);
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Layout helpers
    // ------------------------------------------------------------------

    /// A horizontal rule across the line (or `width` cells of it).
    pub fn rule(&mut self, options: RuleOptions) -> Result<&mut Self> {
        let width = options.width.unwrap_or_else(|| self.composer.columns());
        let glyph = match options.style {
            BorderStyle::Single => '─',
            BorderStyle::Double => '═',
        };
        self.composer.flush(FlushOptions::default());
        let value: String = std::iter::repeat_n(glyph, width).collect();
        self.composer.text(&value, self.codepage);
        self.composer.flush(FlushOptions::newline());
        Ok(self)
    }

    /// Render rows of cells against a column layout. Every cell goes
    /// through a nested embedded encoder sized to the column width; short
    /// cells are padded to the row's tallest cell per `vertical_align`.
    pub fn table(&mut self, columns: &[TableColumn], rows: Vec<Vec<Cell<'_>>>) -> Result<&mut Self> {
        self.ensure_top_level("table")?;
        if columns.is_empty() {
            return Err(Error::Validation("table needs at least one column".into()));
        }
        self.composer.flush(FlushOptions::default());

        for row in rows {
            if row.len() != columns.len() {
                return Err(Error::Validation(format!(
                    "row has {} cells but the table has {} columns",
                    row.len(),
                    columns.len()
                )));
            }

            let mut cells: Vec<Vec<Line>> = Vec::with_capacity(row.len());
            for (cell, column) in row.into_iter().zip(columns) {
                let mut nested = self.nested(column.width, column.align);
                match cell {
                    Cell::Text(text) => {
                        nested.text(&text)?;
                    }
                    Cell::Build(build) => build(&mut nested)?,
                }
                cells.push(nested.commands());
            }

            let height = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
            for (lines, column) in cells.iter_mut().zip(columns) {
                while lines.len() < height {
                    let blank = Line {
                        items: vec![Item::Space { size: column.width }],
                        height: 1,
                        newline: false,
                    };
                    match column.vertical_align {
                        VerticalAlign::Top => lines.push(blank),
                        VerticalAlign::Bottom => lines.insert(0, blank),
                    }
                }
            }

            for index in 0..height {
                for (lines, column) in cells.iter_mut().zip(columns) {
                    if column.margin_left > 0 {
                        self.composer.space(column.margin_left);
                    }
                    let items = std::mem::take(&mut lines[index].items);
                    self.composer.add_items(items, column.width);
                    if column.margin_right > 0 {
                        self.composer.space(column.margin_right);
                    }
                }
                self.composer.flush(FlushOptions::newline());
            }
        }
        Ok(self)
    }

    /// Draw a bordered (or borderless) box around nested content.
    pub fn draw_box(&mut self, options: BoxOptions, content: Cell<'_>) -> Result<&mut Self> {
        self.ensure_top_level("box")?;
        let width = options
            .width
            .unwrap_or_else(|| self.composer.columns().saturating_sub(options.margin));
        let border = usize::from(options.style != BoxStyle::None);
        let inner = width
            .checked_sub(2 * border + 2 * options.padding)
            .filter(|inner| *inner > 0)
            .ok_or_else(|| {
                Error::Validation(format!(
                    "box width {width} leaves no room for borders and padding"
                ))
            })?;

        let mut nested = self.nested(inner, options.align);
        match content {
            Cell::Text(text) => {
                nested.text(&text)?;
            }
            Cell::Build(build) => build(&mut nested)?,
        }
        let lines = nested.commands();

        let (top_left, top_right, bottom_left, bottom_right, horizontal, vertical) =
            match options.style {
                BoxStyle::Single => ('┌', '┐', '└', '┘', '─', '│'),
                BoxStyle::Double => ('╔', '╗', '╚', '╝', '═', '║'),
                BoxStyle::None => (' ', ' ', ' ', ' ', ' ', ' '),
            };

        self.composer.flush(FlushOptions::default());

        if border == 1 {
            self.box_edge(top_left, horizontal, top_right, width, options.margin);
        }
        for line in lines {
            if options.margin > 0 {
                self.composer.space(options.margin);
            }
            if border == 1 {
                self.add_glyph(vertical);
            }
            if options.padding > 0 {
                self.composer.space(options.padding);
            }
            self.composer.add_items(line.items, inner);
            if options.padding > 0 {
                self.composer.space(options.padding);
            }
            if border == 1 {
                self.add_glyph(vertical);
            }
            self.composer.flush(FlushOptions::newline());
        }
        if border == 1 {
            self.box_edge(bottom_left, horizontal, bottom_right, width, options.margin);
        }
        Ok(self)
    }

    fn box_edge(&mut self, left: char, fill: char, right: char, width: usize, margin: usize) {
        if margin > 0 {
            self.composer.space(margin);
        }
        let mut value = String::with_capacity(width * 3);
        value.push(left);
        value.extend(std::iter::repeat_n(fill, width.saturating_sub(2)));
        value.push(right);
        let cells = value.chars().count();
        self.composer
            .add(Item::Text { value, codepage: self.codepage }, cells);
        self.composer.flush(FlushOptions::newline());
    }

    fn add_glyph(&mut self, glyph: char) {
        self.composer.add(
            Item::Text { value: glyph.to_string(), codepage: self.codepage },
            1,
        );
    }

    // ------------------------------------------------------------------
    // Codes, images, hardware
    // ------------------------------------------------------------------

    /// Queue a 1D barcode, validated against the printer's symbologies.
    pub fn barcode(
        &mut self,
        value: &str,
        symbology: Symbology,
        options: BarcodeOptions,
    ) -> Result<&mut Self> {
        self.ensure_top_level("barcode")?;
        let support = &self.capabilities.barcodes;
        if !support.supported || !support.symbologies.contains(&symbology) {
            self.capability_gate(format!(
                "printer does not support {} barcodes",
                symbology.name()
            ))?;
            return Ok(self);
        }
        let bytes = self.driver.barcode(value, symbology, &options)?;
        self.command_with_alignment(CommandKind::Barcode, bytes);
        Ok(self)
    }

    /// Queue a QR code, validated against the printer's supported models.
    pub fn qrcode(&mut self, value: &str, options: QrOptions) -> Result<&mut Self> {
        self.ensure_top_level("qrcode")?;
        let support = &self.capabilities.qrcode;
        if !support.supported || !support.models.contains(&options.model) {
            self.capability_gate(format!(
                "printer does not support QR codes (model {:?})",
                options.model
            ))?;
            return Ok(self);
        }
        let bytes = self.driver.qrcode(value, &options)?;
        self.command_with_alignment(CommandKind::QrCode, bytes);
        Ok(self)
    }

    /// Queue a PDF417 code, substituting the capability fallback
    /// symbology on printers that cannot render PDF417.
    pub fn pdf417(&mut self, value: &str, options: Pdf417Options) -> Result<&mut Self> {
        self.ensure_top_level("pdf417")?;
        let support = self.capabilities.pdf417;
        if !support.supported {
            if let Some(fallback) = support.fallback {
                warn!(
                    "printer does not render PDF417; substituting a {} barcode",
                    fallback.name()
                );
                return self.barcode(value, fallback, BarcodeOptions::default());
            }
            self.capability_gate("printer does not support PDF417".into())?;
            return Ok(self);
        }
        let bytes = self.driver.pdf417(value, &options)?;
        self.command_with_alignment(CommandKind::Pdf417, bytes);
        Ok(self)
    }

    /// Queue an image in the active image mode. Large images take the
    /// cooperatively-yielding path; output bytes do not depend on it.
    pub async fn image(&mut self, image: &Image<'_>) -> Result<&mut Self> {
        self.ensure_top_level("image")?;
        let compress = self.capabilities.image.compression;
        let bytes = self
            .driver
            .image(image, self.image_mode, compress, &mut self.pool)
            .await?;
        self.command_with_alignment(CommandKind::Image, bytes);
        Ok(self)
    }

    /// Feed past the print head and cut the paper.
    pub fn cut(&mut self, cut_type: CutType) -> Result<&mut Self> {
        self.ensure_top_level("cut")?;
        self.composer.flush(FlushOptions::default());
        for _ in 0..self.feed_before_cut {
            self.composer.flush(FlushOptions::newline());
        }
        let bytes = self.driver.cut(cut_type);
        self.composer.raw(CommandKind::Cut, bytes, 0);
        self.composer.flush(FlushOptions::flush());
        Ok(self)
    }

    /// Fire the cash drawer.
    pub fn pulse(&mut self, device: u8, on_ms: u16, off_ms: u16) -> Result<&mut Self> {
        self.ensure_top_level("pulse")?;
        self.composer.flush(FlushOptions::default());
        let bytes = self.driver.pulse(device, on_ms, off_ms);
        self.composer.raw(CommandKind::Pulse, bytes, 0);
        self.composer.flush(FlushOptions::flush());
        Ok(self)
    }

    /// Queue opaque bytes verbatim.
    pub fn raw(&mut self, bytes: Vec<u8>) -> Result<&mut Self> {
        self.composer.raw(CommandKind::Raw, bytes, 0);
        Ok(self)
    }

    /// Alignment for barcodes and images is a wire command, not space
    /// padding: bracket the payload with align emissions when the
    /// document is not left-aligned.
    fn command_with_alignment(&mut self, kind: CommandKind, bytes: Vec<u8>) {
        self.composer.flush(FlushOptions::default());
        let alignment = self.composer.alignment();
        if alignment != Alignment::Left {
            let payload = self.driver.align(alignment);
            self.composer
                .add(Item::Align { value: alignment, payload: Some(payload) }, 0);
        }
        self.composer.raw(kind, bytes, 0);
        if alignment != Alignment::Left {
            let payload = self.driver.align(Alignment::Left);
            self.composer
                .add(Item::Align { value: Alignment::Left, payload: Some(payload) }, 0);
        }
        self.composer.flush(FlushOptions::flush());
    }

    // ------------------------------------------------------------------
    // Finalization
    // ------------------------------------------------------------------

    /// Finalize the document into lines and reset the encoder for the
    /// next one.
    pub fn commands(&mut self) -> Vec<Line> {
        self.composer.flush(FlushOptions::flush());
        let mut lines = self.composer.take_lines();

        if self.auto_flush && !self.embedded {
            let last_command = lines
                .iter()
                .rev()
                .flat_map(|line| line.items.iter().rev())
                .find_map(|item| match item {
                    Item::Payload { kind, .. } => Some(*kind),
                    _ => None,
                });
            if !matches!(last_command, Some(CommandKind::Cut | CommandKind::Pulse)) {
                let bytes = self.driver.flush();
                if !bytes.is_empty() {
                    lines.push(Line {
                        items: vec![Item::Payload { kind: CommandKind::Flush, bytes }],
                        height: 1,
                        newline: false,
                    });
                }
            }
        }

        self.composer = LineComposer::new(self.columns, self.embedded);
        self.font = Font::A;
        self.codepage = None;
        lines
    }

    /// Linearize into one contiguous byte buffer.
    pub fn encode(&mut self) -> Result<Vec<u8>> {
        Ok(self.render()?.concat())
    }

    /// Linearize into per-line byte buffers (terminators included).
    pub fn encode_lines(&mut self) -> Result<Vec<Vec<u8>>> {
        self.render()
    }

    /// Linearize and wrap in a chunked stream for backpressure-aware
    /// transmission.
    pub fn encode_chunks(&mut self, options: ChunkOptions) -> Result<ChunkStream> {
        let data = self.encode()?;
        ChunkStream::new(data, options)
    }

    fn render(&mut self) -> Result<Vec<Vec<u8>>> {
        let lines = self.commands();
        let candidates: Vec<&'static str> = self.mapping.candidates().collect();
        // Sentinel: the first text run always emits its codepage command.
        let mut wire_codepage: Option<u8> = None;

        let mut rendered = Vec::with_capacity(lines.len());
        for line in lines {
            let mut out = Vec::new();
            for item in line.items {
                self.render_item(item, &mut out, &mut wire_codepage, &candidates)?;
            }
            if line.newline {
                out.extend_from_slice(self.newline.bytes());
            }
            rendered.push(out);
        }
        Ok(rendered)
    }

    fn render_item(
        &self,
        item: Item,
        out: &mut Vec<u8>,
        wire_codepage: &mut Option<u8>,
        candidates: &[&'static str],
    ) -> Result<()> {
        match item {
            Item::Text { value, codepage } => match codepage {
                Some(name) => {
                    let bytes = codepage::encode(&value, name)?;
                    self.switch_codepage(name, out, wire_codepage)?;
                    out.extend_from_slice(&bytes);
                }
                None => {
                    for run in codepage::auto_encode(&value, candidates) {
                        self.switch_codepage(run.codepage, out, wire_codepage)?;
                        out.extend_from_slice(&run.bytes);
                    }
                }
            },
            Item::Style(delta) => {
                let bytes = match delta {
                    StyleDelta::Bold(enabled) => self.driver.bold(enabled),
                    StyleDelta::Italic(enabled) => self.driver.italic(enabled),
                    StyleDelta::Underline(enabled) => self.driver.underline(enabled),
                    StyleDelta::Invert(enabled) => self.driver.invert(enabled),
                    StyleDelta::Size { width, height } => self.driver.size(width, height),
                };
                out.extend_from_slice(&bytes);
            }
            Item::Space { size } => out.extend(std::iter::repeat_n(b' ', size)),
            Item::Align { payload: Some(bytes), .. } => out.extend_from_slice(&bytes),
            Item::Align { payload: None, .. } => {}
            Item::Payload { bytes, .. } => out.extend_from_slice(&bytes),
            Item::Empty => {}
        }
        Ok(())
    }

    fn switch_codepage(
        &self,
        name: &str,
        out: &mut Vec<u8>,
        wire_codepage: &mut Option<u8>,
    ) -> Result<()> {
        let value = self.mapping.wire_value(name).ok_or_else(|| {
            Error::Configuration(format!(
                "codepage {name} is not in the {} mapping",
                self.mapping.name
            ))
        })?;
        if *wire_codepage != Some(value) {
            out.extend_from_slice(&self.driver.codepage(value));
            *wire_codepage = Some(value);
        }
        Ok(())
    }
}

fn validate_multiplier(what: &str, value: u8) -> Result<()> {
    if !(1..=8).contains(&value) {
        return Err(Error::Validation(format!(
            "{what} multiplier must be 1-8, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escpos_encoder() -> Encoder {
        Encoder::new(EncoderOptions::new()).unwrap()
    }

    #[test]
    fn test_simple_line_and_cut_prefix() {
        let mut encoder = escpos_encoder();
        encoder
            .initialize()
            .unwrap()
            .line("Hi")
            .unwrap()
            .cut(CutType::Full)
            .unwrap();
        let bytes = encoder.encode().unwrap();
        assert_eq!(
            bytes,
            vec![
                0x1B, 0x40, 0x1C, 0x2E, 0x1B, 0x4D, 0x00, // initialize
                0x1B, 0x74, 0x00, // cp437
                0x48, 0x69, // "Hi"
                0x0A, 0x0D, // newline
                0x1D, 0x56, 0x00, // full cut, no trailing newline
            ]
        );
    }

    #[test]
    fn test_bold_toggle_between_text_runs() {
        let mut encoder = escpos_encoder();
        encoder
            .text("a")
            .unwrap()
            .bold(true)
            .unwrap()
            .text("b")
            .unwrap()
            .bold(false)
            .unwrap()
            .text("c")
            .unwrap()
            .newline()
            .unwrap();
        let bytes = encoder.encode().unwrap();
        let expected = [
            &[0x1B, 0x74, 0x00][..],
            b"a",
            &[0x1B, 0x45, 0x01],
            b"b",
            &[0x1B, 0x45, 0x00],
            b"c",
            &[0x0A, 0x0D],
        ]
        .concat();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_unknown_model_is_configuration_error() {
        let result = Encoder::new(EncoderOptions::new().printer_model("made-up-9000"));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_invalid_columns_rejected() {
        let result = Encoder::new(EncoderOptions::new().columns(40));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_width_multiplier_validated() {
        let mut encoder = escpos_encoder();
        assert!(matches!(encoder.width(9), Err(Error::Validation(_))));
        assert!(matches!(encoder.width(0), Err(Error::Validation(_))));
    }

    #[test]
    fn test_codepage_unknown_name() {
        let mut encoder = escpos_encoder();
        assert!(matches!(
            encoder.codepage("cp1047"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_codepage_dedup_across_lines() {
        let mut encoder = escpos_encoder();
        encoder.line("one").unwrap().line("two").unwrap();
        let bytes = encoder.encode().unwrap();
        let switches = bytes
            .windows(2)
            .filter(|pair| pair == &[0x1B, 0x74])
            .count();
        assert_eq!(switches, 1, "same codepage must not be re-emitted");
    }

    #[test]
    fn test_font_change_mid_line_rejected() {
        let mut encoder = escpos_encoder();
        encoder.text("abc").unwrap();
        assert!(matches!(encoder.font(Font::B), Err(Error::Context(_))));
    }

    #[test]
    fn test_font_change_scales_columns() {
        let mut encoder = escpos_encoder();
        assert_eq!(encoder.columns(), 42);
        encoder.font(Font::B).unwrap();
        assert_eq!(encoder.columns(), 56);
    }

    #[test]
    fn test_capability_strict_vs_relaxed() {
        // TM-T88IV has no QR support.
        let mut relaxed = Encoder::for_printer("epson-tm-t88iv").unwrap();
        relaxed.qrcode("data", QrOptions::default()).unwrap();
        assert!(relaxed.encode().unwrap().is_empty());

        let mut strict = Encoder::new(
            EncoderOptions::new()
                .printer_model("epson-tm-t88iv")
                .strictness(Strictness::Strict),
        )
        .unwrap();
        assert!(matches!(
            strict.qrcode("data", QrOptions::default()),
            Err(Error::Capability(_))
        ));
    }

    #[test]
    fn test_pdf417_fallback_substitutes_barcode() {
        let mut encoder = Encoder::for_printer("hp-a779").unwrap();
        encoder.pdf417("FALLBACK", Pdf417Options::default()).unwrap();
        let bytes = encoder.encode().unwrap();
        // GS k 73: the CODE128 function-B envelope from the fallback.
        assert!(
            bytes.windows(3).any(|w| w == [0x1D, 0x6B, 73]),
            "expected a code128 envelope in {bytes:02X?}"
        );
    }

    #[test]
    fn test_embedded_operations_error_inside_table_cells() {
        let mut encoder = escpos_encoder();
        let result = encoder.table(
            &[TableColumn::new(10)],
            vec![vec![Cell::build(|nested| {
                nested.cut(CutType::Full).map(|_| ())
            })]],
        );
        assert!(matches!(result, Err(Error::Context(_))));
    }

    #[test]
    fn test_table_pads_cells_to_width() {
        let mut encoder = escpos_encoder();
        encoder
            .table(
                &[TableColumn::new(6), TableColumn::new(6)],
                vec![vec![Cell::from("ab"), Cell::from("cd")]],
            )
            .unwrap();
        let bytes = encoder.encode().unwrap();
        let expected = [&[0x1B, 0x74, 0x00][..], b"ab    cd    ", &[0x0A, 0x0D]].concat();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_table_vertical_align_bottom() {
        let columns = [
            TableColumn::new(4),
            TableColumn::new(4).vertical_align(VerticalAlign::Bottom),
        ];
        let mut encoder = escpos_encoder();
        encoder
            .table(
                &columns,
                vec![vec![Cell::from("one two"), Cell::from("x")]],
            )
            .unwrap();
        let lines = encoder.encode_lines().unwrap();
        assert_eq!(lines.len(), 2);
        // Cell two is blank on the first row line, content on the last.
        let expected_first = [&[0x1B, 0x74, 0x00][..], b"one     ", &[0x0A, 0x0D]].concat();
        let expected_second = [&b"two x   "[..], &[0x0A, 0x0D]].concat();
        assert_eq!(lines[0], expected_first);
        assert_eq!(lines[1], expected_second);
    }

    #[test]
    fn test_pulse_suppresses_trailing_newline() {
        let mut encoder = escpos_encoder();
        encoder.line("paid").unwrap().pulse(0, 100, 200).unwrap();
        let bytes = encoder.encode().unwrap();
        assert_eq!(&bytes[bytes.len() - 5..], &[0x1B, 0x70, 0x00, 50, 100]);
    }

    #[test]
    fn test_auto_flush_for_starprnt() {
        let mut encoder = Encoder::for_printer("star-mc-print2").unwrap();
        encoder.line("hello").unwrap();
        let bytes = encoder.encode().unwrap();
        assert!(bytes.ends_with(&[0x1B, 0x1D, 0x50, 0x30, 0x1B, 0x1D, 0x50, 0x31]));

        let mut encoder = Encoder::for_printer("star-mc-print2").unwrap();
        encoder.line("hello").unwrap().cut(CutType::Full).unwrap();
        let bytes = encoder.encode().unwrap();
        assert!(
            bytes.ends_with(&[0x1B, 0x64, 0x00]),
            "no flush after a cut: {bytes:02X?}"
        );
    }

    #[test]
    fn test_encode_resets_document_state() {
        let mut encoder = escpos_encoder();
        encoder.bold(true).unwrap().line("one").unwrap();
        let first = encoder.encode().unwrap();
        assert!(first.windows(3).any(|w| w == [0x1B, 0x45, 0x01]));

        encoder.line("two").unwrap();
        let second = encoder.encode().unwrap();
        assert!(
            !second.windows(3).any(|w| w == [0x1B, 0x45, 0x01]),
            "style state must reset between documents"
        );
    }

    #[test]
    fn test_fluent_identity() {
        let mut encoder = escpos_encoder();
        let returned: *const Encoder = encoder.text("x").unwrap();
        assert!(std::ptr::eq(returned, &encoder));
    }

    #[test]
    fn test_rule_draws_box_glyphs() {
        let mut encoder = escpos_encoder();
        encoder
            .rule(RuleOptions { style: BorderStyle::Double, width: Some(4) })
            .unwrap();
        let bytes = encoder.encode().unwrap();
        // cp437 0xCD is ═.
        assert_eq!(
            bytes,
            vec![0x1B, 0x74, 0x00, 0xCD, 0xCD, 0xCD, 0xCD, 0x0A, 0x0D]
        );
    }

    #[test]
    fn test_draw_box_single_frame() {
        let mut encoder = escpos_encoder();
        encoder
            .draw_box(
                BoxOptions { width: Some(6), ..Default::default() },
                Cell::from("ab"),
            )
            .unwrap();
        let lines = encoder.encode_lines().unwrap();
        assert_eq!(lines.len(), 3);
        // ┌────┐ / │ab  │ / └────┘ in cp437.
        assert_eq!(lines[0], vec![0x1B, 0x74, 0x00, 0xDA, 0xC4, 0xC4, 0xC4, 0xC4, 0xBF, 0x0A, 0x0D]);
        assert_eq!(lines[1], vec![0xB3, b'a', b'b', b' ', b' ', 0xB3, 0x0A, 0x0D]);
        assert_eq!(lines[2], vec![0xC0, 0xC4, 0xC4, 0xC4, 0xC4, 0xD9, 0x0A, 0x0D]);
    }

    #[test]
    fn test_barcode_center_alignment_brackets_wire_commands() {
        let mut encoder = escpos_encoder();
        encoder.align(Alignment::Center).unwrap();
        encoder
            .barcode("123456", Symbology::Code39, BarcodeOptions::default())
            .unwrap();
        let bytes = encoder.encode().unwrap();
        let center = [0x1B, 0x61, 0x01];
        let left = [0x1B, 0x61, 0x00];
        let center_at = bytes.windows(3).position(|w| w == center);
        let left_at = bytes.windows(3).position(|w| w == left);
        assert!(center_at.is_some() && left_at.is_some());
        assert!(center_at < left_at);
    }

    #[tokio::test]
    async fn test_image_is_flushed_as_command_line() {
        let data = vec![255u8; 8 * 8 * 4];
        let img = Image::new(&data, 8, 8).unwrap();
        let mut encoder = Encoder::for_printer("epson-tm-t88v").unwrap();
        encoder.image(&img).await.unwrap();
        let bytes = encoder.encode().unwrap();
        assert_eq!(&bytes[..3], &[0x1D, 0x76, 0x30]);
        assert!(!bytes.ends_with(&[0x0A, 0x0D]), "image lines take no terminator");
    }

    #[tokio::test]
    async fn test_chunked_stream_matches_encode() {
        let mut encoder = escpos_encoder();
        encoder.initialize().unwrap();
        for index in 0..60 {
            encoder.line(&format!("item {index} ........ 9.99")).unwrap();
        }
        encoder.cut(CutType::Full).unwrap();
        let whole = encoder.encode().unwrap();

        let mut encoder = escpos_encoder();
        encoder.initialize().unwrap();
        for index in 0..60 {
            encoder.line(&format!("item {index} ........ 9.99")).unwrap();
        }
        encoder.cut(CutType::Full).unwrap();
        let stream = encoder.encode_chunks(ChunkOptions::default()).unwrap();
        assert_eq!(stream.collect().await, whole);
    }
}
