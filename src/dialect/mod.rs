//! # Printer Dialects
//!
//! A uniform capability interface over the three wire command languages
//! this crate speaks. Every operation the encoder needs (initialization,
//! styling, codepage selection, barcodes, 2D codes, images, cuts, cash
//! drawer pulses, page flushes) has one method on [`Dialect`], and each
//! driver emits its language's exact byte sequences.
//!
//! ## Module Structure
//!
//! - [`escpos`]: the ESC/POS family (Epson and the many compatibles)
//! - [`starprnt`]: StarPRNT (current Star Micronics protocol)
//! - [`starline`]: Star Line Mode (legacy Star), a thin StarPRNT variant
//!
//! Multi-byte integers are **little-endian** on the wire in all three
//! dialects.

pub mod escpos;
pub mod starline;
pub mod starprnt;

use crate::error::Result;
use crate::image::Image;
use crate::pool::BufferPool;
use async_trait::async_trait;

/// ESC (Escape) - command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - extended command prefix
pub const GS: u8 = 0x1D;

/// FS (File Separator) - character-mode commands (ESC/POS)
pub const FS: u8 = 0x1C;

/// RS (Record Separator) - terminator / configuration prefix (Star)
pub const RS: u8 = 0x1E;

/// LF (Line Feed) - print and advance one line
pub const LF: u8 = 0x0A;

/// CR (Carriage Return)
pub const CR: u8 = 0x0D;

/// Encode a u16 value as little-endian bytes [low, high].
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

/// The three supported command languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectKind {
    EscPos,
    StarPrnt,
    StarLine,
}

impl DialectKind {
    /// Instantiate the driver for this dialect.
    pub fn driver(self) -> Box<dyn Dialect> {
        match self {
            DialectKind::EscPos => Box::new(escpos::EscPos),
            DialectKind::StarPrnt => Box::new(starprnt::StarPrnt),
            DialectKind::StarLine => Box::new(starline::StarLine),
        }
    }
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Printer font selection. Column counts per font come from the printer
/// capability record, not from the dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Font {
    #[default]
    A,
    B,
    C,
}

impl Font {
    /// Zero-based index ('A' = 0).
    pub fn index(self) -> u8 {
        match self {
            Font::A => 0,
            Font::B => 1,
            Font::C => 2,
        }
    }
}

/// Paper cut variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutType {
    #[default]
    Full,
    Partial,
}

/// How images are framed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageMode {
    /// Row-major bitmap commands (`GS v 0` family).
    #[default]
    Raster,
    /// Vertical 24-dot bands (`ESC *` / `ESC X`).
    Column,
}

/// 1D barcode symbologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    UpcA,
    UpcE,
    Ean13,
    Ean8,
    Code39,
    Itf,
    Codabar,
    Code93,
    Code128,
}

impl Symbology {
    pub fn name(self) -> &'static str {
        match self {
            Symbology::UpcA => "upca",
            Symbology::UpcE => "upce",
            Symbology::Ean13 => "ean13",
            Symbology::Ean8 => "ean8",
            Symbology::Code39 => "code39",
            Symbology::Itf => "itf",
            Symbology::Codabar => "codabar",
            Symbology::Code93 => "code93",
            Symbology::Code128 => "code128",
        }
    }
}

/// 1D barcode parameters.
#[derive(Debug, Clone, Copy)]
pub struct BarcodeOptions {
    /// Bar height in dots.
    pub height: u8,
    /// Module width in dots.
    pub width: u8,
    /// Print the human-readable text under the bars.
    pub text: bool,
}

impl Default for BarcodeOptions {
    fn default() -> Self {
        Self { height: 60, width: 3, text: true }
    }
}

/// QR code model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrModel {
    Model1 = 1,
    #[default]
    Model2 = 2,
}

/// QR error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrErrorLevel {
    L = 0,
    #[default]
    M = 1,
    Q = 2,
    H = 3,
}

/// QR code parameters.
#[derive(Debug, Clone, Copy)]
pub struct QrOptions {
    pub model: QrModel,
    /// Cell size in dots, 1–8.
    pub size: u8,
    pub error_level: QrErrorLevel,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            model: QrModel::Model2,
            size: 6,
            error_level: QrErrorLevel::M,
        }
    }
}

/// PDF417 parameters.
#[derive(Debug, Clone, Copy)]
pub struct Pdf417Options {
    /// Data columns, 0 = auto or 1–30.
    pub columns: u8,
    /// Rows, 0 = auto or 3–90.
    pub rows: u8,
    /// Module width in dots.
    pub width: u8,
    /// Error correction level 0–8.
    pub error_level: u8,
}

impl Default for Pdf417Options {
    fn default() -> Self {
        Self { columns: 0, rows: 0, width: 3, error_level: 1 }
    }
}

/// One printer command language.
///
/// Styling and layout methods are infallible byte builders; code and image
/// methods validate their parameters against the dialect's limits. A
/// method the dialect has no command for (e.g. italic on Star hardware)
/// returns an empty sequence.
#[async_trait]
pub trait Dialect: Send + Sync {
    fn kind(&self) -> DialectKind;

    /// Reset the printer to its power-on text state.
    fn initialize(&self) -> Vec<u8>;

    fn font(&self, font: Font) -> Vec<u8>;

    fn align(&self, alignment: Alignment) -> Vec<u8>;

    fn bold(&self, enabled: bool) -> Vec<u8>;

    fn italic(&self, enabled: bool) -> Vec<u8>;

    fn underline(&self, enabled: bool) -> Vec<u8>;

    fn invert(&self, enabled: bool) -> Vec<u8>;

    /// Character cell multipliers, both in `1..=8`.
    fn size(&self, width: u8, height: u8) -> Vec<u8>;

    /// Select the codepage slot `value` (a wire byte from the printer's
    /// codepage mapping).
    fn codepage(&self, value: u8) -> Vec<u8>;

    fn cut(&self, cut: CutType) -> Vec<u8>;

    /// Fire the cash drawer: `device` 0 or 1, times in milliseconds.
    fn pulse(&self, device: u8, on_ms: u16, off_ms: u16) -> Vec<u8>;

    /// Force page-mode printers to put paper out; empty for dialects that
    /// print as lines complete.
    fn flush(&self) -> Vec<u8>;

    fn barcode(&self, value: &str, symbology: Symbology, options: &BarcodeOptions)
    -> Result<Vec<u8>>;

    fn qrcode(&self, value: &str, options: &QrOptions) -> Result<Vec<u8>>;

    fn pdf417(&self, value: &str, options: &Pdf417Options) -> Result<Vec<u8>>;

    /// Frame `image` in this dialect, choosing sync or cooperative
    /// yielding by image size. `compress` is honoured only where the
    /// dialect and mode support RLE payloads.
    async fn image(
        &self,
        image: &Image<'_>,
        mode: ImageMode,
        compress: bool,
        pool: &mut BufferPool,
    ) -> Result<Vec<u8>>;
}
