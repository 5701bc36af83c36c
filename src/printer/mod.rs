//! # Printer Registry
//!
//! Static capability records for the supported printer models. A model id
//! resolves to everything the encoder needs to know about the hardware:
//! which dialect it speaks, its codepage mapping, fonts and column
//! counts, which barcode symbologies and 2D codes it renders, how images
//! should be framed, and how far to feed before cutting.
//!
//! ## Usage
//!
//! ```
//! use recibo::printer;
//!
//! let model = printer::lookup("epson-tm-t88v").unwrap();
//! assert_eq!(model.capabilities.columns(), 42);
//!
//! for model in printer::models() {
//!     println!("{}: {}", model.id, model.display_name);
//! }
//! ```

pub mod mappings;
pub mod models;

use crate::dialect::{DialectKind, Font, ImageMode, QrModel, Symbology};

/// Newline terminator written after each printed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Newline {
    /// `0A 0D`, the common default for receipt printers.
    #[default]
    LfCr,
    /// `0A` only.
    Lf,
    /// No terminator (caller manages line endings).
    None,
}

impl Newline {
    pub fn bytes(self) -> &'static [u8] {
        match self {
            Newline::LfCr => &[0x0A, 0x0D],
            Newline::Lf => &[0x0A],
            Newline::None => &[],
        }
    }
}

/// One font the hardware offers, with its glyph size and column count.
#[derive(Debug, Clone, Copy)]
pub struct FontSpec {
    pub font: Font,
    /// Glyph cell, e.g. `"12x24"`.
    pub size: &'static str,
    /// Characters per line in this font.
    pub columns: usize,
}

/// 1D barcode support.
#[derive(Debug, Clone, Copy)]
pub struct BarcodeSupport {
    pub supported: bool,
    pub symbologies: &'static [Symbology],
}

/// QR code support.
#[derive(Debug, Clone, Copy)]
pub struct QrSupport {
    pub supported: bool,
    pub models: &'static [QrModel],
}

/// PDF417 support; `fallback` names a 1D symbology to substitute when the
/// hardware cannot render PDF417 itself.
#[derive(Debug, Clone, Copy)]
pub struct Pdf417Support {
    pub supported: bool,
    pub fallback: Option<Symbology>,
}

/// How the hardware takes images.
#[derive(Debug, Clone, Copy)]
pub struct ImageSupport {
    pub mode: ImageMode,
    /// Whether `GS v 0` mode 1 (RLE) payloads are accepted.
    pub compression: bool,
}

/// Everything the encoder needs to know about one printer model.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    pub dialect: DialectKind,
    /// Name of the codepage mapping in [`mappings`].
    pub codepage_mapping: &'static str,
    pub newline: Newline,
    pub fonts: &'static [FontSpec],
    pub barcodes: BarcodeSupport,
    pub qrcode: QrSupport,
    pub pdf417: Pdf417Support,
    pub image: ImageSupport,
    /// Blank lines to feed before cutting, so the cut lands past the last
    /// printed line.
    pub cutter_feed: u8,
}

impl Capabilities {
    /// Spec for one font, if the hardware has it.
    pub fn font(&self, font: Font) -> Option<&'static FontSpec> {
        self.fonts.iter().find(|spec| spec.font == font)
    }

    /// Column count of font A, the default line width.
    pub fn columns(&self) -> usize {
        self.font(Font::A).map_or(48, |spec| spec.columns)
    }
}

/// A registry entry.
#[derive(Debug, Clone, Copy)]
pub struct PrinterModel {
    pub id: &'static str,
    pub display_name: &'static str,
    pub capabilities: Capabilities,
}

/// All known models.
pub fn models() -> &'static [PrinterModel] {
    models::MODELS
}

/// Find a model by id.
pub fn lookup(id: &str) -> Option<&'static PrinterModel> {
    models::MODELS.iter().find(|model| model.id == id)
}

/// Capability defaults for encoders constructed without a printer model:
/// a forgiving 42-column profile in the requested dialect.
pub fn generic_capabilities(dialect: DialectKind) -> Capabilities {
    Capabilities {
        dialect,
        codepage_mapping: match dialect {
            DialectKind::EscPos => "epson",
            DialectKind::StarPrnt | DialectKind::StarLine => "star",
        },
        newline: Newline::LfCr,
        fonts: models::FONTS_42_56,
        barcodes: BarcodeSupport { supported: true, symbologies: models::ALL_SYMBOLOGIES },
        qrcode: QrSupport { supported: true, models: models::QR_BOTH_MODELS },
        pdf417: Pdf417Support { supported: true, fallback: None },
        image: ImageSupport {
            mode: match dialect {
                DialectKind::EscPos => ImageMode::Raster,
                DialectKind::StarPrnt | DialectKind::StarLine => ImageMode::Column,
            },
            compression: false,
        },
        cutter_feed: 0,
    }
}
