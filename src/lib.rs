//! # Recibo - Receipt Printer Command Encoder
//!
//! Recibo turns high-level document operations (text, styling, tables,
//! barcodes, images, cuts) into the byte streams thermal receipt printers
//! consume, in any of three wire dialects:
//!
//! - **ESC/POS** (Epson TM series and compatibles)
//! - **StarPRNT** (current Star Micronics hardware)
//! - **Star Line Mode** (legacy Star hardware)
//!
//! ## Quick Start
//!
//! ```
//! use recibo::{Alignment, CutType, Encoder};
//!
//! let mut encoder = Encoder::for_printer("epson-tm-t88v")?;
//! encoder
//!     .initialize()?
//!     .align(Alignment::Center)?
//!     .bold(true)?
//!     .line("CAFE RECIBO")?
//!     .bold(false)?
//!     .align(Alignment::Left)?
//!     .line("1x flat white             4.50")?
//!     .cut(CutType::Full)?;
//!
//! let bytes = encoder.encode()?;
//! // send `bytes` over TCP/USB/serial/Bluetooth...
//! # assert!(!bytes.is_empty());
//! # Ok::<(), recibo::Error>(())
//! ```
//!
//! Large payloads can stream in bounded chunks with backpressure between
//! them; see [`Encoder::encode_chunks`]. Large images take a
//! cooperatively-yielding encode path that never changes output bytes;
//! see [`Encoder::image`].
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`encoder`] | Fluent document API and linearization |
//! | [`dialect`] | The three wire-command languages |
//! | [`printer`] | Model registry and capability records |
//! | [`compose`] | Line composition engine |
//! | [`image`] | Raster/column bit packing and RLE |
//! | [`codepage`] | Single-byte text encoding |
//! | [`stream`] | Chunked, backpressure-aware output |
//! | [`wrap`] | Cell-budget word wrapping |
//! | [`style`] | Style state tracking |
//! | [`pool`] | Byte-buffer recycling |
//! | [`error`] | Error types |
//!
//! ## Choosing a printer
//!
//! Construction with a model id pulls columns, dialect, codepage mapping
//! and image mode from the registry; explicit options override any of
//! them. Without a model id the encoder defaults to a 42-column ESC/POS
//! profile.

pub mod codepage;
pub mod compose;
pub mod dialect;
pub mod encoder;
pub mod error;
pub mod image;
pub mod pool;
pub mod printer;
pub mod stream;
pub mod style;
pub mod wrap;

// Re-exports for convenience
pub use dialect::{
    Alignment, BarcodeOptions, CutType, DialectKind, Font, ImageMode, Pdf417Options, QrErrorLevel,
    QrModel, QrOptions, Symbology,
};
pub use encoder::{
    BorderStyle, BoxOptions, BoxStyle, Cell, Encoder, EncoderOptions, RuleOptions, TableColumn,
    VerticalAlign,
};
pub use error::{Error, Result, Strictness};
pub use image::Image;
pub use pool::BufferPool;
pub use stream::{Chunk, ChunkOptions, ChunkSink, ChunkStream};
