//! # StarPRNT Driver
//!
//! Command builders for StarPRNT, the current Star Micronics protocol
//! (mC-Print, mPOP, TSP100IV, SM-L series). Star hardware keeps the old
//! line-mode heritage: styles are discrete on/off commands rather than
//! parameterized ones, images are vertical 24-dot bands, and page-mode
//! devices need an explicit flush to put paper out.
//!
//! ## Command Summary
//!
//! | Operation | Bytes |
//! |-----------|-------|
//! | initialize | `1B 40 18` |
//! | font | `1B 1E 46 n` |
//! | align | `1B 1D 61 n` |
//! | bold | `1B 45` on / `1B 46` off |
//! | underline | `1B 2D n` |
//! | invert | `1B 34` on / `1B 35` off |
//! | size | `1B 69 h w` (zero-based multipliers) |
//! | codepage | `1B 1D 74 n` |
//! | cut | `1B 64 n` |
//! | pulse | `1B 07 t1 t2` + drawer byte |
//! | flush | `1B 1D 50 30`, `1B 1D 50 31` |
//! | image band | `1B 58 nL nH d... 0A 0D` |
//!
//! Barcodes use `ESC b`, QR the `ESC GS y` envelope and PDF417 the
//! `ESC GS x` envelope. There is no italic command; the driver emits
//! nothing for it.

use super::{
    Alignment, BarcodeOptions, CR, CutType, Dialect, DialectKind, ESC, Font, GS, ImageMode, LF,
    Pdf417Options, QrOptions, RS, Symbology, u16_le,
};
use crate::error::{Error, Result};
use crate::image::{self, Image};
use crate::pool::BufferPool;
use async_trait::async_trait;
use log::trace;

/// The StarPRNT dialect driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct StarPrnt;

/// `ESC b` symbology ids.
fn symbology_id(symbology: Symbology) -> u8 {
    match symbology {
        Symbology::UpcE => 48,
        Symbology::UpcA => 49,
        Symbology::Ean8 => 50,
        Symbology::Ean13 => 51,
        Symbology::Code39 => 52,
        Symbology::Itf => 53,
        Symbology::Code128 => 54,
        Symbology::Code93 => 55,
        Symbology::Codabar => 56,
    }
}

#[async_trait]
impl Dialect for StarPrnt {
    fn kind(&self) -> DialectKind {
        DialectKind::StarPrnt
    }

    fn initialize(&self) -> Vec<u8> {
        // ESC @ plus CAN to drop anything buffered pre-reset.
        vec![ESC, b'@', 0x18]
    }

    fn font(&self, font: Font) -> Vec<u8> {
        vec![ESC, RS, b'F', font.index()]
    }

    fn align(&self, alignment: Alignment) -> Vec<u8> {
        let n = match alignment {
            Alignment::Left => 0,
            Alignment::Center => 1,
            Alignment::Right => 2,
        };
        vec![ESC, GS, b'a', n]
    }

    fn bold(&self, enabled: bool) -> Vec<u8> {
        if enabled {
            vec![ESC, b'E']
        } else {
            vec![ESC, b'F']
        }
    }

    fn italic(&self, _enabled: bool) -> Vec<u8> {
        // No italic in the Star command set.
        Vec::new()
    }

    fn underline(&self, enabled: bool) -> Vec<u8> {
        vec![ESC, b'-', u8::from(enabled)]
    }

    fn invert(&self, enabled: bool) -> Vec<u8> {
        if enabled {
            vec![ESC, b'4']
        } else {
            vec![ESC, b'5']
        }
    }

    fn size(&self, width: u8, height: u8) -> Vec<u8> {
        vec![ESC, b'i', height - 1, width - 1]
    }

    fn codepage(&self, value: u8) -> Vec<u8> {
        vec![ESC, GS, b't', value]
    }

    fn cut(&self, cut: CutType) -> Vec<u8> {
        let m = match cut {
            CutType::Full => 0,
            CutType::Partial => 1,
        };
        vec![ESC, b'd', m]
    }

    fn pulse(&self, device: u8, on_ms: u16, off_ms: u16) -> Vec<u8> {
        // ESC BEL times are 10 ms units, 127 max, then the drawer byte.
        let t1 = (on_ms / 10).min(127) as u8;
        let t2 = (off_ms / 10).min(127) as u8;
        let drawer = if device == 0 { 0x07 } else { 0x1A };
        vec![ESC, 0x07, t1, t2, drawer]
    }

    fn flush(&self) -> Vec<u8> {
        // Set page mode, then back to line mode: forces buffered output.
        vec![ESC, GS, b'P', b'0', ESC, GS, b'P', b'1']
    }

    fn barcode(
        &self,
        value: &str,
        symbology: Symbology,
        options: &BarcodeOptions,
    ) -> Result<Vec<u8>> {
        if value.is_empty() || value.len() > 255 {
            return Err(Error::Validation(format!(
                "barcode data must be 1-255 bytes, got {}",
                value.len()
            )));
        }
        if options.height == 0 {
            return Err(Error::Validation("barcode height must be at least 1".into()));
        }
        if !(2..=4).contains(&options.width) {
            return Err(Error::Validation(format!(
                "barcode width must be 2-4 dots on Star hardware, got {}",
                options.width
            )));
        }

        let n1 = symbology_id(symbology);
        // n2: HRI under the bars + line feed (50) or bars only (49).
        let n2 = if options.text { 50 } else { 49 };
        // n3: module width mode, 49..=51 for 2..=4 dots.
        let n3 = 48 + (options.width - 1);
        let n4 = options.height.max(1);

        let mut cmd = Vec::with_capacity(7 + value.len());
        cmd.extend_from_slice(&[ESC, b'b', n1, n2, n3, n4]);
        cmd.extend_from_slice(value.as_bytes());
        cmd.push(RS);
        Ok(cmd)
    }

    fn qrcode(&self, value: &str, options: &QrOptions) -> Result<Vec<u8>> {
        if !(1..=8).contains(&options.size) {
            return Err(Error::Validation(format!(
                "qrcode size must be 1-8, got {}",
                options.size
            )));
        }
        if value.is_empty() || value.len() > 7089 {
            return Err(Error::Validation(format!(
                "qrcode data must be 1-7089 bytes, got {}",
                value.len()
            )));
        }

        let [nl, nh] = u16_le(value.len() as u16);
        let mut cmd = Vec::new();
        cmd.extend_from_slice(&[ESC, GS, b'y', b'S', b'0', options.model as u8]);
        cmd.extend_from_slice(&[ESC, GS, b'y', b'S', b'1', options.error_level as u8]);
        cmd.extend_from_slice(&[ESC, GS, b'y', b'S', b'2', options.size]);
        cmd.extend_from_slice(&[ESC, GS, b'y', b'D', b'1', 0, nl, nh]);
        cmd.extend_from_slice(value.as_bytes());
        cmd.extend_from_slice(&[ESC, GS, b'y', b'P']);
        Ok(cmd)
    }

    fn pdf417(&self, value: &str, options: &Pdf417Options) -> Result<Vec<u8>> {
        if options.columns > 30 {
            return Err(Error::Validation(format!(
                "pdf417 columns must be 0-30, got {}",
                options.columns
            )));
        }
        if options.rows != 0 && !(3..=90).contains(&options.rows) {
            return Err(Error::Validation(format!(
                "pdf417 rows must be 0 or 3-90, got {}",
                options.rows
            )));
        }
        if !(1..=15).contains(&options.width) {
            return Err(Error::Validation(format!(
                "pdf417 width must be 1-15 on Star hardware, got {}",
                options.width
            )));
        }
        if options.error_level > 8 {
            return Err(Error::Validation(format!(
                "pdf417 error level must be 0-8, got {}",
                options.error_level
            )));
        }
        if value.is_empty() {
            return Err(Error::Validation("pdf417 data must not be empty".into()));
        }

        let [nl, nh] = u16_le(value.len() as u16);
        let mut cmd = Vec::new();
        // Fixed-size mode; 0 means auto for both dimensions.
        cmd.extend_from_slice(&[ESC, GS, b'x', b'S', b'0', 1, options.rows, options.columns]);
        cmd.extend_from_slice(&[ESC, GS, b'x', b'S', b'1', options.error_level]);
        cmd.extend_from_slice(&[ESC, GS, b'x', b'S', b'2', options.width]);
        cmd.extend_from_slice(&[ESC, GS, b'x', b'S', b'3', 3]);
        cmd.extend_from_slice(&[ESC, GS, b'x', b'D', nl, nh]);
        cmd.extend_from_slice(value.as_bytes());
        cmd.extend_from_slice(&[ESC, GS, b'x', b'P']);
        Ok(cmd)
    }

    async fn image(
        &self,
        img: &Image<'_>,
        _mode: ImageMode,
        _compress: bool,
        pool: &mut BufferPool,
    ) -> Result<Vec<u8>> {
        // Star hardware takes column bands only; the mode and compression
        // capabilities never route here.
        band_image(img, pool).await
    }
}

/// Frame the image as `ESC X` 24-dot bands.
pub(super) async fn band_image(img: &Image<'_>, pool: &mut BufferPool) -> Result<Vec<u8>> {
    let width = img.width();
    let bands = image::band_count(img.height());
    let large = img.is_large();
    trace!("star column image {}x{}: {} band(s)", width, img.height(), bands);

    let [nl, nh] = u16_le(width as u16);
    let mut out = Vec::with_capacity(bands * (3 * width + 6));

    for band in 0..bands {
        let mut buf = pool.acquire(3 * width);
        if large {
            image::pack_band_yielding(img, band, &mut buf).await;
        } else {
            image::pack_band(img, band, &mut buf);
        }

        out.extend_from_slice(&[ESC, b'X', nl, nh]);
        out.extend_from_slice(&buf);
        out.extend_from_slice(&[LF, CR]);
        pool.release(buf);
    }

    Ok(out)
}
