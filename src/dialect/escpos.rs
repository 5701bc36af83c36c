//! # ESC/POS Driver
//!
//! Command builders for the ESC/POS family (Epson TM series and the wide
//! field of compatibles). ESC/POS is the de-facto receipt printer
//! language; commands are ESC/GS-prefixed byte sequences and multi-byte
//! integers are little-endian.
//!
//! ## Command Summary
//!
//! | Operation | Bytes |
//! |-----------|-------|
//! | initialize | `1B 40`, `1C 2E`, `1B 4D 00` |
//! | font n | `1B 4D n` |
//! | align | `1B 61 n` |
//! | bold | `1B 45 n` |
//! | underline | `1B 2D n` |
//! | italic | `1B 34 n` |
//! | invert | `1D 42 n` |
//! | size | `1D 21 n` |
//! | codepage | `1B 74 n` |
//! | cut | `1D 56 n` |
//! | pulse | `1B 70 d t1 t2` |
//! | raster image | `1D 76 30 m xL xH yL yH d...` |
//! | column image | `1B 2A 21 nL nH d... 0A` |
//!
//! Barcodes use `GS k` (function A for the classic six symbologies,
//! function B for CODE93/CODE128); QR and PDF417 use the `GS ( k`
//! two-dimensional code envelope.

use super::{
    Alignment, BarcodeOptions, CutType, Dialect, DialectKind, ESC, FS, Font, GS, ImageMode, LF,
    Pdf417Options, QrModel, QrOptions, Symbology, u16_le,
};
use crate::error::{Error, Result};
use crate::image::{self, Image, rle};
use crate::pool::BufferPool;
use async_trait::async_trait;
use log::trace;

/// The ESC/POS dialect driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscPos;

/// GS k symbology id plus which function frames the data.
fn symbology_id(symbology: Symbology) -> (u8, BarcodeFunction) {
    match symbology {
        Symbology::UpcA => (0, BarcodeFunction::A),
        Symbology::UpcE => (1, BarcodeFunction::A),
        Symbology::Ean13 => (2, BarcodeFunction::A),
        Symbology::Ean8 => (3, BarcodeFunction::A),
        Symbology::Code39 => (4, BarcodeFunction::A),
        Symbology::Itf => (5, BarcodeFunction::A),
        Symbology::Codabar => (6, BarcodeFunction::A),
        Symbology::Code93 => (72, BarcodeFunction::B),
        Symbology::Code128 => (73, BarcodeFunction::B),
    }
}

enum BarcodeFunction {
    /// `GS k id data NUL`
    A,
    /// `GS k id len data`
    B,
}

/// `GS ( k` header for the 2D code envelope: `cn` selects the symbol
/// (48 = PDF417, 49 = QR), `fn_` the function, `payload_len` counts the
/// bytes after pL/pH excluding cn/fn.
fn gs_paren_k(cn: u8, fn_: u8, payload: &[u8]) -> Vec<u8> {
    let [pl, ph] = u16_le((payload.len() + 2) as u16);
    let mut cmd = vec![GS, b'(', b'k', pl, ph, cn, fn_];
    cmd.extend_from_slice(payload);
    cmd
}

#[async_trait]
impl Dialect for EscPos {
    fn kind(&self) -> DialectKind {
        DialectKind::EscPos
    }

    fn initialize(&self) -> Vec<u8> {
        // ESC @, then cancel kanji character mode, then font A.
        vec![ESC, b'@', FS, b'.', ESC, b'M', 0]
    }

    fn font(&self, font: Font) -> Vec<u8> {
        vec![ESC, b'M', font.index()]
    }

    fn align(&self, alignment: Alignment) -> Vec<u8> {
        let n = match alignment {
            Alignment::Left => 0,
            Alignment::Center => 1,
            Alignment::Right => 2,
        };
        vec![ESC, b'a', n]
    }

    fn bold(&self, enabled: bool) -> Vec<u8> {
        vec![ESC, b'E', u8::from(enabled)]
    }

    fn italic(&self, enabled: bool) -> Vec<u8> {
        vec![ESC, b'4', u8::from(enabled)]
    }

    fn underline(&self, enabled: bool) -> Vec<u8> {
        vec![ESC, b'-', u8::from(enabled)]
    }

    fn invert(&self, enabled: bool) -> Vec<u8> {
        vec![GS, b'B', u8::from(enabled)]
    }

    fn size(&self, width: u8, height: u8) -> Vec<u8> {
        // Width multiplier in the high nibble, height in the low.
        let n = ((width - 1) << 4) | (height - 1);
        vec![GS, b'!', n]
    }

    fn codepage(&self, value: u8) -> Vec<u8> {
        vec![ESC, b't', value]
    }

    fn cut(&self, cut: CutType) -> Vec<u8> {
        let m = match cut {
            CutType::Full => 0,
            CutType::Partial => 1,
        };
        vec![GS, b'V', m]
    }

    fn pulse(&self, device: u8, on_ms: u16, off_ms: u16) -> Vec<u8> {
        // ESC p times are 2 ms units, capped at 500 ms.
        let t1 = (on_ms.min(500) / 2) as u8;
        let t2 = (off_ms.min(500) / 2) as u8;
        vec![ESC, b'p', device.min(1), t1, t2]
    }

    fn flush(&self) -> Vec<u8> {
        Vec::new()
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
        if !(1..=6).contains(&options.width) {
            return Err(Error::Validation(format!(
                "barcode width must be 1-6, got {}",
                options.width
            )));
        }

        let (id, function) = symbology_id(symbology);

        let mut data = value.as_bytes().to_vec();
        if symbology == Symbology::Code128 && !data.starts_with(b"{") {
            // Default to code set B when the caller did not pick one.
            let mut prefixed = b"{B".to_vec();
            prefixed.extend_from_slice(&data);
            data = prefixed;
        }

        let mut cmd = Vec::with_capacity(12 + data.len());
        cmd.extend_from_slice(&[GS, b'h', options.height]);
        cmd.extend_from_slice(&[GS, b'w', options.width]);
        cmd.extend_from_slice(&[GS, b'H', if options.text { 2 } else { 0 }]);
        match function {
            BarcodeFunction::A => {
                cmd.extend_from_slice(&[GS, b'k', id]);
                cmd.extend_from_slice(&data);
                cmd.push(0x00);
            }
            BarcodeFunction::B => {
                cmd.extend_from_slice(&[GS, b'k', id, data.len() as u8]);
                cmd.extend_from_slice(&data);
            }
        }
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

        let model = match options.model {
            QrModel::Model1 => 49,
            QrModel::Model2 => 50,
        };

        let mut cmd = Vec::new();
        cmd.extend(gs_paren_k(49, 65, &[model, 0])); // model
        cmd.extend(gs_paren_k(49, 67, &[options.size])); // cell size
        cmd.extend(gs_paren_k(49, 69, &[48 + options.error_level as u8])); // error level
        let mut store = vec![b'0'];
        store.extend_from_slice(value.as_bytes());
        cmd.extend(gs_paren_k(49, 80, &store)); // store data
        cmd.extend(gs_paren_k(49, 81, &[b'0'])); // print
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
        if !(2..=8).contains(&options.width) {
            return Err(Error::Validation(format!(
                "pdf417 width must be 2-8, got {}",
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

        let mut cmd = Vec::new();
        cmd.extend(gs_paren_k(48, 65, &[options.columns])); // columns
        cmd.extend(gs_paren_k(48, 66, &[options.rows])); // rows
        cmd.extend(gs_paren_k(48, 67, &[options.width])); // module width
        cmd.extend(gs_paren_k(48, 68, &[3])); // row height
        cmd.extend(gs_paren_k(48, 69, &[48, 48 + options.error_level])); // error level
        let mut store = vec![b'0'];
        store.extend_from_slice(value.as_bytes());
        cmd.extend(gs_paren_k(48, 80, &store)); // store data
        cmd.extend(gs_paren_k(48, 81, &[b'0'])); // print
        Ok(cmd)
    }

    async fn image(
        &self,
        img: &Image<'_>,
        mode: ImageMode,
        compress: bool,
        pool: &mut BufferPool,
    ) -> Result<Vec<u8>> {
        match mode {
            ImageMode::Raster => raster_image(img, compress, pool).await,
            ImageMode::Column => column_image(img, pool).await,
        }
    }
}

/// Frame the image as one `GS v 0` command per strip.
async fn raster_image(img: &Image<'_>, compress: bool, pool: &mut BufferPool) -> Result<Vec<u8>> {
    let stride = img.width_bytes();
    let strips = image::raster_strips(img.height(), image::STRIP_MAX_ROWS);
    let large = img.is_large();
    trace!(
        "escpos raster image {}x{}: {} strip(s), compression {}",
        img.width(),
        img.height(),
        strips.len(),
        if compress { "on" } else { "off" }
    );

    let mut out = Vec::with_capacity(stride * img.height() + strips.len() * 8);
    for (index, strip) in strips.iter().enumerate() {
        let mut buf = pool.acquire(stride * strip.rows);
        image::pack_raster_rows(img, strip.y0, strip.rows, &mut buf);

        let [xl, xh] = u16_le(stride as u16);
        let [yl, yh] = u16_le(strip.rows as u16);

        if compress {
            let result = rle::compress(&buf, pool);
            let m = u8::from(result.compressed);
            out.extend_from_slice(&[GS, b'v', b'0', m, xl, xh, yl, yh]);
            out.extend_from_slice(&result.data);
        } else {
            out.extend_from_slice(&[GS, b'v', b'0', 0, xl, xh, yl, yh]);
            out.extend_from_slice(&buf);
        }
        pool.release(buf);

        if large && (index + 1) % image::RASTER_YIELD_INTERVAL == 0 {
            tokio::task::yield_now().await;
        }
    }
    Ok(out)
}

/// Frame the image as 24-dot `ESC *` bands bracketed by line-spacing
/// commands, so consecutive bands touch without gaps.
async fn column_image(img: &Image<'_>, pool: &mut BufferPool) -> Result<Vec<u8>> {
    let width = img.width();
    let bands = image::band_count(img.height());
    let large = img.is_large();
    trace!("escpos column image {}x{}: {} band(s)", width, img.height(), bands);

    let [nl, nh] = u16_le(width as u16);
    let mut out = Vec::with_capacity(bands * (3 * width + 6) + 6);
    out.extend_from_slice(&[ESC, b'3', 24]); // 24-dot line spacing

    for band in 0..bands {
        let mut buf = pool.acquire(3 * width);
        if large {
            image::pack_band_yielding(img, band, &mut buf).await;
        } else {
            image::pack_band(img, band, &mut buf);
        }

        out.extend_from_slice(&[ESC, b'*', 0x21, nl, nh]);
        out.extend_from_slice(&buf);
        out.push(LF);
        pool.release(buf);
    }

    out.extend_from_slice(&[ESC, b'2']); // restore default line spacing
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize() {
        assert_eq!(
            EscPos.initialize(),
            vec![0x1B, 0x40, 0x1C, 0x2E, 0x1B, 0x4D, 0x00]
        );
    }

    #[test]
    fn test_font() {
        assert_eq!(EscPos.font(Font::A), vec![0x1B, 0x4D, 0x00]);
        assert_eq!(EscPos.font(Font::B), vec![0x1B, 0x4D, 0x01]);
    }

    #[test]
    fn test_align() {
        assert_eq!(EscPos.align(Alignment::Left), vec![0x1B, 0x61, 0x00]);
        assert_eq!(EscPos.align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
        assert_eq!(EscPos.align(Alignment::Right), vec![0x1B, 0x61, 0x02]);
    }

    #[test]
    fn test_styles() {
        assert_eq!(EscPos.bold(true), vec![0x1B, 0x45, 0x01]);
        assert_eq!(EscPos.bold(false), vec![0x1B, 0x45, 0x00]);
        assert_eq!(EscPos.italic(true), vec![0x1B, 0x34, 0x01]);
        assert_eq!(EscPos.underline(true), vec![0x1B, 0x2D, 0x01]);
        assert_eq!(EscPos.invert(true), vec![0x1D, 0x42, 0x01]);
    }

    #[test]
    fn test_size_packs_nibbles() {
        assert_eq!(EscPos.size(1, 1), vec![0x1D, 0x21, 0x00]);
        assert_eq!(EscPos.size(2, 2), vec![0x1D, 0x21, 0x11]);
        assert_eq!(EscPos.size(3, 1), vec![0x1D, 0x21, 0x20]);
        assert_eq!(EscPos.size(1, 4), vec![0x1D, 0x21, 0x03]);
        assert_eq!(EscPos.size(8, 8), vec![0x1D, 0x21, 0x77]);
    }

    #[test]
    fn test_codepage_and_cut() {
        assert_eq!(EscPos.codepage(0x10), vec![0x1B, 0x74, 0x10]);
        assert_eq!(EscPos.cut(CutType::Full), vec![0x1D, 0x56, 0x00]);
        assert_eq!(EscPos.cut(CutType::Partial), vec![0x1D, 0x56, 0x01]);
    }

    #[test]
    fn test_pulse_clamps_to_500ms() {
        assert_eq!(EscPos.pulse(0, 100, 200), vec![0x1B, 0x70, 0x00, 50, 100]);
        assert_eq!(EscPos.pulse(1, 900, 900), vec![0x1B, 0x70, 0x01, 250, 250]);
    }

    #[test]
    fn test_barcode_function_a() {
        let cmd = EscPos
            .barcode("4006381333931", Symbology::Ean13, &BarcodeOptions::default())
            .unwrap();
        // height, width, HRI, then GS k 2 data NUL
        assert_eq!(&cmd[..9], &[0x1D, 0x68, 60, 0x1D, 0x77, 3, 0x1D, 0x48, 2]);
        assert_eq!(&cmd[9..12], &[0x1D, 0x6B, 2]);
        assert_eq!(cmd.last(), Some(&0x00));
    }

    #[test]
    fn test_barcode_function_b_code128_prefixes_code_set() {
        let cmd = EscPos
            .barcode("RECIBO", Symbology::Code128, &BarcodeOptions::default())
            .unwrap();
        let tail = &cmd[9..];
        assert_eq!(&tail[..4], &[0x1D, 0x6B, 73, 8]); // len = "{B" + 6
        assert_eq!(&tail[4..6], b"{B");
        assert_eq!(&tail[6..], b"RECIBO");
    }

    #[test]
    fn test_barcode_width_out_of_range() {
        let options = BarcodeOptions { width: 9, ..Default::default() };
        assert!(matches!(
            EscPos.barcode("123", Symbology::Code39, &options),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_qrcode_envelope() {
        let cmd = EscPos.qrcode("AB", &QrOptions::default()).unwrap();
        // Model: GS ( k 04 00 31 41 50 00
        assert_eq!(&cmd[..9], &[0x1D, 0x28, 0x6B, 4, 0, 49, 65, 50, 0]);
        // Cell size 6: GS ( k 03 00 31 43 06
        assert_eq!(&cmd[9..17], &[0x1D, 0x28, 0x6B, 3, 0, 49, 67, 6]);
        // Error level M: GS ( k 03 00 31 45 49
        assert_eq!(&cmd[17..25], &[0x1D, 0x28, 0x6B, 3, 0, 49, 69, 49]);
        // Store: GS ( k 05 00 31 50 30 'A' 'B'
        assert_eq!(&cmd[25..35], &[0x1D, 0x28, 0x6B, 5, 0, 49, 80, 48, b'A', b'B']);
        // Print: GS ( k 03 00 31 51 30
        assert_eq!(&cmd[35..], &[0x1D, 0x28, 0x6B, 3, 0, 49, 81, 48]);
    }

    #[test]
    fn test_qrcode_size_validated() {
        let options = QrOptions { size: 9, ..Default::default() };
        assert!(matches!(
            EscPos.qrcode("x", &options),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_pdf417_rows_validated() {
        let options = Pdf417Options { rows: 2, ..Default::default() };
        assert!(matches!(
            EscPos.pdf417("x", &options),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_pdf417_envelope_prefix() {
        let cmd = EscPos.pdf417("Z", &Pdf417Options::default()).unwrap();
        // Columns auto: GS ( k 03 00 30 41 00
        assert_eq!(&cmd[..8], &[0x1D, 0x28, 0x6B, 3, 0, 48, 65, 0]);
    }

    fn white_image_data(width: usize, height: usize) -> Vec<u8> {
        vec![255u8; width * height * 4]
    }

    #[tokio::test]
    async fn test_raster_image_framing() {
        let data = white_image_data(16, 3);
        let img = Image::new(&data, 16, 3).unwrap();
        let mut pool = BufferPool::new();
        let cmd = EscPos
            .image(&img, ImageMode::Raster, false, &mut pool)
            .await
            .unwrap();
        assert_eq!(&cmd[..8], &[0x1D, 0x76, 0x30, 0x00, 0x02, 0x00, 0x03, 0x00]);
        assert_eq!(cmd.len(), 8 + 2 * 3);
        assert!(cmd[8..].iter().all(|&b| b == 0));
    }

    #[tokio::test]
    async fn test_raster_image_compressed_mode_flag() {
        // All-black image: long runs, RLE certainly wins.
        let data = vec![0u8; 64 * 64 * 4];
        let img = Image::new(&data, 64, 64).unwrap();
        let mut pool = BufferPool::new();
        let cmd = EscPos
            .image(&img, ImageMode::Raster, true, &mut pool)
            .await
            .unwrap();
        assert_eq!(cmd[3], 0x01, "mode byte must flag RLE payload");
        assert!(cmd.len() < 8 + 8 * 64);
    }

    #[tokio::test]
    async fn test_column_image_framing() {
        let data = white_image_data(8, 24);
        let img = Image::new(&data, 8, 24).unwrap();
        let mut pool = BufferPool::new();
        let cmd = EscPos
            .image(&img, ImageMode::Column, false, &mut pool)
            .await
            .unwrap();
        assert_eq!(&cmd[..3], &[0x1B, 0x33, 24]);
        assert_eq!(&cmd[3..8], &[0x1B, 0x2A, 0x21, 8, 0]);
        assert_eq!(cmd[8 + 24], 0x0A);
        assert_eq!(&cmd[cmd.len() - 2..], &[0x1B, 0x32]);
    }
}
