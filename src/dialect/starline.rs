//! # Star Line Mode Driver
//!
//! The legacy Star protocol spoken by older hardware (TSP650II, TUP500
//! series). Line-mode devices print each line as it completes, so there is
//! no page-mode flush, and initialization is a bare `ESC @`. Everything
//! else (styling, codepages, barcodes, 2D codes, band images) matches
//! StarPRNT byte for byte, which is why this driver delegates.

use super::starprnt::{self, StarPrnt};
use super::{
    Alignment, BarcodeOptions, CutType, Dialect, DialectKind, ESC, Font, ImageMode, Pdf417Options,
    QrOptions, Symbology,
};
use crate::error::Result;
use crate::image::Image;
use crate::pool::BufferPool;
use async_trait::async_trait;

/// The Star Line Mode dialect driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct StarLine;

#[async_trait]
impl Dialect for StarLine {
    fn kind(&self) -> DialectKind {
        DialectKind::StarLine
    }

    fn initialize(&self) -> Vec<u8> {
        vec![ESC, b'@']
    }

    fn font(&self, font: Font) -> Vec<u8> {
        StarPrnt.font(font)
    }

    fn align(&self, alignment: Alignment) -> Vec<u8> {
        StarPrnt.align(alignment)
    }

    fn bold(&self, enabled: bool) -> Vec<u8> {
        StarPrnt.bold(enabled)
    }

    fn italic(&self, enabled: bool) -> Vec<u8> {
        StarPrnt.italic(enabled)
    }

    fn underline(&self, enabled: bool) -> Vec<u8> {
        StarPrnt.underline(enabled)
    }

    fn invert(&self, enabled: bool) -> Vec<u8> {
        StarPrnt.invert(enabled)
    }

    fn size(&self, width: u8, height: u8) -> Vec<u8> {
        StarPrnt.size(width, height)
    }

    fn codepage(&self, value: u8) -> Vec<u8> {
        StarPrnt.codepage(value)
    }

    fn cut(&self, cut: CutType) -> Vec<u8> {
        StarPrnt.cut(cut)
    }

    fn pulse(&self, device: u8, on_ms: u16, off_ms: u16) -> Vec<u8> {
        StarPrnt.pulse(device, on_ms, off_ms)
    }

    fn flush(&self) -> Vec<u8> {
        // Line-mode hardware prints as lines complete.
        Vec::new()
    }

    fn barcode(
        &self,
        value: &str,
        symbology: Symbology,
        options: &BarcodeOptions,
    ) -> Result<Vec<u8>> {
        StarPrnt.barcode(value, symbology, options)
    }

    fn qrcode(&self, value: &str, options: &QrOptions) -> Result<Vec<u8>> {
        StarPrnt.qrcode(value, options)
    }

    fn pdf417(&self, value: &str, options: &Pdf417Options) -> Result<Vec<u8>> {
        StarPrnt.pdf417(value, options)
    }

    async fn image(
        &self,
        img: &Image<'_>,
        _mode: ImageMode,
        _compress: bool,
        pool: &mut BufferPool,
    ) -> Result<Vec<u8>> {
        starprnt::band_image(img, pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_is_bare_reset() {
        assert_eq!(StarLine.initialize(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_flush_is_empty() {
        assert!(StarLine.flush().is_empty());
    }

    #[test]
    fn test_styles_match_starprnt() {
        assert_eq!(StarLine.bold(true), StarPrnt.bold(true));
        assert_eq!(StarLine.size(2, 3), StarPrnt.size(2, 3));
        assert_eq!(StarLine.cut(CutType::Partial), StarPrnt.cut(CutType::Partial));
    }
}
