//! # Golden Tests
//!
//! End-to-end documents with byte-exact expectations, one per wire
//! dialect, plus the image pipeline and chunked-streaming contracts.
//! Expected byte sequences are written inline: receipt documents are
//! small enough that a hex vector next to the builder calls reads better
//! than an opaque blob on disk.

use pretty_assertions::assert_eq;
use recibo::dialect::escpos::EscPos;
use recibo::dialect::{Dialect, ImageMode};
use recibo::image::{Image, rle};
use recibo::{
    Alignment, BufferPool, ChunkOptions, CutType, Encoder, EncoderOptions, Symbology,
};

const INIT: &[u8] = &[0x1B, 0x40, 0x1C, 0x2E, 0x1B, 0x4D, 0x00];
const CP437: &[u8] = &[0x1B, 0x74, 0x00];
const NL: &[u8] = &[0x0A, 0x0D];

fn escpos_encoder() -> Encoder {
    Encoder::new(EncoderOptions::new()).unwrap()
}

// ============================================================================
// DOCUMENT SCENARIOS
// ============================================================================

#[test]
fn golden_escpos_line_and_cut() {
    let mut encoder = escpos_encoder();
    encoder
        .initialize()
        .unwrap()
        .line("Hi")
        .unwrap()
        .cut(CutType::Full)
        .unwrap();

    let expected = [INIT, CP437, b"Hi", NL, &[0x1D, 0x56, 0x00]].concat();
    assert_eq!(encoder.encode().unwrap(), expected);
}

#[test]
fn golden_escpos_styled_receipt() {
    let mut encoder = escpos_encoder();
    encoder
        .initialize()
        .unwrap()
        .line("A")
        .unwrap()
        .bold(true)
        .unwrap()
        .line("B")
        .unwrap()
        .cut(CutType::Partial)
        .unwrap();

    let expected = [
        INIT,
        CP437,
        b"A",
        NL,
        &[0x1B, 0x45, 0x01], // bold on carried into the line
        b"B",
        &[0x1B, 0x45, 0x00], // driven back to default at line end
        NL,
        &[0x1D, 0x56, 0x01],
    ]
    .concat();
    assert_eq!(encoder.encode().unwrap(), expected);
}

#[test]
fn golden_right_alignment_pads_and_strips() {
    let mut encoder = escpos_encoder();
    encoder
        .align(Alignment::Right)
        .unwrap()
        .text("hello ")
        .unwrap()
        .newline()
        .unwrap();

    // 42 columns: trailing space stripped, 37 cells of padding, then the
    // five text cells. The codepage switch rides with the text item.
    let mut expected = vec![b' '; 37];
    expected.extend_from_slice(CP437);
    expected.extend_from_slice(b"hello");
    expected.extend_from_slice(NL);
    assert_eq!(encoder.encode().unwrap(), expected);
}

#[test]
fn golden_starline_receipt_with_cutter_feed() {
    let mut encoder = Encoder::for_printer("star-tsp650ii").unwrap();
    encoder.line("HELLO").unwrap().cut(CutType::Full).unwrap();

    let expected = [
        &[0x1B, 0x1D, 0x74, 0x01][..], // cp437 in the star mapping
        b"HELLO",
        NL,
        NL, // three blank feed lines ahead of the cutter
        NL,
        NL,
        &[0x1B, 0x64, 0x00],
    ]
    .concat();
    assert_eq!(encoder.encode().unwrap(), expected);
}

#[test]
fn golden_starprnt_auto_flush() {
    let mut encoder = Encoder::for_printer("star-mc-print2").unwrap();
    encoder.line("OK").unwrap();

    let expected = [
        &[0x1B, 0x1D, 0x74, 0x01][..],
        b"OK",
        NL,
        &[0x1B, 0x1D, 0x50, 0x30, 0x1B, 0x1D, 0x50, 0x31],
    ]
    .concat();
    assert_eq!(encoder.encode().unwrap(), expected);
}

#[test]
fn golden_auto_codepage_switches_mid_line() {
    let mut encoder = escpos_encoder();
    encoder.line("a€b").unwrap();

    // € is not in cp437; the first candidate carrying it is windows1252
    // (slot 16), and ASCII after it stays in the switched run.
    let expected = [
        CP437,
        b"a",
        &[0x1B, 0x74, 0x10],
        &[0x80],
        b"b",
        NL,
    ]
    .concat();
    assert_eq!(encoder.encode().unwrap(), expected);
}

#[test]
fn golden_barcode_document() {
    let mut encoder = escpos_encoder();
    encoder
        .line("ticket")
        .unwrap()
        .barcode("123456789012", Symbology::UpcA, Default::default())
        .unwrap()
        .cut(CutType::Full)
        .unwrap();

    let expected = [
        CP437,
        b"ticket",
        NL,
        &[0x1D, 0x68, 60], // height
        &[0x1D, 0x77, 3],  // module width
        &[0x1D, 0x48, 2],  // HRI below
        &[0x1D, 0x6B, 0],  // GS k function A, UPC-A
        b"123456789012",
        &[0x00],
        &[0x1D, 0x56, 0x00],
    ]
    .concat();
    assert_eq!(encoder.encode().unwrap(), expected);
}

// ============================================================================
// IMAGE PIPELINE
// ============================================================================

#[tokio::test]
async fn golden_strip_partition_headers() {
    // 576x1000 white image: two strips of 512 and 488 rows, 72-byte
    // stride, 72,000 raster bytes split 36,864 + 35,136.
    let data = vec![255u8; 576 * 1000 * 4];
    let image = Image::new(&data, 576, 1000).unwrap();
    let mut pool = BufferPool::new();

    let cmd = EscPos
        .image(&image, ImageMode::Raster, false, &mut pool)
        .await
        .unwrap();

    assert_eq!(cmd.len(), 2 * 8 + 72_000);
    assert_eq!(&cmd[..8], &[0x1D, 0x76, 0x30, 0x00, 0x48, 0x00, 0x00, 0x02]);
    let second = 8 + 36_864;
    assert_eq!(
        &cmd[second..second + 8],
        &[0x1D, 0x76, 0x30, 0x00, 0x48, 0x00, 0xE8, 0x01]
    );
}

#[tokio::test]
async fn golden_image_from_rgba_buffer() {
    // Fixture via the `image` crate: 16x8 white with a black top row.
    let mut fixture = image::RgbaImage::from_pixel(16, 8, image::Rgba([255, 255, 255, 255]));
    for x in 0..16 {
        fixture.put_pixel(x, 0, image::Rgba([0, 0, 0, 255]));
    }
    let raw = fixture.into_raw();
    let img = Image::new(&raw, 16, 8).unwrap();
    let mut pool = BufferPool::new();

    let cmd = EscPos
        .image(&img, ImageMode::Raster, false, &mut pool)
        .await
        .unwrap();
    assert_eq!(&cmd[..8], &[0x1D, 0x76, 0x30, 0x00, 0x02, 0x00, 0x08, 0x00]);
    assert_eq!(&cmd[8..10], &[0xFF, 0xFF], "top row fully black");
    assert!(cmd[10..].iter().all(|&b| b == 0), "remaining rows white");
}

#[test]
fn golden_rle_spec_vector() {
    let mut data = vec![0xAA; 130];
    data.extend_from_slice(&[0x01, 0x02, 0x03, 0x04, 0x05]);

    let mut pool = BufferPool::new();
    let result = rle::compress(&data, &mut pool);
    assert!(result.compressed);
    assert_eq!(
        result.data,
        vec![0xFF, 0xAA, 0x00, 0xAA, 0x04, 0x01, 0x02, 0x03, 0x04, 0x05]
    );
    assert_eq!(rle::decompress(&result.data), data);
}

#[tokio::test]
async fn golden_minimum_width_image_accepted_both_paths() {
    let data = vec![0u8; 8 * 4]; // 8x1, all black
    let image = Image::new(&data, 8, 1).unwrap();
    let mut pool = BufferPool::new();

    let raster = EscPos
        .image(&image, ImageMode::Raster, false, &mut pool)
        .await
        .unwrap();
    assert_eq!(raster, vec![0x1D, 0x76, 0x30, 0x00, 0x01, 0x00, 0x01, 0x00, 0xFF]);

    let column = EscPos
        .image(&image, ImageMode::Column, false, &mut pool)
        .await
        .unwrap();
    // Line spacing, one band with 23 white padded rows, spacing reset.
    assert_eq!(&column[..3], &[0x1B, 0x33, 24]);
    assert_eq!(&column[3..8], &[0x1B, 0x2A, 0x21, 0x08, 0x00]);
    let band = &column[8..8 + 24];
    for triple in band.chunks(3) {
        // Top row black in the first byte, 23 padded rows white below.
        assert_eq!(triple, &[0x80, 0x00, 0x00]);
    }
}

// ============================================================================
// CHUNKED STREAMING
// ============================================================================

#[tokio::test]
async fn golden_chunk_partition_of_2050_bytes() {
    let mut encoder = escpos_encoder();
    encoder.raw(vec![0xA5; 2050]).unwrap();

    let mut stream = encoder
        .encode_chunks(ChunkOptions { chunk_size: 512, sink: None })
        .unwrap();

    let mut sizes = Vec::new();
    let mut last = None;
    while let Some(chunk) = stream.next().await {
        sizes.push(chunk.bytes.len());
        last = Some(chunk);
    }
    assert_eq!(sizes, vec![512, 512, 512, 512, 2]);
    let last = last.unwrap();
    assert!(last.is_last);
    assert_eq!(last.bytes_sent, 2050);
    assert_eq!(last.total, 5);
}

#[tokio::test]
async fn golden_chunks_concatenate_to_encode_for_any_size() {
    for chunk_size in [1usize, 7, 512, 100_000] {
        let mut encoder = escpos_encoder();
        encoder
            .initialize()
            .unwrap()
            .line("chunk equality")
            .unwrap()
            .cut(CutType::Full)
            .unwrap();
        let whole = encoder.encode().unwrap();

        let mut encoder = escpos_encoder();
        encoder
            .initialize()
            .unwrap()
            .line("chunk equality")
            .unwrap()
            .cut(CutType::Full)
            .unwrap();
        let stream = encoder
            .encode_chunks(ChunkOptions { chunk_size, sink: None })
            .unwrap();
        assert_eq!(stream.total_chunks(), whole.len().div_ceil(chunk_size));
        assert_eq!(stream.collect().await, whole, "chunk_size {chunk_size}");
    }
}

// ============================================================================
// DETERMINISM
// ============================================================================

#[test]
fn golden_output_is_deterministic() {
    let _ = env_logger::builder().is_test(true).try_init();
    let build = || {
        let mut encoder = Encoder::for_printer("epson-tm-t88v").unwrap();
        encoder
            .initialize()
            .unwrap()
            .align(Alignment::Center)
            .unwrap()
            .size(2, 2)
            .unwrap()
            .line("CAFE RECIBO")
            .unwrap()
            .size(1, 1)
            .unwrap()
            .align(Alignment::Left)
            .unwrap()
            .line("espresso              3.00")
            .unwrap()
            .cut(CutType::Full)
            .unwrap();
        encoder.encode().unwrap()
    };
    assert_eq!(build(), build());
}
