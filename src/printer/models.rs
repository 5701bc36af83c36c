//! The model table. Values come from vendor command references; where a
//! clone family is loose about its heritage (the `pos-*` generics) the
//! entries describe the common firmware behaviour.

use super::{
    BarcodeSupport, Capabilities, FontSpec, ImageSupport, Newline, Pdf417Support, PrinterModel,
    QrSupport,
};
use crate::dialect::{DialectKind, Font, ImageMode, QrModel, Symbology};

pub(crate) const ALL_SYMBOLOGIES: &[Symbology] = &[
    Symbology::UpcA,
    Symbology::UpcE,
    Symbology::Ean13,
    Symbology::Ean8,
    Symbology::Code39,
    Symbology::Itf,
    Symbology::Codabar,
    Symbology::Code93,
    Symbology::Code128,
];

/// The cheap-clone set: no Codabar or Code93 in most firmwares.
const BASIC_SYMBOLOGIES: &[Symbology] = &[
    Symbology::UpcA,
    Symbology::UpcE,
    Symbology::Ean13,
    Symbology::Ean8,
    Symbology::Code39,
    Symbology::Itf,
    Symbology::Code128,
];

pub(crate) const QR_BOTH_MODELS: &[QrModel] = &[QrModel::Model1, QrModel::Model2];
const QR_MODEL_2: &[QrModel] = &[QrModel::Model2];

pub(crate) const FONTS_42_56: &[FontSpec] = &[
    FontSpec { font: Font::A, size: "12x24", columns: 42 },
    FontSpec { font: Font::B, size: "9x17", columns: 56 },
];

const FONTS_48_64: &[FontSpec] = &[
    FontSpec { font: Font::A, size: "12x24", columns: 48 },
    FontSpec { font: Font::B, size: "9x24", columns: 64 },
];

const FONTS_32_42: &[FontSpec] = &[
    FontSpec { font: Font::A, size: "12x24", columns: 32 },
    FontSpec { font: Font::B, size: "9x24", columns: 42 },
];

const FONTS_44_56: &[FontSpec] = &[
    FontSpec { font: Font::A, size: "12x24", columns: 44 },
    FontSpec { font: Font::B, size: "9x17", columns: 56 },
];

pub const MODELS: &[PrinterModel] = &[
    PrinterModel {
        id: "epson-tm-t88iv",
        display_name: "Epson TM-T88IV",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepage_mapping: "epson",
            newline: Newline::LfCr,
            fonts: FONTS_42_56,
            barcodes: BarcodeSupport { supported: true, symbologies: ALL_SYMBOLOGIES },
            qrcode: QrSupport { supported: false, models: &[] },
            pdf417: Pdf417Support { supported: false, fallback: Some(Symbology::Code128) },
            image: ImageSupport { mode: ImageMode::Raster, compression: false },
            cutter_feed: 4,
        },
    },
    PrinterModel {
        id: "epson-tm-t88v",
        display_name: "Epson TM-T88V",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepage_mapping: "epson",
            newline: Newline::LfCr,
            fonts: FONTS_42_56,
            barcodes: BarcodeSupport { supported: true, symbologies: ALL_SYMBOLOGIES },
            qrcode: QrSupport { supported: true, models: QR_BOTH_MODELS },
            pdf417: Pdf417Support { supported: true, fallback: None },
            image: ImageSupport { mode: ImageMode::Raster, compression: true },
            cutter_feed: 4,
        },
    },
    PrinterModel {
        id: "epson-tm-t20iii",
        display_name: "Epson TM-T20III",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepage_mapping: "epson",
            newline: Newline::LfCr,
            fonts: FONTS_48_64,
            barcodes: BarcodeSupport { supported: true, symbologies: ALL_SYMBOLOGIES },
            qrcode: QrSupport { supported: true, models: QR_BOTH_MODELS },
            pdf417: Pdf417Support { supported: true, fallback: None },
            image: ImageSupport { mode: ImageMode::Raster, compression: true },
            cutter_feed: 4,
        },
    },
    PrinterModel {
        id: "epson-tm-p20ii",
        display_name: "Epson TM-P20II",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepage_mapping: "epson",
            newline: Newline::LfCr,
            fonts: FONTS_32_42,
            barcodes: BarcodeSupport { supported: true, symbologies: ALL_SYMBOLOGIES },
            qrcode: QrSupport { supported: true, models: QR_MODEL_2 },
            pdf417: Pdf417Support { supported: true, fallback: None },
            image: ImageSupport { mode: ImageMode::Raster, compression: true },
            cutter_feed: 0,
        },
    },
    PrinterModel {
        id: "bixolon-srp-350iii",
        display_name: "Bixolon SRP-350III",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepage_mapping: "epson",
            newline: Newline::LfCr,
            fonts: FONTS_42_56,
            barcodes: BarcodeSupport { supported: true, symbologies: ALL_SYMBOLOGIES },
            qrcode: QrSupport { supported: true, models: QR_MODEL_2 },
            pdf417: Pdf417Support { supported: true, fallback: None },
            image: ImageSupport { mode: ImageMode::Raster, compression: false },
            cutter_feed: 4,
        },
    },
    PrinterModel {
        id: "citizen-ct-s310ii",
        display_name: "Citizen CT-S310II",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepage_mapping: "epson",
            newline: Newline::LfCr,
            fonts: FONTS_48_64,
            barcodes: BarcodeSupport { supported: true, symbologies: ALL_SYMBOLOGIES },
            qrcode: QrSupport { supported: true, models: QR_MODEL_2 },
            pdf417: Pdf417Support { supported: true, fallback: None },
            image: ImageSupport { mode: ImageMode::Raster, compression: false },
            cutter_feed: 3,
        },
    },
    PrinterModel {
        id: "hp-a779",
        display_name: "HP A779",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepage_mapping: "epson",
            newline: Newline::LfCr,
            fonts: FONTS_44_56,
            barcodes: BarcodeSupport { supported: true, symbologies: ALL_SYMBOLOGIES },
            qrcode: QrSupport { supported: false, models: &[] },
            pdf417: Pdf417Support { supported: false, fallback: Some(Symbology::Code128) },
            image: ImageSupport { mode: ImageMode::Raster, compression: false },
            cutter_feed: 4,
        },
    },
    PrinterModel {
        id: "pos-5890",
        display_name: "Generic POS-5890 (58mm)",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepage_mapping: "epson",
            newline: Newline::Lf,
            fonts: &[FontSpec { font: Font::A, size: "12x24", columns: 32 }],
            barcodes: BarcodeSupport { supported: true, symbologies: BASIC_SYMBOLOGIES },
            qrcode: QrSupport { supported: true, models: QR_MODEL_2 },
            pdf417: Pdf417Support { supported: false, fallback: None },
            image: ImageSupport { mode: ImageMode::Column, compression: false },
            cutter_feed: 0,
        },
    },
    PrinterModel {
        id: "pos-8360",
        display_name: "Generic POS-8360 (80mm)",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepage_mapping: "epson",
            newline: Newline::Lf,
            fonts: FONTS_48_64,
            barcodes: BarcodeSupport { supported: true, symbologies: BASIC_SYMBOLOGIES },
            qrcode: QrSupport { supported: true, models: QR_MODEL_2 },
            pdf417: Pdf417Support { supported: false, fallback: Some(Symbology::Code128) },
            image: ImageSupport { mode: ImageMode::Column, compression: false },
            cutter_feed: 4,
        },
    },
    PrinterModel {
        id: "xprinter-xp-n160ii",
        display_name: "Xprinter XP-N160II",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepage_mapping: "epson",
            newline: Newline::LfCr,
            fonts: FONTS_48_64,
            barcodes: BarcodeSupport { supported: true, symbologies: ALL_SYMBOLOGIES },
            qrcode: QrSupport { supported: true, models: QR_MODEL_2 },
            pdf417: Pdf417Support { supported: false, fallback: Some(Symbology::Code128) },
            image: ImageSupport { mode: ImageMode::Raster, compression: false },
            cutter_feed: 4,
        },
    },
    PrinterModel {
        id: "star-mc-print2",
        display_name: "Star mC-Print2",
        capabilities: Capabilities {
            dialect: DialectKind::StarPrnt,
            codepage_mapping: "star",
            newline: Newline::LfCr,
            fonts: FONTS_32_42,
            barcodes: BarcodeSupport { supported: true, symbologies: ALL_SYMBOLOGIES },
            qrcode: QrSupport { supported: true, models: QR_MODEL_2 },
            pdf417: Pdf417Support { supported: true, fallback: None },
            image: ImageSupport { mode: ImageMode::Column, compression: false },
            cutter_feed: 3,
        },
    },
    PrinterModel {
        id: "star-mpop",
        display_name: "Star mPOP",
        capabilities: Capabilities {
            dialect: DialectKind::StarPrnt,
            codepage_mapping: "star",
            newline: Newline::LfCr,
            fonts: FONTS_32_42,
            barcodes: BarcodeSupport { supported: true, symbologies: ALL_SYMBOLOGIES },
            qrcode: QrSupport { supported: true, models: QR_MODEL_2 },
            pdf417: Pdf417Support { supported: true, fallback: None },
            image: ImageSupport { mode: ImageMode::Column, compression: false },
            cutter_feed: 3,
        },
    },
    PrinterModel {
        id: "star-tsp100iv",
        display_name: "Star TSP100IV",
        capabilities: Capabilities {
            dialect: DialectKind::StarPrnt,
            codepage_mapping: "star",
            newline: Newline::LfCr,
            fonts: FONTS_48_64,
            barcodes: BarcodeSupport { supported: true, symbologies: ALL_SYMBOLOGIES },
            qrcode: QrSupport { supported: true, models: QR_BOTH_MODELS },
            pdf417: Pdf417Support { supported: true, fallback: None },
            image: ImageSupport { mode: ImageMode::Column, compression: false },
            cutter_feed: 3,
        },
    },
    PrinterModel {
        id: "star-sm-l200",
        display_name: "Star SM-L200",
        capabilities: Capabilities {
            dialect: DialectKind::StarPrnt,
            codepage_mapping: "star",
            newline: Newline::LfCr,
            fonts: FONTS_32_42,
            barcodes: BarcodeSupport { supported: true, symbologies: ALL_SYMBOLOGIES },
            qrcode: QrSupport { supported: true, models: QR_MODEL_2 },
            pdf417: Pdf417Support { supported: false, fallback: Some(Symbology::Code128) },
            image: ImageSupport { mode: ImageMode::Column, compression: false },
            cutter_feed: 0,
        },
    },
    PrinterModel {
        id: "star-tsp650ii",
        display_name: "Star TSP650II",
        capabilities: Capabilities {
            dialect: DialectKind::StarLine,
            codepage_mapping: "star",
            newline: Newline::LfCr,
            fonts: FONTS_48_64,
            barcodes: BarcodeSupport { supported: true, symbologies: ALL_SYMBOLOGIES },
            qrcode: QrSupport { supported: true, models: QR_BOTH_MODELS },
            pdf417: Pdf417Support { supported: true, fallback: None },
            image: ImageSupport { mode: ImageMode::Column, compression: false },
            cutter_feed: 3,
        },
    },
    PrinterModel {
        id: "star-tup592",
        display_name: "Star TUP592",
        capabilities: Capabilities {
            dialect: DialectKind::StarLine,
            codepage_mapping: "star",
            newline: Newline::LfCr,
            fonts: FONTS_48_64,
            barcodes: BarcodeSupport { supported: true, symbologies: ALL_SYMBOLOGIES },
            qrcode: QrSupport { supported: true, models: QR_MODEL_2 },
            pdf417: Pdf417Support { supported: false, fallback: Some(Symbology::Code128) },
            image: ImageSupport { mode: ImageMode::Column, compression: false },
            cutter_feed: 3,
        },
    },
];
