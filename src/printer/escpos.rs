//! ESC/POS command encoding for 58mm thermal printers.

use image::imageops::{self, BiLevel, FilterType};
use image::{DynamicImage, GrayImage, Luma};

/// Printable width in dots.
pub const PAPER_WIDTH: u32 = 384;

/// Tallest raster band sent in a single `GS v 0` command.
pub const MAX_BAND_HEIGHT: u32 = 960;

/// Lines fed before cutting so the ticket clears the blade.
pub const CUT_FEED_LINES: u8 = 6;

/// `ESC @`: reset the printer.
pub const INITIALIZE: [u8; 2] = [0x1b, 0x40];

const RASTER_HEADER: [u8; 4] = [0x1d, 0x76, 0x30, 0x00];

/// `ESC d n` feed followed by `GS V 0` full cut.
pub fn cut() -> Vec<u8> {
    vec![0x1b, 0x64, CUT_FEED_LINES, 0x1d, 0x56, 0x00]
}

/// Converts an image to the 1-bit raster the printer expects.
///
/// Transparent areas become white, the image is scaled to [`PAPER_WIDTH`]
/// keeping its aspect ratio, then Floyd-Steinberg dithered to black and white.
pub fn to_monochrome(image: &DynamicImage) -> GrayImage {
    let rgba = image.to_rgba8();
    let mut gray = GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as f32 / 255.0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        Luma([(luma * alpha + 255.0 * (1.0 - alpha)).round() as u8])
    });

    if gray.width() != PAPER_WIDTH && gray.width() > 0 {
        let height = (gray.height() as u64 * PAPER_WIDTH as u64 / gray.width() as u64).max(1) as u32;
        gray = imageops::resize(&gray, PAPER_WIDTH, height, FilterType::Triangle);
    }

    imageops::dither(&mut gray, &BiLevel);
    gray
}

/// Encodes an image as one or more `GS v 0` raster commands.
///
/// Rows are packed eight dots per byte, most significant bit on the left,
/// a set bit printing black.
pub fn raster_image(image: &DynamicImage) -> Vec<u8> {
    let bitmap = to_monochrome(image);
    let width_bytes = ((bitmap.width() + 7) / 8) as usize;
    let mut out = Vec::with_capacity(width_bytes * bitmap.height() as usize + 16);

    let mut top = 0;
    while top < bitmap.height() {
        let band = MAX_BAND_HEIGHT.min(bitmap.height() - top);

        out.extend_from_slice(&RASTER_HEADER);
        out.extend_from_slice(&(width_bytes as u16).to_le_bytes());
        out.extend_from_slice(&(band as u16).to_le_bytes());

        for y in top..top + band {
            let mut row = vec![0u8; width_bytes];
            for x in 0..bitmap.width() {
                if bitmap.get_pixel(x, y).0[0] < 128 {
                    row[(x / 8) as usize] |= 0x80 >> (x % 8);
                }
            }
            out.extend_from_slice(&row);
        }

        top += band;
    }

    out
}
