//! Two-tone reduction of raster images
//!
//! Every image is reduced to a 1-bit mask before it reaches the PDF: a set
//! bit is ink (primary color), a clear bit is paper (secondary color). The
//! mask is stored as an indexed image whose two-entry palette is the
//! document's color scheme, so no other color can appear.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::{DynamicImage, GrayImage, Luma};

use crate::types::{GenerateError, ImageItem, Result, ToneMode};

const INK: u8 = 0;
const PAPER: u8 = 255;

/// A packed, zlib-compressed 1-bit image ready to become an XObject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatImage {
    pub width: u32,
    pub height: u32,
    /// Rows packed MSB-first, each padded to a whole byte, then deflated
    pub data: Vec<u8>,
}

/// Reduce an image to two tones and pack it.
pub fn flatten(item: &ImageItem, mode: ToneMode) -> Result<FlatImage> {
    let (width, height) = item.pixel_dimensions();
    if width == 0 || height == 0 {
        return Err(GenerateError::Render {
            image: item.id,
            reason: "image has no pixels".to_string(),
        });
    }

    let gray = luminance(&item.bitmap);
    let mask = binarize(gray, mode);
    let packed = pack_bits(&mask);

    let data = compress(&packed).map_err(|e| GenerateError::Render {
        image: item.id,
        reason: format!("failed to compress image data: {}", e),
    })?;

    log::debug!(
        "Flattened image {} ({}x{}, {} -> {} bytes)",
        item.id,
        width,
        height,
        packed.len(),
        data.len()
    );

    Ok(FlatImage {
        width,
        height,
        data,
    })
}

/// Luminance of every pixel, composited over white using its alpha.
pub fn luminance(image: &DynamicImage) -> GrayImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    GrayImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000;
        let alpha = a as u32;
        let composited = (luma * alpha + 255 * (255 - alpha) + 127) / 255;
        Luma([composited as u8])
    })
}

/// Map every pixel to `INK` or `PAPER` according to `mode`.
pub fn binarize(mut gray: GrayImage, mode: ToneMode) -> GrayImage {
    match mode {
        ToneMode::Auto => {
            let cut = otsu_cut(&gray);
            log::trace!("Otsu cut at {}", cut);
            apply_cut(&mut gray, cut);
        }
        ToneMode::Threshold(cut) => apply_cut(&mut gray, cut as u16),
        ToneMode::Dither => {
            image::imageops::dither(&mut gray, &image::imageops::BiLevel);
        }
    }
    gray
}

/// Pixels strictly below `cut` become ink.
fn apply_cut(gray: &mut GrayImage, cut: u16) {
    for pixel in gray.pixels_mut() {
        pixel.0[0] = if (pixel.0[0] as u16) < cut { INK } else { PAPER };
    }
}

/// Cut value from Otsu's method.
///
/// Levels up to and including the Otsu threshold are ink, so the cut is the
/// threshold plus one. An image with a single gray level has no between-class
/// variance; it is split at mid-gray instead so dark images stay dark.
pub fn otsu_cut(gray: &GrayImage) -> u16 {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total_pixels = gray.width() as u64 * gray.height() as u64;
    let levels = histogram.iter().filter(|&&count| count > 0).count();
    if total_pixels == 0 || levels < 2 {
        return 128;
    }

    let sum_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum();

    let mut sum_background: f64 = 0.0;
    let mut weight_background: u64 = 0;
    let mut max_variance: f64 = -1.0;
    let mut best_threshold: u8 = 0;

    for (t, &count) in histogram.iter().enumerate() {
        weight_background += count;
        if weight_background == 0 {
            continue;
        }
        let weight_foreground = total_pixels - weight_background;
        if weight_foreground == 0 {
            break;
        }

        sum_background += t as f64 * count as f64;
        let mean_background = sum_background / weight_background as f64;
        let mean_foreground = (sum_total - sum_background) / weight_foreground as f64;

        let diff = mean_background - mean_foreground;
        let variance = weight_background as f64 * weight_foreground as f64 * diff * diff;
        if variance > max_variance {
            max_variance = variance;
            best_threshold = t as u8;
        }
    }

    best_threshold as u16 + 1
}

/// Pack an ink/paper mask into rows of bits, MSB first. Ink is 1.
pub fn pack_bits(mask: &GrayImage) -> Vec<u8> {
    let (width, height) = mask.dimensions();
    let row_bytes = width.div_ceil(8) as usize;
    let mut packed = vec![0u8; row_bytes * height as usize];

    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel.0[0] == INK {
            let index = y as usize * row_bytes + (x / 8) as usize;
            packed[index] |= 0x80 >> (x % 8);
        }
    }

    packed
}

fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageId;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn gray_from(values: &[u8], width: u32) -> GrayImage {
        let height = values.len() as u32 / width;
        GrayImage::from_fn(width, height, |x, y| {
            Luma([values[(y * width + x) as usize]])
        })
    }

    fn ink_count(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p.0[0] == INK).count()
    }

    #[test]
    fn test_transparent_pixels_become_white() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let gray = luminance(&DynamicImage::ImageRgba8(image));
        assert!(gray.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn test_luminance_weights() {
        let image = RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]));
        let gray = luminance(&DynamicImage::ImageRgb8(image));
        assert_eq!(gray.get_pixel(0, 0).0[0], 76);
    }

    #[test]
    fn test_fixed_threshold() {
        let gray = gray_from(&[0, 99, 100, 255], 4);
        let mask = binarize(gray, ToneMode::Threshold(100));
        let values: Vec<u8> = mask.pixels().map(|p| p.0[0]).collect();
        assert_eq!(values, vec![INK, INK, PAPER, PAPER]);
    }

    #[test]
    fn test_threshold_zero_is_all_paper() {
        let gray = gray_from(&[0, 0, 0, 0], 2);
        assert_eq!(ink_count(&binarize(gray, ToneMode::Threshold(0))), 0);
    }

    #[test]
    fn test_otsu_splits_bimodal_image() {
        let gray = gray_from(&[10, 20, 15, 230, 240, 250], 3);
        let cut = otsu_cut(&gray);
        assert!(cut > 20 && cut <= 230, "cut = {}", cut);

        let mask = binarize(gray, ToneMode::Auto);
        assert_eq!(ink_count(&mask), 3);
    }

    #[test]
    fn test_otsu_uniform_images() {
        let black = gray_from(&[0; 4], 2);
        assert_eq!(ink_count(&binarize(black, ToneMode::Auto)), 4);

        let white = gray_from(&[255; 4], 2);
        assert_eq!(ink_count(&binarize(white, ToneMode::Auto)), 0);
    }

    #[test]
    fn test_dither_outputs_two_levels() {
        let gray = GrayImage::from_fn(16, 16, |x, _| Luma([(x * 16) as u8]));
        let mask = binarize(gray, ToneMode::Dither);
        assert!(mask.pixels().all(|p| p.0[0] == INK || p.0[0] == PAPER));
        let ink = ink_count(&mask);
        assert!(ink > 0 && ink < 256);
    }

    #[test]
    fn test_pack_bits_pads_rows() {
        // 10 pixels wide: two bytes per row
        let mut values = [PAPER; 20];
        values[0] = INK;
        values[9] = INK;
        values[10 + 8] = INK;
        let mask = gray_from(&values, 10);

        assert_eq!(pack_bits(&mask), vec![0x80, 0x40, 0x00, 0x80]);
    }

    #[test]
    fn test_flatten_compresses_packed_bits() {
        use flate2::read::ZlibDecoder;
        use std::io::Read;

        let item = ImageItem::new(
            ImageId(1),
            DynamicImage::ImageRgb8(RgbImage::from_pixel(9, 3, Rgb([0, 0, 0]))),
            "black.png",
        );
        let flat = flatten(&item, ToneMode::Auto).unwrap();
        assert_eq!((flat.width, flat.height), (9, 3));

        let mut raw = Vec::new();
        ZlibDecoder::new(&flat.data[..])
            .read_to_end(&mut raw)
            .unwrap();
        assert_eq!(raw, vec![0xFF, 0x80, 0xFF, 0x80, 0xFF, 0x80]);
    }

    #[test]
    fn test_flatten_rejects_empty_bitmap() {
        let item = ImageItem::new(ImageId(7), DynamicImage::new_rgb8(0, 5), "empty.png");
        let result = flatten(&item, ToneMode::Auto);
        assert!(matches!(
            result,
            Err(GenerateError::Render { image: ImageId(7), .. })
        ));
    }
}
