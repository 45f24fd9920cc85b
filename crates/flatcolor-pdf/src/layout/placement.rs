//! Image placement within cells
//!
//! This module handles calculating the final position of an image within
//! its grid cell, accounting for:
//! - Cell padding
//! - The caption band
//! - Rotation (applied before fitting)
//! - Fit scaling (aspect ratio preserved, never cropped)

use crate::constants::{CAPTION_BAND_MM, CELL_PADDING_MM};
use crate::types::Rotation;

use super::{ImagePlacement, Rect};

/// Split a cell into the frame the image is fit into and, when captions
/// are shown, the caption band along the bottom of the cell.
pub fn calculate_frame(cell: &Rect, show_captions: bool) -> (Rect, Option<Rect>) {
    if !show_captions {
        return (cell.inset(CELL_PADDING_MM), None);
    }

    let band_height = CAPTION_BAND_MM.min(cell.height);
    let caption = Rect::new(
        cell.x,
        cell.bottom() - band_height,
        cell.width,
        band_height,
    );
    let above = Rect::new(cell.x, cell.y, cell.width, cell.height - band_height);

    (above.inset(CELL_PADDING_MM), Some(caption))
}

/// Fit a `source_width` x `source_height` rectangle into `target`.
///
/// Returns the largest rectangle with the source aspect ratio that fits
/// inside `target`, centered, together with the scale factor applied.
pub fn fit_rect(source_width: f32, source_height: f32, target: &Rect) -> (Rect, f32) {
    let scale = calculate_scale(source_width, source_height, target.width, target.height);

    let width = source_width * scale;
    let height = source_height * scale;

    let rect = Rect::new(
        target.x + (target.width - width) / 2.0,
        target.y + (target.height - height) / 2.0,
        width,
        height,
    );

    (rect, scale)
}

/// Calculate the placement of an image in a cell.
///
/// # Arguments
/// * `cell` - The cell bounds
/// * `pixel_width` - Source bitmap width, before rotation
/// * `pixel_height` - Source bitmap height, before rotation
/// * `rotation` - Rotation applied to the bitmap
/// * `show_captions` - Whether a caption band is reserved
pub fn place_image(
    cell: &Rect,
    pixel_width: u32,
    pixel_height: u32,
    rotation: Rotation,
    show_captions: bool,
) -> ImagePlacement {
    let (frame, caption_rect) = calculate_frame(cell, show_captions);

    // Rotate first so quarter turns swap the dimensions being fit
    let (source_width, source_height) =
        rotation.apply_to_dimensions(pixel_width as f32, pixel_height as f32);

    let (image_rect, scale) = fit_rect(source_width, source_height, &frame);

    ImagePlacement {
        cell: *cell,
        frame,
        image_rect,
        caption_rect,
        rotation,
        scale,
    }
}

/// Calculate scale factor for fitting source to target dimensions.
fn calculate_scale(src_width: f32, src_height: f32, target_width: f32, target_height: f32) -> f32 {
    if src_width <= 0.0 || src_height <= 0.0 {
        return 0.0;
    }
    let scale_w = target_width / src_width;
    let scale_h = target_height / src_height;
    scale_w.min(scale_h).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_scale_fit() {
        // Source is 800x600, target is 400x400
        // To fit, we need to scale by 0.5 (width-limited)
        let scale = calculate_scale(800.0, 600.0, 400.0, 400.0);
        assert!((scale - 0.5).abs() < 0.001);

        // Source is 400x800, target is 400x400
        // To fit, we need to scale by 0.5 (height-limited)
        let scale = calculate_scale(400.0, 800.0, 400.0, 400.0);
        assert!((scale - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_fit_rect_letterboxes_and_centers() {
        let target = Rect::new(10.0, 10.0, 100.0, 100.0);
        let (rect, _) = fit_rect(200.0, 100.0, &target);

        assert!(approx(rect.width, 100.0));
        assert!(approx(rect.height, 50.0));
        assert!(approx(rect.x, 10.0));
        assert!(approx(rect.y, 35.0));
        assert!(target.contains(&rect));
    }

    #[test]
    fn test_fit_rect_upscales_small_images() {
        let target = Rect::new(0.0, 0.0, 100.0, 50.0);
        let (rect, scale) = fit_rect(10.0, 10.0, &target);

        assert!(approx(scale, 5.0));
        assert!(approx(rect.width, 50.0));
        assert!(approx(rect.height, 50.0));
        assert!(approx(rect.x, 25.0));
    }

    #[test]
    fn test_quarter_rotation_swaps_aspect() {
        let cell = Rect::new(0.0, 0.0, 104.0, 54.0);

        let upright = place_image(&cell, 400, 200, Rotation::None, false);
        let turned = place_image(&cell, 400, 200, Rotation::Clockwise90, false);

        assert!(approx(upright.image_rect.width / upright.image_rect.height, 2.0));
        assert!(approx(turned.image_rect.width / turned.image_rect.height, 0.5));
        assert!(cell.contains(&turned.image_rect));

        let half_turn = place_image(&cell, 400, 200, Rotation::Clockwise180, false);
        assert_eq!(half_turn.image_rect, upright.image_rect);
    }

    #[test]
    fn test_padding_applied() {
        let cell = Rect::new(0.0, 0.0, 100.0, 100.0);
        let placement = place_image(&cell, 10, 10, Rotation::None, false);

        assert_eq!(placement.frame, cell.inset(CELL_PADDING_MM));
        assert!(approx(placement.image_rect.width, 100.0 - 2.0 * CELL_PADDING_MM));
        assert!(placement.caption_rect.is_none());
    }

    #[test]
    fn test_caption_band_reserved_below_image() {
        let cell = Rect::new(0.0, 0.0, 100.0, 100.0);
        let placement = place_image(&cell, 10, 10, Rotation::None, true);

        let caption = placement.caption_rect.unwrap();
        assert!(approx(caption.height, CAPTION_BAND_MM));
        assert!(approx(caption.bottom(), cell.bottom()));
        assert!(placement.image_rect.bottom() <= caption.y + 1e-3);
        assert!(cell.contains(&caption));
        assert!(cell.contains(&placement.image_rect));
    }
}
