//! Page geometry resolution
//!
//! Turns a page size, orientation and margin set into absolute page
//! dimensions and the content rectangle that cells are laid out in.
//! All values are millimeters with the origin at the top-left corner.

use crate::constants::{FOOTER_BAND_MM, HEADER_BAND_MM};
use crate::layout::Rect;
use crate::types::*;

/// Resolved page dimensions and regions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    /// Area left for cells after margins and bands
    pub content: Rect,
    pub header_band: Option<Rect>,
    pub footer_band: Option<Rect>,
}

/// Resolve page dimensions and the content rectangle.
///
/// Fails with `InvalidGeometry` when a margin is negative, not finite, or
/// not smaller than half of its page dimension, or when the bands leave no
/// room for content.
pub fn resolve(
    page_size: PageSize,
    orientation: Orientation,
    margins: &Margins,
    show_header: bool,
    show_footer: bool,
) -> Result<PageGeometry> {
    let (page_width, page_height) = page_size.dimensions_with_orientation(orientation);

    if !(page_width.is_finite() && page_height.is_finite())
        || page_width <= 0.0
        || page_height <= 0.0
    {
        return Err(GenerateError::InvalidGeometry(format!(
            "Page dimensions must be positive, got {} x {} mm",
            page_width, page_height
        )));
    }

    check_margin("top", margins.top_mm, page_height)?;
    check_margin("bottom", margins.bottom_mm, page_height)?;
    check_margin("left", margins.left_mm, page_width)?;
    check_margin("right", margins.right_mm, page_width)?;

    let mut content = Rect::new(
        margins.left_mm,
        margins.top_mm,
        page_width - margins.left_mm - margins.right_mm,
        page_height - margins.top_mm - margins.bottom_mm,
    );

    let header_band = show_header.then(|| {
        let band = Rect::new(content.x, content.y, content.width, HEADER_BAND_MM);
        content.y += HEADER_BAND_MM;
        content.height -= HEADER_BAND_MM;
        band
    });

    let footer_band = show_footer.then(|| {
        content.height -= FOOTER_BAND_MM;
        Rect::new(content.x, content.bottom(), content.width, FOOTER_BAND_MM)
    });

    if content.width <= 0.0 || content.height <= 0.0 {
        return Err(GenerateError::InvalidGeometry(format!(
            "Margins and bands leave no content area ({:.1} x {:.1} mm)",
            content.width, content.height
        )));
    }

    Ok(PageGeometry {
        page_width,
        page_height,
        content,
        header_band,
        footer_band,
    })
}

fn check_margin(side: &str, value: f32, page_dimension: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(GenerateError::InvalidGeometry(format!(
            "The {} margin must be a non-negative number, got {}",
            side, value
        )));
    }
    if value >= page_dimension / 2.0 {
        return Err(GenerateError::InvalidGeometry(format!(
            "The {} margin ({} mm) must be smaller than half the page ({} mm)",
            side, value, page_dimension
        )));
    }
    Ok(())
}
