//! Output page rendering
//!
//! Turns a page plan into a content stream plus the flattened images it
//! draws. Nothing here touches the `lopdf::Document`; pages are rendered
//! independently (and in parallel) and stitched together afterwards by
//! the assembler.
//!
//! Layout rectangles are millimeters from the top-left corner; the content
//! stream uses points from the bottom-left corner.

use crate::constants::{
    BAND_FONT_SIZE, BORDER_WIDTH, CAPTION_FONT_SIZE, CELL_PADDING_MM, FONT_RESOURCE,
    HELVETICA_CAP_HEIGHT, mm_to_pt,
};
use crate::geometry::PageGeometry;
use crate::layout::{ImagePlacement, PagePlan, Rect, place_image};
use crate::options::DocumentConfig;
use crate::types::{GenerateError, ImageItem, Rgb, Rotation, Result};

use super::text::{escape_pdf_string, fit_text, substitute_tokens, text_width};
use super::tone::{FlatImage, flatten};

// =============================================================================
// Public API
// =============================================================================

/// One rendered page, not yet part of a document
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub page_index: usize,
    pub width_pt: f32,
    pub height_pt: f32,
    /// Uncompressed content stream
    pub content: Vec<u8>,
    /// Images drawn by the content stream, named by `image_resource_name`
    pub images: Vec<FlatImage>,
    /// Whether the content stream references the shared font
    pub uses_font: bool,
}

/// XObject resource name for the `index`th image on a page
pub fn image_resource_name(index: usize) -> String {
    format!("Im{}", index)
}

/// Render one page.
///
/// # Arguments
/// * `plan` - Cells and images for this page
/// * `config` - Document configuration snapshot
/// * `geometry` - Resolved page geometry
/// * `total_pages` - Page count of the whole document, for band text
pub fn render_page(
    plan: &PagePlan<'_>,
    config: &DocumentConfig,
    geometry: &PageGeometry,
    total_pages: usize,
) -> Result<RenderedPage> {
    let page_height = geometry.page_height;
    let colors = &config.colors;

    let mut ops = String::new();
    let mut images = Vec::with_capacity(plan.images.len());
    let mut uses_font = false;

    // Paper
    ops.push_str(&format!(
        "q {} rg 0 0 {} {} re f Q\n",
        color_operands(colors.secondary),
        num(mm_to_pt(geometry.page_width)),
        num(mm_to_pt(page_height)),
    ));

    let mut placements = Vec::with_capacity(plan.images.len());
    for (cell, item) in plan.cells.iter().zip(&plan.images) {
        let placement = place_cell_image(cell, item, config.show_captions)?;

        let name = image_resource_name(images.len());
        images.push(flatten(item, config.tone)?);
        ops.push_str(&generate_image_command(
            &name,
            &placement.image_rect,
            placement.rotation,
            page_height,
        ));

        placements.push((placement, *item));
    }

    if config.show_borders && !placements.is_empty() {
        ops.push_str(&format!(
            "q {} RG {} w\n",
            color_operands(colors.primary),
            num(BORDER_WIDTH)
        ));
        for (placement, _) in &placements {
            let (x, y, w, h) = to_pdf_rect(&placement.cell, page_height);
            ops.push_str(&format!("{} {} {} {} re S\n", num(x), num(y), num(w), num(h)));
        }
        ops.push_str("Q\n");
    }

    let mut text_ops = String::new();

    if config.show_captions {
        for (placement, item) in &placements {
            if let Some(caption) = &placement.caption_rect {
                text_ops.push_str(&centered_text(
                    &item.display_name,
                    caption,
                    CAPTION_FONT_SIZE,
                    page_height,
                ));
            }
        }
    }

    let page_number = plan.page_index + 1;
    for (band, rect) in [
        (&config.header, geometry.header_band),
        (&config.footer, geometry.footer_band),
    ] {
        if let (true, Some(rect)) = (band.enabled, rect) {
            let text = substitute_tokens(&band.text, page_number, total_pages);
            text_ops.push_str(&centered_text(&text, &rect, BAND_FONT_SIZE, page_height));
        }
    }

    if !text_ops.is_empty() {
        uses_font = true;
        ops.push_str(&format!("q {} rg\n", color_operands(colors.primary)));
        ops.push_str(&text_ops);
        ops.push_str("Q\n");
    }

    Ok(RenderedPage {
        page_index: plan.page_index,
        width_pt: mm_to_pt(geometry.page_width),
        height_pt: mm_to_pt(page_height),
        content: ops.into_bytes(),
        images,
        uses_font,
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

fn place_cell_image(cell: &Rect, item: &ImageItem, show_captions: bool) -> Result<ImagePlacement> {
    let (width, height) = item.pixel_dimensions();
    if width == 0 || height == 0 {
        return Err(GenerateError::Render {
            image: item.id,
            reason: "image has no pixels".to_string(),
        });
    }

    let placement = place_image(cell, width, height, item.rotation, show_captions);
    if placement.image_rect.is_empty() {
        return Err(GenerateError::Render {
            image: item.id,
            reason: format!(
                "cell of {:.1} x {:.1} mm leaves no room for the image",
                cell.width, cell.height
            ),
        });
    }

    Ok(placement)
}

/// Convert a top-left millimeter rectangle to bottom-left points `(x, y, w, h)`
fn to_pdf_rect(rect: &Rect, page_height: f32) -> (f32, f32, f32, f32) {
    (
        mm_to_pt(rect.x),
        mm_to_pt(page_height - rect.bottom()),
        mm_to_pt(rect.width),
        mm_to_pt(rect.height),
    )
}

/// Generate the content stream command that paints an image XObject.
///
/// Image space is the unit square; the matrix maps it onto `rect` (already
/// in rotated orientation) and turns it clockwise by `rotation`.
fn generate_image_command(name: &str, rect: &Rect, rotation: Rotation, page_height: f32) -> String {
    let (x, y, w, h) = to_pdf_rect(rect, page_height);

    let matrix = match rotation {
        Rotation::None => [w, 0.0, 0.0, h, x, y],
        Rotation::Clockwise90 => [0.0, -h, w, 0.0, x, y + h],
        Rotation::Clockwise180 => [-w, 0.0, 0.0, -h, x + w, y + h],
        Rotation::Clockwise270 => [0.0, h, -w, 0.0, x + w, y],
    };

    let [a, b, c, d, e, f] = matrix.map(num);
    format!("q {} {} {} {} {} {} cm /{} Do Q\n", a, b, c, d, e, f, name)
}

/// One line of text centered in `rect`, shortened to fit its width
fn centered_text(text: &str, rect: &Rect, font_size: f32, page_height: f32) -> String {
    let (x, y, w, h) = to_pdf_rect(rect, page_height);
    let max_width = (w - 2.0 * mm_to_pt(CELL_PADDING_MM)).max(0.0);

    let encoded = fit_text(text, max_width, font_size);
    if encoded.is_empty() {
        return String::new();
    }

    let text_x = x + (w - text_width(&encoded, font_size)) / 2.0;
    let text_y = y + (h - font_size * HELVETICA_CAP_HEIGHT) / 2.0;

    format!(
        "BT /{} {} Tf {} {} Td ({}) Tj ET\n",
        FONT_RESOURCE,
        num(font_size),
        num(text_x),
        num(text_y),
        escape_pdf_string(&encoded)
    )
}

/// Operands for `rg`/`RG`
fn color_operands(color: Rgb) -> String {
    let (r, g, b) = color.components();
    format!("{:.4} {:.4} {:.4}", r, g, b)
}

/// Fixed-precision number for content streams
fn num(value: f32) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    // Avoid "-0"
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{}", rounded)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::plan;
    use crate::types::{Band, ImageId, LayoutMode};
    use image::DynamicImage;

    fn items(count: usize) -> Vec<ImageItem> {
        (0..count)
            .map(|i| {
                ImageItem::new(
                    ImageId(i as u64),
                    DynamicImage::new_rgb8(8, 4),
                    format!("photo-{}.png", i),
                )
            })
            .collect()
    }

    fn render_first(config: &DocumentConfig, images: &[ImageItem]) -> RenderedPage {
        let geometry = config.geometry().unwrap();
        let plans = plan(images, config.layout, &geometry.content).unwrap();
        render_page(&plans[0], config, &geometry, plans.len()).unwrap()
    }

    fn content_string(page: &RenderedPage) -> String {
        String::from_utf8(page.content.clone()).unwrap()
    }

    #[test]
    fn test_image_matrices() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        let page_height = 100.0;
        let (x, y, w, h) = to_pdf_rect(&rect, page_height);
        assert!((y - mm_to_pt(40.0)).abs() < 1e-3);

        let upright = generate_image_command("Im0", &rect, Rotation::None, page_height);
        assert_eq!(
            upright,
            format!("q {} 0 0 {} {} {} cm /Im0 Do Q\n", num(w), num(h), num(x), num(y))
        );

        let half = generate_image_command("Im0", &rect, Rotation::Clockwise180, page_height);
        assert!(half.starts_with(&format!("q {} 0 0 {} ", num(-w), num(-h))));

        let quarter = generate_image_command("Im0", &rect, Rotation::Clockwise90, page_height);
        assert!(quarter.starts_with(&format!("q 0 {} {} 0 ", num(-h), num(w))));
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(0.0), "0");
        assert_eq!(num(-0.0001), "0");
        assert_eq!(num(1.5), "1.5");
        assert_eq!(num(2.0), "2");
    }

    #[test]
    fn test_page_draws_background_images_and_borders() {
        let config = DocumentConfig {
            layout: LayoutMode::TwoUp,
            ..Default::default()
        };
        let images = items(2);
        let page = render_first(&config, &images);
        let content = content_string(&page);

        assert_eq!(page.images.len(), 2);
        assert!(content.starts_with("q 0.9412 0.9765 1.0000 rg"));
        assert!(content.contains("/Im0 Do"));
        assert!(content.contains("/Im1 Do"));
        assert_eq!(content.matches(" re S").count(), 2);
        assert!(!page.uses_font);
    }

    #[test]
    fn test_empty_cells_get_no_border() {
        let config = DocumentConfig {
            layout: LayoutMode::Grid2x2,
            ..Default::default()
        };
        let images = items(1);
        let page = render_first(&config, &images);

        assert_eq!(content_string(&page).matches(" re S").count(), 1);
    }

    #[test]
    fn test_borders_disabled() {
        let config = DocumentConfig {
            show_borders: false,
            ..Default::default()
        };
        let page = render_first(&config, &items(1));
        assert!(!content_string(&page).contains(" RG "));
    }

    #[test]
    fn test_captions_and_bands_use_font() {
        let config = DocumentConfig {
            show_captions: true,
            header: Band::shown("Sheet (draft)"),
            footer: Band::shown("Page {page} of {pages}"),
            ..Default::default()
        };
        let images = items(3);
        let page = render_first(&config, &images);
        let content = content_string(&page);

        assert!(page.uses_font);
        assert!(content.contains("(photo-0.png) Tj"));
        assert!(content.contains("(Sheet \\(draft\\)) Tj"));
        assert!(content.contains("(Page 1 of 3) Tj"));
    }

    #[test]
    fn test_disabled_band_not_drawn() {
        let config = DocumentConfig {
            footer: Band {
                enabled: false,
                text: "hidden".to_string(),
            },
            ..Default::default()
        };
        let page = render_first(&config, &items(1));
        assert!(!content_string(&page).contains("hidden"));
    }

    #[test]
    fn test_empty_bitmap_is_render_error() {
        let config = DocumentConfig::default();
        let images = vec![ImageItem::new(
            ImageId(42),
            DynamicImage::new_rgb8(0, 0),
            "broken.png",
        )];
        let geometry = config.geometry().unwrap();
        let plans = plan(&images, config.layout, &geometry.content).unwrap();

        let result = render_page(&plans[0], &config, &geometry, 1);
        assert!(matches!(
            result,
            Err(GenerateError::Render { image: ImageId(42), .. })
        ));
    }
}
