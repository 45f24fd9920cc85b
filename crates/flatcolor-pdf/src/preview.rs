use crate::generate::{CancelToken, generate_async};
use crate::options::DocumentConfig;
use crate::types::*;

/// Generate a preview of the document
/// Returns a PDF holding at most `max_pages` pages
pub async fn generate_preview(
    images: &[ImageItem],
    config: &DocumentConfig,
    max_pages: usize,
) -> Result<Vec<u8>> {
    if max_pages == 0 {
        return Err(GenerateError::Config(
            "Preview needs at least one page".to_string(),
        ));
    }

    // Only the images that land on the first pages are rendered
    let image_limit = max_pages.saturating_mul(config.layout.cells_per_page());
    let preview_images: Vec<ImageItem> = images.iter().take(image_limit).cloned().collect();

    generate_async(preview_images, config.clone(), CancelToken::new()).await
}
