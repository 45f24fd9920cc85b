//! File I/O around the engine

use std::path::Path;

use chrono::NaiveDate;

use crate::types::*;

/// Load and decode a single image file.
///
/// The display name is the file name without its directory.
pub async fn load_image(path: impl AsRef<Path>, id: ImageId) -> Result<ImageItem> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    let bitmap = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await??;

    let display_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    log::debug!(
        "Loaded {} ({}x{})",
        display_name,
        bitmap.width(),
        bitmap.height()
    );

    Ok(ImageItem::new(id, bitmap, display_name))
}

/// Load multiple images, numbering them in order from zero
pub async fn load_images(paths: &[impl AsRef<Path>]) -> Result<Vec<ImageItem>> {
    let mut images = Vec::with_capacity(paths.len());
    for (index, path) in paths.iter().enumerate() {
        images.push(load_image(path, ImageId(index as u64)).await?);
    }
    Ok(images)
}

/// Save generated PDF bytes
pub async fn save_pdf(bytes: &[u8], path: impl AsRef<Path>) -> Result<()> {
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// File name for a generated document.
///
/// A non-blank custom name gets `.pdf` appended; otherwise the name is
/// dated, e.g. `flatcolor-pdf-2024-03-09.pdf`.
pub fn output_filename(custom: Option<&str>, date: NaiveDate) -> String {
    match custom.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => format!("{}.pdf", name),
        None => format!("flatcolor-pdf-{}.pdf", date.format("%Y-%m-%d")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_dated_filename() {
        assert_eq!(output_filename(None, date()), "flatcolor-pdf-2024-03-09.pdf");
        assert_eq!(
            output_filename(Some("   "), date()),
            "flatcolor-pdf-2024-03-09.pdf"
        );
    }

    #[test]
    fn test_custom_filename_trimmed() {
        assert_eq!(output_filename(Some("  holiday "), date()), "holiday.pdf");
    }

    #[tokio::test]
    async fn test_load_image_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        image::RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let item = load_image(&path, ImageId(5)).await.unwrap();
        assert_eq!(item.id, ImageId(5));
        assert_eq!(item.display_name, "dot.png");
        assert_eq!(item.pixel_dimensions(), (3, 2));
    }

    #[tokio::test]
    async fn test_load_image_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"not an image").unwrap();

        let result = load_image(&path, ImageId(0)).await;
        assert!(matches!(result, Err(GenerateError::Image(_))));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = load_image("/definitely/not/here.png", ImageId(0)).await;
        assert!(matches!(result, Err(GenerateError::Io(_))));
    }
}
