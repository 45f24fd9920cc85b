use crate::layout::{check_frame, create_grid_layout, page_count};
use crate::options::DocumentConfig;
use crate::types::*;

/// Pagination figures for a set of images, computed without rendering
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStatistics {
    pub images: usize,
    pub pages: usize,
    pub cells_per_page: usize,
    /// Unused cells on the last page
    pub empty_cells: usize,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub cell_width_mm: f32,
    pub cell_height_mm: f32,
}

/// Calculate statistics for laying out `image_count` images
pub fn calculate_statistics(
    image_count: usize,
    config: &DocumentConfig,
) -> Result<LayoutStatistics> {
    if image_count == 0 {
        return Err(GenerateError::EmptyInput);
    }

    let geometry = config.geometry()?;
    let grid = create_grid_layout(config.layout, &geometry.content)?;
    check_frame(&grid, config.show_captions)?;

    let cells_per_page = grid.cell_count();
    let pages = page_count(image_count, config.layout);
    let empty_cells = pages * cells_per_page - image_count;

    Ok(LayoutStatistics {
        images: image_count,
        pages,
        cells_per_page,
        empty_cells,
        page_width_mm: geometry.page_width,
        page_height_mm: geometry.page_height,
        cell_width_mm: grid.cell_width,
        cell_height_mm: grid.cell_height,
    })
}
