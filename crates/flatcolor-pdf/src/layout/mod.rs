//! Layout calculation modules
//!
//! This module handles all the geometric calculations for pagination:
//! - Grid layout (cell dimensions and gutters)
//! - Pagination (which images land on which page)
//! - Image placement (padding, captions, rotation, fit scaling)

mod grid;
mod placement;
mod types;

pub use grid::*;
pub use placement::*;
pub use types::*;

use crate::types::{GenerateError, ImageItem, LayoutMode, Result};

/// Number of pages needed for `image_count` images
pub fn page_count(image_count: usize, mode: LayoutMode) -> usize {
    image_count.div_ceil(mode.cells_per_page())
}

/// Split images into per-page plans.
///
/// Every plan carries the full cell template; the last plan holds the
/// remaining images and leaves its trailing cells empty. Input order is
/// preserved.
pub fn plan<'a>(
    images: &'a [ImageItem],
    mode: LayoutMode,
    content: &Rect,
) -> Result<Vec<PagePlan<'a>>> {
    if images.is_empty() {
        return Err(GenerateError::EmptyInput);
    }

    let grid = create_grid_layout(mode, content)?;
    let cells = cell_rects(&grid);

    let plans = images
        .chunks(grid.cell_count())
        .enumerate()
        .map(|(page_index, chunk)| PagePlan {
            page_index,
            cells: cells.clone(),
            images: chunk.iter().collect(),
        })
        .collect();

    Ok(plans)
}
