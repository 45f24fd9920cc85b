//! Grid layout calculation
//!
//! This module handles the geometric layout of the cell grid inside the
//! content rectangle.

use crate::constants::GUTTER_FRACTION;
use crate::types::{GenerateError, LayoutMode, Result};

use super::{GridLayout, GridPosition, Rect, calculate_frame};

// =============================================================================
// Grid Creation
// =============================================================================

/// Create a grid layout for the given layout mode.
///
/// The gutter is a fixed fraction of the content width and is used between
/// rows and between columns, so that cells plus gutters exactly fill
/// `content`.
pub fn create_grid_layout(mode: LayoutMode, content: &Rect) -> Result<GridLayout> {
    let (rows, cols) = mode.grid_dimensions();

    let gutter = content.width * GUTTER_FRACTION;
    let cell_width = (content.width - (cols - 1) as f32 * gutter) / cols as f32;
    let cell_height = (content.height - (rows - 1) as f32 * gutter) / rows as f32;

    if cell_width <= 0.0 || cell_height <= 0.0 {
        return Err(GenerateError::InvalidGeometry(format!(
            "Content area {:.1} x {:.1} mm is too small for a {}x{} grid",
            content.width, content.height, rows, cols
        )));
    }

    Ok(GridLayout {
        rows,
        cols,
        cell_width,
        cell_height,
        gutter,
        bounds: *content,
    })
}

/// Check that a cell still has room for an image once the padding and,
/// when captions are shown, the caption band are taken out.
pub fn check_frame(grid: &GridLayout, show_captions: bool) -> Result<()> {
    let cell = Rect::new(0.0, 0.0, grid.cell_width, grid.cell_height);
    let (frame, _) = calculate_frame(&cell, show_captions);

    if frame.is_empty() {
        return Err(GenerateError::InvalidGeometry(format!(
            "Cells of {:.1} x {:.1} mm leave no room for an image",
            grid.cell_width, grid.cell_height
        )));
    }

    Ok(())
}

// =============================================================================
// Cell Calculations
// =============================================================================

/// Calculate the bounds of a cell at the given grid position.
pub fn cell_bounds(grid: &GridLayout, pos: GridPosition) -> Rect {
    let cell_x = grid.bounds.x + pos.col as f32 * (grid.cell_width + grid.gutter);
    let cell_y = grid.bounds.y + pos.row as f32 * (grid.cell_height + grid.gutter);

    Rect::new(cell_x, cell_y, grid.cell_width, grid.cell_height)
}

/// All cells of the grid in reading order (row-major from the top-left)
pub fn cell_rects(grid: &GridLayout) -> Vec<Rect> {
    (0..grid.rows)
        .flat_map(|row| (0..grid.cols).map(move |col| GridPosition::new(row, col)))
        .map(|pos| cell_bounds(grid, pos))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_single_grid_fills_content() {
        let content = Rect::new(15.0, 15.0, 180.0, 267.0);
        let grid = create_grid_layout(LayoutMode::Single, &content).unwrap();

        assert_eq!(grid.rows, 1);
        assert_eq!(grid.cols, 1);
        assert_eq!(cell_rects(&grid), vec![content]);
    }

    #[test]
    fn test_two_up_stacks_vertically() {
        let content = Rect::new(15.0, 15.0, 180.0, 267.0);
        let grid = create_grid_layout(LayoutMode::TwoUp, &content).unwrap();
        let cells = cell_rects(&grid);

        assert_eq!(cells.len(), 2);
        assert!(approx(grid.gutter, 180.0 * GUTTER_FRACTION));
        assert!(approx(cells[0].width, 180.0));
        assert!(approx(cells[0].y, 15.0));
        assert!(approx(cells[1].y, cells[0].bottom() + grid.gutter));
        assert!(approx(cells[1].bottom(), content.bottom()));
    }

    #[test]
    fn test_grid_cells_and_gutters_fill_content() {
        let content = Rect::new(10.0, 20.0, 190.0, 250.0);

        for mode in LayoutMode::ALL {
            let grid = create_grid_layout(mode, &content).unwrap();
            let (rows, cols) = mode.grid_dimensions();

            let total_width = cols as f32 * grid.cell_width + (cols - 1) as f32 * grid.gutter;
            let total_height = rows as f32 * grid.cell_height + (rows - 1) as f32 * grid.gutter;
            assert!(approx(total_width, content.width), "{:?}", mode);
            assert!(approx(total_height, content.height), "{:?}", mode);

            let cells = cell_rects(&grid);
            assert_eq!(cells.len(), mode.cells_per_page());
            let last = cells.last().unwrap();
            assert!(approx(last.right(), content.right()));
            assert!(approx(last.bottom(), content.bottom()));
            assert!(cells.iter().all(|cell| content.contains(cell)));
        }
    }

    #[test]
    fn test_cell_bounds_row_major() {
        let content = Rect::new(0.0, 0.0, 100.0, 100.0);
        let grid = create_grid_layout(LayoutMode::Grid2x2, &content).unwrap();

        // 3% gutter of 100mm = 3mm, cells 48.5mm
        let top_right = cell_bounds(&grid, GridPosition::new(0, 1));
        assert!(approx(top_right.x, 51.5));
        assert!(approx(top_right.y, 0.0));

        let bottom_left = cell_bounds(&grid, GridPosition::new(1, 0));
        assert!(approx(bottom_left.x, 0.0));
        assert!(approx(bottom_left.y, 51.5));

        let cells = cell_rects(&grid);
        assert_eq!(cells[1], top_right);
        assert_eq!(cells[2], bottom_left);
    }

    #[test]
    fn test_too_short_content_fails() {
        // 100mm wide gives a 3mm gutter; two gutters exceed a 5mm tall area
        let content = Rect::new(0.0, 0.0, 100.0, 5.0);
        let result = create_grid_layout(LayoutMode::Grid3x3, &content);
        assert!(matches!(result, Err(GenerateError::InvalidGeometry(_))));
    }

    #[test]
    fn test_cells_without_room_for_image_fail() {
        // A4 with 140mm top and bottom margins leaves a 180 x 17mm content area
        let content = Rect::new(15.0, 140.0, 180.0, 17.0);
        let grid = create_grid_layout(LayoutMode::Grid3x3, &content).unwrap();
        assert!(grid.cell_height > 0.0);

        let result = check_frame(&grid, false);
        assert!(matches!(result, Err(GenerateError::InvalidGeometry(_))));
    }

    #[test]
    fn test_caption_band_counts_against_frame() {
        // 10mm tall cells fit an image without captions but not with them
        let content = Rect::new(0.0, 0.0, 100.0, 10.0);
        let grid = create_grid_layout(LayoutMode::Single, &content).unwrap();

        assert!(check_frame(&grid, false).is_ok());
        assert!(matches!(
            check_frame(&grid, true),
            Err(GenerateError::InvalidGeometry(_))
        ));
    }
}
