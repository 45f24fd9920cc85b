//! Layout data types
//!
//! These types carry the intermediate results between geometry resolution
//! and page rendering. Rectangles are in millimeters with the origin at the
//! top-left corner of the page and y growing downward.

use crate::types::{ImageItem, Rotation};

/// A rectangular area in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (top edge)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge y coordinate
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center x coordinate
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Center y coordinate
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Shrink by `amount` on every side, never past zero size
    pub fn inset(&self, amount: f32) -> Rect {
        let dx = amount.min(self.width / 2.0);
        let dy = amount.min(self.height / 2.0);
        Rect::new(
            self.x + dx,
            self.y + dy,
            self.width - 2.0 * dx,
            self.height - 2.0 * dy,
        )
    }

    /// Whether `other` lies inside this rectangle (with a small tolerance)
    pub fn contains(&self, other: &Rect) -> bool {
        const EPSILON: f32 = 1e-3;
        other.x >= self.x - EPSILON
            && other.y >= self.y - EPSILON
            && other.right() <= self.right() + EPSILON
            && other.bottom() <= self.bottom() + EPSILON
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Position within the grid (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    /// Row index (0 = top row)
    pub row: usize,
    /// Column index (0 = leftmost column)
    pub col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Cell template for one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Number of rows in the grid
    pub rows: usize,
    /// Number of columns in the grid
    pub cols: usize,
    /// Width of each cell in mm
    pub cell_width: f32,
    /// Height of each cell in mm
    pub cell_height: f32,
    /// Gap between neighbouring cells in mm
    pub gutter: f32,
    /// The content rectangle the grid tiles
    pub bounds: Rect,
}

impl GridLayout {
    /// Total number of cells in the grid
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }
}

/// Cells and images for one output page
#[derive(Debug, Clone)]
pub struct PagePlan<'a> {
    pub page_index: usize,
    /// Every cell of the template, row-major from the top-left
    pub cells: Vec<Rect>,
    /// Images in input order; may be shorter than `cells` on the last page
    pub images: Vec<&'a ImageItem>,
}

impl PagePlan<'_> {
    pub fn empty_cells(&self) -> usize {
        self.cells.len() - self.images.len()
    }
}

/// Final position of one image inside its cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    /// The cell the image was assigned to
    pub cell: Rect,
    /// Area the image was fit into (cell minus padding and caption band)
    pub frame: Rect,
    /// The fitted image rectangle, already in rotated orientation
    pub image_rect: Rect,
    /// Caption band, when captions are shown
    pub caption_rect: Option<Rect>,
    pub rotation: Rotation,
    /// Millimeters per (rotated) source pixel
    pub scale: f32,
}
