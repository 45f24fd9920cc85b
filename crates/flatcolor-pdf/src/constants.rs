//! Shared constants for document generation
//!
//! This module centralizes the fixed layout measurements, font sizes and
//! unit conversions used throughout the engine.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Page Bands
// =============================================================================

/// Height of the header band (mm)
pub const HEADER_BAND_MM: f32 = 12.0;

/// Height of the footer band (mm)
pub const FOOTER_BAND_MM: f32 = 12.0;

/// Font size for header and footer text (points)
pub const BAND_FONT_SIZE: f32 = 10.0;

// =============================================================================
// Cells
// =============================================================================

/// Gap between cells as a fraction of the content width
pub const GUTTER_FRACTION: f32 = 0.03;

/// Inner padding between a cell edge and its image (mm)
pub const CELL_PADDING_MM: f32 = 2.0;

/// Height reserved at the bottom of a cell for its caption (mm)
pub const CAPTION_BAND_MM: f32 = 6.0;

/// Font size for captions (points)
pub const CAPTION_FONT_SIZE: f32 = 8.0;

/// Stroke width for cell borders (points)
pub const BORDER_WIDTH: f32 = 0.75;

// =============================================================================
// Text
// =============================================================================

/// Resource name of the shared Helvetica font
pub const FONT_RESOURCE: &str = "F1";

/// Helvetica cap height as a fraction of the font size, for vertical centering
pub const HELVETICA_CAP_HEIGHT: f32 = 0.718;

/// Appended to text cut short to fit its box
pub const TRUNCATION_SUFFIX: &str = "...";

/// Placeholder for characters Helvetica/WinAnsi cannot show
pub const REPLACEMENT_CHAR: u8 = b'?';

// =============================================================================
// Document
// =============================================================================

/// Producer string written to the document info dictionary
pub const PRODUCER: &str = concat!("flatcolor-pdf ", env!("CARGO_PKG_VERSION"));
