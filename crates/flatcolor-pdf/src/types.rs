use image::{DynamicImage, GenericImageView};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("No images to lay out")]
    EmptyInput,
    #[error("Render error for image {image}: {reason}")]
    Render { image: ImageId, reason: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Generation cancelled")]
    Cancelled,
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, GenerateError>;

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Portrait: height > width (default for most paper sizes)
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Standard page sizes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PageSize {
    /// Get base dimensions (always portrait: width < height for standard sizes)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PageSize::A3 => (297.0, 420.0),
            PageSize::A4 => (210.0, 297.0),
            PageSize::A5 => (148.0, 210.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
            PageSize::Tabloid => (279.4, 431.8),
            PageSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PageSize::A3 => "A3",
            PageSize::A4 => "A4",
            PageSize::A5 => "A5",
            PageSize::Letter => "Letter",
            PageSize::Legal => "Legal",
            PageSize::Tabloid => "Tabloid",
            PageSize::Custom { .. } => "Custom",
        }
    }
}

impl FromStr for PageSize {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a3" => Ok(PageSize::A3),
            "a4" => Ok(PageSize::A4),
            "a5" => Ok(PageSize::A5),
            "letter" => Ok(PageSize::Letter),
            "legal" => Ok(PageSize::Legal),
            "tabloid" => Ok(PageSize::Tabloid),
            other => Err(GenerateError::Config(format!("Unknown page size: {}", other))),
        }
    }
}

/// Clockwise rotation applied to an image before it is fit into its cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// Accepts any multiple of 90, normalized into `0..360`.
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        match degrees.rem_euclid(360) {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Clockwise90),
            180 => Ok(Rotation::Clockwise180),
            270 => Ok(Rotation::Clockwise270),
            _ => Err(GenerateError::Config(format!(
                "Rotation must be a multiple of 90 degrees, got {}",
                degrees
            ))),
        }
    }

    /// The next quarter turn clockwise
    pub fn rotated_clockwise(self) -> Self {
        match self {
            Rotation::None => Rotation::Clockwise90,
            Rotation::Clockwise90 => Rotation::Clockwise180,
            Rotation::Clockwise180 => Rotation::Clockwise270,
            Rotation::Clockwise270 => Rotation::None,
        }
    }

    /// Quarter turns swap width and height
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Rotation::Clockwise90 | Rotation::Clockwise270)
    }

    /// Dimensions of a `width` x `height` bitmap after this rotation
    pub fn apply_to_dimensions(self, width: f32, height: f32) -> (f32, f32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the `#` is optional, digits are case-insensitive)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(GenerateError::Config(format!(
                "Invalid color '{}': expected #RRGGBB",
                hex
            )));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|e| GenerateError::Config(format!("Invalid color '{}': {}", hex, e)))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Components scaled to `0.0..=1.0` for PDF color operators
    pub fn components(&self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self> {
        Rgb::from_hex(s)
    }
}

/// The two colors a document may use.
///
/// `primary` is the ink: borders, text and the dark tone of every image.
/// `secondary` is the paper: page background and the light tone of every image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorScheme {
    pub primary: Rgb,
    pub secondary: Rgb,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            primary: Rgb::new(0x02, 0x84, 0xC7),
            secondary: Rgb::new(0xF0, 0xF9, 0xFF),
        }
    }
}

impl ColorScheme {
    pub const fn new(primary: Rgb, secondary: Rgb) -> Self {
        Self { primary, secondary }
    }

    /// Plain black on white
    pub const fn black_and_white() -> Self {
        Self::new(Rgb::BLACK, Rgb::WHITE)
    }

    /// Named presets offered to users picking a scheme
    pub fn presets() -> &'static [(&'static str, ColorScheme)] {
        const PRESETS: [(&str, ColorScheme); 6] = [
            (
                "Ocean",
                ColorScheme::new(Rgb::new(0x02, 0x84, 0xC7), Rgb::new(0xF0, 0xF9, 0xFF)),
            ),
            (
                "Forest",
                ColorScheme::new(Rgb::new(0x16, 0x65, 0x34), Rgb::new(0xF0, 0xFD, 0xF4)),
            ),
            (
                "Crimson",
                ColorScheme::new(Rgb::new(0xB9, 0x1C, 0x1C), Rgb::new(0xFE, 0xF2, 0xF2)),
            ),
            (
                "Amber",
                ColorScheme::new(Rgb::new(0xB4, 0x53, 0x09), Rgb::new(0xFF, 0xFB, 0xEB)),
            ),
            (
                "Slate",
                ColorScheme::new(Rgb::new(0x1E, 0x29, 0x3B), Rgb::new(0xF8, 0xFA, 0xFC)),
            ),
            ("Mono", ColorScheme::black_and_white()),
        ];
        &PRESETS
    }

    /// Look up a preset by name (case-insensitive)
    pub fn preset(name: &str) -> Option<ColorScheme> {
        Self::presets()
            .iter()
            .find(|(preset, _)| preset.eq_ignore_ascii_case(name.trim()))
            .map(|(_, scheme)| *scheme)
    }
}

/// Page margins, in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Margins {
    pub top_mm: f32,
    pub right_mm: f32,
    pub bottom_mm: f32,
    pub left_mm: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(15.0)
    }
}

impl Margins {
    /// Create uniform margins on all sides
    pub fn uniform(margin_mm: f32) -> Self {
        Self {
            top_mm: margin_mm,
            right_mm: margin_mm,
            bottom_mm: margin_mm,
            left_mm: margin_mm,
        }
    }
}

/// A header or footer band
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Band {
    pub enabled: bool,
    /// May contain `{page}` and `{pages}`, replaced per page
    pub text: String,
}

impl Band {
    pub fn shown(text: impl Into<String>) -> Self {
        Self {
            enabled: true,
            text: text.into(),
        }
    }

    pub fn hidden() -> Self {
        Self::default()
    }
}

/// Images-per-page arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutMode {
    /// One image per page
    #[default]
    Single,
    /// Two images stacked vertically
    TwoUp,
    /// 2 rows x 2 columns
    Grid2x2,
    /// 3 rows x 2 columns
    Grid3x2,
    /// 3 rows x 3 columns
    Grid3x3,
}

impl LayoutMode {
    pub const ALL: [LayoutMode; 5] = [
        LayoutMode::Single,
        LayoutMode::TwoUp,
        LayoutMode::Grid2x2,
        LayoutMode::Grid3x2,
        LayoutMode::Grid3x3,
    ];

    /// Fixed grid template as (rows, columns)
    pub fn grid_dimensions(self) -> (usize, usize) {
        match self {
            LayoutMode::Single => (1, 1),
            LayoutMode::TwoUp => (2, 1),
            LayoutMode::Grid2x2 => (2, 2),
            LayoutMode::Grid3x2 => (3, 2),
            LayoutMode::Grid3x3 => (3, 3),
        }
    }

    pub fn cells_per_page(self) -> usize {
        let (rows, cols) = self.grid_dimensions();
        rows * cols
    }

    pub fn name(&self) -> &'static str {
        match self {
            LayoutMode::Single => "single",
            LayoutMode::TwoUp => "2-up",
            LayoutMode::Grid2x2 => "grid-4",
            LayoutMode::Grid3x2 => "grid-6",
            LayoutMode::Grid3x3 => "grid-9",
        }
    }
}

impl FromStr for LayoutMode {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "1-up" => Ok(LayoutMode::Single),
            "2-up" | "two-up" | "double" => Ok(LayoutMode::TwoUp),
            "grid-4" | "2x2" | "grid" => Ok(LayoutMode::Grid2x2),
            "grid-6" | "3x2" => Ok(LayoutMode::Grid3x2),
            "grid-9" | "3x3" => Ok(LayoutMode::Grid3x3),
            other => Err(GenerateError::Config(format!("Unknown layout: {}", other))),
        }
    }
}

/// How raster pixels are reduced to the two document colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ToneMode {
    /// Global threshold chosen per image with Otsu's method
    #[default]
    Auto,
    /// Pixels with luminance below the value become ink
    Threshold(u8),
    /// Floyd-Steinberg error diffusion
    Dither,
}

/// Caller-assigned image identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A decoded image and the metadata needed to place it
#[derive(Debug, Clone)]
pub struct ImageItem {
    pub id: ImageId,
    pub bitmap: Arc<DynamicImage>,
    pub display_name: String,
    pub rotation: Rotation,
}

impl ImageItem {
    pub fn new(id: ImageId, bitmap: DynamicImage, display_name: impl Into<String>) -> Self {
        Self {
            id,
            bitmap: Arc::new(bitmap),
            display_name: display_name.into(),
            rotation: Rotation::None,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Bitmap dimensions in pixels, before rotation
    pub fn pixel_dimensions(&self) -> (u32, u32) {
        self.bitmap.dimensions()
    }
}
