pub mod constants;
pub mod generate;
pub mod geometry;
pub mod layout;
mod options;
mod preview;
pub mod render;
mod stats;
mod types;

pub use generate::io::{load_image, load_images, output_filename, save_pdf};
pub use generate::{
    CancelToken, Stage, generate, generate_async, generate_async_with_progress,
    generate_with_cancel, generate_with_progress,
};
pub use generate::io;
pub use geometry::{PageGeometry, resolve};
pub use options::*;
pub use preview::generate_preview;
pub use stats::{LayoutStatistics, calculate_statistics};
pub use types::*;
