//! PDF rendering modules
//!
//! This module handles everything that ends up inside a page:
//! - Two-tone reduction and packing of images
//! - Helvetica text encoding, measurement and truncation
//! - Content stream generation for one page

mod page;
pub mod text;
pub mod tone;

pub use page::*;
pub use tone::{FlatImage, flatten};
