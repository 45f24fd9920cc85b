//! Document generation
//!
//! This module orchestrates the pipeline:
//! 1. Validate the configuration and resolve page geometry
//! 2. Split the images into per-page plans
//! 3. Render every page (in parallel)
//! 4. Assemble the pages into one PDF

mod assemble;
mod cancel;
pub mod io;

pub use assemble::assemble;
pub use cancel::CancelToken;

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::layout::plan;
use crate::options::DocumentConfig;
use crate::render::text::strip_tokens;
use crate::render::{RenderedPage, render_page};
use crate::types::*;

/// Where a generation currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Resolving,
    Planning,
    /// `page` pages of `total` finished
    Rendering { page: usize, total: usize },
    Assembling,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Idle => write!(f, "idle"),
            Stage::Resolving => write!(f, "resolving geometry"),
            Stage::Planning => write!(f, "planning pages"),
            Stage::Rendering { page, total } => write!(f, "rendering {}/{}", page, total),
            Stage::Assembling => write!(f, "assembling"),
            Stage::Done => write!(f, "done"),
            Stage::Failed => write!(f, "failed"),
        }
    }
}

/// Generate a PDF from images and a configuration snapshot.
pub fn generate(images: &[ImageItem], config: &DocumentConfig) -> Result<Vec<u8>> {
    generate_with_cancel(images, config, &CancelToken::new())
}

/// Like [`generate`], giving up with `Cancelled` once `token` fires.
///
/// The token is checked before each page render and before assembly; a
/// cancelled run never returns bytes.
pub fn generate_with_cancel(
    images: &[ImageItem],
    config: &DocumentConfig,
    token: &CancelToken,
) -> Result<Vec<u8>> {
    generate_with_progress(images, config, token, &|_| {})
}

/// Like [`generate_with_cancel`], reporting each stage transition.
///
/// `on_stage` may be called from rayon worker threads while pages render.
pub fn generate_with_progress(
    images: &[ImageItem],
    config: &DocumentConfig,
    token: &CancelToken,
    on_stage: &(dyn Fn(Stage) + Sync),
) -> Result<Vec<u8>> {
    let enter = |stage: Stage| {
        log::debug!("Generation stage: {}", stage);
        on_stage(stage);
    };

    let result = run_pipeline(images, config, token, &enter);
    match &result {
        Ok(bytes) => {
            enter(Stage::Done);
            log::info!(
                "Generated {} byte PDF from {} images",
                bytes.len(),
                images.len()
            );
        }
        Err(GenerateError::Cancelled) => {
            enter(Stage::Failed);
            log::info!("Generation cancelled");
        }
        Err(e) => {
            enter(Stage::Failed);
            log::warn!("Generation failed: {}", e);
        }
    }
    result
}

fn run_pipeline(
    images: &[ImageItem],
    config: &DocumentConfig,
    token: &CancelToken,
    enter: &(dyn Fn(Stage) + Sync),
) -> Result<Vec<u8>> {
    enter(Stage::Resolving);
    config.validate()?;
    let geometry = config.geometry()?;

    enter(Stage::Planning);
    let plans = plan(images, config.layout, &geometry.content)?;
    let total = plans.len();

    enter(Stage::Rendering { page: 0, total });
    let finished = AtomicUsize::new(0);
    let pages = plans
        .par_iter()
        .map(|page_plan| {
            token.check()?;
            let page = render_page(page_plan, config, &geometry, total)?;
            let page_number = finished.fetch_add(1, Ordering::SeqCst) + 1;
            enter(Stage::Rendering {
                page: page_number,
                total,
            });
            Ok(page)
        })
        .collect::<Result<Vec<RenderedPage>>>()?;

    token.check()?;
    enter(Stage::Assembling);
    let title = config
        .header
        .enabled
        .then(|| strip_tokens(&config.header.text))
        .filter(|title| !title.is_empty());
    assemble(pages, &config.colors, title.as_deref())
}

/// Run [`generate_with_cancel`] on the blocking thread pool.
pub async fn generate_async(
    images: Vec<ImageItem>,
    config: DocumentConfig,
    token: CancelToken,
) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || generate_with_cancel(&images, &config, &token)).await?
}

/// Run [`generate_with_progress`] on the blocking thread pool.
pub async fn generate_async_with_progress<F>(
    images: Vec<ImageItem>,
    config: DocumentConfig,
    token: CancelToken,
    on_stage: F,
) -> Result<Vec<u8>>
where
    F: Fn(Stage) + Send + Sync + 'static,
{
    tokio::task::spawn_blocking(move || {
        generate_with_progress(&images, &config, &token, &on_stage)
    })
    .await?
}
