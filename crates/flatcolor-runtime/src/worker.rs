use flatcolor_pdf::layout::page_count;
use flatcolor_pdf::{CancelToken, GenerateError, Stage, generate_async_with_progress};
use tokio::sync::mpsc;

use crate::{DocumentConfig, GenerateCommand, GenerateUpdate, ImageItem, RequestId};

/// A generation request waiting to run
struct Job {
    request_id: RequestId,
    images: Vec<ImageItem>,
    config: DocumentConfig,
}

/// Async worker task that processes generation commands and sends updates.
///
/// Only the newest request matters: queued requests that a newer
/// `Generate` supersedes are reported as cancelled without running, and a
/// running generation is cancelled as soon as a newer one arrives.
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<GenerateCommand>,
    update_tx: mpsc::UnboundedSender<GenerateUpdate>,
) {
    let mut next_job: Option<Job> = None;

    loop {
        let job = match next_job.take() {
            Some(job) => job,
            None => match command_rx.recv().await {
                Some(GenerateCommand::Generate {
                    request_id,
                    images,
                    config,
                }) => Job {
                    request_id,
                    images,
                    config,
                },
                Some(GenerateCommand::Cancel { request_id }) => {
                    log::debug!("Ignoring cancel for idle request {:?}", request_id);
                    continue;
                }
                None => break,
            },
        };

        // Drain any queued commands, keeping only the most recent request
        let Some(job) = drain_queue(job, &mut command_rx, &update_tx) else {
            continue;
        };

        let closed = run_job(job, &mut command_rx, &update_tx, &mut next_job).await;
        if closed && next_job.is_none() {
            break;
        }
    }

    log::debug!("Command channel closed, worker exiting");
}

fn drain_queue(
    job: Job,
    command_rx: &mut mpsc::UnboundedReceiver<GenerateCommand>,
    update_tx: &mpsc::UnboundedSender<GenerateUpdate>,
) -> Option<Job> {
    let mut current = Some(job);

    while let Ok(cmd) = command_rx.try_recv() {
        match cmd {
            GenerateCommand::Generate {
                request_id,
                images,
                config,
            } => {
                let newer = Job {
                    request_id,
                    images,
                    config,
                };
                if let Some(old) = current.replace(newer) {
                    log::debug!("Discarding queued generation, using newer request");
                    let _ = update_tx.send(GenerateUpdate::Cancelled {
                        request_id: old.request_id,
                    });
                }
            }
            GenerateCommand::Cancel { request_id } => {
                if current.as_ref().is_some_and(|job| job.request_id == request_id) {
                    current = None;
                    let _ = update_tx.send(GenerateUpdate::Cancelled { request_id });
                }
            }
        }
    }

    current
}

/// Run one job while still listening for commands.
///
/// Returns `true` when the command channel closed during the run.
async fn run_job(
    job: Job,
    command_rx: &mut mpsc::UnboundedReceiver<GenerateCommand>,
    update_tx: &mpsc::UnboundedSender<GenerateUpdate>,
    next_job: &mut Option<Job>,
) -> bool {
    let request_id = job.request_id;
    let pages = page_count(job.images.len(), job.config.layout);
    let token = CancelToken::new();

    let _ = update_tx.send(GenerateUpdate::Started { request_id });

    let progress_tx = update_tx.clone();
    let generation = generate_async_with_progress(
        job.images,
        job.config,
        token.clone(),
        move |stage| {
            if let Stage::Rendering { page, total } = stage {
                let _ = progress_tx.send(GenerateUpdate::Progress {
                    request_id,
                    current: page,
                    total,
                });
            }
        },
    );
    tokio::pin!(generation);

    let mut closed = false;
    let result = loop {
        tokio::select! {
            // Newer commands win over a result that is ready at the same time
            biased;
            cmd = command_rx.recv(), if !closed => match cmd {
                Some(GenerateCommand::Generate { request_id: newer_id, images, config }) => {
                    log::debug!("Request {:?} superseded by {:?}", request_id, newer_id);
                    token.cancel();
                    let newer = Job { request_id: newer_id, images, config };
                    if let Some(old) = next_job.replace(newer) {
                        let _ = update_tx.send(GenerateUpdate::Cancelled {
                            request_id: old.request_id,
                        });
                    }
                }
                Some(GenerateCommand::Cancel { request_id: cancel_id }) => {
                    if cancel_id == request_id {
                        token.cancel();
                    } else if next_job.as_ref().is_some_and(|job| job.request_id == cancel_id) {
                        *next_job = None;
                        let _ = update_tx.send(GenerateUpdate::Cancelled { request_id: cancel_id });
                    }
                }
                None => closed = true,
            },
            result = &mut generation => break result,
        }
    };

    let update = match result {
        // A finished document still counts as cancelled once superseded
        _ if token.is_cancelled() => GenerateUpdate::Cancelled { request_id },
        Ok(bytes) => GenerateUpdate::Completed {
            request_id,
            bytes,
            page_count: pages,
        },
        Err(GenerateError::Cancelled) => GenerateUpdate::Cancelled { request_id },
        Err(e) => GenerateUpdate::Failed {
            request_id,
            message: e.to_string(),
        },
    };
    let _ = update_tx.send(update);

    closed
}
