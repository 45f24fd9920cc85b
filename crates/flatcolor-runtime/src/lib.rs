mod worker;

// Re-export types from the engine crate
pub use flatcolor_pdf::{CancelToken, DocumentConfig, ImageItem};
pub use worker::worker_task;

/// Caller-chosen identifier tying updates to the request that caused them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

/// Commands sent from the caller to the worker
#[derive(Debug)]
pub enum GenerateCommand {
    /// Generate a document. Supersedes any generation still queued or running.
    Generate {
        request_id: RequestId,
        images: Vec<ImageItem>,
        config: DocumentConfig,
    },
    /// Abandon a queued or running generation
    Cancel { request_id: RequestId },
}

/// Updates sent from the worker back to the caller
#[derive(Debug, Clone)]
pub enum GenerateUpdate {
    Started {
        request_id: RequestId,
    },
    Progress {
        request_id: RequestId,
        current: usize,
        total: usize,
    },
    Completed {
        request_id: RequestId,
        bytes: Vec<u8>,
        page_count: usize,
    },
    Cancelled {
        request_id: RequestId,
    },
    Failed {
        request_id: RequestId,
        message: String,
    },
}

impl GenerateUpdate {
    pub fn request_id(&self) -> RequestId {
        match self {
            GenerateUpdate::Started { request_id }
            | GenerateUpdate::Progress { request_id, .. }
            | GenerateUpdate::Completed { request_id, .. }
            | GenerateUpdate::Cancelled { request_id }
            | GenerateUpdate::Failed { request_id, .. } => *request_id,
        }
    }
}
