//! Shared server state

use std::collections::HashMap;
use std::sync::Arc;

use recall_core::session::FeedbackFailure;
use recall_core::{AiReviewPipeline, ReviewSessionManager, Storage};
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

/// A server-held interactive review session
///
/// The failure receiver is drained into responses so clients learn about
/// schedule writes that did not land.
pub struct SessionEntry {
    pub manager: ReviewSessionManager,
    pub failures: mpsc::UnboundedReceiver<FeedbackFailure>,
}

/// Shared application state for the HTTP API
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub pipeline: Arc<AiReviewPipeline>,
    /// In-memory registry of interactive review sessions, keyed by handle
    pub sessions: Arc<Mutex<HashMap<Uuid, SessionEntry>>>,
}

impl AppState {
    pub fn new(storage: Arc<Storage>, pipeline: Arc<AiReviewPipeline>) -> Self {
        Self {
            storage,
            pipeline,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}
