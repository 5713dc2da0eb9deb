//! Async wrapper: runs consolidation on tokio's blocking pool.

use std::sync::Arc;

use identity_core::errors::{IdentityError, IdentityResult, StorageError};
use identity_core::models::{ConsolidatedView, IdentifyRequest, IdentifyResponse};

use crate::engine::ConsolidationEngine;

/// Cheap to clone; every clone shares one engine.
///
/// Dropping a returned future does not cancel the call already handed to the
/// blocking pool. It still commits or rolls back as a whole.
#[derive(Clone)]
pub struct AsyncConsolidator {
    engine: Arc<ConsolidationEngine>,
}

impl AsyncConsolidator {
    pub fn new(engine: ConsolidationEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    pub fn from_shared(engine: Arc<ConsolidationEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<ConsolidationEngine> {
        &self.engine
    }

    pub async fn consolidate(
        &self,
        email: Option<String>,
        phone_number: Option<String>,
    ) -> IdentityResult<ConsolidatedView> {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || {
            engine.consolidate(email.as_deref(), phone_number.as_deref())
        })
        .await
        .map_err(join_error)?
    }

    pub async fn identify(&self, request: IdentifyRequest) -> IdentityResult<IdentifyResponse> {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || engine.identify(&request))
            .await
            .map_err(join_error)?
    }
}

fn join_error(err: tokio::task::JoinError) -> IdentityError {
    StorageError::Backend {
        message: format!("consolidation task failed: {err}"),
    }
    .into()
}
