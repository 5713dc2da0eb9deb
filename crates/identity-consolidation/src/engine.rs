//! ConsolidationEngine: validates, runs the pipeline in a transaction, and
//! restarts the whole call when the store reports a conflict.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use identity_core::config::ConsolidationConfig;
use identity_core::constants::MAX_CONSOLIDATION_ATTEMPTS;
use identity_core::contact::ContactId;
use identity_core::errors::{IdentityError, IdentityResult, StorageError};
use identity_core::models::{ConsolidatedView, IdentifyRequest, IdentifyResponse};
use identity_core::traits::ITransactionalStore;
use identity_observability::tracing_setup::events;
use identity_observability::{consolidation_span, storage_span, ConsolidationCounters};
use tracing::info;

use crate::pipeline::{self, PipelineResult};

/// What a committed call did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsolidationOutcome {
    /// No match; a new primary was inserted.
    CreatedPrimary,
    /// One existing cluster gained a secondary carrying a new fact.
    CreatedSecondary,
    /// At least one record was promoted, demoted or re-parented.
    Merged,
    /// Everything in the request was already known.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidationReport {
    pub view: ConsolidatedView,
    pub outcome: ConsolidationOutcome,
    pub secondary_created: bool,
    /// Former primaries now linked to `view.primary_contact_id`.
    pub demoted: Vec<ContactId>,
    pub reparented: usize,
    /// Set when the integrity fallback promoted a secondary.
    pub promoted: Option<ContactId>,
    pub attempts: u32,
}

impl ConsolidationReport {
    fn from_pipeline(result: PipelineResult, attempts: u32) -> Self {
        let outcome = if result.primary_created {
            ConsolidationOutcome::CreatedPrimary
        } else if result.promoted.is_some() || !result.demoted.is_empty() || result.reparented > 0 {
            ConsolidationOutcome::Merged
        } else if result.secondary_created {
            ConsolidationOutcome::CreatedSecondary
        } else {
            ConsolidationOutcome::Unchanged
        };
        Self {
            view: result.view,
            outcome,
            secondary_created: result.secondary_created,
            demoted: result.demoted,
            reparented: result.reparented,
            promoted: result.promoted,
            attempts,
        }
    }
}

/// The consolidation engine.
///
/// Shareable across threads; each call opens its own store transaction, so
/// concurrent calls serialize at the store's write lock.
pub struct ConsolidationEngine {
    store: Arc<dyn ITransactionalStore>,
    config: ConsolidationConfig,
    counters: Arc<ConsolidationCounters>,
}

impl ConsolidationEngine {
    pub fn new(store: Arc<dyn ITransactionalStore>) -> Self {
        Self::with_config(store, ConsolidationConfig::default())
    }

    pub fn with_config(store: Arc<dyn ITransactionalStore>, config: ConsolidationConfig) -> Self {
        Self {
            store,
            config,
            counters: Arc::new(ConsolidationCounters::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn ITransactionalStore> {
        &self.store
    }

    pub fn counters(&self) -> &Arc<ConsolidationCounters> {
        &self.counters
    }

    pub fn config(&self) -> &ConsolidationConfig {
        &self.config
    }

    /// Resolve the identity behind `email` and/or `phone_number`.
    /// Empty strings count as absent; at least one value is required.
    pub fn consolidate(
        &self,
        email: Option<&str>,
        phone_number: Option<&str>,
    ) -> IdentityResult<ConsolidatedView> {
        self.consolidate_with_report(email, phone_number)
            .map(|report| report.view)
    }

    /// Wire-level entry point.
    pub fn identify(&self, request: &IdentifyRequest) -> IdentityResult<IdentifyResponse> {
        self.consolidate(request.email(), request.phone_number())
            .map(IdentifyResponse::from)
    }

    pub fn consolidate_with_report(
        &self,
        email: Option<&str>,
        phone_number: Option<&str>,
    ) -> IdentityResult<ConsolidationReport> {
        let email = email.filter(|e| !e.is_empty());
        let phone_number = phone_number.filter(|p| !p.is_empty());
        if email.is_none() && phone_number.is_none() {
            return Err(IdentityError::validation(
                "either email or phoneNumber must be provided",
            ));
        }

        self.counters.record_call();
        let span = consolidation_span!(email, phone_number);
        let _guard = span.enter();

        let max_attempts = self.config.max_attempts.clamp(1, MAX_CONSOLIDATION_ATTEMPTS);
        let mut attempt = 0;
        loop {
            attempt += 1;
            span.record("attempt", attempt);

            match self.attempt(email, phone_number) {
                Ok(result) => {
                    let report = ConsolidationReport::from_pipeline(result, attempt);
                    self.record(&report);
                    return Ok(report);
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    events::retrying(attempt, max_attempts, &e);
                    self.counters.record_retry();
                    let backoff = self.config.retry_backoff_ms.saturating_mul(u64::from(attempt));
                    thread::sleep(Duration::from_millis(backoff));
                }
                Err(e) if e.is_retryable() => {
                    self.counters.record_failure();
                    return Err(StorageError::RetriesExhausted {
                        attempts: attempt,
                        last_error: e.to_string(),
                    }
                    .into());
                }
                Err(e) => {
                    self.counters.record_failure();
                    return Err(e);
                }
            }
        }
    }

    /// One transactional pass. Any error drops the transaction, which rolls back.
    fn attempt(
        &self,
        email: Option<&str>,
        phone_number: Option<&str>,
    ) -> IdentityResult<PipelineResult> {
        let _span = storage_span!("consolidate").entered();
        let tx = self.store.begin()?;
        let result = pipeline::run_pipeline(&*tx, email, phone_number)?;
        tx.commit()?;
        Ok(result)
    }

    fn record(&self, report: &ConsolidationReport) {
        match report.outcome {
            ConsolidationOutcome::CreatedPrimary => self.counters.record_primary_created(),
            _ if report.secondary_created => self.counters.record_secondary_created(),
            _ => {}
        }
        if report.promoted.is_some() {
            self.counters.record_integrity_fallback();
        }
        if !report.demoted.is_empty() || report.reparented > 0 {
            self.counters.record_merge(report.demoted.len(), report.reparented);
        }
        info!(
            primary_id = %report.view.primary_contact_id,
            outcome = ?report.outcome,
            cluster_size = report.view.cluster_size(),
            attempts = report.attempts,
            "consolidation complete"
        );
    }
}
