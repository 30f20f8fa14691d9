//! Reconciliation engine
//!
//! Runs one descriptor through validate, plan, existence guard, execute and
//! interpret. Each call is independent: the engine keeps no state between
//! reconciliations and issues at most two requests (guard listing, then the
//! planned request).

use crate::descriptor::{DesiredState, ResourceDescriptor};
use crate::error::{DuplicateResourceError, ReconcileError, RemoteOperationError, ValidationError};
use crate::guard;
use crate::plan::{ExistenceCheck, RequestPlan, plan};
use crate::validate::validate;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use trafficjam_client::{ApiResponse, HttpMethod, Payload, Requester};

/// Whether a status code means the operation succeeded (200 through 299)
pub fn is_success(status_code: u16) -> bool {
    (200..=299).contains(&status_code)
}

/// Result of one reconciliation, as reported to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationOutcome {
    /// The remote resource was (or would have been) modified
    pub changed: bool,
    pub failed: bool,
    /// Status of the last request; `None` when nothing was sent
    pub status_code: Option<u16>,
    /// Decoded response body, or the existing entry on a duplicate
    pub response: Option<Value>,
    /// Why the run failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl ReconciliationOutcome {
    /// Rejected before any request. `changed` is set so the failure gets surfaced.
    pub fn validation_failed(err: &ValidationError) -> Self {
        Self {
            changed: true,
            failed: true,
            status_code: None,
            response: None,
            msg: Some(err.to_string()),
        }
    }

    /// Creation skipped because the resource already exists
    ///
    /// Carries the listing's status and the matching entry.
    pub fn duplicate(err: &DuplicateResourceError, listing_status: u16, existing: Value) -> Self {
        Self {
            changed: true,
            failed: true,
            status_code: Some(listing_status),
            response: Some(existing),
            msg: Some(err.to_string()),
        }
    }

    /// Interpret the planned request's response
    pub fn from_response(state: DesiredState, plan: &RequestPlan, result: ApiResponse) -> Self {
        let ok = is_success(result.status_code);
        let msg = (!ok).then(|| {
            RemoteOperationError {
                method: plan.method,
                url: plan.url.clone(),
                status_code: result.status_code,
            }
            .to_string()
        });

        Self {
            changed: ok && state != DesiredState::Query,
            failed: !ok,
            status_code: Some(result.status_code),
            response: result.response,
            msg,
        }
    }
}

/// Reconciler drives one descriptor against a TrafficJam instance
pub struct Reconciler {
    requester: Box<dyn Requester>,
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Create a reconciler over any transport
    pub fn new(requester: impl Requester + 'static) -> Self {
        Self {
            requester: Box::new(requester),
        }
    }

    /// Reconcile one descriptor
    ///
    /// Validation, duplicate and non-2xx outcomes are `Ok` with `failed` set.
    /// `Err` means no status could be obtained or the descriptor could not be planned.
    pub async fn reconcile(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> Result<ReconciliationOutcome, ReconcileError> {
        info!(
            "Reconciling {} (state: {}, subinterface: {})",
            descriptor.kind, descriptor.desired_state, descriptor.subinterface
        );

        if descriptor.subinterface && !descriptor.targets_subinterface() {
            warn!(
                "{} has no subinterfaces, ignoring subinterface flag",
                descriptor.kind
            );
        }

        if let Err(e) = validate(descriptor) {
            warn!("Rejected {} descriptor: {}", descriptor.kind, e);
            return Ok(ReconciliationOutcome::validation_failed(&e));
        }

        let plan = plan(descriptor)?;
        debug!(
            "Planned {} {} with payload keys {:?}",
            plan.method,
            plan.url,
            plan.payload_keys()
        );

        let timeout = descriptor.connection.timeout();

        if let Some(check) = &plan.existence_check {
            if let Some(outcome) = self.guard(check, timeout).await? {
                return Ok(outcome);
            }
        }

        let result = self.send(plan.method, &plan.url, plan.payload.as_ref(), timeout).await?;
        let outcome = ReconciliationOutcome::from_response(descriptor.desired_state, &plan, result);

        if outcome.failed {
            warn!(
                "{} {} failed with status {:?}",
                plan.method, plan.url, outcome.status_code
            );
        } else {
            info!(
                "Reconciled {} (changed: {}, status: {:?})",
                descriptor.kind, outcome.changed, outcome.status_code
            );
        }

        Ok(outcome)
    }

    /// List the target collection; a failed outcome if the entry is already there
    async fn guard(
        &self,
        check: &ExistenceCheck,
        timeout: Duration,
    ) -> Result<Option<ReconciliationOutcome>, ReconcileError> {
        let listing = self.send(HttpMethod::Get, &check.url, None, timeout).await?;

        if !is_success(listing.status_code) {
            // Nothing usable to compare against; let the POST decide
            debug!(
                "Listing {} returned {}, skipping duplicate check",
                check.url, listing.status_code
            );
            return Ok(None);
        }

        let Some(existing) = guard::find_existing(listing.response.as_ref(), check.key, &check.value) else {
            debug!("No existing {} with {} = {}", check.label, check.key, check.value);
            return Ok(None);
        };

        let err = DuplicateResourceError {
            label: check.label,
            key: check.key,
            value: check.value.clone(),
        };
        warn!("{} ({} = {}), not creating", err, check.key, check.value);

        Ok(Some(ReconciliationOutcome::duplicate(
            &err,
            listing.status_code,
            existing.clone(),
        )))
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        payload: Option<&Payload>,
        timeout: Duration,
    ) -> Result<ApiResponse, ReconcileError> {
        self.requester
            .request(method, url, payload, timeout)
            .await
            .map_err(|e| {
                error!("{} {} failed: {}", method, url, e);
                ReconcileError::Transport(e)
            })
    }
}
