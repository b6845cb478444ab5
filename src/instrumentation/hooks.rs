//! Request lifecycle hooks.
//!
//! The host calls [`InstrumentationHooks::on_request`] before routing and
//! keeps the returned [`RequestInstrumentation`] for the lifetime of the
//! request. It then calls [`InstrumentationHooks::on_after_handle`] or
//! [`InstrumentationHooks::on_error`]; the first of these finalizes the
//! request and every later call is ignored.

use super::policy::{LabelPolicy, Phase};
use super::timer::{ActiveTimer, RequestTimer};
use crate::domain::RequestContext;
use prometheus::IntCounterVec;

/// Lifecycle state of a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Never started; excluded requests stay here for good.
    NotStarted,
    Started,
    Finalized,
}

/// Per-request instrumentation state, owned by the request.
#[derive(Debug)]
pub struct RequestInstrumentation {
    state: RequestState,
    timer: Option<ActiveTimer>,
}

impl RequestInstrumentation {
    // ---

    /// State for a request that is not instrumented.
    pub fn excluded() -> Self {
        // ---
        Self {
            state: RequestState::NotStarted,
            timer: None,
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// `path` label pinned at request start, while the request is running.
    pub fn path(&self) -> Option<&str> {
        self.timer.as_ref().and_then(|timer| timer.start_labels().get("path"))
    }
}

/// Orchestrates labels, counter and timer across the request lifecycle.
pub struct InstrumentationHooks {
    metrics_path: String,
    policy: LabelPolicy,
    requests: IntCounterVec,
    timer: RequestTimer,
}

impl InstrumentationHooks {
    // ---

    pub fn new(
        metrics_path: impl Into<String>,
        policy: LabelPolicy,
        requests: IntCounterVec,
        timer: RequestTimer,
    ) -> Self {
        // ---
        Self {
            metrics_path: metrics_path.into(),
            policy,
            requests,
            timer,
        }
    }

    pub fn policy(&self) -> &LabelPolicy {
        &self.policy
    }

    /// Requests whose path ends with the metrics path are never measured.
    pub fn is_excluded(&self, path: &str) -> bool {
        path.ends_with(self.metrics_path.as_str())
    }

    /// Starts instrumentation for a request, unless it is excluded.
    pub fn on_request(&self, ctx: &dyn RequestContext) -> RequestInstrumentation {
        // ---
        if self.is_excluded(ctx.path()) {
            tracing::trace!(path = ctx.path(), "metrics endpoint request not instrumented");
            return RequestInstrumentation::excluded();
        }

        let labels = self.policy.build_labels(ctx, Phase::Start);

        RequestInstrumentation {
            state: RequestState::Started,
            timer: Some(self.timer.start(labels)),
        }
    }

    /// Finalizes after the handler produced a response.
    ///
    /// Returns the recorded duration in seconds, or `None` when nothing was
    /// recorded.
    pub fn on_after_handle(
        &self,
        request: &mut RequestInstrumentation,
        ctx: &dyn RequestContext,
    ) -> Option<f64> {
        self.finalize(request, ctx, "response")
    }

    /// Finalizes after the handler failed.
    pub fn on_error(
        &self,
        request: &mut RequestInstrumentation,
        ctx: &dyn RequestContext,
    ) -> Option<f64> {
        self.finalize(request, ctx, "error")
    }

    fn finalize(
        &self,
        request: &mut RequestInstrumentation,
        ctx: &dyn RequestContext,
        outcome: &'static str,
    ) -> Option<f64> {
        // ---
        match request.state {
            RequestState::Started => {}
            RequestState::NotStarted => return None,
            RequestState::Finalized => {
                tracing::debug!(outcome, method = ctx.method(), "request already finalized, ignoring");
                return None;
            }
        }
        request.state = RequestState::Finalized;

        let timer = request.timer.take()?;
        let path = timer.start_labels().get("path").unwrap_or_default().to_string();
        let labels = self.policy.build_labels(ctx, Phase::End { path: &path });

        // Both instruments share the label columns; the counter only moves
        // when the duration was observed.
        let counter = match self.requests.get_metric_with_label_values(&labels.values()) {
            Ok(counter) => counter,
            Err(err) => {
                tracing::warn!(error = %err, "dropping request with mismatched labels");
                return None;
            }
        };
        let seconds = self.timer.finalize(Some(timer), &labels)?;
        counter.inc();

        tracing::debug!(
            outcome,
            method = ctx.method(),
            path = %path,
            status = ?labels.get("status"),
            seconds,
            "request instrumented"
        );
        Some(seconds)
    }
}
