//! Label policy: derives the label set recorded for a request.
//!
//! Label columns are always `method, path, status`, then the configured
//! static labels, then the configured dynamic labels, each group in
//! configuration order.

use super::path::PathNormalizer;
use crate::config::MetricsConfig;
use crate::domain::{
    is_prometheus_label, is_reserved_label, LabelExtractor, LabelSet, RequestContext,
    RESERVED_LABELS,
};
use crate::error::{MetricsError, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Value recorded for a dynamic label whose extractor failed.
pub const EXTRACTOR_FAULT_VALUE: &str = "";

/// Status recorded when neither the response nor the context carries one.
pub const UNKNOWN_STATUS: &str = "500";

/// Point in the request lifecycle at which labels are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase<'a> {
    /// Before the handler runs. The path is resolved from the context.
    Start,
    /// After the handler. `path` is the value resolved at [`Phase::Start`],
    /// so both phases always agree on it.
    End { path: &'a str },
}

/// Computes canonical label sets from configuration and request context.
pub struct LabelPolicy {
    normalizer: PathNormalizer,
    use_route_path: bool,
    static_labels: Vec<(String, String)>,
    dynamic_labels: Vec<(String, Arc<dyn LabelExtractor>)>,
    label_names: Vec<String>,
}

impl LabelPolicy {
    // ---

    /// Builds the policy, rejecting reserved or repeated label names.
    ///
    /// # Errors
    /// [`MetricsError::ReservedLabel`] for `method`, `path` or `status`,
    /// [`MetricsError::InvalidLabelName`] for `le` and `__`-prefixed names,
    /// [`MetricsError::DuplicateLabel`] for a name configured twice.
    pub fn new(config: &MetricsConfig) -> Result<Self> {
        // ---
        let mut label_names: Vec<String> = RESERVED_LABELS.iter().map(|n| n.to_string()).collect();

        let configured = config
            .static_labels
            .iter()
            .map(|(name, _)| name)
            .chain(config.dynamic_labels.iter().map(|(name, _)| name));

        for name in configured {
            if is_reserved_label(name) {
                return Err(MetricsError::ReservedLabel(name.clone()));
            }
            if is_prometheus_label(name) {
                return Err(MetricsError::InvalidLabelName(name.clone()));
            }
            if label_names.contains(name) {
                return Err(MetricsError::DuplicateLabel(name.clone()));
            }
            label_names.push(name.clone());
        }

        Ok(Self {
            normalizer: PathNormalizer::new(),
            use_route_path: config.use_route_path,
            static_labels: config.static_labels.clone(),
            dynamic_labels: config.dynamic_labels.clone(),
            label_names,
        })
    }

    /// Label names in column order.
    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Route template when enabled and known, else the normalized raw path.
    pub fn resolve_path(&self, ctx: &dyn RequestContext) -> String {
        // ---
        match ctx.route() {
            Some(route) if self.use_route_path && !route.is_empty() => route.to_string(),
            _ => self.normalizer.normalize(ctx.path()),
        }
    }

    /// Computes the full label set for `ctx`.
    ///
    /// Nothing is cached between phases; dynamic extractors run on every
    /// call.
    pub fn build_labels(&self, ctx: &dyn RequestContext, phase: Phase<'_>) -> LabelSet {
        // ---
        let path = match phase {
            Phase::Start => self.resolve_path(ctx),
            Phase::End { path } => path.to_string(),
        };

        let mut labels = LabelSet::with_capacity(self.label_names.len());
        labels.push("method", ctx.method());
        labels.push("path", path);
        labels.push("status", resolve_status(ctx));

        for (name, value) in &self.static_labels {
            labels.push(name.as_str(), value.as_str());
        }
        for (name, extractor) in &self.dynamic_labels {
            labels.push(name.as_str(), evaluate_guarded(name, extractor.as_ref(), ctx));
        }

        debug_assert!(labels.matches(&self.label_names));
        labels
    }
}

/// Status label value: the response's code, else an explicitly set status,
/// else `500`.
pub fn resolve_status(ctx: &dyn RequestContext) -> String {
    // ---
    ctx.response_code()
        .or_else(|| ctx.status())
        .map(|code| code.to_string())
        .unwrap_or_else(|| UNKNOWN_STATUS.to_string())
}

fn evaluate_guarded(name: &str, extractor: &dyn LabelExtractor, ctx: &dyn RequestContext) -> String {
    // ---
    match panic::catch_unwind(AssertUnwindSafe(|| extractor.evaluate(ctx))) {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            tracing::warn!(label = name, error = %err, "label extractor failed, using empty value");
            EXTRACTOR_FAULT_VALUE.to_string()
        }
        Err(_) => {
            tracing::warn!(label = name, "label extractor panicked, using empty value");
            EXTRACTOR_FAULT_VALUE.to_string()
        }
    }
}
