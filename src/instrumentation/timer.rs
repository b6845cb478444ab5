use crate::domain::LabelSet;
use prometheus::HistogramVec;
use std::time::{Duration, Instant};

/// A running request timer.
///
/// Consumed by [`RequestTimer::finalize`], so it can be observed at most
/// once.
#[derive(Debug)]
pub struct ActiveTimer {
    started: Instant,
    labels: LabelSet,
}

impl ActiveTimer {
    // ---

    /// Labels computed when the request started. Their `path` is the value
    /// pinned for the end phase.
    pub fn start_labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Records request durations into the latency histogram.
#[derive(Clone)]
pub struct RequestTimer {
    histogram: HistogramVec,
}

impl RequestTimer {
    // ---

    pub fn new(histogram: HistogramVec) -> Self {
        Self { histogram }
    }

    /// Starts timing a request on the monotonic clock.
    pub fn start(&self, labels: LabelSet) -> ActiveTimer {
        // ---
        ActiveTimer {
            started: Instant::now(),
            labels,
        }
    }

    /// Observes the elapsed seconds under `labels` and returns them.
    ///
    /// `labels` are the end-phase labels and may differ from the start
    /// labels (typically in `status`). Without a timer this does nothing
    /// and returns `None`. `None` is also returned when the histogram
    /// rejects `labels`, in which case nothing is observed.
    pub fn finalize(&self, timer: Option<ActiveTimer>, labels: &LabelSet) -> Option<f64> {
        // ---
        let timer = timer?;
        let seconds = timer.elapsed().as_secs_f64();

        match self.histogram.get_metric_with_label_values(&labels.values()) {
            Ok(histogram) => {
                histogram.observe(seconds);
                Some(seconds)
            }
            Err(err) => {
                tracing::warn!(error = %err, "dropping duration observation with mismatched labels");
                None
            }
        }
    }
}
