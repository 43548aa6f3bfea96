//! Prometheus metrics for the summarize endpoint.

use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

/// Per-server registry; not the process-global default, so several routers
/// can coexist in one process.
pub struct Metrics {
    registry: Registry,
    requests: IntCounterVec,
    inference_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("summarize_requests_total", "Summarize requests by outcome"),
            &["outcome"],
        )?;
        let inference_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "summarize_inference_seconds",
                "Time spent in the inference provider",
            )
            .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(inference_seconds.clone()))?;

        Ok(Self {
            registry,
            requests,
            inference_seconds,
        })
    }

    /// Count one request; `outcome` is `"ok"` or an error type.
    pub fn record_request(&self, outcome: &str) {
        self.requests.with_label_values(&[outcome]).inc();
    }

    pub fn observe_inference(&self, seconds: f64) {
        self.inference_seconds.observe(seconds);
    }

    pub fn requests_with_outcome(&self, outcome: &str) -> u64 {
        self.requests.with_label_values(&[outcome]).get()
    }

    /// Text exposition format.
    pub fn render(&self) -> prometheus::Result<String> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}
