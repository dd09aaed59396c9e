//! Gateway metrics: concurrent counters and a latency aggregate.
//!
//! The aggregate is process-wide state owned by [`MetricsSink`], constructed
//! once at startup and reset only on restart. Each request produces exactly
//! one update inside one critical section, so the latency count/sum/max/min
//! move together and are never observed half-applied.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use tmfgw_sdk::{LatencySnapshot, MetricsSnapshot};

/// Counter names reported by the metrics-read operation.
pub const TOTAL_REQUESTS: &str = "total_requests";
pub const UPSTREAM_ERRORS: &str = "upstream_errors";
pub const VALIDATION_FAILURES: &str = "validation_failures";

/// What happened to one inbound request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestOutcome {
    /// The backend could not be reached at all.
    pub upstream_error: bool,
    /// A request or response payload failed validation.
    pub validation_failure: bool,
}

#[derive(Debug, Default)]
struct LatencyAggregate {
    count: u64,
    sum: u64,
    max: u64,
    min: Option<u64>,
}

#[derive(Debug)]
struct MetricAggregate {
    counters: BTreeMap<String, u64>,
    latency: LatencyAggregate,
}

impl MetricAggregate {
    fn new() -> Self {
        let mut counters = BTreeMap::new();
        for name in [TOTAL_REQUESTS, UPSTREAM_ERRORS, VALIDATION_FAILURES] {
            counters.insert(name.to_owned(), 0);
        }
        Self {
            counters,
            latency: LatencyAggregate::default(),
        }
    }
}

/// Records outcomes of gateway operations.
#[derive(Debug)]
pub struct MetricsSink {
    aggregate: Mutex<MetricAggregate>,
}

impl MetricsSink {
    #[must_use]
    pub fn new() -> Self {
        Self {
            aggregate: Mutex::new(MetricAggregate::new()),
        }
    }

    /// Record one completed request as a single atomic update.
    pub fn record_request(&self, outcome: RequestOutcome, elapsed_ms: u64) {
        let mut aggregate = self.aggregate.lock();

        *aggregate
            .counters
            .entry(TOTAL_REQUESTS.to_owned())
            .or_insert(0) += 1;
        if outcome.upstream_error {
            *aggregate
                .counters
                .entry(UPSTREAM_ERRORS.to_owned())
                .or_insert(0) += 1;
        }
        if outcome.validation_failure {
            *aggregate
                .counters
                .entry(VALIDATION_FAILURES.to_owned())
                .or_insert(0) += 1;
        }

        let latency = &mut aggregate.latency;
        latency.count += 1;
        latency.sum = latency.sum.saturating_add(elapsed_ms);
        latency.max = latency.max.max(elapsed_ms);
        latency.min = Some(latency.min.map_or(elapsed_ms, |min| min.min(elapsed_ms)));
    }

    /// Point-in-time view of the aggregate; `avg` is derived here.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let aggregate = self.aggregate.lock();
        let latency = &aggregate.latency;
        #[allow(clippy::integer_division)]
        let avg = if latency.count == 0 {
            0
        } else {
            latency.sum / latency.count
        };
        MetricsSnapshot {
            counters: aggregate.counters.clone(),
            latency_ms: LatencySnapshot {
                count: latency.count,
                avg,
                max: latency.max,
                min: latency.min.unwrap_or(0),
            },
        }
    }
}

impl Default for MetricsSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn starts_with_zeroed_counters() {
        let sink = MetricsSink::new();
        let snapshot = sink.snapshot();
        assert_eq!(snapshot.counters.get(TOTAL_REQUESTS), Some(&0));
        assert_eq!(snapshot.latency_ms.count, 0);
        assert_eq!(snapshot.latency_ms.min, 0);
    }

    #[test]
    fn records_outcome_and_latency_together() {
        let sink = MetricsSink::new();
        sink.record_request(
            RequestOutcome {
                upstream_error: true,
                validation_failure: false,
            },
            40,
        );
        sink.record_request(RequestOutcome::default(), 20);

        let snapshot = sink.snapshot();
        assert_eq!(snapshot.counters.get(TOTAL_REQUESTS), Some(&2));
        assert_eq!(snapshot.counters.get(UPSTREAM_ERRORS), Some(&1));
        assert_eq!(snapshot.counters.get(VALIDATION_FAILURES), Some(&0));
        assert_eq!(snapshot.latency_ms.count, 2);
        assert_eq!(snapshot.latency_ms.avg, 30);
        assert_eq!(snapshot.latency_ms.max, 40);
        assert_eq!(snapshot.latency_ms.min, 20);
    }

    #[test]
    fn concurrent_updates_never_lose_counts() {
        let sink = Arc::new(MetricsSink::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let sink = Arc::clone(&sink);
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    sink.record_request(RequestOutcome::default(), 1);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = sink.snapshot();
        assert_eq!(snapshot.counters.get(TOTAL_REQUESTS), Some(&800));
        assert_eq!(snapshot.latency_ms.count, 800);
        assert_eq!(snapshot.latency_ms.avg, 1);
    }
}
