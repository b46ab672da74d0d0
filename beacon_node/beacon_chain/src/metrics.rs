use lazy_static::lazy_static;
pub use prometheus::Error;
use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Histogram, HistogramTimer,
    IntCounter, IntGauge, Result,
};

pub fn start_timer(histogram: &Result<Histogram>) -> Option<HistogramTimer> {
    if let Ok(histogram) = histogram {
        Some(histogram.start_timer())
    } else {
        None
    }
}

pub fn stop_timer(timer: Option<HistogramTimer>) {
    if let Some(t) = timer {
        t.observe_duration()
    }
}

pub fn inc_counter(counter: &Result<IntCounter>) {
    if let Ok(counter) = counter {
        counter.inc();
    }
}

pub fn set_gauge(gauge: &Result<IntGauge>, value: i64) {
    if let Ok(gauge) = gauge {
        gauge.set(value);
    }
}

lazy_static! {
    /*
     * Shuffling cache
     */
    pub static ref SHUFFLING_CACHE_HITS: Result<IntCounter> = register_int_counter!(
        "beacon_shuffling_cache_hits_total",
        "Count of times shuffling cache fulfils request"
    );
    pub static ref SHUFFLING_CACHE_MISSES: Result<IntCounter> = register_int_counter!(
        "beacon_shuffling_cache_misses_total",
        "Count of times shuffling cache fails request"
    );
    pub static ref SHUFFLING_CACHE_PROMISE_HITS: Result<IntCounter> = register_int_counter!(
        "beacon_shuffling_cache_promise_hits_total",
        "Count of times the shuffling cache returns a promise to future shuffling"
    );
    pub static ref SHUFFLING_CACHE_PROMISE_FAILS: Result<IntCounter> = register_int_counter!(
        "beacon_shuffling_cache_promise_fails_total",
        "Count of times the shuffling cache detects a failed promise"
    );
    pub static ref SHUFFLING_CACHE_RETENTION_REJECTS: Result<IntCounter> = register_int_counter!(
        "beacon_shuffling_cache_retention_rejects_total",
        "Count of requests for shufflings older than the live window"
    );
    pub static ref SHUFFLING_CACHE_SIZE: Result<IntGauge> = register_int_gauge!(
        "beacon_shuffling_cache_size",
        "Number of entries held by the shuffling cache"
    );
    pub static ref SHUFFLING_COMPUTATION_TIMES: Result<Histogram> = register_histogram!(
        "beacon_shuffling_computation_seconds",
        "Time taken to compute a committee cache"
    );

    /*
     * Committee archive
     */
    pub static ref COMMITTEE_ARCHIVE_WRITES: Result<IntCounter> = register_int_counter!(
        "beacon_committee_archive_writes_total",
        "Count of epochs written to the committee archive"
    );
    pub static ref COMMITTEE_ARCHIVE_READ_TIMES: Result<Histogram> = register_histogram!(
        "beacon_committee_archive_read_seconds",
        "Time taken to read an epoch from the committee archive"
    );
    pub static ref COMMITTEE_ARCHIVE_READ_TIMEOUTS: Result<IntCounter> = register_int_counter!(
        "beacon_committee_archive_read_timeouts_total",
        "Count of committee archive reads which timed out"
    );

    /*
     * Committee queries
     */
    pub static ref COMMITTEE_QUERY_LIVE_REQUESTS: Result<IntCounter> = register_int_counter!(
        "beacon_committee_query_live_requests_total",
        "Count of committee queries served from the live window"
    );
    pub static ref COMMITTEE_QUERY_ARCHIVE_REQUESTS: Result<IntCounter> = register_int_counter!(
        "beacon_committee_query_archive_requests_total",
        "Count of committee queries served from the archive"
    );
    pub static ref COMMITTEE_QUERY_REJECTED_REQUESTS: Result<IntCounter> = register_int_counter!(
        "beacon_committee_query_rejected_requests_total",
        "Count of committee queries for future epochs"
    );
    pub static ref COMMITTEE_QUERY_TIMES: Result<Histogram> = register_histogram!(
        "beacon_committee_query_seconds",
        "Full runtime of a committee query"
    );
}
