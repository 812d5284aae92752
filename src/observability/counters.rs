// src/observability/counters.rs
//! Engine counters

use crate::interception::policy::Classification;
use metrics::{counter, describe_counter};

pub const REQUESTS_TOTAL: &str = "mock_engine_requests_total";
pub const REPLAYED_TOTAL: &str = "mock_engine_replayed_total";
pub const RECORDED_TOTAL: &str = "mock_engine_recorded_total";
pub const STORE_FAILURES_TOTAL: &str = "mock_engine_store_failures_total";

pub fn describe() {
    describe_counter!(REQUESTS_TOTAL, "Intercepted requests by classification");
    describe_counter!(REPLAYED_TOTAL, "Requests answered from the mock store");
    describe_counter!(RECORDED_TOTAL, "Live responses settled into the mock store");
    describe_counter!(STORE_FAILURES_TOTAL, "Live responses that could not be recorded");
}

pub fn record_request(classification: Classification) {
    counter!(REQUESTS_TOTAL, "classification" => classification.as_str()).increment(1);
}

pub fn record_replay() {
    counter!(REPLAYED_TOTAL).increment(1);
}

pub fn record_recorded() {
    counter!(RECORDED_TOTAL).increment(1);
}

pub fn record_store_failure() {
    counter!(STORE_FAILURES_TOTAL).increment(1);
}
