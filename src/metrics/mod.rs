//! Prometheus metrics of the facade layer
//!
//! Collectors live in a crate-local [`struct@REGISTRY`]; call [`gather`] to
//! render them in the text exposition format.


use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::Encoder;
use prometheus::IntCounterVec;
use prometheus::IntGauge;
use prometheus::Opts;
use prometheus::Registry;
use prometheus::TextEncoder;
use tracing::error;

lazy_static! {
    pub static ref NEXT_CALLS: IntCounterVec = IntCounterVec::new(
        Opts::new("watcher_next_calls", "Next calls served, by facade"),
        &["facade"]
    )
    .expect("metric can not be created");

    pub static ref NEXT_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("watcher_next_failures", "Next calls that returned an error, by facade and error kind"),
        &["facade", "kind"]
    )
    .expect("metric can not be created");

    pub static ref LIVE_RESOURCES: IntGauge =
        IntGauge::new("watcher_live_resources", "Resources currently registered across connections")
            .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

static REGISTER: Once = Once::new();

pub(crate) fn register_custom_metrics(registry: &Registry) {
    registry
        .register(Box::new(NEXT_CALLS.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(NEXT_FAILURES.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(LIVE_RESOURCES.clone()))
        .expect("collector can be registered");
}

/// Renders every facade metric in the prometheus text format.
pub fn gather() -> String {
    REGISTER.call_once(|| register_custom_metrics(&REGISTRY));

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        error!("could not encode facade metrics: {}", e);
    }
    match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            error!("facade metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    }
}

pub(crate) fn record_next(
    facade: &str,
    failure: Option<&'static str>,
) {
    NEXT_CALLS.with_label_values(&[facade]).inc();
    if let Some(kind) = failure {
        NEXT_FAILURES.with_label_values(&[facade, kind]).inc();
    }
}
