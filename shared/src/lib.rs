pub mod aggregation;
pub mod config;
pub mod store;
pub mod telemetry;
pub mod wire;

pub use aggregation::{AggregationError, Granularity, Series, aggregate};
pub use store::{PaymentRecord, PaymentStore, StoreError};

/// Install the global tracing subscriber for the calling binary.
#[macro_export]
macro_rules! init_tracing {
    () => {
        $crate::telemetry::init(env!("CARGO_CRATE_NAME"))
    };
}
