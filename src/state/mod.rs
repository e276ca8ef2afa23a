// Derived state store and ingestion metrics

mod entity;
mod metrics;
mod store;

pub use entity::{StatusFlag, StoreChange, StoreSnapshot, SystemStatus, Team};
pub use metrics::{IngestMetrics, MetricsSnapshot, UNKNOWN_EVENT_KEY};
pub use store::StateStore;

#[cfg(test)]
mod tests;
