//! # Geotel Library
//!
//! Geospatial telemetry for bandwidth-constrained radio links.
//!
//! This library provides an ellipsoidal/spherical earth-model kernel and a
//! sensor/telemetry framework that packs heterogeneous device readings
//! (location, battery, link quality, environmental sensors) into compact
//! MessagePack envelopes, decodes them on receipt, and derives relationships
//! (distance, bearing, radio-horizon visibility) between two telemetry
//! snapshots.

pub mod config;
pub mod error;
pub mod geodesy;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_support {
    use tracing_subscriber::EnvFilter;

    /// Install the test tracing subscriber. Safe to call from every test;
    /// only the first call wins.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}
