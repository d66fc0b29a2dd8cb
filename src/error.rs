//! # Error Types
//!
//! Custom error types for Geotel using `thiserror`.

use thiserror::Error;

/// Main error type for Geotel
#[derive(Debug, Error)]
pub enum GeotelError {
    /// Telemetry envelope / payload codec errors
    #[error("codec error: {0}")]
    Codec(String),

    /// Sensor lifecycle and hardware source errors
    #[error("sensor error: {0}")]
    Sensor(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Geotel
pub type Result<T> = std::result::Result<T, GeotelError>;
