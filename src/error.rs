//! Error types for the telemetry pipeline

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by transports and configuration loading
///
/// Nothing in the ingestion path is fatal: packet-level problems are reported
/// as [`Ingest::Malformed`](crate::Ingest::Malformed) and transport failures
/// during polling as [`Ingest::TransportError`](crate::Ingest::TransportError).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port could not be opened or queried
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error while reading a transport or a config file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Transport is in a state where it cannot be read
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),
}
