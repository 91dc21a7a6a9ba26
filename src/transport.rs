//! Byte transports feeding the packet framer

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::info;

use crate::error::{Error, Result};

/// Non-blocking byte source
pub trait Transport: Send {
    /// Read whatever bytes are available into `buffer`
    ///
    /// Returns `Ok(0)` when nothing is waiting. Must not block beyond the
    /// transport's short read timeout.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;
}

/// Serial port transport
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open a serial port (8N1, no flow control)
    ///
    /// # Arguments
    /// * `path` - Serial port path (e.g., "/dev/ttyACM0")
    /// * `baud_rate` - Baud rate (e.g., 115200)
    /// * `timeout` - Upper bound on a single read
    pub fn open(path: &str, baud_rate: u32, timeout: Duration) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()?;

        info!(path, baud_rate, "Opened serial port");
        Ok(Self { port })
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let available = self.port.bytes_to_read()? as usize;
        if available == 0 {
            return Ok(0);
        }

        let len = available.min(buffer.len());
        match self.port.read(&mut buffer[..len]) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory transport for replaying captured streams
///
/// Clones share the same queue, so one handle can keep injecting bytes after
/// another has been handed to a [`SampleSource`](crate::SampleSource).
#[derive(Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    pending: VecDeque<u8>,
    failure: Option<String>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for subsequent reads
    pub fn inject(&self, data: &[u8]) {
        self.lock().pending.extend(data);
    }

    /// Make the next read fail with `reason`
    pub fn fail_next_read(&self, reason: impl Into<String>) {
        self.lock().failure = Some(reason.into());
    }

    /// Bytes not yet read
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MemoryTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.lock();
        if let Some(reason) = inner.failure.take() {
            return Err(Error::TransportUnavailable(reason));
        }

        let n = inner.pending.len().min(buffer.len());
        for (slot, byte) in buffer.iter_mut().zip(inner.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_reads_what_was_injected() {
        let mut transport = MemoryTransport::new();
        transport.inject(b"$1 2 3;");

        let mut buf = [0u8; 4];
        assert_eq!(transport.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"$1 2");
        assert_eq!(transport.pending(), 3);

        let mut buf = [0u8; 16];
        assert_eq!(transport.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b" 3;");
        assert_eq!(transport.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_clones_share_queue() {
        let writer = MemoryTransport::new();
        let mut reader = writer.clone();

        writer.inject(b"abc");
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
    }

    #[test]
    fn test_failure_is_one_shot() {
        let mut transport = MemoryTransport::new();
        transport.inject(b"x");
        transport.fail_next_read("unplugged");

        let mut buf = [0u8; 8];
        assert!(matches!(
            transport.read(&mut buf),
            Err(Error::TransportUnavailable(reason)) if reason == "unplugged"
        ));
        assert_eq!(transport.read(&mut buf).unwrap(), 1);
    }

    #[test]
    fn test_open_missing_port_fails() {
        let result = SerialTransport::open(
            "/dev/imu-telemetry-does-not-exist",
            115_200,
            Duration::from_millis(10),
        );
        assert!(result.is_err());
    }
}
