//! Packet framing for the serial telemetry text stream
//!
//! The device streams text packets over an unreliable byte link. The framer
//! accumulates whatever bytes are available, extracts every complete packet,
//! recovers from stray fragments and bounds its own buffer.

use tracing::{debug, trace, warn};

use crate::types::{Ingest, Sample, WireFormat};
use crate::units;

/// Marks the start of a framed packet
pub const START_MARKER: char = '$';
/// Marks the end of a framed packet
pub const END_MARKER: char = ';';
/// Terminates a CSV line
pub const LINE_END: char = '\n';

/// Buffered text beyond this many characters without a complete packet is dropped
pub const MAX_BUFFER_CHARS: usize = 1000;

/// Why a completed packet was discarded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    #[error("expected 6 or 9 values, found {0}")]
    TokenCount(usize),
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
}

/// Running counters kept by a [`PacketFramer`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FramerStats {
    /// Packets decoded into samples
    pub decoded: u64,
    /// Completed packets discarded as undecodable
    pub malformed: u64,
    /// Stray fragments dropped to resynchronize on an end marker
    pub resyncs: u64,
    /// Times the buffer was cleared for exceeding [`MAX_BUFFER_CHARS`]
    pub overflows: u64,
}

/// Streaming text packet parser
///
/// Call [`feed`](Self::feed) once per poll with whatever bytes are available,
/// possibly none. It never waits for more input.
///
/// When several packets complete in one call, all of them are consumed but
/// only the most recent sample is returned. Use [`feed_all`](Self::feed_all)
/// to keep every sample.
///
/// # Example
/// ```
/// use imu_telemetry::{PacketFramer, WireFormat};
///
/// let mut framer = PacketFramer::new(WireFormat::Framed);
/// let sample = framer
///     .feed(b"$0 0 1000 0 0 0;$10 20 1000 0 0 2000;")
///     .into_data()
///     .unwrap();
///
/// // Only the later packet is reported
/// assert!((sample.gyroscope().z - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct PacketFramer {
    format: WireFormat,
    buffer: String,
    /// Trailing bytes of a UTF-8 sequence split across reads
    pending: Vec<u8>,
    stats: FramerStats,
}

impl PacketFramer {
    pub fn new(format: WireFormat) -> Self {
        Self {
            format,
            buffer: String::with_capacity(MAX_BUFFER_CHARS),
            pending: Vec::with_capacity(4),
            stats: FramerStats::default(),
        }
    }

    /// Appends `bytes` and returns the last sample completed by them
    ///
    /// Returns [`Ingest::Malformed`] when packets completed but none decoded,
    /// and [`Ingest::NoData`] when no packet completed.
    pub fn feed(&mut self, bytes: &[u8]) -> Ingest<Sample> {
        let mut latest = None;
        let mut malformed = false;

        self.process(bytes, |packet| match packet {
            Ok(sample) => latest = Some(sample),
            Err(_) => malformed = true,
        });

        match latest {
            Some(sample) => Ingest::Data(sample),
            None if malformed => Ingest::Malformed,
            None => Ingest::NoData,
        }
    }

    /// Appends `bytes` and returns every sample completed by them, oldest first
    pub fn feed_all(&mut self, bytes: &[u8]) -> Vec<Sample> {
        let mut samples = Vec::new();
        self.process(bytes, |packet| {
            if let Ok(sample) = packet {
                samples.push(sample);
            }
        });
        samples
    }

    /// Text waiting for the rest of its packet
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    pub fn stats(&self) -> FramerStats {
        self.stats
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Drops any partially received packet
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.pending.clear();
    }

    fn process(&mut self, bytes: &[u8], mut on_packet: impl FnMut(Result<Sample, PacketError>)) {
        self.append(bytes);

        while let Some(payload) = self.next_payload() {
            let packet = parse_payload(&payload, self.format);
            match &packet {
                Ok(_) => self.stats.decoded += 1,
                Err(error) => {
                    self.stats.malformed += 1;
                    trace!(%error, payload = %payload, "Discarding malformed packet");
                }
            }
            on_packet(packet);
        }

        let buffered = self.buffer.chars().count();
        if buffered > MAX_BUFFER_CHARS {
            warn!(buffered, "Framer buffer overflow, discarding buffered text");
            self.buffer.clear();
            self.stats.overflows += 1;
        }
    }

    fn append(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);

        // A multi-byte character cut off by the read waits for its remaining bytes
        let complete = self.pending.len() - incomplete_tail(&self.pending);
        self.buffer.extend(
            String::from_utf8_lossy(&self.pending[..complete])
                .chars()
                .filter(|&c| c != '\0'),
        );
        self.pending.drain(..complete);
    }

    fn next_payload(&mut self) -> Option<String> {
        match self.format {
            WireFormat::Framed => self.next_framed(),
            WireFormat::Csv => self.next_line(),
        }
    }

    fn next_framed(&mut self) -> Option<String> {
        loop {
            let end = self.buffer.find(END_MARKER)?;

            // The start marker nearest to the end marker wins; anything before it
            // is the remains of a truncated packet.
            match self.buffer[..end].rfind(START_MARKER) {
                Some(start) => {
                    let payload = self.buffer[start + 1..end].to_owned();
                    self.buffer.drain(..=end);
                    return Some(payload);
                }
                None => {
                    debug!(discarded = end + 1, "Resynchronizing past orphan end marker");
                    self.buffer.drain(..=end);
                    self.stats.resyncs += 1;
                }
            }
        }
    }

    fn next_line(&mut self) -> Option<String> {
        loop {
            let end = self.buffer.find(LINE_END)?;
            let line = self.buffer[..end].trim().to_owned();
            self.buffer.drain(..=end);
            if !line.is_empty() {
                return Some(line);
            }
        }
    }
}

/// Length of a truncated but so far valid UTF-8 sequence at the end of `bytes`
fn incomplete_tail(bytes: &[u8]) -> usize {
    let window = bytes.len().saturating_sub(3);
    for start in (window..bytes.len()).rev() {
        // Skip continuation bytes back to the sequence's leading byte
        if bytes[start] & 0xC0 == 0x80 {
            continue;
        }
        return match std::str::from_utf8(&bytes[start..]) {
            Err(e) if e.valid_up_to() == 0 && e.error_len().is_none() => bytes.len() - start,
            _ => 0,
        };
    }
    0
}

/// Decodes one packet payload (markers already stripped) into an SI sample
///
/// Framed payloads split on single spaces with empty tokens ignored. CSV
/// payloads split on commas with each token trimmed. Six values leave the
/// magnetometer at zero; nine values fill every field. `NaN` and infinities
/// are rejected so one bad packet cannot poison the integrated state.
pub fn parse_payload(payload: &str, format: WireFormat) -> Result<Sample, PacketError> {
    let tokens: Vec<&str> = match format {
        WireFormat::Framed => payload.split(' ').filter(|t| !t.is_empty()).collect(),
        WireFormat::Csv => payload.split(',').map(str::trim).collect(),
    };

    if tokens.len() != 6 && tokens.len() != Sample::LEN {
        return Err(PacketError::TokenCount(tokens.len()));
    }

    let mut raw = [0.0; Sample::LEN];
    for (slot, token) in raw.iter_mut().zip(&tokens) {
        *slot = token
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| PacketError::InvalidNumber((*token).to_owned()))?;
    }

    Ok(units::to_si(raw))
}
