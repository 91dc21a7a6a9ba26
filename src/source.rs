//! Sample sources: live serial stream or simulation

use std::time::Duration;

use tracing::warn;

use crate::config::Config;
use crate::framer::{FramerStats, PacketFramer};
use crate::simulation::SimulationGenerator;
use crate::transport::{SerialTransport, Transport};
use crate::types::{ConnectionOutcome, Ingest, Mode, Sample, SimulationSettings, WireFormat};

/// Bytes read from the transport per poll
const READ_CHUNK: usize = 1024;

/// Where samples come from
///
/// Both variants produce SI samples, one per call to [`poll`](Self::poll).
pub enum SampleSource {
    /// Bytes from a transport, decoded by a packet framer
    Live {
        transport: Box<dyn Transport>,
        framer: PacketFramer,
    },
    /// Synthetic noise around a stationary board
    Simulation(SimulationGenerator),
}

impl SampleSource {
    /// Build the source the configuration asks for
    ///
    /// A Live source whose serial port cannot be opened is replaced by a
    /// Simulation source; the returned outcome records the downgrade.
    pub fn open(config: &Config) -> (Self, ConnectionOutcome) {
        match config.mode {
            Mode::Simulation => (
                Self::simulation(config.simulation),
                ConnectionOutcome::Honored(Mode::Simulation),
            ),
            Mode::Live => {
                let timeout = Duration::from_millis(config.read_timeout_ms);
                match SerialTransport::open(&config.port, config.baud, timeout) {
                    Ok(transport) => (
                        Self::live(Box::new(transport), config.wire_format),
                        ConnectionOutcome::Honored(Mode::Live),
                    ),
                    Err(e) => {
                        warn!(port = %config.port, error = %e, "Serial port unavailable, switching to simulation");
                        (
                            Self::simulation(config.simulation),
                            ConnectionOutcome::Downgraded {
                                reason: e.to_string(),
                            },
                        )
                    }
                }
            }
        }
    }

    pub fn live(transport: Box<dyn Transport>, format: WireFormat) -> Self {
        SampleSource::Live {
            transport,
            framer: PacketFramer::new(format),
        }
    }

    pub fn simulation(settings: SimulationSettings) -> Self {
        SampleSource::Simulation(SimulationGenerator::new(settings))
    }

    pub fn mode(&self) -> Mode {
        match self {
            SampleSource::Live { .. } => Mode::Live,
            SampleSource::Simulation(_) => Mode::Simulation,
        }
    }

    /// Fetch the sample for this poll tick without blocking
    pub fn poll(&mut self) -> Ingest<Sample> {
        match self {
            SampleSource::Live { transport, framer } => {
                let mut received = Vec::new();
                let mut buf = [0u8; READ_CHUNK];
                loop {
                    match transport.read(&mut buf) {
                        Ok(n) => {
                            received.extend_from_slice(&buf[..n]);
                            if n < READ_CHUNK {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "Transport read failed");
                            return Ingest::TransportError(e);
                        }
                    }
                }
                framer.feed(&received)
            }
            SampleSource::Simulation(generator) => Ingest::Data(generator.next_sample()),
        }
    }

    /// Framer counters, for a Live source
    pub fn framer_stats(&self) -> Option<FramerStats> {
        match self {
            SampleSource::Live { framer, .. } => Some(framer.stats()),
            SampleSource::Simulation(_) => None,
        }
    }
}
