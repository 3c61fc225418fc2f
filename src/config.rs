use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::store::entry::now_millis;

/// Millisecond clock used to generate stream entry IDs.
///
/// Defaults to the system clock; tests can pin it to make ID assignment
/// deterministic.
#[derive(Clone)]
pub struct StreamClock(Arc<dyn Fn() -> u64 + Send + Sync>);

impl StreamClock {
    pub fn system() -> Self {
        StreamClock(Arc::new(now_millis))
    }

    pub fn fixed(ms: u64) -> Self {
        StreamClock(Arc::new(move || ms))
    }

    pub fn from_fn(f: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        StreamClock(Arc::new(f))
    }

    pub fn now(&self) -> u64 {
        (self.0)()
    }
}

impl fmt::Debug for StreamClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StreamClock")
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How often the background sweep looks for expired keys.
    pub sweep_interval: Duration,
    /// Maximum expired keys removed per sweep cycle.
    pub sweep_sample: usize,
    /// Register-index bits for HyperLogLog sketches (4..=18).
    /// The default of 14 gives 16384 registers and ~0.81% standard error.
    pub hll_precision: u8,
    /// Per-subscriber queue bound; a full queue drops that subscriber's
    /// copy of the message rather than blocking the publisher.
    pub subscriber_buffer: usize,
    /// Clock consulted when auto-assigning stream entry IDs.
    pub stream_clock: StreamClock,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            sweep_interval: Duration::from_millis(100),
            sweep_sample: 20,
            hll_precision: 14,
            subscriber_buffer: 1024,
            stream_clock: StreamClock::system(),
        }
    }
}
