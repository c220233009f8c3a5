use std::time::Duration;

use crate::error::OtaError;

pub const DEFAULT_PROBE_COUNT: u32 = 10;
pub const DEFAULT_PROBE_PERIOD: Duration = Duration::from_millis(10);
pub const DEFAULT_LISTEN_DURATION: Duration = Duration::from_millis(500);
pub const DEFAULT_WARMUP: Duration = Duration::from_millis(100);

pub const DEFAULT_CHUNK_SIZE: usize = 1400;
pub const DEFAULT_ACK_TIMEOUT_SECS: f64 = 0.5;
pub const DEFAULT_RETRIES: u32 = 10;

/// Largest chunk the u16 length field can describe.
pub const MAX_CHUNK_SIZE: usize = u16::MAX as usize;

/// Front-end settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// 0 prints everything, 1 drops headers, 2 prints results only.
    pub quiet: u8,
}

/// Timing of one discovery pass.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub probe_count: u32,
    pub probe_period: Duration,
    /// Wall-clock listen window, measured from the start of the adapter scan.
    pub listen_duration: Duration,
    /// Delay before the first probe so the listener is already capturing.
    pub warmup: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            probe_count: DEFAULT_PROBE_COUNT,
            probe_period: DEFAULT_PROBE_PERIOD,
            listen_duration: DEFAULT_LISTEN_DURATION,
            warmup: DEFAULT_WARMUP,
        }
    }
}

/// How an inbound ack is matched against the chunk that was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckPolicy {
    /// Any well-formed ack from the device counts.
    #[default]
    Lenient,
    /// Offset, total, length, checksum, image id and first word must all match.
    Strict,
}

/// Parameters of one OTA session.
#[derive(Debug, Clone)]
pub struct FlashConfig {
    pub chunk_size: usize,
    /// Offset increment after an acknowledged chunk. `None` means `chunk_size`.
    pub step: Option<usize>,
    pub timeout_secs: f64,
    /// Attempts per chunk, the first send included.
    pub retries: u32,
    pub ack_policy: AckPolicy,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            step: None,
            timeout_secs: DEFAULT_ACK_TIMEOUT_SECS,
            retries: DEFAULT_RETRIES,
            ack_policy: AckPolicy::default(),
        }
    }
}

impl FlashConfig {
    pub fn step(&self) -> usize {
        self.step.unwrap_or(self.chunk_size)
    }

    /// Per-attempt ack wait. Fails for values a [`Duration`] cannot hold.
    pub fn timeout(&self) -> Result<Duration, OtaError> {
        Duration::try_from_secs_f64(self.timeout_secs)
            .map_err(|_| OtaError::format(format!("timeout {}s out of range", self.timeout_secs)))
    }

    /// Rejects values the transfer loop cannot work with.
    pub fn validate(&self) -> Result<(), OtaError> {
        if self.chunk_size < 2 {
            return Err(OtaError::format("chunk must be >= 2"));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(OtaError::format(format!(
                "chunk must be <= {MAX_CHUNK_SIZE}"
            )));
        }
        if self.retries < 1 {
            return Err(OtaError::format("retries must be >= 1"));
        }
        // NaN fails this comparison too
        if !(self.timeout_secs > 0.0) || !self.timeout_secs.is_finite() {
            return Err(OtaError::format("timeout must be > 0"));
        }
        self.timeout()?;
        let step = self.step();
        if step == 0 || step > self.chunk_size {
            return Err(OtaError::format(format!(
                "step must be within 1..={}",
                self.chunk_size
            )));
        }
        Ok(())
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
