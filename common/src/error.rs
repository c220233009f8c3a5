use thiserror::Error;

/// Failures surfaced by the discovery scanner and the OTA transfer engine.
///
/// Frames that fail to decode are never reported through this type; they are
/// dropped where they are received.
#[derive(Error, Debug)]
pub enum OtaError {
    /// Malformed device address or an out-of-range configuration value.
    /// Always raised before any frame is sent.
    #[error("format error: {0}")]
    Format(String),

    /// The adapter has no usable hardware address.
    #[error("adapter {adapter} has no usable hardware address")]
    AdapterUnusable { adapter: String },

    /// Retry budget exhausted for the chunk at `offset`.
    #[error("no valid ack for offset={offset} after {attempts} attempts")]
    TransferFailed { offset: usize, attempts: u32 },

    #[error("operation cancelled at offset={offset}")]
    Cancelled { offset: usize },

    /// The raw channel could not be opened, or a frame could not be sent.
    #[error("link error on {adapter}: {source}")]
    Link {
        adapter: String,
        #[source]
        source: anyhow::Error,
    },
}

impl OtaError {
    pub fn format<T: Into<String>>(msg: T) -> Self {
        OtaError::Format(msg.into())
    }

    pub fn link(adapter: &str, source: anyhow::Error) -> Self {
        OtaError::Link {
            adapter: adapter.to_string(),
            source,
        }
    }

    /// Offset the transfer stopped at, for failures that happen mid-session.
    pub fn failed_offset(&self) -> Option<usize> {
        match self {
            OtaError::TransferFailed { offset, .. } | OtaError::Cancelled { offset } => {
                Some(*offset)
            }
            _ => None,
        }
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
