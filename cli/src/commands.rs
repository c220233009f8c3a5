pub mod discover;
pub mod flash;
pub mod interfaces;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use hgota_common::config::{
    AckPolicy, DEFAULT_ACK_TIMEOUT_SECS, DEFAULT_CHUNK_SIZE, DEFAULT_PROBE_COUNT, DEFAULT_RETRIES,
    FlashConfig, ScanConfig,
};

#[derive(Parser)]
#[command(name = "hgota")]
#[command(version)]
#[command(about = "Discover and reflash HaLow modules over raw Ethernet.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print less (-q drops headers, -qq prints results only)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the adapters discovery would probe
    #[command(alias = "i")]
    Interfaces,
    /// Probe every adapter and list the devices that answer
    #[command(alias = "d")]
    Discover {
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Push a firmware image to a device
    #[command(alias = "f")]
    Flash(FlashArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Probes sent per adapter
    #[arg(long, default_value_t = DEFAULT_PROBE_COUNT)]
    pub count: u32,

    /// Spacing between probes in milliseconds
    #[arg(long, default_value_t = 10)]
    pub period_ms: u64,

    /// Listen window per adapter in milliseconds
    #[arg(long, default_value_t = 500)]
    pub listen_ms: u64,
}

impl From<ScanArgs> for ScanConfig {
    fn from(args: ScanArgs) -> Self {
        Self {
            probe_count: args.count,
            probe_period: Duration::from_millis(args.period_ms),
            listen_duration: Duration::from_millis(args.listen_ms),
            ..Default::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct FlashArgs {
    /// Firmware image to push
    pub firmware: PathBuf,

    /// Device hardware address, skips discovery (needs --iface)
    #[arg(long, requires = "iface")]
    pub device: Option<String>,

    /// Adapter to flash through, by OS or display name (needs --device)
    #[arg(long, requires = "device")]
    pub iface: Option<String>,

    /// Pick the N-th discovered device
    #[arg(long, default_value_t = 1, conflicts_with = "device")]
    pub select: usize,

    /// Bytes per chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk: usize,

    /// Offset increment per acknowledged chunk, defaults to --chunk
    #[arg(long)]
    pub step: Option<usize>,

    /// Seconds to wait for each ack
    #[arg(long, default_value_t = DEFAULT_ACK_TIMEOUT_SECS)]
    pub timeout: f64,

    /// Attempts per chunk
    #[arg(long, default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,

    /// Require acks to echo every field of the sent chunk
    #[arg(long)]
    pub strict_ack: bool,

    #[command(flatten)]
    pub scan: ScanArgs,
}

impl From<&FlashArgs> for FlashConfig {
    fn from(args: &FlashArgs) -> Self {
        Self {
            chunk_size: args.chunk,
            step: args.step,
            timeout_secs: args.timeout,
            retries: args.retries,
            ack_policy: if args.strict_ack {
                AckPolicy::Strict
            } else {
                AckPolicy::Lenient
            },
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
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
