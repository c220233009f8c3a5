//! Raw Ethernet channels.
//!
//! A channel is split into a [`FrameSender`] and a [`FrameReceiver`] so the
//! discovery sender and listener can run on different threads. Receivers
//! return `None` after a short read timeout, which is where callers check
//! their deadlines and the cancel token.

use std::io::ErrorKind;
use std::time::Duration;

use anyhow::{Context, bail};
use hgota_common::network::interface::Adapter;
use pnet::datalink::{self, Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};
use tracing::debug;

const READ_TIMEOUT: Duration = Duration::from_millis(50);

pub trait FrameSender: Send {
    fn send_frame(&mut self, frame: &[u8]) -> anyhow::Result<()>;
}

pub trait FrameReceiver: Send {
    /// Next captured frame, or `None` once the read timeout passes.
    fn next_frame(&mut self) -> anyhow::Result<Option<Vec<u8>>>;
}

pub struct LinkHandle {
    pub tx: Box<dyn FrameSender>,
    pub rx: Box<dyn FrameReceiver>,
}

/// Opens a raw channel on an adapter.
pub trait LinkOpener: Send + Sync {
    fn open(&self, adapter: &Adapter) -> anyhow::Result<LinkHandle>;
}

/// Promiscuous `pnet` datalink channels on real adapters.
#[derive(Debug, Clone)]
pub struct RawLinkOpener {
    read_timeout: Duration,
}

impl Default for RawLinkOpener {
    fn default() -> Self {
        Self {
            read_timeout: READ_TIMEOUT,
        }
    }
}

impl RawLinkOpener {
    pub fn new() -> Self {
        Self::default()
    }

    fn config(&self) -> Config {
        Config {
            read_timeout: Some(self.read_timeout),
            promiscuous: true,
            ..Default::default()
        }
    }
}

impl LinkOpener for RawLinkOpener {
    fn open(&self, adapter: &Adapter) -> anyhow::Result<LinkHandle> {
        let intf: NetworkInterface = datalink::interfaces()
            .into_iter()
            .find(|i| i.name == adapter.name)
            .with_context(|| format!("interface {} is gone", adapter.name))?;

        let (tx, rx) = open_eth_channel(&intf, &self.config(), datalink::channel)?;
        debug!("raw channel open on {}", adapter.display_name);

        Ok(LinkHandle {
            tx: Box::new(RawSender(tx)),
            rx: Box::new(RawReceiver(rx)),
        })
    }
}

struct RawSender(Box<dyn DataLinkSender>);

impl FrameSender for RawSender {
    fn send_frame(&mut self, frame: &[u8]) -> anyhow::Result<()> {
        match self.0.send_to(frame, None) {
            Some(result) => result.context("sending frame"),
            None => bail!("datalink sender refused a {}-byte frame", frame.len()),
        }
    }
}

struct RawReceiver(Box<dyn DataLinkReceiver>);

impl FrameReceiver for RawReceiver {
    fn next_frame(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
        match self.0.next() {
            Ok(frame) => Ok(Some(frame.to_vec())),
            Err(e) if is_idle(e.kind()) => Ok(None),
            Err(e) => Err(e).context("receiving frame"),
        }
    }
}

fn is_idle(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}

fn open_eth_channel<F>(intf: &NetworkInterface, cfg: &Config, channel_opener: F)
    -> anyhow::Result<(Box<dyn DataLinkSender>, Box<dyn DataLinkReceiver>)>
where F: FnOnce(&NetworkInterface, Config) -> std::io::Result<datalink::Channel>
{
    let ch: Channel = channel_opener(intf, *cfg).with_context(|| format!("opening on {}", intf.name))?;
    match ch {
        Channel::Ethernet(tx, rx) => Ok((tx, rx)),
        _ => bail!("non-ethernet channel for {}", intf.name),
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
