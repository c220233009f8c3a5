//! # Adapter Enumeration
//!
//! Turns the operating system's interface list into [`Adapter`] values.
//!
//! Enumeration happens through an explicit [`InterfaceEnumerator`] value that
//! the caller constructs for each scan; nothing is cached between calls.

use pnet::datalink::NetworkInterface;
use pnet::util::MacAddr;

use crate::error::OtaError;
use crate::network::mac;

/// A network adapter as seen at enumeration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adapter {
    /// OS handle used to open a raw channel.
    pub name: String,
    /// Human readable name, falls back to `name`.
    pub display_name: String,
    pub index: u32,
    pub mac: Option<MacAddr>,
    pub loopback: bool,
}

impl From<&NetworkInterface> for Adapter {
    fn from(interface: &NetworkInterface) -> Self {
        let description = interface.description.trim();
        let display_name = if description.is_empty() {
            interface.name.clone()
        } else {
            description.to_string()
        };

        Self {
            name: interface.name.clone(),
            display_name,
            index: interface.index,
            mac: interface.mac,
            loopback: interface.is_loopback(),
        }
    }
}

impl Adapter {
    /// The adapter's own hardware address, or [`OtaError::AdapterUnusable`]
    /// when it has none or it is all zeros.
    pub fn hardware_addr(&self) -> Result<MacAddr, OtaError> {
        match self.mac {
            Some(addr) if !mac::is_null(addr) => Ok(addr),
            _ => Err(OtaError::AdapterUnusable {
                adapter: self.display_name.clone(),
            }),
        }
    }

    pub fn is_loopback(&self) -> bool {
        let lname = self.name.to_ascii_lowercase();
        self.loopback || lname == "lo" || lname.contains("loopback")
    }

    /// Matches either the OS name or the display name, ignoring case.
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || self.display_name.eq_ignore_ascii_case(name)
    }
}

/// Source of adapters for a scan.
pub trait InterfaceEnumerator: Send + Sync {
    fn adapters(&self) -> Vec<Adapter>;
}

/// Enumerates the adapters of this machine through `pnet`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInterfaces;

impl InterfaceEnumerator for SystemInterfaces {
    fn adapters(&self) -> Vec<Adapter> {
        pnet::datalink::interfaces()
            .iter()
            .map(Adapter::from)
            .collect()
    }
}

/// Every non-loopback adapter. Adapters without a hardware address are kept;
/// the scanner skips them on its own.
pub fn usable_adapters(enumerator: &dyn InterfaceEnumerator) -> Vec<Adapter> {
    enumerator
        .adapters()
        .into_iter()
        .filter(|adapter| !adapter.is_loopback())
        .collect()
}

/// Exact OS name lookup. Unlike [`find_adapter`] it never falls back to
/// display names, so it cannot pick a different adapter whose display name
/// collides.
pub fn adapter_by_os_name(enumerator: &dyn InterfaceEnumerator, name: &str) -> Option<Adapter> {
    usable_adapters(enumerator)
        .into_iter()
        .find(|adapter| adapter.name == name)
}

pub fn find_adapter(enumerator: &dyn InterfaceEnumerator, name: &str) -> Option<Adapter> {
    usable_adapters(enumerator)
        .into_iter()
        .find(|adapter| adapter.matches(name))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
