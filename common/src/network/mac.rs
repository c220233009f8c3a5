use std::sync::OnceLock;

use mac_oui::Oui;
use pnet::util::MacAddr;

use crate::error::OtaError;

static OUI_DB: OnceLock<Option<Oui>> = OnceLock::new();

/// Retrieves or initializes the **Organizationally unique identifier** database.
///
/// Used for linking a vendor to a device hardware address.
fn get_oui_db() -> Option<&'static Oui> {
    OUI_DB.get_or_init(|| Oui::default().ok()).as_ref()
}

/// Identify the vendor of a MAC address.
pub fn get_vendor(mac: MacAddr) -> Option<String> {
    let db = get_oui_db()?;
    let mac_str = mac.to_string();
    match db.lookup_by_mac(&mac_str) {
        Ok(Some(entry)) => Some(entry.company_name.clone()),
        _ => None,
    }
}

/// Parses exactly six colon separated two-digit hex octets.
pub fn parse_mac(s: &str) -> Result<MacAddr, OtaError> {
    let bad_mac = || OtaError::format(format!("Bad MAC: {s}"));

    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.len() != 6 {
        return Err(bad_mac());
    }

    let mut octets = [0u8; 6];
    for (octet, part) in octets.iter_mut().zip(parts) {
        if part.len() != 2 {
            return Err(bad_mac());
        }
        *octet = u8::from_str_radix(part, 16).map_err(|_| bad_mac())?;
    }

    let [a, b, c, d, e, f] = octets;
    Ok(MacAddr::new(a, b, c, d, e, f))
}

pub fn is_null(mac: MacAddr) -> bool {
    mac == MacAddr::zero()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mac_accepts_mixed_case() {
        let mac = parse_mac("aa:BB:0c:1D:2e:3F").unwrap();
        assert_eq!(mac, MacAddr::new(0xaa, 0xbb, 0x0c, 0x1d, 0x2e, 0x3f));
    }

    #[test]
    fn parse_mac_rejects_short_address() {
        assert!(matches!(parse_mac("AA:BB:CC"), Err(OtaError::Format(_))));
    }

    #[test]
    fn parse_mac_rejects_single_digit_octets() {
        assert!(parse_mac("a:b:c:d:e:f").is_err());
    }

    #[test]
    fn parse_mac_rejects_non_hex() {
        assert!(parse_mac("zz:00:00:00:00:00").is_err());
        assert!(parse_mac("aa-bb-cc-dd-ee-ff").is_err());
        assert!(parse_mac("").is_err());
    }

    #[test]
    fn null_mac_is_detected() {
        assert!(is_null(MacAddr::zero()));
        assert!(!is_null(MacAddr::broadcast()));
    }
}
