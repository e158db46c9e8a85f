use core::fmt::{self, Write};
use core::str::FromStr;

use bt_hci::param::BdAddr;

/// Peer device address (`BD_ADDR`) of an AVRCP target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BluetoothAddress(pub [u8; 6]);

/// Returned when a textual address is not six colon-separated hex octets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseAddressError;

impl fmt::Display for ParseAddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected address in the form XX:XX:XX:XX:XX:XX")
    }
}

impl core::error::Error for ParseAddressError {}

impl BluetoothAddress {
    /// Create a new address from its six octets
    #[must_use]
    pub const fn new(addr: [u8; 6]) -> Self {
        Self(addr)
    }

    /// Raw address octets
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Render as `XX:XX:XX:XX:XX:XX` without allocating
    #[must_use]
    pub fn format_hex(&self) -> heapless::String<17> {
        let mut out = heapless::String::new();
        // 17 bytes always fit
        write!(out, "{self}").ok();
        out
    }
}

impl fmt::Display for BluetoothAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl FromStr for BluetoothAddress {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 6];
        let mut parts = s.split(':');
        for byte in &mut bytes {
            let part = parts.next().ok_or(ParseAddressError)?;
            if part.len() != 2 {
                return Err(ParseAddressError);
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| ParseAddressError)?;
        }
        if parts.next().is_some() {
            return Err(ParseAddressError);
        }
        Ok(Self(bytes))
    }
}

impl From<[u8; 6]> for BluetoothAddress {
    fn from(addr: [u8; 6]) -> Self {
        Self(addr)
    }
}

impl From<BdAddr> for BluetoothAddress {
    fn from(addr: BdAddr) -> Self {
        let mut bytes = [0u8; 6];
        bytes.copy_from_slice(addr.raw());
        Self(bytes)
    }
}

impl From<BluetoothAddress> for BdAddr {
    fn from(addr: BluetoothAddress) -> Self {
        BdAddr::new(addr.0)
    }
}

impl TryFrom<&[u8]> for BluetoothAddress {
    type Error = ParseAddressError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; 6]>::try_from(bytes)
            .map(Self)
            .map_err(|_| ParseAddressError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_matches_reference_console() {
        let addr = BluetoothAddress::new([0x00, 0x1B, 0xDC, 0x08, 0x0A, 0xA5]);
        assert_eq!(addr.format_hex().as_str(), "00:1B:DC:08:0A:A5");
    }

    #[test]
    fn test_parse_accepts_mixed_case() {
        let addr: BluetoothAddress = "00:1b:DC:08:0a:A5".parse().unwrap();
        assert_eq!(addr.as_bytes(), &[0x00, 0x1B, 0xDC, 0x08, 0x0A, 0xA5]);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("00:1B:DC:08:0A".parse::<BluetoothAddress>().is_err());
        assert!("00:1B:DC:08:0A:A5:FF".parse::<BluetoothAddress>().is_err());
        assert!("001B:DC:08:0A:A5".parse::<BluetoothAddress>().is_err());
        assert!("00-1B-DC-08-0A-A5".parse::<BluetoothAddress>().is_err());
        assert!("0G:1B:DC:08:0A:A5".parse::<BluetoothAddress>().is_err());
    }

    #[test]
    fn test_bd_addr_conversion() {
        let addr = BluetoothAddress::new([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
        let bd_addr: BdAddr = addr.into();
        assert_eq!(BluetoothAddress::from(bd_addr), addr);
    }

    #[test]
    fn test_try_from_slice_length() {
        assert!(BluetoothAddress::try_from(&[1u8, 2, 3, 4, 5, 6][..]).is_ok());
        assert!(BluetoothAddress::try_from(&[1u8, 2, 3][..]).is_err());
    }
}
