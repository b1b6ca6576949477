//! Next hop address.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

/// An IPv4 or IPv6 neighbor address, usable as part of a hashed store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpAddress(IpAddr);

impl IpAddress {
    pub const fn v4(a: u8, b: u8, c: u8, d: u8) -> Self {
        IpAddress(IpAddr::V4(Ipv4Addr::new(a, b, c, d)))
    }
}

impl From<IpAddr> for IpAddress {
    fn from(addr: IpAddr) -> Self {
        IpAddress(addr)
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
