//! Subnet (address + prefix length).

use super::{Addr, IpVersion};
use crate::codec;
use crate::error::AddrError;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// An address with a prefix length.
///
/// The stored address need not be the network base; the relation engine
/// normalizes on the fly. Ordering is by family, address, then mask.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Subnet {
    /// The address, not necessarily aligned on `mask`.
    pub addr: Addr,
    /// Prefix length (0-32 for IPv4, 0-128 for IPv6).
    pub mask: u8,
}

impl Subnet {
    /// Build a subnet, rejecting masks wider than the address family.
    pub fn new(addr: Addr, mask: u8) -> Result<Subnet, AddrError> {
        if mask > addr.width() {
            return Err(AddrError::BadMask(mask.to_string()));
        }
        Ok(Subnet { addr, mask })
    }

    /// A host subnet (/32 or /128).
    pub fn host(addr: Addr) -> Subnet {
        Subnet {
            addr,
            mask: addr.width(),
        }
    }

    pub fn version(&self) -> IpVersion {
        self.addr.version()
    }

    /// Lowest (network) address of the subnet.
    pub fn lo(&self) -> Addr {
        self.addr.network(self.mask)
    }

    /// Highest (broadcast) address of the subnet.
    pub fn hi(&self) -> Addr {
        self.addr.broadcast(self.mask)
    }

    /// True if `addr` falls inside the subnet.
    pub fn contains(&self, addr: Addr) -> bool {
        addr.version() == self.version() && addr.network(self.mask) == self.lo()
    }

    /// Same subnet with the host bits cleared.
    pub fn normalized(&self) -> Subnet {
        Subnet {
            addr: self.lo(),
            mask: self.mask,
        }
    }
}

impl FromStr for Subnet {
    type Err = AddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        codec::get_subnet_or_ip(s.trim()).map(|(subnet, _)| subnet)
    }
}

impl std::fmt::Display for Subnet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}

impl Serialize for Subnet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Subnet {
    fn deserialize<D>(deserializer: D) -> Result<Subnet, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Subnet::from_str(&s).map_err(|e| de::Error::custom(format!("invalid subnet {s}: {e}")))
    }
}
