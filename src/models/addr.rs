//! IPv4/IPv6 address value.

use super::bitbuf;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Width in bits of an IPv4 address.
pub const IPV4_BITS: u8 = 32;
/// Width in bits of an IPv6 address.
pub const IPV6_BITS: u8 = 128;

/// Address family.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Number of bits of an address of this family.
    pub fn width(self) -> u8 {
        match self {
            IpVersion::V4 => IPV4_BITS,
            IpVersion::V6 => IPV6_BITS,
        }
    }
}

/// An IPv4 or IPv6 address.
///
/// IPv6 values are eight 16-bit blocks, block 0 being the most significant.
/// The derived ordering sorts every IPv4 address before every IPv6 address
/// and is numeric within a family.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Addr {
    V4(u32),
    V6([u16; 8]),
}

impl Default for Addr {
    fn default() -> Self {
        Addr::V4(0)
    }
}

impl Addr {
    pub fn version(&self) -> IpVersion {
        match self {
            Addr::V4(_) => IpVersion::V4,
            Addr::V6(_) => IpVersion::V6,
        }
    }

    pub fn width(&self) -> u8 {
        self.version().width()
    }

    /// The all-zero address of `version`.
    pub fn zero(version: IpVersion) -> Addr {
        match version {
            IpVersion::V4 => Addr::V4(0),
            IpVersion::V6 => Addr::V6([0; 8]),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Addr::V4(v) => *v == 0,
            Addr::V6(b) => b.iter().all(|w| *w == 0),
        }
    }

    /// Logical right shift; shifting by the full width or more gives zero.
    pub fn shift_right(&self, bits: u32) -> Addr {
        match *self {
            Addr::V4(v) => Addr::V4(v.checked_shr(bits).unwrap_or(0)),
            Addr::V6(mut b) => {
                bitbuf::shift_right(&mut b, bits as usize);
                Addr::V6(b)
            }
        }
    }

    /// Logical left shift; shifting by the full width or more gives zero.
    pub fn shift_left(&self, bits: u32) -> Addr {
        match *self {
            Addr::V4(v) => Addr::V4(v.checked_shl(bits).unwrap_or(0)),
            Addr::V6(mut b) => {
                bitbuf::shift_left(&mut b, bits as usize);
                Addr::V6(b)
            }
        }
    }

    /// Add one, wrapping on overflow.
    pub fn increase(&self) -> Addr {
        match *self {
            Addr::V4(v) => Addr::V4(v.wrapping_add(1)),
            Addr::V6(mut b) => {
                bitbuf::increase(&mut b);
                Addr::V6(b)
            }
        }
    }

    /// Subtract one, wrapping on underflow.
    pub fn decrease(&self) -> Addr {
        match *self {
            Addr::V4(v) => Addr::V4(v.wrapping_sub(1)),
            Addr::V6(mut b) => {
                bitbuf::decrease(&mut b);
                Addr::V6(b)
            }
        }
    }

    /// Number of trailing zero bits, the full width for a zero address.
    pub fn trailing_zeros(&self) -> u32 {
        match self {
            Addr::V4(v) => v.trailing_zeros(),
            Addr::V6(b) => bitbuf::trailing_zeros(b) as u32,
        }
    }

    /// Keep the `mask` most significant bits, clear the others.
    pub fn network(&self, mask: u8) -> Addr {
        let host_bits = self.width().saturating_sub(mask) as u32;
        self.shift_right(host_bits).shift_left(host_bits)
    }

    /// Keep the `mask` most significant bits, set the others.
    pub fn broadcast(&self, mask: u8) -> Addr {
        let net = self.network(mask);
        match (net, Addr::host_mask(self.version(), mask)) {
            (Addr::V4(n), Addr::V4(h)) => Addr::V4(n | h),
            (Addr::V6(mut n), Addr::V6(h)) => {
                for (w, hw) in n.iter_mut().zip(h.iter()) {
                    *w |= hw;
                }
                Addr::V6(n)
            }
            // host_mask follows the version of self
            (net, _) => net,
        }
    }

    /// All host bits set for a prefix of length `mask`.
    pub fn host_mask(version: IpVersion, mask: u8) -> Addr {
        let ones = match version {
            IpVersion::V4 => Addr::V4(u32::MAX),
            IpVersion::V6 => Addr::V6([0xffff; 8]),
        };
        ones.shift_right(mask as u32)
    }

    /// Value of bit `index` counted from the most significant bit.
    pub fn bit(&self, index: u8) -> bool {
        match self {
            Addr::V4(v) => index < 32 && (v >> (31 - index)) & 1 == 1,
            Addr::V6(b) => {
                index < 128 && (b[index as usize / 16] >> (15 - index % 16)) & 1 == 1
            }
        }
    }

    /// The four octets of an IPv4 address, or the last 32 bits of an IPv6 one.
    pub fn low_octets(&self) -> [u8; 4] {
        match self {
            Addr::V4(v) => v.to_be_bytes(),
            Addr::V6(b) => {
                let [a, c] = b[6].to_be_bytes();
                let [d, e] = b[7].to_be_bytes();
                [a, c, d, e]
            }
        }
    }
}

impl From<Ipv4Addr> for Addr {
    fn from(a: Ipv4Addr) -> Self {
        Addr::V4(u32::from(a))
    }
}

impl From<Ipv6Addr> for Addr {
    fn from(a: Ipv6Addr) -> Self {
        Addr::V6(a.segments())
    }
}

impl From<IpAddr> for Addr {
    fn from(a: IpAddr) -> Self {
        match a {
            IpAddr::V4(v4) => v4.into(),
            IpAddr::V6(v6) => v6.into(),
        }
    }
}

impl From<Addr> for IpAddr {
    fn from(a: Addr) -> Self {
        match a {
            Addr::V4(v) => IpAddr::V4(Ipv4Addr::from(v)),
            Addr::V6(b) => IpAddr::V6(Ipv6Addr::from(b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_and_broadcast_v4() {
        let a = Addr::from(Ipv4Addr::new(192, 168, 1, 42));
        assert_eq!(a.network(24), Addr::from(Ipv4Addr::new(192, 168, 1, 0)));
        assert_eq!(a.broadcast(24), Addr::from(Ipv4Addr::new(192, 168, 1, 255)));
        assert_eq!(a.network(0), Addr::V4(0));
        assert_eq!(a.broadcast(0), Addr::V4(u32::MAX));
        assert_eq!(a.network(32), a);
    }

    #[test]
    fn test_network_and_broadcast_v6() {
        let a = Addr::from("2001:db8::1234".parse::<Ipv6Addr>().unwrap());
        assert_eq!(
            a.network(64),
            Addr::from("2001:db8::".parse::<Ipv6Addr>().unwrap())
        );
        assert_eq!(
            a.broadcast(64),
            Addr::from("2001:db8::ffff:ffff:ffff:ffff".parse::<Ipv6Addr>().unwrap())
        );
        assert_eq!(a.network(128), a);
    }

    #[test]
    fn test_ordering_v4_before_v6() {
        assert!(Addr::V4(u32::MAX) < Addr::V6([0; 8]));
        assert!(Addr::V6([0, 0, 0, 0, 0, 0, 0, 2]) > Addr::V6([0, 0, 0, 0, 0, 0, 0, 1]));
    }

    #[test]
    fn test_bit() {
        let a = Addr::V4(0x8000_0001);
        assert!(a.bit(0));
        assert!(!a.bit(1));
        assert!(a.bit(31));
        let b = Addr::V6([0, 0x0001, 0, 0, 0, 0, 0, 0]);
        assert!(b.bit(31));
        assert!(!b.bit(30));
    }

    #[test]
    fn test_increase_decrease_wrap() {
        assert_eq!(Addr::V4(u32::MAX).increase(), Addr::V4(0));
        assert_eq!(Addr::V4(0).decrease(), Addr::V4(u32::MAX));
        assert_eq!(Addr::V6([0xffff; 8]).increase(), Addr::V6([0; 8]));
    }
}
