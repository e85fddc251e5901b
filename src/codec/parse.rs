//! Text to address, mask and subnet parsing.
//!
//! Every function takes a string slice so callers can parse a part of a
//! line without copying it. Nothing here panics; malformed input is an
//! [`AddrError`].

use crate::error::AddrError;
use crate::models::{Addr, IpVersion, Subnet};

/// Longest accepted textual address (`ffff:...:255.255.255.255`).
pub const MAX_ADDR_LEN: usize = 45;

/// How many leading characters are inspected to guess the family.
const FAMILY_PROBE_LEN: usize = 5;

/// What [`get_subnet_or_ip`] found.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IpKind {
    Ipv4Addr,
    Ipv4Prefix,
    Ipv6Addr,
    Ipv6Prefix,
}

impl IpKind {
    fn new(version: IpVersion, prefix: bool) -> IpKind {
        match (version, prefix) {
            (IpVersion::V4, false) => IpKind::Ipv4Addr,
            (IpVersion::V4, true) => IpKind::Ipv4Prefix,
            (IpVersion::V6, false) => IpKind::Ipv6Addr,
            (IpVersion::V6, true) => IpKind::Ipv6Prefix,
        }
    }

    pub fn is_prefix(self) -> bool {
        matches!(self, IpKind::Ipv4Prefix | IpKind::Ipv6Prefix)
    }
}

/// Parse an IPv4 or IPv6 address.
///
/// # Examples
/// ```
/// use subnet_tool::codec::string2addr;
/// use subnet_tool::models::Addr;
/// assert_eq!(string2addr("10.0.0.1").unwrap(), Addr::V4(0x0a00_0001));
/// assert!(string2addr("10.0.0.256").is_err());
/// ```
pub fn string2addr(s: &str) -> Result<Addr, AddrError> {
    let bad = || AddrError::BadIp(s.to_string());
    if s.is_empty() || s.len() > MAX_ADDR_LEN {
        return Err(bad());
    }
    let probe = s
        .bytes()
        .take(FAMILY_PROBE_LEN)
        .find(|c| *c == b'.' || *c == b':');
    let addr = match probe {
        Some(b'.') => parse_ipv4(s).map(Addr::V4),
        Some(b':') => parse_ipv6(s).map(Addr::V6),
        _ => None,
    };
    addr.ok_or_else(bad)
}

/// Four dot separated decimal groups, each 0-255.
fn parse_ipv4(s: &str) -> Option<u32> {
    let mut value: u32 = 0;
    let mut groups = 0;
    for part in s.split('.') {
        groups += 1;
        if groups > 4 {
            return None;
        }
        value = (value << 8) | parse_octet(part)? as u32;
    }
    (groups == 4).then_some(value)
}

fn parse_octet(part: &str) -> Option<u8> {
    if part.is_empty() || part.len() > 3 || !part.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    part.parse::<u16>()
        .ok()
        .filter(|n| *n <= 255)
        .map(|n| n as u8)
}

fn parse_ipv6(s: &str) -> Option<[u16; 8]> {
    let (head, tail) = match s.find("::") {
        Some(i) => {
            let rest = &s[i + 2..];
            if rest.contains("::") {
                log::trace!("'{s}': '::' used twice");
                return None;
            }
            (&s[..i], Some(rest))
        }
        None => (s, None),
    };

    let mut blocks = [0u16; 8];
    match tail {
        None => {
            let all = parse_hextets(head, true)?;
            if all.len() != 8 {
                return None;
            }
            blocks.copy_from_slice(&all);
        }
        Some(tail) => {
            let front = parse_hextets(head, false)?;
            let back = parse_hextets(tail, true)?;
            // '::' stands for at least one zero block
            if front.len() + back.len() > 7 {
                return None;
            }
            blocks[..front.len()].copy_from_slice(&front);
            blocks[8 - back.len()..].copy_from_slice(&back);
        }
    }
    Some(blocks)
}

/// Colon separated hextets; the last one may be a dotted IPv4 address.
fn parse_hextets(part: &str, dotted_tail: bool) -> Option<Vec<u16>> {
    let mut out = Vec::with_capacity(8);
    if part.is_empty() {
        return Some(out);
    }
    let pieces: Vec<&str> = part.split(':').collect();
    let last = pieces.len() - 1;
    for (i, piece) in pieces.iter().enumerate() {
        if i == last && dotted_tail && piece.contains('.') {
            let v4 = parse_ipv4(piece)?;
            out.push((v4 >> 16) as u16);
            out.push(v4 as u16);
        } else {
            let hex = piece.bytes().all(|c| c.is_ascii_hexdigit());
            if piece.is_empty() || piece.len() > 4 || !hex {
                return None;
            }
            out.push(u16::from_str_radix(piece, 16).ok()?);
        }
        if out.len() > 8 {
            return None;
        }
    }
    Some(out)
}

/// Parse a prefix length or an IPv4 dotted netmask.
///
/// A dotted netmask must be a left-aligned run of ones.
///
/// # Examples
/// ```
/// use subnet_tool::codec::string2mask;
/// use subnet_tool::models::IpVersion;
/// assert_eq!(string2mask("255.255.255.0", IpVersion::V4).unwrap(), 24);
/// assert!(string2mask("255.0.255.0", IpVersion::V4).is_err());
/// ```
pub fn string2mask(s: &str, version: IpVersion) -> Result<u8, AddrError> {
    let bad = || AddrError::BadMask(s.to_string());
    if s.contains('.') {
        if version != IpVersion::V4 {
            return Err(bad());
        }
        let m = parse_ipv4(s).ok_or_else(bad)?;
        let ones = m.leading_ones();
        if ones + m.trailing_zeros() != 32 {
            log::trace!("'{s}': netmask is not contiguous");
            return Err(bad());
        }
        return Ok(ones as u8);
    }
    if s.is_empty() || s.len() > 3 || !s.bytes().all(|c| c.is_ascii_digit()) {
        return Err(bad());
    }
    let mask: u8 = s.parse().map_err(|_| bad())?;
    if mask > version.width() {
        return Err(bad());
    }
    Ok(mask)
}

/// Parse `addr` or `addr/mask`.
///
/// Without a mask the subnet is a host route (/32 or /128).
pub fn get_subnet_or_ip(s: &str) -> Result<(Subnet, IpKind), AddrError> {
    let (addr_part, mask_part) = match s.split_once('/') {
        Some((a, m)) => (a, Some(m)),
        None => (s, None),
    };
    let addr = string2addr(addr_part)?;
    match mask_part {
        None => Ok((Subnet::host(addr), IpKind::new(addr.version(), false))),
        Some(m) if m.contains('/') => Err(AddrError::BadPrefix(s.to_string())),
        Some(m) => {
            let mask = string2mask(m, addr.version())?;
            Ok((Subnet { addr, mask }, IpKind::new(addr.version(), true)))
        }
    }
}

/// Parse an abbreviated classful IPv4 prefix (`10`, `172.30/16`, `10.1.1.0`).
///
/// Missing octets are zero; a missing mask comes from the address class.
pub fn classfull_get_subnet(s: &str) -> Result<Subnet, AddrError> {
    let (addr_part, mask_part) = match s.split_once('/') {
        Some((a, m)) => (a, Some(m)),
        None => (s, None),
    };
    let groups: Vec<&str> = addr_part.split('.').collect();
    if groups.len() > 4 {
        return Err(AddrError::BadIp(s.to_string()));
    }
    let mut value: u32 = 0;
    for i in 0..4 {
        let octet = match groups.get(i) {
            Some(g) => parse_octet(g).ok_or_else(|| AddrError::BadIp(s.to_string()))?,
            None => 0,
        };
        value = (value << 8) | octet as u32;
    }
    let mask = match mask_part {
        Some(m) => string2mask(m, IpVersion::V4)?,
        None => classful_mask(value),
    };
    Ok(Subnet {
        addr: Addr::V4(value),
        mask,
    })
}

/// Prefix length of the class (A, B, C, D/E) `addr` belongs to.
pub fn classful_mask(addr: u32) -> u8 {
    match addr >> 24 {
        0..=127 => 8,
        128..=191 => 16,
        192..=223 => 24,
        _ => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v6(s: &str) -> [u16; 8] {
        match string2addr(s) {
            Ok(Addr::V6(b)) => b,
            other => panic!("{s} did not parse as IPv6: {other:?}"),
        }
    }

    #[test]
    fn test_ipv4_valid() {
        assert_eq!(string2addr("0.0.0.0").unwrap(), Addr::V4(0));
        assert_eq!(string2addr("255.255.255.255").unwrap(), Addr::V4(u32::MAX));
        assert_eq!(string2addr("192.168.001.010").unwrap(), Addr::V4(0xc0a8_010a));
    }

    #[test]
    fn test_ipv4_invalid() {
        for s in [
            "", "1.2.3", "1.2.3.4.5", "1..2.3", ".1.2.3", "1.2.3.", "256.1.1.1", "1.2.3.4a",
            "1.2.3.1000", "a.b.c.d", "1.2.3.4 ",
        ] {
            assert!(string2addr(s).is_err(), "{s:?} should be rejected");
        }
    }

    #[test]
    fn test_ipv6_valid() {
        assert_eq!(v6("::"), [0; 8]);
        assert_eq!(v6("::1"), [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(v6("2001:db8::1"), [0x2001, 0xdb8, 0, 0, 0, 0, 0, 1]);
        assert_eq!(v6("fe80::"), [0xfe80, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            v6("1:2:3:4:5:6:7:8"),
            [1, 2, 3, 4, 5, 6, 7, 8]
        );
        assert_eq!(v6("1:2:3::5:6:7:8"), [1, 2, 3, 0, 5, 6, 7, 8]);
        assert_eq!(
            v6("::ffff:10.1.2.3"),
            [0, 0, 0, 0, 0, 0xffff, 0x0a01, 0x0203]
        );
        assert_eq!(v6("::10.1.2.3"), [0, 0, 0, 0, 0, 0, 0x0a01, 0x0203]);
        assert_eq!(
            v6("0:0:0:0:0:ffff:1.2.3.4"),
            [0, 0, 0, 0, 0, 0xffff, 0x0102, 0x0304]
        );
    }

    #[test]
    fn test_ipv6_invalid() {
        for s in [
            ":",
            ":::",
            "1::2::3",
            "1:2:3:4:5:6:7",
            "1:2:3:4:5:6:7:8:9",
            "1:2:3:4::5:6:7:8",
            "12345::",
            ":1::",
            "1::2:",
            "g::1",
            "::1.2.3",
            "1.2.3.4::",
            "::ffff:1.2.3.4:5",
            "1:2:3:4:5:6:7:1.2.3.4",
            "+1::",
            "::+f",
            "1:+2::3",
        ] {
            assert!(string2addr(s).is_err(), "{s:?} should be rejected");
        }
    }

    #[test]
    fn test_string2mask_decimal() {
        assert_eq!(string2mask("0", IpVersion::V4).unwrap(), 0);
        assert_eq!(string2mask("32", IpVersion::V4).unwrap(), 32);
        assert!(string2mask("33", IpVersion::V4).is_err());
        assert_eq!(string2mask("128", IpVersion::V6).unwrap(), 128);
        assert!(string2mask("129", IpVersion::V6).is_err());
        assert!(string2mask("", IpVersion::V4).is_err());
        assert!(string2mask("-1", IpVersion::V4).is_err());
        assert!(string2mask("2a", IpVersion::V4).is_err());
    }

    #[test]
    fn test_string2mask_dotted() {
        assert_eq!(string2mask("255.255.255.0", IpVersion::V4).unwrap(), 24);
        assert_eq!(string2mask("255.255.255.255", IpVersion::V4).unwrap(), 32);
        assert_eq!(string2mask("0.0.0.0", IpVersion::V4).unwrap(), 0);
        assert_eq!(string2mask("255.255.254.0", IpVersion::V4).unwrap(), 23);
        assert_eq!(string2mask("128.0.0.0", IpVersion::V4).unwrap(), 1);
        assert!(string2mask("255.0.255.0", IpVersion::V4).is_err());
        assert!(string2mask("255.254.254.0", IpVersion::V4).is_err());
        assert!(string2mask("255.255.253.0", IpVersion::V4).is_err());
        assert!(string2mask("0.255.255.255", IpVersion::V4).is_err());
        assert!(string2mask("255.255.255.0", IpVersion::V6).is_err());
    }

    #[test]
    fn test_string2mask_accepts_every_contiguous_mask() {
        for len in 0..=32u32 {
            let m = u32::MAX.checked_shl(32 - len).unwrap_or(0);
            let dotted = std::net::Ipv4Addr::from(m).to_string();
            assert_eq!(string2mask(&dotted, IpVersion::V4).unwrap() as u32, len);
        }
    }

    #[test]
    fn test_get_subnet_or_ip() {
        let (s, kind) = get_subnet_or_ip("10.0.0.0/8").unwrap();
        assert_eq!(kind, IpKind::Ipv4Prefix);
        assert_eq!(s.addr, Addr::V4(0x0a00_0000));
        assert_eq!(s.mask, 8);

        let (s, kind) = get_subnet_or_ip("10.1.2.3").unwrap();
        assert_eq!(kind, IpKind::Ipv4Addr);
        assert_eq!(s.mask, 32);

        let (s, kind) = get_subnet_or_ip("2001:db8::/32").unwrap();
        assert_eq!(kind, IpKind::Ipv6Prefix);
        assert_eq!(s.mask, 32);

        let (s, kind) = get_subnet_or_ip("2001:db8::1").unwrap();
        assert_eq!(kind, IpKind::Ipv6Addr);
        assert_eq!(s.mask, 128);

        let (s, _) = get_subnet_or_ip("10.0.0.0/255.255.0.0").unwrap();
        assert_eq!(s.mask, 16);

        assert!(matches!(
            get_subnet_or_ip("10.0.0.0/33"),
            Err(AddrError::BadMask(_))
        ));
        assert!(matches!(
            get_subnet_or_ip("10.0.0/8"),
            Err(AddrError::BadIp(_))
        ));
        assert!(matches!(
            get_subnet_or_ip("10.0.0.0/8/8"),
            Err(AddrError::BadPrefix(_))
        ));
    }

    #[test]
    fn test_classfull_get_subnet() {
        let s = classfull_get_subnet("10").unwrap();
        assert_eq!((s.addr, s.mask), (Addr::V4(0x0a00_0000), 8));
        let s = classfull_get_subnet("172.30/16").unwrap();
        assert_eq!((s.addr, s.mask), (Addr::V4(0xac1e_0000), 16));
        let s = classfull_get_subnet("172.30").unwrap();
        assert_eq!(s.mask, 16);
        let s = classfull_get_subnet("192.168.1").unwrap();
        assert_eq!((s.addr, s.mask), (Addr::V4(0xc0a8_0100), 24));
        let s = classfull_get_subnet("224.1.1.1").unwrap();
        assert_eq!(s.mask, 4);
        let s = classfull_get_subnet("10.1.1.0/24").unwrap();
        assert_eq!(s.mask, 24);
        assert!(classfull_get_subnet("10.1.1.1.1").is_err());
        assert!(classfull_get_subnet("300/8").is_err());
        assert!(classfull_get_subnet("10/40").is_err());
    }
}
