//! Address, subnet and mask rendering.

use crate::error::RenderError;
use crate::models::{Addr, IpVersion, Subnet};
use itertools::Itertools;
use std::fmt;
use std::net::Ipv4Addr;

/// Minimum buffer a caller must declare for an IPv4 address.
pub const IPV4_STRLEN: usize = 16;
/// Minimum buffer a caller must declare for an IPv6 address.
pub const IPV6_STRLEN: usize = 40;

/// IPv6 textual form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Compression {
    /// `2001:0db8:0000:0000:0000:0000:0000:0001`
    Full,
    /// `2001:db8:0:0:0:0:0:1`
    NoPad,
    /// `2001:db8::1`
    Compressed,
    /// like [`Compression::Compressed`], with `::a.b.c.d` and `::ffff:a.b.c.d`
    #[default]
    Mixed,
}

impl TryFrom<u8> for Compression {
    type Error = RenderError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Compression::Full),
            1 => Ok(Compression::NoPad),
            2 => Ok(Compression::Compressed),
            3 => Ok(Compression::Mixed),
            _ => Err(RenderError::BadLevel(level)),
        }
    }
}

impl From<Compression> for u8 {
    fn from(c: Compression) -> u8 {
        match c {
            Compression::Full => 0,
            Compression::NoPad => 1,
            Compression::Compressed => 2,
            Compression::Mixed => 3,
        }
    }
}

/// Render `addr` into a buffer of `buf_len` bytes at compression `level`.
///
/// Fails closed when the declared buffer is smaller than [`IPV4_STRLEN`] or
/// [`IPV6_STRLEN`].
pub fn addr2str(addr: &Addr, buf_len: usize, level: u8) -> Result<String, RenderError> {
    let needed = match addr.version() {
        IpVersion::V4 => IPV4_STRLEN,
        IpVersion::V6 => IPV6_STRLEN,
    };
    if buf_len < needed {
        log::error!("addr2str: buffer of {buf_len} bytes, need {needed}");
        return Err(RenderError::BufferTooSmall {
            given: buf_len,
            needed,
        });
    }
    Ok(render_addr(addr, Compression::try_from(level)?))
}

/// Render `subnet` as `addr/mask` into a buffer of `buf_len` bytes.
pub fn subnet2str(subnet: &Subnet, buf_len: usize, level: u8) -> Result<String, RenderError> {
    // room for "/128"
    let needed = match subnet.version() {
        IpVersion::V4 => IPV4_STRLEN + 3,
        IpVersion::V6 => IPV6_STRLEN + 4,
    };
    if buf_len < needed {
        log::error!("subnet2str: buffer of {buf_len} bytes, need {needed}");
        return Err(RenderError::BufferTooSmall {
            given: buf_len,
            needed,
        });
    }
    Ok(render_subnet(subnet, Compression::try_from(level)?))
}

pub fn render_subnet(subnet: &Subnet, level: Compression) -> String {
    format!("{}/{}", render_addr(&subnet.addr, level), subnet.mask)
}

pub fn render_addr(addr: &Addr, level: Compression) -> String {
    match addr {
        Addr::V4(v) => Ipv4Addr::from(*v).to_string(),
        Addr::V6(b) => render_v6(b, level),
    }
}

fn render_v6(b: &[u16; 8], level: Compression) -> String {
    match level {
        Compression::Full => b.iter().map(|w| format!("{w:04x}")).join(":"),
        Compression::NoPad => b.iter().map(|w| format!("{w:x}")).join(":"),
        Compression::Compressed => compress(b),
        Compression::Mixed => {
            let [a, c] = b[6].to_be_bytes();
            let [d, e] = b[7].to_be_bytes();
            if b[..5].iter().all(|w| *w == 0) && b[5] == 0xffff {
                format!("::ffff:{a}.{c}.{d}.{e}")
            } else if b[..6].iter().all(|w| *w == 0) && b[6] != 0 {
                format!("::{a}.{c}.{d}.{e}")
            } else {
                compress(b)
            }
        }
    }
}

/// Replace the longest run of at least two zero blocks by `::`.
///
/// On equal length the right-most run wins.
fn compress(b: &[u16; 8]) -> String {
    let hex = |blocks: &[u16]| blocks.iter().map(|w| format!("{w:x}")).join(":");
    match longest_zero_run(b) {
        Some((start, len)) => format!("{}::{}", hex(&b[..start]), hex(&b[start + len..])),
        None => hex(b),
    }
}

fn longest_zero_run(b: &[u16; 8]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut i = 0;
    while i < b.len() {
        if b[i] != 0 {
            i += 1;
            continue;
        }
        let start = i;
        while i < b.len() && b[i] == 0 {
            i += 1;
        }
        let len = i - start;
        if len >= 2 && best.map_or(true, |(_, l)| len >= l) {
            best = Some((start, len));
        }
    }
    best
}

/// Dotted netmask for an IPv4 prefix length (clamped to 32).
pub fn mask2str(mask: u8) -> String {
    let m = u32::MAX.checked_shl(32 - mask.min(32) as u32).unwrap_or(0);
    Ipv4Addr::from(m).to_string()
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&render_addr(self, Compression::Mixed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::string2addr;

    fn r(s: &str, level: u8) -> String {
        addr2str(&string2addr(s).unwrap(), IPV6_STRLEN, level).unwrap()
    }

    #[test]
    fn test_render_levels() {
        assert_eq!(r("2001:db8::1", 0), "2001:0db8:0000:0000:0000:0000:0000:0001");
        assert_eq!(r("2001:db8::1", 1), "2001:db8:0:0:0:0:0:1");
        assert_eq!(r("2001:db8::1", 2), "2001:db8::1");
        assert_eq!(r("2001:db8::1", 3), "2001:db8::1");
    }

    #[test]
    fn test_render_embedded_ipv4() {
        assert_eq!(r("::1", 3), "::1");
        assert_eq!(r("::", 3), "::");
        assert_eq!(r("::10.1.2.3", 3), "::10.1.2.3");
        assert_eq!(r("::10.1.2.3", 2), "::a01:203");
        assert_eq!(r("::ffff:192.168.1.1", 3), "::ffff:192.168.1.1");
        assert_eq!(r("::ffff:192.168.1.1", 2), "::ffff:c0a8:101");
    }

    #[test]
    fn test_compression_rules() {
        // single zero block is never compressed
        assert_eq!(r("1:0:2:3:4:5:6:7", 3), "1:0:2:3:4:5:6:7");
        // longest run wins
        assert_eq!(r("1:0:0:2:0:0:0:3", 3), "1:0:0:2::3");
        // tie goes right
        assert_eq!(r("1:0:0:2:3:0:0:4", 3), "1:0:0:2:3::4");
        assert_eq!(r("0:0:1:2:3:4:0:0", 3), "0:0:1:2:3:4::");
        assert_eq!(r("fe80::", 3), "fe80::");
    }

    #[test]
    fn test_buffer_contract() {
        let v4 = string2addr("10.0.0.1").unwrap();
        assert_eq!(addr2str(&v4, 16, 3).unwrap(), "10.0.0.1");
        assert!(matches!(
            addr2str(&v4, 15, 3),
            Err(RenderError::BufferTooSmall { given: 15, needed: 16 })
        ));
        let v6 = string2addr("::1").unwrap();
        assert!(addr2str(&v6, 39, 3).is_err());
        assert!(matches!(addr2str(&v6, 40, 4), Err(RenderError::BadLevel(4))));
    }

    #[test]
    fn test_subnet2str() {
        let s = crate::codec::get_subnet_or_ip("2001:db8::/32").unwrap().0;
        assert_eq!(subnet2str(&s, 64, 3).unwrap(), "2001:db8::/32");
        assert!(subnet2str(&s, 40, 3).is_err());
    }

    #[test]
    fn test_mask2str() {
        assert_eq!(mask2str(0), "0.0.0.0");
        assert_eq!(mask2str(24), "255.255.255.0");
        assert_eq!(mask2str(23), "255.255.254.0");
        assert_eq!(mask2str(32), "255.255.255.255");
    }

    #[test]
    fn test_roundtrip_all_levels() {
        for s in [
            "::",
            "::1",
            "2001:db8::1",
            "fe80::1:2",
            "::ffff:10.0.0.1",
            "1:2:3:4:5:6:7:8",
            "0:0:1::",
            "10.20.30.40",
        ] {
            let a = string2addr(s).unwrap();
            for level in 0..=3u8 {
                let text = addr2str(&a, IPV6_STRLEN, level).unwrap();
                assert_eq!(string2addr(&text).unwrap(), a, "{s} at level {level}: {text}");
            }
        }
    }
}
