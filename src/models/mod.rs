//! Domain models.
//!
//! - [`Addr`] - IPv4/IPv6 address value
//! - [`Subnet`] - address with prefix length
//! - [`Route`] and [`RouteFile`] - routes sharing an attribute name table
//! - [`BgpRoute`] and [`BgpFile`] - BGP table entries
//! - [`bitbuf`] - 128-bit arithmetic over 16-bit blocks

mod addr;
mod bgp;
pub mod bitbuf;
mod route;
mod subnet;

pub use addr::{Addr, IpVersion, IPV4_BITS, IPV6_BITS};
pub use bgp::{BgpFile, BgpRoute, Origin, MAX_AS_PATH_LEN};
pub use route::{Route, RouteFile, COMMENT};
pub use subnet::Subnet;
