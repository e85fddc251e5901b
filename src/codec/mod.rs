//! Conversion between text and the address model.
//!
//! - [`parse`] - addresses, masks, prefixes and classful prefixes
//! - [`render`] - addresses and subnets at an IPv6 compression level

mod parse;
mod render;

pub use parse::{
    classful_mask, classfull_get_subnet, get_subnet_or_ip, string2addr, string2mask, IpKind,
    MAX_ADDR_LEN,
};
pub use render::{
    addr2str, mask2str, render_addr, render_subnet, subnet2str, Compression, IPV4_STRLEN,
    IPV6_STRLEN,
};
