//! `ipcalc` style description of a subnet.

use super::relation::{next_subnet, previous_subnet};
use crate::codec::render_subnet;
use crate::models::{IpVersion, Route, Subnet};
use crate::output::{fprint_route, FormatOptions};

const REPORT: [(&str, &str); 6] = [
    ("Address", "%I"),
    ("Netmask", "%M = %m"),
    ("Network", "%N/%m"),
    ("HostMin", "%L"),
    ("HostMax", "%U"),
    ("Broadcast", "%B"),
];

/// Usable host count; IPv4 blocks up to /30 lose network and broadcast.
fn host_count(subnet: &Subnet) -> String {
    let bits = u32::from(subnet.addr.width() - subnet.mask);
    let size = match 1u128.checked_shl(bits) {
        Some(size) => size,
        None => return format!("2^{bits}"),
    };
    match subnet.version() {
        IpVersion::V4 if subnet.mask < 31 => (size - 2).to_string(),
        _ => size.to_string(),
    }
}

/// Report lines describing `subnet`.
///
/// # Arguments
/// * `subnet` - The subnet to describe, host bits allowed
/// * `opts` - Formatter options (IPv6 compression)
///
/// # Returns
/// One `Label: value` line per property
pub fn subnet_info(subnet: &Subnet, opts: &FormatOptions) -> Vec<String> {
    log::debug!("subnet_info({subnet})");
    let route = Route::new(*subnet, "", None, Vec::new());
    let mut lines: Vec<String> = REPORT
        .iter()
        .map(|(label, fmt)| {
            let value = fprint_route(fmt, Some(&route), &[], opts);
            format!("{:<10} {value}", format!("{label}:"))
        })
        .collect();
    lines.push(format!("{:<10} {}", "Hosts:", host_count(subnet)));
    let normal = subnet.normalized();
    lines.push(format!(
        "{:<10} {}",
        "Previous:",
        render_subnet(&previous_subnet(&normal), opts.compress)
    ));
    lines.push(format!(
        "{:<10} {}",
        "Next:",
        render_subnet(&next_subnet(&normal), opts.compress)
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_info_ipv4() {
        let s: Subnet = "192.168.1.77/24".parse().unwrap();
        let lines = subnet_info(&s, &FormatOptions::default());
        assert_eq!(
            lines,
            [
                "Address:   192.168.1.77",
                "Netmask:   255.255.255.0 = 24",
                "Network:   192.168.1.0/24",
                "HostMin:   192.168.1.1",
                "HostMax:   192.168.1.254",
                "Broadcast: 192.168.1.255",
                "Hosts:     254",
                "Previous:  192.168.0.0/24",
                "Next:      192.168.2.0/24",
            ]
        );
    }

    #[test]
    fn test_subnet_info_ipv6_and_edges() {
        let s: Subnet = "2001:db8::/127".parse().unwrap();
        let lines = subnet_info(&s, &FormatOptions::default());
        assert_eq!(lines[1], "Netmask:   127 = 127");
        assert_eq!(lines[6], "Hosts:     2");

        let all: Subnet = "::/0".parse().unwrap();
        assert_eq!(subnet_info(&all, &FormatOptions::default())[6], "Hosts:     2^128");

        let p2p: Subnet = "10.0.0.0/31".parse().unwrap();
        let lines = subnet_info(&p2p, &FormatOptions::default());
        assert_eq!(lines[3], "HostMin:   10.0.0.0");
        assert_eq!(lines[6], "Hosts:     2");
    }
}
