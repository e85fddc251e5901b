//! Cisco IOS `show ip route` text to a route file.

use super::Patterns;
use crate::codec::classful_mask;
use crate::config::Config;
use crate::csv::LoadReport;
use crate::models::{Addr, Route, RouteFile, Subnet};
use crate::scanf::Sto;
use std::error::Error;

/// `172.16.0.0/24 is subnetted, 2 subnets`
const SUBNETTED: &str = "%Q is subnetted, %u";
/// `10.0.0.0/8 is variably subnetted, 4 subnets, 2 masks`
const VARIABLY: &str = "%Q is variably subnetted, %u";
/// `O   10.1.0.0/16 ...` or `D   172.16.1.0 ...` under a subnetted header
const CODE_PREFIX: &str = "%[A-Za-z*] +%I/%u";
/// `O E2  192.168.10.0/24 ...`
const CODE_SUB_PREFIX: &str = "%[A-Za-z*] +%[A-Za-z0-9] +%I/%u";
/// `[110/2] via 10.0.0.3, ...` below a route with several next hops
const CONTINUATION: &str = "\\[%u/%u\\] (via) %I";
const CONNECTED: &str = "(is directly connected), %32[^, \\n]";
const VIA_UPTIME: &str = "(via) %I, [0-9a-z:]+, %32[^, \\n]";
const VIA_DEVICE: &str = "(via) %I, %W%32[^, \\n]";

const ALL: [&str; 8] = [
    SUBNETTED,
    VARIABLY,
    CODE_PREFIX,
    CODE_SUB_PREFIX,
    CONTINUATION,
    CONNECTED,
    VIA_UPTIME,
    VIA_DEVICE,
];

fn v4(s: &Subnet) -> u32 {
    match s.addr {
        Addr::V4(a) => a,
        Addr::V6(_) => 0,
    }
}

fn classful_network(a: u32) -> u32 {
    a & u32::MAX << (32 - classful_mask(a))
}

fn is_preamble(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("Codes:") || t.starts_with("Gateway of last resort") || t.contains(" - ")
}

/// Next hop and device of a route line.
fn next_hop(p: &Patterns, line: &str) -> (Option<Addr>, String) {
    let connected = p.scan(CONNECTED, line);
    if let Some(Sto::Str(device)) = connected.first() {
        return (None, device.clone());
    }
    let mut caps = p.scan(VIA_UPTIME, line);
    if caps.len() < 2 {
        caps = p.scan(VIA_DEVICE, line);
    }
    let gw = caps.first().and_then(Sto::as_addr);
    let device: String = caps.iter().skip(1).filter_map(Sto::as_str).collect();
    (gw, device)
}

/// Convert `show ip route` output.
///
/// Prefixes printed without a mask take the mask of the enclosing
/// `is subnetted` header, or their classful mask. Next hops on
/// continuation lines become extra routes for the same prefix. The route
/// code (`O E2`, `S*`...) is kept as the comment.
///
/// # Arguments
/// * `text` - Router output
/// * `config` - Ceilings and pattern nesting limit
///
/// # Returns
/// The routes, with route lines counted good and unparsable lines bad
pub fn cisco_routes(text: &str, config: &Config) -> Result<(RouteFile, LoadReport), Box<dyn Error>> {
    log::info!("#Start cisco_routes() {} lines", text.lines().count());
    let p = Patterns::compile(&ALL, config)?;
    let mut file = RouteFile::new(&config.limits);
    let mut report = LoadReport::default();
    // classful network of the last `is subnetted` header, and its mask
    let mut header: Option<(u32, u8)> = None;
    let mut last: Option<(Subnet, String)> = None;

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() || is_preamble(line) {
            continue;
        }
        if let [Sto::Subnet(s), _] = p.scan(SUBNETTED, line).as_slice() {
            log::trace!("line {}: subnetted header {s}", index + 1);
            header = Some((classful_network(v4(s)), s.mask));
            continue;
        }
        if p.scan(VARIABLY, line).len() == 2 {
            header = None;
            continue;
        }

        if line.starts_with(char::is_whitespace) {
            match (&last, p.scan(CONTINUATION, line).len()) {
                (Some((subnet, code)), 3) => {
                    let (gw, device) = next_hop(&p, line);
                    file.push(Route::new(*subnet, &device, gw, vec![code.clone()]))?;
                    report.good += 1;
                }
                _ => {
                    log::warn!("line {}: not a route: '{}'", index + 1, line.trim());
                    report.bad += 1;
                }
            }
            continue;
        }

        let mut caps = p.scan(CODE_PREFIX, line);
        let mut code_len = 1;
        if caps.len() < 2 {
            caps = p.scan(CODE_SUB_PREFIX, line);
            code_len = 2;
        }
        let addr = match caps.get(code_len).and_then(Sto::as_addr) {
            Some(Addr::V4(a)) => a,
            _ => {
                log::warn!("line {}: no prefix in '{line}'", index + 1);
                report.bad += 1;
                continue;
            }
        };
        let mask = match caps.get(code_len + 1).and_then(Sto::as_int) {
            Some(m) if m <= 32 => m as u8,
            Some(m) => {
                log::warn!("line {}: bad mask /{m}", index + 1);
                report.bad += 1;
                continue;
            }
            None => match header {
                Some((network, m)) if classful_network(addr) == network => m,
                _ => classful_mask(addr),
            },
        };
        let code = caps[..code_len]
            .iter()
            .filter_map(Sto::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        let subnet = Subnet {
            addr: Addr::V4(addr),
            mask,
        };
        let (gw, device) = next_hop(&p, line);
        log::trace!("line {}: {code} {subnet} gw={gw:?} dev={device}", index + 1);
        file.push(Route::new(subnet, &device, gw, vec![code.clone()]))?;
        last = Some((subnet, code));
        report.good += 1;
    }
    log::info!("cisco_routes: {} good / {} bad", report.good, report.bad);
    Ok((file, report))
}
