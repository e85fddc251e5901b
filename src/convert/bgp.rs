//! Cisco `show ip bgp` text to a BGP route file.

use super::Patterns;
use crate::config::Config;
use crate::csv::LoadReport;
use crate::models::{BgpFile, BgpRoute, Origin, Subnet};
use crate::scanf::Sto;
use std::error::Error;

const NETWORK_NEXT_HOP: &str = "%Q +%I";
const NETWORK: &str = "%Q";
const NEXT_HOP: &str = "%I";
const ALL: [&str; 3] = [NETWORK_NEXT_HOP, NETWORK, NEXT_HOP];

/// Width of the status code column (`*>i`).
const STATUS_WIDTH: usize = 3;

/// Right edges of the numeric columns, read from the table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    metric: usize,
    local_pref: usize,
    weight: usize,
}

impl Default for Columns {
    /// Edges of the usual `   Network          Next Hop            Metric LocPrf Weight Path`.
    fn default() -> Self {
        Columns {
            metric: 46,
            local_pref: 53,
            weight: 60,
        }
    }
}

impl Columns {
    fn from_header(line: &str) -> Option<Columns> {
        let end = |name: &str| line.find(name).map(|i| i + name.len());
        Some(Columns {
            metric: end("Metric")?,
            local_pref: end("LocPrf")?,
            weight: end("Weight")?,
        })
    }
}

/// Whitespace separated tokens with their byte range.
fn tokens(line: &str) -> Vec<(usize, usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in line.char_indices().chain(std::iter::once((line.len(), ' '))) {
        match (start, c.is_whitespace()) {
            (None, false) => start = Some(i),
            (Some(s), true) => {
                out.push((s, i, &line[s..i]));
                start = None;
            }
            _ => {}
        }
    }
    out
}

fn is_status(status: &str) -> bool {
    status.chars().all(|c| " *>isdhrSRmbfxac".contains(c))
}

/// Fill metrics, AS path and origin from the tokens after the next hop.
fn fill_attributes(route: &mut BgpRoute, line: &str, after: usize, cols: &Columns) -> bool {
    let mut path = Vec::new();
    for (_, end, tok) in tokens(line).into_iter().filter(|(s, _, _)| *s >= after) {
        let number = tok.parse::<u32>().ok();
        match number {
            Some(n) if path.is_empty() && end <= cols.metric => route.med = n,
            Some(n) if path.is_empty() && end <= cols.local_pref => route.local_pref = n,
            Some(n) if path.is_empty() && end <= cols.weight => route.weight = n,
            _ => path.push(tok),
        }
    }
    let origin = match path.pop().and_then(|o| o.chars().next()).and_then(Origin::from_code) {
        Some(o) => o,
        None => return false,
    };
    route.origin = origin;
    route.set_as_path(&path.join(" "));
    true
}

/// Convert `show ip bgp` output.
///
/// Networks printed without a mask take their classful mask. A line with a
/// blank network column is another path for the previous network, and a
/// network alone on its line continues on the next one.
///
/// # Arguments
/// * `text` - Router output
/// * `config` - Ceilings and pattern nesting limit
///
/// # Returns
/// The routes, with route lines counted good and unparsable lines bad
pub fn cisco_bgp(text: &str, config: &Config) -> Result<(BgpFile, LoadReport), Box<dyn Error>> {
    log::info!("#Start cisco_bgp() {} lines", text.lines().count());
    let p = Patterns::compile(&ALL, config)?;
    let mut file = BgpFile::new(&config.limits);
    let mut report = LoadReport::default();
    let mut cols: Option<Columns> = None;
    let mut network: Option<Subnet> = None;
    let mut pending_status: Option<String> = None;

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if cols.is_none() {
            if line.contains("Network") && line.contains("Next Hop") {
                cols = Columns::from_header(line).or(Some(Columns::default()));
            }
            continue;
        }
        let (status, body) = match (line.get(..STATUS_WIDTH), line.get(STATUS_WIDTH..)) {
            (Some(s), Some(b)) if is_status(s) => (s.to_string(), b),
            _ => {
                log::debug!("line {}: end of table: '{line}'", index + 1);
                continue;
            }
        };
        let status = match pending_status.take() {
            Some(s) if status.trim().is_empty() => s,
            _ => status,
        };

        let next_hop = if body.starts_with(char::is_whitespace) {
            p.scan(NEXT_HOP, body).first().and_then(Sto::as_addr)
        } else {
            let caps = p.scan(NETWORK_NEXT_HOP, body);
            network = caps.first().and_then(Sto::as_subnet);
            if caps.len() == 1 && body.split_whitespace().count() == 1 {
                pending_status = Some(status);
                continue;
            }
            caps.get(1).and_then(Sto::as_addr)
        };

        let (subnet, gw) = match (network, next_hop) {
            (Some(s), Some(gw)) => (s, gw),
            _ => {
                log::warn!("line {}: no network or next hop: '{line}'", index + 1);
                report.bad += 1;
                continue;
            }
        };
        // metrics start after the next hop token
        let hop_token = usize::from(!body.starts_with(char::is_whitespace));
        let after = tokens(body)
            .get(hop_token)
            .map_or(line.len(), |(_, end, _)| STATUS_WIDTH + end);

        let mut route = BgpRoute {
            subnet,
            gw: Some(gw),
            valid: status.contains('*'),
            best: status.contains('>'),
            internal: status.contains('i'),
            ..BgpRoute::default()
        };
        if !fill_attributes(&mut route, line, after, &cols.unwrap_or_default()) {
            log::warn!("line {}: no origin code: '{line}'", index + 1);
            report.bad += 1;
            continue;
        }
        file.push(route)?;
        report.good += 1;
    }
    if cols.is_none() {
        log::warn!("cisco_bgp: no table header found");
    }
    log::info!("cisco_bgp: {} good / {} bad", report.good, report.bad);
    Ok((file, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{fprint_bgp_route, FormatOptions};

    const SHOW_IP_BGP: &str = "\
BGP table version is 5, local router ID is 10.0.0.1
Status codes: s suppressed, d damped, h history, * valid, > best, i - internal
Origin codes: i - IGP, e - EGP, ? - incomplete

   Network          Next Hop            Metric LocPrf Weight Path
*> 10.0.0.0         0.0.0.0                  0         32768 i
*> 10.1.0.0/16      192.0.2.1               10    100      0 65001 65002 i
*                   192.0.2.2               20             0 65003 e
*>i172.16.0.0/12    10.0.0.2                 0    100      0 ?
*> 192.168.100.0/24
                    10.0.0.9                               0 65004 {65005,65006} i
*> 192.168.200.0/24 junk

Total number of prefixes 5
";

    #[test]
    fn test_cisco_bgp() {
        let (file, report) = cisco_bgp(SHOW_IP_BGP, &Config::default()).unwrap();
        assert_eq!(report, LoadReport { good: 5, bad: 1 });
        let opts = FormatOptions::default();
        let got: Vec<String> = file
            .routes()
            .iter()
            .map(|r| fprint_bgp_route("%v%b%i %P %G %e/%l/%w [%A] %o", Some(r), &opts))
            .collect();
        assert_eq!(
            got,
            [
                "*>e 10.0.0.0/8 0.0.0.0 0/0/32768 [] i",
                "*>e 10.1.0.0/16 192.0.2.1 10/100/0 [65001 65002] i",
                "*e 10.1.0.0/16 192.0.2.2 20/0/0 [65003] e",
                "*>i 172.16.0.0/12 10.0.0.2 0/100/0 [] ?",
                "*>e 192.168.100.0/24 10.0.0.9 0/0/0 [65004 {65005,65006}] i",
            ]
        );
    }

    #[test]
    fn test_tokens() {
        assert_eq!(tokens(" ab  c"), [(1, 3, "ab"), (5, 6, "c")]);
        assert!(tokens("   ").is_empty());
    }
}
