//! Sorting and aggregation of whole route files.

use super::relation::{aggregate_subnet, subnet_compare, Relation};
use crate::models::{Route, RouteFile};
use std::error::Error;

/// Sort routes by family, network address then mask.
pub fn sort_routes(file: &mut RouteFile) {
    file.routes_mut()
        .sort_by(|a, b| a.subnet.normalized().cmp(&b.subnet.normalized()));
}

/// Merge two routes covering sibling subnets.
///
/// Device and gateway survive only when both halves agree; attributes are
/// taken from the first route.
fn merge_routes(a: &Route, b: &Route) -> Option<Route> {
    let subnet = aggregate_subnet(&a.subnet, &b.subnet).ok()?;
    Some(Route {
        subnet,
        device: if a.device == b.device {
            a.device.clone()
        } else {
            String::new()
        },
        gw: if a.gw == b.gw { a.gw } else { None },
        attrs: a.attrs.clone(),
    })
}

/// Aggregate a route file into the smallest equivalent set of prefixes.
///
/// Included prefixes are dropped and sibling prefixes merged until nothing
/// changes. The result is sorted.
pub fn aggregate_routes(file: &RouteFile) -> Result<RouteFile, Box<dyn Error>> {
    log::info!("#Start aggregate_routes() {} routes", file.len());
    let mut routes: Vec<Route> = file
        .iter()
        .map(|r| Route {
            subnet: r.subnet.normalized(),
            ..r.clone()
        })
        .collect();

    let mut pass = 0;
    loop {
        pass += 1;
        routes.sort_by(|a, b| a.subnet.cmp(&b.subnet));

        let mut changed = false;
        let mut result: Vec<Route> = Vec::with_capacity(routes.len());
        let mut iter = routes.into_iter().peekable();

        while let Some(mut current) = iter.next() {
            while let Some(next) = iter.peek() {
                if current.subnet.version() != next.subnet.version() {
                    break;
                }
                let relation = subnet_compare(&current.subnet, &next.subnet)?;
                if matches!(relation, Relation::Includes | Relation::Equals) {
                    log::trace!("{} includes {}, dropped", current.subnet, next.subnet);
                    iter.next();
                    changed = true;
                } else if let Some(merged) = merge_routes(&current, next) {
                    log::trace!("{} + {} -> {}", current.subnet, next.subnet, merged.subnet);
                    iter.next();
                    current = merged;
                    changed = true;
                } else {
                    break;
                }
            }
            result.push(current);
        }

        routes = result;
        if !changed {
            break;
        }
    }
    log::debug!("aggregate_routes: {} passes, {} routes", pass, routes.len());

    let mut out = file.empty_like();
    for r in routes {
        out.push(r)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limits;
    use crate::models::Subnet;

    fn file_of(prefixes: &[&str]) -> RouteFile {
        let mut f = RouteFile::new(&Limits::default());
        for p in prefixes {
            let subnet: Subnet = p.parse().unwrap();
            let mut r = f.blank_route(subnet);
            r.device = "eth0".to_string();
            f.push(r).unwrap();
        }
        f
    }

    fn prefixes(f: &RouteFile) -> Vec<String> {
        f.iter().map(|r| r.subnet.to_string()).collect()
    }

    #[test]
    fn test_sort_routes() {
        let mut f = file_of(&["10.0.1.0/24", "2001:db8::/32", "10.0.0.0/8", "10.0.0.0/24"]);
        sort_routes(&mut f);
        assert_eq!(
            prefixes(&f),
            ["10.0.0.0/8", "10.0.0.0/24", "10.0.1.0/24", "2001:db8::/32"]
        );
    }

    #[test]
    fn test_aggregate_siblings_cascade() {
        let f = file_of(&["10.0.0.0/24", "10.0.1.0/24", "10.0.2.0/24", "10.0.3.0/24"]);
        let out = aggregate_routes(&f).unwrap();
        assert_eq!(prefixes(&out), ["10.0.0.0/22"]);
        assert_eq!(out.routes()[0].device, "eth0");
    }

    #[test]
    fn test_aggregate_drops_included() {
        let f = file_of(&["10.0.0.0/8", "10.1.0.0/16", "10.1.2.3/32", "192.168.0.0/24"]);
        let out = aggregate_routes(&f).unwrap();
        assert_eq!(prefixes(&out), ["10.0.0.0/8", "192.168.0.0/24"]);
    }

    #[test]
    fn test_aggregate_mixed_families() {
        let f = file_of(&[
            "2001:db8:8000::/33",
            "192.168.0.128/25",
            "2001:db8::/33",
            "192.168.0.0/25",
            "192.168.2.0/24",
        ]);
        let out = aggregate_routes(&f).unwrap();
        assert_eq!(
            prefixes(&out),
            ["192.168.0.0/24", "192.168.2.0/24", "2001:db8::/32"]
        );
    }

    #[test]
    fn test_aggregate_merge_keeps_common_fields_only() {
        let mut f = file_of(&["10.0.0.0/25"]);
        let mut r = f.blank_route("10.0.0.128/25".parse().unwrap());
        r.device = "eth1".to_string();
        f.push(r).unwrap();
        let out = aggregate_routes(&f).unwrap();
        assert_eq!(prefixes(&out), ["10.0.0.0/24"]);
        assert_eq!(out.routes()[0].device, "");
    }
}
