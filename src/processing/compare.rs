//! Comparison of two route files.

use super::relation::{subnet_compare, Relation};
use crate::error::LoadError;
use crate::models::{Route, RouteFile, Subnet};

/// Best relation found in the other file for one route.
#[derive(Debug, Clone)]
pub struct CompareRow<'a> {
    pub route: &'a Route,
    pub relation: Relation,
    /// The prefix of the other file that produced `relation`.
    pub other: Option<Subnet>,
}

fn strength(r: Relation) -> u8 {
    match r {
        Relation::Equals => 3,
        Relation::Included => 2,
        Relation::Includes => 1,
        Relation::NoMatch => 0,
    }
}

/// For every route of `a`, the strongest relation with any route of `b`.
///
/// Strength order: EQUALS, INCLUDED (the most specific container wins),
/// INCLUDES, NOMATCH. Routes of a different family never relate.
pub fn compare_files<'a>(a: &'a RouteFile, b: &RouteFile) -> Vec<CompareRow<'a>> {
    a.iter()
        .map(|route| {
            let mut best = CompareRow {
                route,
                relation: Relation::NoMatch,
                other: None,
            };
            for other in b.iter() {
                let relation = match subnet_compare(&route.subnet, &other.subnet) {
                    Ok(r) => r,
                    Err(_) => continue,
                };
                let better = strength(relation) > strength(best.relation)
                    || (relation == Relation::Included
                        && best.relation == Relation::Included
                        && best.other.map_or(true, |o| other.subnet.mask > o.mask));
                if better {
                    best.relation = relation;
                    best.other = Some(other.subnet);
                }
                if best.relation == Relation::Equals {
                    break;
                }
            }
            log::trace!("{} -> {} {:?}", route.subnet, best.relation, best.other);
            best
        })
        .collect()
}

/// Routes of `a` that neither equal nor fall inside a route of `b`.
///
/// The result shares the ceiling of `a`; exceeding it is an error.
pub fn missing_routes(a: &RouteFile, b: &RouteFile) -> Result<RouteFile, LoadError> {
    let mut out = a.empty_like();
    for row in compare_files(a, b) {
        if matches!(row.relation, Relation::Equals | Relation::Included) {
            continue;
        }
        out.push(row.route.clone())?;
    }
    Ok(out)
}
