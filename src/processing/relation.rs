//! Subnet relations and arithmetic.
//!
//! All functions work on unnormalized subnets: host bits are shifted out
//! before comparing, nothing needs to be canonical up front.

use crate::error::RelationError;
use crate::models::{Addr, Subnet};

/// Relation of a subnet A to a subnet B.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Relation {
    Equals,
    /// A contains B.
    Includes,
    /// A is contained in B.
    Included,
    NoMatch,
}

impl Relation {
    /// The relation of B to A.
    pub fn reverse(self) -> Relation {
        match self {
            Relation::Includes => Relation::Included,
            Relation::Included => Relation::Includes,
            other => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Equals => "EQUALS",
            Relation::Includes => "INCLUDES",
            Relation::Included => "INCLUDED",
            Relation::NoMatch => "NOMATCH",
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn same_family(a: &Addr, b: &Addr) -> Result<(), RelationError> {
    if a.version() != b.version() {
        log::debug!("family mismatch between {a} and {b}");
        return Err(RelationError::FamilyMismatch);
    }
    Ok(())
}

/// Compare two subnets of the same family.
///
/// # Examples
/// ```
/// use subnet_tool::models::Subnet;
/// use subnet_tool::processing::{subnet_compare, Relation};
/// let a: Subnet = "10.0.0.0/8".parse().unwrap();
/// let b: Subnet = "10.1.2.3/32".parse().unwrap();
/// assert_eq!(subnet_compare(&a, &b).unwrap(), Relation::Includes);
/// ```
pub fn subnet_compare(a: &Subnet, b: &Subnet) -> Result<Relation, RelationError> {
    same_family(&a.addr, &b.addr)?;
    let shallow = a.mask.min(b.mask);
    let shift = (a.addr.width() - shallow) as u32;
    if a.addr.shift_right(shift) != b.addr.shift_right(shift) {
        return Ok(Relation::NoMatch);
    }
    Ok(match a.mask.cmp(&b.mask) {
        std::cmp::Ordering::Equal => Relation::Equals,
        std::cmp::Ordering::Less => Relation::Includes,
        std::cmp::Ordering::Greater => Relation::Included,
    })
}

/// True if `a` sorts after `b` numerically.
pub fn addr_is_superior(a: &Addr, b: &Addr) -> Result<bool, RelationError> {
    same_family(a, b)?;
    Ok(a > b)
}

/// True if `a` sorts after `b`: larger address, or same address and a
/// smaller mask.
pub fn subnet_is_superior(a: &Subnet, b: &Subnet) -> Result<bool, RelationError> {
    same_family(&a.addr, &b.addr)?;
    if a.addr == b.addr {
        return Ok(a.mask < b.mask);
    }
    Ok(a.addr > b.addr)
}

/// Merge two sibling subnets of the same mask into their parent.
///
/// # Examples
/// ```
/// use subnet_tool::models::Subnet;
/// use subnet_tool::processing::aggregate_subnet;
/// let a: Subnet = "192.168.0.0/25".parse().unwrap();
/// let b: Subnet = "192.168.0.128/25".parse().unwrap();
/// assert_eq!(aggregate_subnet(&a, &b).unwrap().to_string(), "192.168.0.0/24");
/// ```
pub fn aggregate_subnet(a: &Subnet, b: &Subnet) -> Result<Subnet, RelationError> {
    same_family(&a.addr, &b.addr)?;
    let not_aggregatable = || RelationError::NotAggregatable(a.to_string(), b.to_string());
    if a.mask != b.mask || a.mask == 0 {
        return Err(not_aggregatable());
    }
    let shift = (a.addr.width() - a.mask) as u32;
    let (na, nb) = (a.addr.shift_right(shift), b.addr.shift_right(shift));
    if na == nb || na.shift_right(1) != nb.shift_right(1) {
        return Err(not_aggregatable());
    }
    let mask = a.mask - 1;
    Ok(Subnet {
        addr: a.addr.network(mask),
        mask,
    })
}

/// The subnet with its host bits cleared.
pub fn first_ip(s: &Subnet) -> Subnet {
    s.normalized()
}

/// The last address of the subnet (host bits set).
pub fn last_ip(s: &Subnet) -> Addr {
    s.hi()
}

/// The adjacent block of the same size after `s`. Wraps silently.
pub fn next_subnet(s: &Subnet) -> Subnet {
    let shift = (s.addr.width() - s.mask) as u32;
    Subnet {
        addr: s.addr.shift_right(shift).increase().shift_left(shift),
        mask: s.mask,
    }
}

/// The adjacent block of the same size before `s`. Wraps silently.
pub fn previous_subnet(s: &Subnet) -> Subnet {
    let shift = (s.addr.width() - s.mask) as u32;
    Subnet {
        addr: s.addr.shift_right(shift).decrease().shift_left(shift),
        mask: s.mask,
    }
}

/// How many bits can be removed from the mask while the block stays
/// aligned on its network address.
pub fn can_decrease_mask(s: &Subnet) -> u8 {
    let shift = (s.addr.width() - s.mask) as u32;
    let network = s.addr.shift_right(shift);
    let zeros = network.trailing_zeros().min(s.mask as u32);
    zeros as u8
}

/// The ordered maximal aligned subnets covering `a` minus `b`.
///
/// `a == b` gives nothing, `b` outside `a` gives `a` unchanged.
///
/// # Examples
/// ```
/// use subnet_tool::models::Subnet;
/// use subnet_tool::processing::subnet_remove;
/// let a: Subnet = "10.0.0.0/22".parse().unwrap();
/// let b: Subnet = "10.0.1.0/24".parse().unwrap();
/// let parts: Vec<String> = subnet_remove(&a, &b).unwrap().iter().map(|s| s.to_string()).collect();
/// assert_eq!(parts, ["10.0.0.0/24", "10.0.2.0/23"]);
/// ```
pub fn subnet_remove(a: &Subnet, b: &Subnet) -> Result<Vec<Subnet>, RelationError> {
    match subnet_compare(a, b)? {
        Relation::Equals => return Ok(Vec::new()),
        Relation::Includes => {}
        Relation::Included | Relation::NoMatch => return Ok(vec![*a]),
    }
    let a = first_ip(a);
    let b = first_ip(b);
    let bound = (b.mask - a.mask) as usize;
    let mut out = Vec::with_capacity(bound);

    // everything before b, narrowing towards it
    let mut s = a;
    while s != b {
        if out.len() >= bound {
            log::error!("subnet_remove({a}, {b}): fragment bound {bound} reached before b");
            return Ok(out);
        }
        s.mask += 1;
        s = first_ip(&s);
        match subnet_compare(&s, &b)? {
            Relation::Includes | Relation::Equals => {}
            _ => {
                out.push(s);
                s = next_subnet(&s);
            }
        }
    }

    // everything after b, widening as alignment allows
    let last_of_a = last_ip(&a);
    let mut s = next_subnet(&b);
    while s.addr > b.addr && s.addr <= last_of_a {
        if out.len() >= bound {
            log::error!("subnet_remove({a}, {b}): fragment bound {bound} reached after b");
            break;
        }
        let widest = s.mask - can_decrease_mask(&s);
        s.mask = widest.max(a.mask + 1);
        s = first_ip(&s);
        out.push(s);
        s = next_subnet(&s);
    }
    log::trace!("subnet_remove({a}, {b}) -> {} fragments", out.len());
    Ok(out)
}
