//! BGP routes as read from `show ip bgp` output.

use super::{Addr, Subnet};
use crate::config::Limits;
use crate::error::LoadError;

/// Maximum length kept of an AS path.
pub const MAX_AS_PATH_LEN: usize = 256;

/// BGP origin attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Origin {
    #[default]
    Igp,
    Egp,
    Incomplete,
}

impl Origin {
    /// The one-letter code used by router output.
    pub fn code(self) -> char {
        match self {
            Origin::Igp => 'i',
            Origin::Egp => 'e',
            Origin::Incomplete => '?',
        }
    }

    pub fn from_code(c: char) -> Option<Origin> {
        match c {
            'i' => Some(Origin::Igp),
            'e' => Some(Origin::Egp),
            '?' => Some(Origin::Incomplete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BgpRoute {
    pub subnet: Subnet,
    pub gw: Option<Addr>,
    pub med: u32,
    pub local_pref: u32,
    pub weight: u32,
    pub as_path: String,
    pub valid: bool,
    pub best: bool,
    pub internal: bool,
    pub origin: Origin,
}

impl BgpRoute {
    /// Set the AS path, truncated to [`MAX_AS_PATH_LEN`] bytes.
    pub fn set_as_path(&mut self, path: &str) {
        let path = path.trim();
        let mut end = path.len().min(MAX_AS_PATH_LEN);
        while !path.is_char_boundary(end) {
            end -= 1;
        }
        self.as_path = path[..end].to_string();
    }
}

/// An owned list of BGP routes.
#[derive(Debug, Clone)]
pub struct BgpFile {
    routes: Vec<BgpRoute>,
    max_routes: usize,
}

impl BgpFile {
    pub fn new(limits: &Limits) -> BgpFile {
        BgpFile {
            routes: Vec::with_capacity(limits.initial_capacity),
            max_routes: limits.max_routes,
        }
    }

    pub fn push(&mut self, route: BgpRoute) -> Result<(), LoadError> {
        if self.routes.len() >= self.max_routes {
            log::error!("BGP route ceiling of {} reached", self.max_routes);
            return Err(LoadError::TooManyRoutes(self.max_routes));
        }
        self.routes.push(route);
        Ok(())
    }

    pub fn routes(&self) -> &[BgpRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
