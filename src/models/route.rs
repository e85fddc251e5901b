//! Routes and route collections.

use super::{Addr, Subnet};
use crate::config::Limits;
use crate::error::LoadError;

/// Name of the first extended attribute slot.
pub const COMMENT: &str = "comment";

/// A route: prefix, outgoing device, gateway and extended attribute values.
///
/// Attribute names are held by the owning [`RouteFile`]; `attrs[i]` is the
/// value of the file's `attr_names()[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Route {
    pub subnet: Subnet,
    pub device: String,
    pub gw: Option<Addr>,
    pub attrs: Vec<String>,
}

impl Route {
    pub fn new(subnet: Subnet, device: &str, gw: Option<Addr>, attrs: Vec<String>) -> Route {
        Route {
            subnet,
            device: device.to_string(),
            gw,
            attrs,
        }
    }

    /// Value of the comment slot, empty when the file has no attributes.
    pub fn comment(&self) -> &str {
        self.attrs.first().map(String::as_str).unwrap_or("")
    }
}

/// An owned list of routes sharing one attribute name table.
#[derive(Debug, Clone)]
pub struct RouteFile {
    attr_names: Vec<String>,
    routes: Vec<Route>,
    max_routes: usize,
}

impl RouteFile {
    /// An empty file with the default "comment" attribute.
    pub fn new(limits: &Limits) -> RouteFile {
        RouteFile::with_attributes(vec![COMMENT.to_string()], limits)
    }

    pub fn with_attributes(attr_names: Vec<String>, limits: &Limits) -> RouteFile {
        RouteFile {
            attr_names,
            routes: Vec::with_capacity(limits.initial_capacity),
            max_routes: limits.max_routes,
        }
    }

    /// An empty file sharing the name table and ceiling of `self`.
    pub fn empty_like(&self) -> RouteFile {
        RouteFile {
            attr_names: self.attr_names.clone(),
            routes: Vec::with_capacity(self.routes.len().max(1)),
            max_routes: self.max_routes,
        }
    }

    pub fn attr_names(&self) -> &[String] {
        &self.attr_names
    }

    /// Index of attribute `name` in the name table.
    pub fn attr_index(&self, name: &str) -> Option<usize> {
        self.attr_names.iter().position(|n| n == name)
    }

    /// Append a route; its attribute count must match the name table.
    pub fn push(&mut self, route: Route) -> Result<(), LoadError> {
        if route.attrs.len() != self.attr_names.len() {
            return Err(LoadError::AttributeCount {
                got: route.attrs.len(),
                expected: self.attr_names.len(),
            });
        }
        if self.routes.len() >= self.max_routes {
            log::error!("route ceiling of {} reached", self.max_routes);
            return Err(LoadError::TooManyRoutes(self.max_routes));
        }
        self.routes.push(route);
        Ok(())
    }

    /// A route with the right number of empty attributes.
    pub fn blank_route(&self, subnet: Subnet) -> Route {
        Route {
            subnet,
            device: String::new(),
            gw: None,
            attrs: vec![String::new(); self.attr_names.len()],
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn routes_mut(&mut self) -> &mut Vec<Route> {
        &mut self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }
}
