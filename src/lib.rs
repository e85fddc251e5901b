//! Subnet arithmetic, route file processing and router output conversion.
//!
//! - [`models`] - addresses, subnets, routes and BGP routes
//! - [`codec`] - text parsing and rendering of addresses and prefixes
//! - [`processing`] - relations, aggregation, subtraction and file operations
//! - [`scanf`] - pattern scanner with typed captures
//! - [`output`] - format string printing and CSV output
//! - [`csv`] - route file loading
//! - [`convert`] - Cisco `show ip route` / `show ip bgp` converters
//! - [`config`], [`logging`], [`cli`] - run-time settings and the command line

pub mod cli;
pub mod codec;
pub mod config;
pub mod convert;
pub mod csv;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod processing;
pub mod scanf;

pub use config::Config;
pub use error::{AddrError, LoadError, RelationError, RenderError, ScanError};
pub use models::{Addr, Route, RouteFile, Subnet};
