//! Router output converters.
//!
//! - [`cisco`] - `show ip route` to a route file
//! - [`bgp`] - `show ip bgp` to a BGP route file
//!
//! Both scan each line with a few fixed patterns and accept a line when
//! enough values were captured.

mod bgp;
mod cisco;

pub use bgp::cisco_bgp;
pub use cisco::cisco_routes;

use crate::config::Config;
use crate::error::ScanError;
use crate::scanf::{Pattern, Sto};
use std::collections::HashMap;

/// Captures kept per line.
const MAX_CAPTURES: usize = 8;

/// Formats compiled once per conversion.
struct Patterns {
    compiled: HashMap<&'static str, Pattern>,
}

impl Patterns {
    fn compile(formats: &[&'static str], config: &Config) -> Result<Patterns, ScanError> {
        let compiled = formats
            .iter()
            .map(|f| Ok((*f, Pattern::compile(f, config.limits.max_pattern_depth)?)))
            .collect::<Result<HashMap<_, _>, ScanError>>()?;
        Ok(Patterns { compiled })
    }

    /// Captures of `fmt` on `line`; empty when nothing matched.
    fn scan(&self, fmt: &str, line: &str) -> Vec<Sto> {
        match self.compiled.get(fmt).map(|p| p.scan(line, MAX_CAPTURES)) {
            Some(Ok(caps)) => caps,
            Some(Err(_)) => Vec::new(),
            None => {
                log::error!("format '{fmt}' was not compiled");
                Vec::new()
            }
        }
    }
}
