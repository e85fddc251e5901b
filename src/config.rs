//! Run-time configuration.
//!
//! Everything has a default; a JSON file can override any field.
//!
//! ```json
//! { "csv_delimiter": ",", "ipv6_compress": 2, "limits": { "max_routes": 100000 } }
//! ```

use crate::codec::Compression;
use crate::output::FormatOptions;
use serde::{Deserialize, Serialize};
use std::error::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "SUBNET_TOOL_CONFIG";
/// Environment variable holding the log verbosity specification.
pub const LOG_ENV: &str = "SUBNET_TOOL_LOG";

pub const DEFAULT_OUTPUT_FMT: &str = "%P;%D;%G;%O#";
pub const DEFAULT_BGP_OUTPUT_FMT: &str = "%P;%G;%e;%l;%w;%A;%o;%b;%i";

/// Size ceilings protecting against unbounded input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Lines read from one file before the load is aborted.
    pub max_lines: usize,
    /// Longest accepted input line, also the formatter output bound.
    pub max_line_len: usize,
    /// Routes held by one collection.
    pub max_routes: usize,
    /// Routes allocated up front; the collection doubles from there.
    pub initial_capacity: usize,
    /// Group nesting accepted by the pattern compiler.
    pub max_pattern_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_lines: 2_000_000,
            max_line_len: 1024,
            max_routes: 1_000_000,
            initial_capacity: 256,
            max_pattern_depth: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub limits: Limits,
    /// CSV field delimiter.
    pub csv_delimiter: char,
    /// Separator printed between attributes by `%O#`.
    pub attr_separator: String,
    /// Route output format.
    pub output_fmt: String,
    /// BGP route output format.
    pub bgp_output_fmt: String,
    /// Default IPv6 compression level (0-3).
    pub ipv6_compress: u8,
    /// Log verbosity, e.g. `"info,scanf=debug"`.
    pub log: Option<String>,
    /// log4rs YAML file used instead of the built-in console logger.
    pub log4rs_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            limits: Limits::default(),
            csv_delimiter: ';',
            attr_separator: ";".to_string(),
            output_fmt: DEFAULT_OUTPUT_FMT.to_string(),
            bgp_output_fmt: DEFAULT_BGP_OUTPUT_FMT.to_string(),
            ipv6_compress: 3,
            log: None,
            log4rs_file: None,
        }
    }
}

impl Config {
    /// Load `path`, or the file named by [`CONFIG_ENV`], or the defaults.
    pub fn load(path: Option<&str>) -> Result<Config, Box<dyn Error>> {
        let path = match path {
            Some(p) => Some(p.to_string()),
            None => std::env::var(CONFIG_ENV).ok(),
        };
        let config = match path {
            Some(p) => {
                log::debug!("reading config from {p}");
                let text = std::fs::read_to_string(&p)
                    .map_err(|e| format!("cannot read config {p}: {e}"))?;
                Config::from_json(&text).map_err(|e| format!("bad config {p}: {e}"))?
            }
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Config, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        Compression::try_from(self.ipv6_compress)?;
        if self.limits.max_line_len == 0 || self.limits.max_routes == 0 {
            return Err("limits must be positive".into());
        }
        Ok(())
    }

    pub fn compression(&self) -> Compression {
        Compression::try_from(self.ipv6_compress).unwrap_or_default()
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            compress: self.compression(),
            attr_separator: self.attr_separator.clone(),
            max_line_len: self.limits.max_line_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let c = Config::from_json(r#"{ "csv_delimiter": ",", "limits": { "max_routes": 10 } }"#)
            .unwrap();
        assert_eq!(c.csv_delimiter, ',');
        assert_eq!(c.limits.max_routes, 10);
        assert_eq!(c.limits.max_line_len, Limits::default().max_line_len);
        assert_eq!(c.output_fmt, DEFAULT_OUTPUT_FMT);
    }

    #[test]
    fn test_validate_rejects_bad_level() {
        let c = Config {
            ipv6_compress: 7,
            ..Config::default()
        };
        assert!(c.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }
}
