//! Logger set-up.
//!
//! Every module logs through the `log` facade with its module path as
//! target, so one subsystem can be made more verbose than the rest:
//!
//! ```text
//! subnet-tool -v "warn,scanf=trace,relation=debug" ...
//! ```
//!
//! A `log4rs.yml` file, when present, replaces the built-in console logger.

use crate::error::LogSpecError;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config as LogConfig, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::error::Error;
use std::path::Path;
use std::str::FromStr;

/// log4rs file picked up from the working directory.
pub const DEFAULT_LOG4RS_FILE: &str = "log4rs.yml";

const CRATE: &str = "subnet_tool";
const PATTERN: &str = "{d(%H:%M:%S)} {h({l:5})} {t} - {m}{n}";

/// Subsystem names accepted in a verbosity string, and their module.
const SUBSYSTEMS: [(&str, &str); 16] = [
    ("codec", "codec"),
    ("parse", "codec::parse"),
    ("render", "codec::render"),
    ("config", "config"),
    ("convert", "convert"),
    ("cisco", "convert::cisco"),
    ("bgp", "convert::bgp"),
    ("csv", "csv"),
    ("models", "models"),
    ("output", "output"),
    ("printf", "output::printf"),
    ("processing", "processing"),
    ("relation", "processing::relation"),
    ("aggregate", "processing::aggregate"),
    ("compare", "processing::compare"),
    ("scanf", "scanf"),
];

/// Root level plus per-subsystem levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verbosity {
    pub root: LevelFilter,
    /// `(log target, level)`
    pub targets: Vec<(String, LevelFilter)>,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity {
            root: LevelFilter::Warn,
            targets: Vec::new(),
        }
    }
}

fn level(s: &str) -> Result<LevelFilter, LogSpecError> {
    LevelFilter::from_str(s.trim()).map_err(|_| LogSpecError::BadLevel(s.trim().to_string()))
}

fn target(name: &str) -> Result<String, LogSpecError> {
    let name = name.trim();
    SUBSYSTEMS
        .iter()
        .find(|(short, _)| *short == name)
        .map(|(_, module)| format!("{CRATE}::{module}"))
        .or_else(|| name.starts_with(CRATE).then(|| name.to_string()))
        .ok_or_else(|| LogSpecError::UnknownSubsystem(name.to_string()))
}

impl FromStr for Verbosity {
    type Err = LogSpecError;

    /// `level` or `subsystem=level` items separated by commas.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut v = Verbosity::default();
        for item in s.split(',').filter(|i| !i.trim().is_empty()) {
            match item.split_once('=') {
                Some((name, lvl)) => v.targets.push((target(name)?, level(lvl)?)),
                None => v.root = level(item)?,
            }
        }
        Ok(v)
    }
}

/// Console logger configuration writing to stderr.
pub fn console_config(v: &Verbosity) -> Result<LogConfig, Box<dyn Error>> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();
    let mut builder =
        LogConfig::builder().appender(Appender::builder().build("stderr", Box::new(stderr)));
    for (name, lvl) in &v.targets {
        builder = builder.logger(Logger::builder().build(name.as_str(), *lvl));
    }
    let config = builder.build(Root::builder().appender("stderr").build(v.root))?;
    Ok(config)
}

/// Install the process logger.
///
/// # Arguments
/// * `log4rs_file` - log4rs YAML file; `log4rs.yml` is used when it exists
/// * `v` - Levels for the built-in console logger
pub fn init(log4rs_file: Option<&str>, v: &Verbosity) -> Result<(), Box<dyn Error>> {
    let file = log4rs_file.or_else(|| {
        Path::new(DEFAULT_LOG4RS_FILE)
            .exists()
            .then_some(DEFAULT_LOG4RS_FILE)
    });
    match file {
        Some(f) => log4rs::init_file(f, Default::default())?,
        None => {
            log4rs::init_config(console_config(v)?)?;
        }
    }
    log::debug!("logging ready, root={} targets={:?}", v.root, v.targets);
    Ok(())
}
