//! Error types shared across the crate.
//!
//! Malformed input is reported with [`AddrError`], [`ScanError`] and
//! [`RelationError`]; the caller decides whether to skip the record or stop.
//! [`LoadError`] separates per-line problems from catastrophic ones that
//! abort a whole file load.

use thiserror::Error;

/// Errors raised while parsing addresses, masks and prefixes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddrError {
    #[error("bad IP address '{0}'")]
    BadIp(String),

    #[error("bad mask '{0}'")]
    BadMask(String),

    #[error("bad prefix '{0}'")]
    BadPrefix(String),
}

/// Errors raised while rendering addresses to text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("output buffer too small ({given} bytes, need {needed})")]
    BufferTooSmall { given: usize, needed: usize },

    #[error("invalid IPv6 compression level {0} (expected 0-3)")]
    BadLevel(u8),
}

/// Errors raised by the relation and arithmetic engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelationError {
    #[error("cannot relate an IPv4 and an IPv6 value")]
    FamilyMismatch,

    #[error("{0} and {1} cannot be aggregated")]
    NotAggregatable(String, String),
}

/// Errors raised by the pattern scanner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("bad format at offset {pos}: {reason}")]
    BadFormat { pos: usize, reason: String },

    #[error("input does not match")]
    NoMatch,
}

/// Errors raised while reading a log verbosity specification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogSpecError {
    #[error("unknown log level '{0}'")]
    BadLevel(String),

    #[error("unknown subsystem '{0}'")]
    UnknownSubsystem(String),
}

/// Errors raised while loading a route file.
///
/// Everything except [`LoadError::BadLine`] aborts the whole load.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: more than {max} lines")]
    TooManyLines { path: String, max: usize },

    #[error("{path}:{line}: line longer than {max} bytes")]
    LineTooLong { path: String, line: usize, max: usize },

    #[error("more than {0} routes")]
    TooManyRoutes(usize),

    #[error("bad header: {0}")]
    BadHeader(String),

    #[error("route has {got} attributes, file declares {expected}")]
    AttributeCount { got: usize, expected: usize },

    #[error("line {line}: {reason}")]
    BadLine { line: usize, reason: String },
}

impl LoadError {
    /// True when the error should abort the whole operation.
    pub fn is_catastrophic(&self) -> bool {
        !matches!(self, LoadError::BadLine { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_line_is_not_catastrophic() {
        let e = LoadError::BadLine {
            line: 3,
            reason: "bad IP".to_string(),
        };
        assert!(!e.is_catastrophic());
        assert!(LoadError::TooManyRoutes(10).is_catastrophic());
        assert_eq!(e.to_string(), "line 3: bad IP");
    }

    #[test]
    fn test_addr_error_display() {
        assert_eq!(
            AddrError::BadMask("255.0.255.0".into()).to_string(),
            "bad mask '255.0.255.0'"
        );
    }
}
