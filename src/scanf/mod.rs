//! Pattern scanner.
//!
//! - [`pattern`] - format compiler
//! - [`matcher`] - matching engine
//! - [`sto`] - typed captures
//!
//! ```
//! use subnet_tool::scanf::{st_scanf, Sto};
//!
//! let got = st_scanf("eth0 via 10.1.1.1, Vlan5", "(via) %I.*%32[^, \\n]", 8).unwrap();
//! assert_eq!(got[0].to_string(), "10.1.1.1");
//! assert_eq!(got[1], Sto::Str("Vlan5".to_string()));
//! ```

mod matcher;
mod pattern;
mod sto;

pub use pattern::{CharClass, Conversion, IntKind, IntSize, Node, NodeKind, Pattern};
pub use sto::Sto;

use crate::config::Limits;
use crate::error::ScanError;

/// Compile `fmt` and match it against `input` in one go.
///
/// Returns at most `capacity` captures. Callers that scan many lines with
/// the same format should compile a [`Pattern`] once instead.
pub fn st_scanf(input: &str, fmt: &str, capacity: usize) -> Result<Vec<Sto>, ScanError> {
    Pattern::compile(fmt, Limits::default().max_pattern_depth)?.scan(input, capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::string2addr;

    #[test]
    fn test_st_scanf_via_device() {
        let got = st_scanf("eth0 via 10.1.1.1, Vlan5", "(via) %I.*%32[^, \\n]", 8).unwrap();
        assert_eq!(
            got,
            vec![
                Sto::Addr(string2addr("10.1.1.1").unwrap()),
                Sto::Str("Vlan5".to_string())
            ]
        );
    }

    #[test]
    fn test_st_scanf_bad_format() {
        assert!(matches!(
            st_scanf("x", "(x", 8),
            Err(ScanError::BadFormat { .. })
        ));
    }

    #[test]
    fn test_st_scanf_count_threshold() {
        // a converter accepts the line when at least 3 values came back
        let fmt = "%P via %I, %s";
        assert_eq!(st_scanf("10.0.0.0/8 via 1.1.1.1, eth0", fmt, 8).unwrap().len(), 3);
        assert_eq!(st_scanf("10.0.0.0/8 via junk", fmt, 8).unwrap().len(), 1);
        assert_eq!(st_scanf("nothing here", fmt, 8), Err(ScanError::NoMatch));
    }

    #[test]
    fn test_st_scanf_width_bound() {
        let got = st_scanf("device=GigabitEthernet0/1", "device=%7s", 8).unwrap();
        assert_eq!(got, vec![Sto::Str("Gigabit".to_string())]);
    }
}
