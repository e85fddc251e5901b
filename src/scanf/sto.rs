//! Typed scanner captures.

use crate::models::{Addr, Subnet};
use std::fmt;

/// One value captured by a conversion specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sto {
    /// `%c`
    Char(char),
    /// `%s`, `%S`, `%W`, `%[...]`
    Str(String),
    /// `%hd`
    Short(i16),
    /// `%hu`, `%hx`
    UShort(u16),
    /// `%d`
    Int(i32),
    /// `%u`, `%x`
    UInt(u32),
    /// `%ld`
    Long(i64),
    /// `%lu`, `%lx`
    ULong(u64),
    /// `%M`
    Mask(u8),
    /// `%I`
    Addr(Addr),
    /// `%P`, `%Q`
    Subnet(Subnet),
}

impl Sto {
    pub fn as_addr(&self) -> Option<Addr> {
        match self {
            Sto::Addr(a) => Some(*a),
            _ => None,
        }
    }

    /// The subnet of a `%P`/`%Q` capture, or a host subnet for `%I`.
    pub fn as_subnet(&self) -> Option<Subnet> {
        match self {
            Sto::Subnet(s) => Some(*s),
            Sto::Addr(a) => Some(Subnet::host(*a)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Sto::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Any integer capture widened to `i128`.
    pub fn as_int(&self) -> Option<i128> {
        match *self {
            Sto::Short(v) => Some(v as i128),
            Sto::UShort(v) => Some(v as i128),
            Sto::Int(v) => Some(v as i128),
            Sto::UInt(v) => Some(v as i128),
            Sto::Long(v) => Some(v as i128),
            Sto::ULong(v) => Some(v as i128),
            Sto::Mask(v) => Some(v as i128),
            _ => None,
        }
    }

    /// Short type name, as printed by the `scanf` command.
    pub fn type_name(&self) -> &'static str {
        match self {
            Sto::Char(_) => "CHAR",
            Sto::Str(_) => "STRING",
            Sto::Short(_) => "SHORT",
            Sto::UShort(_) => "USHORT",
            Sto::Int(_) => "INT",
            Sto::UInt(_) => "UINT",
            Sto::Long(_) => "LONG",
            Sto::ULong(_) => "ULONG",
            Sto::Mask(_) => "MASK",
            Sto::Addr(_) => "ADDR",
            Sto::Subnet(_) => "SUBNET",
        }
    }
}

impl fmt::Display for Sto {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Sto::Char(c) => write!(f, "{c}"),
            Sto::Str(s) => write!(f, "{s}"),
            Sto::Short(v) => write!(f, "{v}"),
            Sto::UShort(v) => write!(f, "{v}"),
            Sto::Int(v) => write!(f, "{v}"),
            Sto::UInt(v) => write!(f, "{v}"),
            Sto::Long(v) => write!(f, "{v}"),
            Sto::ULong(v) => write!(f, "{v}"),
            Sto::Mask(v) => write!(f, "{v}"),
            Sto::Addr(a) => write!(f, "{a}"),
            Sto::Subnet(s) => write!(f, "{s}"),
        }
    }
}
