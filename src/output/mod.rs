//! Output formatting.
//!
//! - [`printf`] - format string driven printing of captures and routes
//! - [`csv`] - route files and comparison results as CSV
//! - [`terminal`] - terminal helpers with colors

mod csv;
mod printf;
mod terminal;

pub use csv::{write_bgp_file, write_compare_rows, write_route_file};
pub use printf::{fprint_bgp_route, fprint_route, st_printf, FormatOptions, BAD_VALUE};
pub use terminal::{format_field, load_summary, relation_label};
