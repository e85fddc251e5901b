//! Subnet processing logic.
//!
//! - [`relation`] - compare, order, aggregate, split and subtract subnets
//! - [`aggregate`] - sorting and aggregation of route files
//! - [`compare`] - route file comparison
//! - [`info`] - `ipcalc` style subnet report

mod aggregate;
mod compare;
mod info;
mod relation;

pub use aggregate::{aggregate_routes, sort_routes};
pub use compare::{compare_files, missing_routes, CompareRow};
pub use info::subnet_info;
pub use relation::{
    addr_is_superior, aggregate_subnet, can_decrease_mask, first_ip, last_ip, next_subnet,
    previous_subnet, subnet_compare, subnet_is_superior, subnet_remove, Relation,
};
