//! Command line interface.
//!
//! [`Cli`] is parsed in `main`; [`run`] executes the command and writes its
//! output to any writer so commands can be tested.

use crate::config::Config;
use crate::convert::{cisco_bgp, cisco_routes};
use crate::csv::{load_route_file, LoadReport};
use crate::error::LoadError;
use crate::models::{RouteFile, Subnet};
use crate::output::{
    load_summary, relation_label, write_bgp_file, write_compare_rows, write_route_file,
};
use crate::processing::{
    aggregate_routes, aggregate_subnet, compare_files, missing_routes, sort_routes,
    subnet_compare, subnet_info, subnet_remove,
};
use crate::scanf::st_scanf;
use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::io::Write;

#[derive(Parser, Debug)]
#[command(author, version, about = "Subnet and route file toolkit", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON configuration file (default: $SUBNET_TOOL_CONFIG)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log levels, e.g. "info,scanf=debug" (default: $SUBNET_TOOL_LOG)
    #[arg(short, long, global = true)]
    pub verbose: Option<String>,

    /// Output format for route lines
    #[arg(short, long, global = true)]
    pub fmt: Option<String>,

    /// IPv6 compression level 0-3
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub compress: Option<u8>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Describe a subnet (network, broadcast, hosts...)
    Ipinfo { subnet: String },
    /// Relation between two subnets
    Compare { a: String, b: String },
    /// Merge two adjacent subnets
    Aggregate { a: String, b: String },
    /// Subnets covering A minus B
    Remove { a: String, b: String },
    /// Run a scan pattern on a string and print the captures
    Scanf { input: String, pattern: String },
    /// Print a route file
    Print { file: String },
    /// Print a route file sorted
    Sort { file: String },
    /// Print a route file aggregated
    Sumup { file: String },
    /// For each route of A, its best relation in B
    CmpFiles { a: String, b: String },
    /// Routes of A not covered by B
    Missing { a: String, b: String },
    /// Convert router output to a route file
    Convert {
        #[arg(value_enum)]
        kind: ConvertKind,
        file: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvertKind {
    /// `show ip route`
    Cisco,
    /// `show ip bgp`
    Bgp,
}

impl Cli {
    /// Apply the command line output options over `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(fmt) = &self.fmt {
            config.output_fmt = fmt.clone();
            config.bgp_output_fmt = fmt.clone();
        }
        if let Some(level) = self.compress {
            config.ipv6_compress = level;
        }
        if let Some(v) = &self.verbose {
            config.log = Some(v.clone());
        }
    }
}

fn subnet(s: &str) -> Result<Subnet, Box<dyn Error>> {
    s.parse::<Subnet>()
        .map_err(|e| format!("{s}: {e}").into())
}

fn load(path: &str, config: &Config) -> Result<RouteFile, Box<dyn Error>> {
    let (file, report) = load_route_file(path, config)?;
    summary(path, report);
    Ok(file)
}

fn summary(name: &str, report: LoadReport) {
    eprintln!("{}", load_summary(name, report.good, report.bad));
}

fn read(path: &str) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_string(),
        source,
    })
}

/// Execute `command`.
///
/// # Arguments
/// * `command` - The parsed command
/// * `config` - Effective configuration
/// * `out` - Destination of the command output
pub fn run<W: Write>(command: &Commands, config: &Config, out: &mut W) -> Result<(), Box<dyn Error>> {
    log::info!("#Start run({command:?})");
    let opts = config.format_options();
    let fmt = config.output_fmt.as_str();

    match command {
        Commands::Ipinfo { subnet: s } => {
            for line in subnet_info(&subnet(s)?, &opts) {
                writeln!(out, "{line}")?;
            }
        }
        Commands::Compare { a, b } => {
            let (a, b) = (subnet(a)?, subnet(b)?);
            writeln!(out, "{a} {} {b}", relation_label(subnet_compare(&a, &b)?))?;
        }
        Commands::Aggregate { a, b } => {
            let merged = aggregate_subnet(&subnet(a)?, &subnet(b)?)?;
            writeln!(out, "{merged}")?;
        }
        Commands::Remove { a, b } => {
            for s in subnet_remove(&subnet(a)?, &subnet(b)?)? {
                writeln!(out, "{s}")?;
            }
        }
        Commands::Scanf { input, pattern } => {
            let captures = st_scanf(input, pattern, 32)?;
            writeln!(out, "{} captures", captures.len())?;
            for (i, c) in captures.iter().enumerate() {
                writeln!(out, "{i}: {:<7} {c}", c.type_name())?;
            }
        }
        Commands::Print { file } => {
            write_route_file(out, &load(file, config)?, fmt, &opts)?;
        }
        Commands::Sort { file } => {
            let mut routes = load(file, config)?;
            sort_routes(&mut routes);
            write_route_file(out, &routes, fmt, &opts)?;
        }
        Commands::Sumup { file } => {
            let routes = load(file, config)?;
            let merged = aggregate_routes(&routes)?;
            log::info!("{file}: {} routes aggregated into {}", routes.len(), merged.len());
            write_route_file(out, &merged, fmt, &opts)?;
        }
        Commands::CmpFiles { a, b } => {
            let (a, b) = (load(a, config)?, load(b, config)?);
            write_compare_rows(out, &compare_files(&a, &b), &opts)?;
        }
        Commands::Missing { a, b } => {
            let (a, b) = (load(a, config)?, load(b, config)?);
            write_route_file(out, &missing_routes(&a, &b)?, fmt, &opts)?;
        }
        Commands::Convert { kind, file } => {
            let text = read(file)?;
            match kind {
                ConvertKind::Cisco => {
                    let (routes, report) = cisco_routes(&text, config)?;
                    summary(file, report);
                    write_route_file(out, &routes, fmt, &opts)?;
                }
                ConvertKind::Bgp => {
                    let (routes, report) = cisco_bgp(&text, config)?;
                    summary(file, report);
                    write_bgp_file(out, &routes, &config.bgp_output_fmt, &opts)?;
                }
            }
        }
    }
    Ok(())
}
