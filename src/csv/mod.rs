//! Route file loading.
//!
//! - [`fields`] - delimited line splitting with quoted fields
//!
//! A route file is a header line naming the columns followed by one route
//! per line:
//!
//! ```text
//! prefix;mask;device;gw;comment;site
//! 10.1.0.0;255.255.0.0;Vlan10;10.0.0.1;core;paris
//! 2001:db8::/32;;eth0;;"v6, lab";lyon
//! ```
//!
//! `prefix` (or `subnet`) is required. `mask`, `device`, `gw` (or
//! `gateway`) and `comment` are optional; every other column becomes an
//! extended attribute.

mod fields;

pub use fields::FieldSplitter;

use crate::codec::{get_subnet_or_ip, string2addr, string2mask};
use crate::config::Config;
use crate::error::LoadError;
use crate::models::{Route, RouteFile, COMMENT};

/// Outcome of a load: lines turned into routes, and lines skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub good: usize,
    pub bad: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Prefix,
    Mask,
    Device,
    Gw,
    /// Index into the attribute name table.
    Attr(usize),
}

/// Column layout read from the header line.
#[derive(Debug)]
struct Layout {
    columns: Vec<Column>,
    attr_names: Vec<String>,
}

impl Layout {
    fn from_header(fields: &[String]) -> Result<Layout, LoadError> {
        let mut attr_names = vec![COMMENT.to_string()];
        let mut columns = Vec::with_capacity(fields.len());
        for field in fields {
            let name = field.trim().to_lowercase();
            let column = match name.as_str() {
                "prefix" | "subnet" => Column::Prefix,
                "mask" => Column::Mask,
                "device" => Column::Device,
                "gw" | "gateway" => Column::Gw,
                COMMENT => Column::Attr(0),
                "" => return Err(LoadError::BadHeader("empty column name".to_string())),
                _ if attr_names.iter().any(|n| n.eq_ignore_ascii_case(&name)) => {
                    return Err(LoadError::BadHeader(format!("duplicate column '{name}'")));
                }
                _ => {
                    attr_names.push(field.trim().to_string());
                    Column::Attr(attr_names.len() - 1)
                }
            };
            if columns.contains(&column) {
                return Err(LoadError::BadHeader(format!("duplicate column '{name}'")));
            }
            columns.push(column);
        }
        if !columns.contains(&Column::Prefix) {
            return Err(LoadError::BadHeader("no prefix column".to_string()));
        }
        Ok(Layout {
            columns,
            attr_names,
        })
    }

    fn parse_line(&self, fields: &[String], file: &RouteFile) -> Result<Route, String> {
        let mut prefix = None;
        let mut mask = None;
        let mut route = file.blank_route(Default::default());
        for (column, value) in self.columns.iter().zip(fields) {
            match column {
                Column::Prefix => prefix = Some(value.as_str()),
                Column::Mask if !value.is_empty() => mask = Some(value.as_str()),
                Column::Mask => {}
                Column::Device => route.device = value.clone(),
                Column::Gw if value.is_empty() => {}
                Column::Gw => route.gw = Some(string2addr(value).map_err(|e| e.to_string())?),
                Column::Attr(i) => route.attrs[*i] = value.clone(),
            }
        }
        let prefix = prefix
            .filter(|p| !p.is_empty())
            .ok_or_else(|| "missing prefix".to_string())?;
        let (mut subnet, _) = get_subnet_or_ip(prefix).map_err(|e| e.to_string())?;
        if let Some(mask) = mask {
            subnet.mask = string2mask(mask, subnet.version()).map_err(|e| e.to_string())?;
        }
        route.subnet = subnet;
        Ok(route)
    }
}

/// Load the route file at `path`.
///
/// Malformed lines are logged, counted in the report and skipped. Ceiling
/// violations and header problems abort the load.
///
/// # Arguments
/// * `path` - File to read
/// * `config` - Delimiter and size ceilings
///
/// # Returns
/// The routes and the good/bad line counts
pub fn load_route_file(path: &str, config: &Config) -> Result<(RouteFile, LoadReport), LoadError> {
    log::info!("#Start load_route_file({path})");
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_string(),
        source,
    })?;
    parse_route_text(&text, path, config)
}

/// Parse route file contents; `name` is used in messages.
pub fn parse_route_text(
    text: &str,
    name: &str,
    config: &Config,
) -> Result<(RouteFile, LoadReport), LoadError> {
    let limits = &config.limits;
    let splitter = FieldSplitter::for_delimiter(config.csv_delimiter)
        .map_err(|e| LoadError::BadHeader(format!("delimiter: {e}")))?;

    let mut layout: Option<Layout> = None;
    let mut file = RouteFile::new(limits);
    let mut report = LoadReport::default();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        if line_no > limits.max_lines {
            return Err(LoadError::TooManyLines {
                path: name.to_string(),
                max: limits.max_lines,
            });
        }
        if line.len() > limits.max_line_len {
            return Err(LoadError::LineTooLong {
                path: name.to_string(),
                line: line_no,
                max: limits.max_line_len,
            });
        }
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let fields = splitter.split(line);

        let current = match &layout {
            Some(l) => l,
            None => {
                let l = Layout::from_header(&fields)?;
                log::debug!("{name}: columns {:?}, attributes {:?}", l.columns, l.attr_names);
                file = RouteFile::with_attributes(l.attr_names.clone(), limits);
                layout = Some(l);
                continue;
            }
        };
        match current.parse_line(&fields, &file) {
            Ok(route) => {
                file.push(route)?;
                report.good += 1;
            }
            Err(reason) => {
                let e = LoadError::BadLine {
                    line: line_no,
                    reason,
                };
                log::warn!("{name}: {e}");
                report.bad += 1;
            }
        }
    }
    if layout.is_none() {
        return Err(LoadError::BadHeader(format!("{name}: no header line")));
    }
    log::info!("{name}: {} good / {} bad", report.good, report.bad);
    Ok((file, report))
}
