//! CSV output of route files and comparison results.

use super::printf::{fprint_bgp_route, fprint_route, FormatOptions};
use super::terminal::format_field;
use crate::codec::render_subnet;
use crate::models::{BgpFile, RouteFile};
use crate::processing::CompareRow;
use std::error::Error;
use std::io::Write;

/// Write a header line for `fmt`, then one line per route.
///
/// # Arguments
/// * `out` - Destination
/// * `file` - Routes to write
/// * `fmt` - Route format string
/// * `opts` - Formatter options
///
/// # Returns
/// The number of routes written
pub fn write_route_file<W: Write>(
    out: &mut W,
    file: &RouteFile,
    fmt: &str,
    opts: &FormatOptions,
) -> Result<usize, Box<dyn Error>> {
    log::info!("#Start write_route_file() {} routes fmt='{fmt}'", file.len());
    writeln!(out, "{}", fprint_route(fmt, None, file.attr_names(), opts))?;
    for route in file.iter() {
        writeln!(out, "{}", fprint_route(fmt, Some(route), file.attr_names(), opts))?;
    }
    Ok(file.len())
}

/// Write a header line for `fmt`, then one line per BGP route.
pub fn write_bgp_file<W: Write>(
    out: &mut W,
    file: &BgpFile,
    fmt: &str,
    opts: &FormatOptions,
) -> Result<usize, Box<dyn Error>> {
    log::info!("#Start write_bgp_file() {} routes fmt='{fmt}'", file.len());
    writeln!(out, "{}", fprint_bgp_route(fmt, None, opts))?;
    for route in file.routes() {
        writeln!(out, "{}", fprint_bgp_route(fmt, Some(route), opts))?;
    }
    Ok(file.len())
}

/// Write comparison rows as quoted, aligned CSV.
pub fn write_compare_rows<W: Write>(
    out: &mut W,
    rows: &[CompareRow],
    opts: &FormatOptions,
) -> Result<(), Box<dyn Error>> {
    writeln!(
        out,
        "{},{},{}",
        format_field("prefix", 20),
        format_field("relation", 12),
        format_field("other", 20)
    )?;
    for row in rows {
        let prefix = render_subnet(&row.route.subnet, opts.compress);
        let other = row
            .other
            .map(|s| render_subnet(&s, opts.compress))
            .unwrap_or_default();
        writeln!(
            out,
            "{prefix},{relation},{other}",
            prefix = format_field(prefix, 20),
            relation = format_field(row.relation, 12),
            other = format_field(other, 20),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limits;
    use crate::csv::parse_route_text;
    use crate::models::Route;
    use crate::processing::compare_files;

    fn file_of(prefixes: &[&str]) -> RouteFile {
        let mut f = RouteFile::new(&Limits::default());
        for p in prefixes {
            f.push(Route::new(p.parse().unwrap(), "eth0", None, vec!["c".to_string()]))
                .unwrap();
        }
        f
    }

    #[test]
    fn test_write_route_file() {
        let file = file_of(&["10.0.0.0/8", "2001:db8::/32"]);
        let mut out = Vec::new();
        let n = write_route_file(&mut out, &file, "%P;%D;%G;%O#", &FormatOptions::default())
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "prefix;device;gw;comment\n10.0.0.0/8;eth0;;c\n2001:db8::/32;eth0;;c\n"
        );
    }

    #[test]
    fn test_written_file_reloads() {
        let config = crate::config::Config::default();
        let text = "prefix;device;comment;site\n10.0.0.0/8;eth0;\"v6; lab\";lyon\n";
        let (file, _) = parse_route_text(text, "in", &config).unwrap();
        let mut out = Vec::new();
        write_route_file(&mut out, &file, "%P;%D;%G;%O#", &FormatOptions::default()).unwrap();
        let written = String::from_utf8(out).unwrap();
        assert_eq!(
            written,
            "prefix;device;gw;comment;site\n10.0.0.0/8;eth0;;\"v6; lab\";lyon\n"
        );

        let (again, report) = parse_route_text(&written, "out", &config).unwrap();
        assert_eq!(report.bad, 0);
        assert_eq!(again.attr_names(), file.attr_names());
        assert_eq!(again.routes()[0].attrs, ["v6; lab", "lyon"]);
    }

    #[test]
    fn test_write_compare_rows() {
        let a = file_of(&["10.1.0.0/16"]);
        let b = file_of(&["10.0.0.0/8"]);
        let rows = compare_files(&a, &b);
        let mut out = Vec::new();
        write_compare_rows(&mut out, &rows, &FormatOptions::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let line = text.lines().nth(1).unwrap();
        assert_eq!(line, r#"       "10.1.0.0/16",  "INCLUDED",        "10.0.0.0/8""#);
    }
}
