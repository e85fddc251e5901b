//! Format string driven printing of captures, routes and BGP routes.
//!
//! All three formatters share one directive lexer and one bounded output
//! buffer. In header mode the route formatters print field names, so a
//! format string doubles as the CSV header of the file it writes.

use crate::codec::{mask2str, render_addr, render_subnet, Compression};
use crate::models::{Addr, BgpRoute, IpVersion, Route, Subnet};
use crate::processing::{first_ip, last_ip};
use crate::scanf::Sto;
use itertools::Itertools;

/// Printed for a missing or mistyped value.
pub const BAD_VALUE: &str = "<?>";

/// Formatter settings taken from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// IPv6 form used when a directive carries no level digit.
    pub compress: Compression,
    /// Separator between attributes printed by `%O#`.
    pub attr_separator: String,
    /// Output bound in bytes; longer output is truncated.
    pub max_line_len: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            compress: Compression::Mixed,
            attr_separator: ";".to_string(),
            max_line_len: 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrSel {
    All,
    Index(usize),
}

/// One `%` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Spec {
    left: bool,
    zero: bool,
    width: usize,
    size: Option<char>,
    conv: char,
    level: Option<u8>,
    attr: Option<AttrSel>,
    /// Directive text, echoed when the formatter does not know `conv`.
    raw: String,
}

impl Spec {
    fn compression(&self, opts: &FormatOptions) -> Compression {
        self.level
            .and_then(|l| Compression::try_from(l).ok())
            .unwrap_or(opts.compress)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Text(String),
    Directive(Spec),
}

fn lex(fmt: &str) -> Vec<Token> {
    let chars: Vec<char> = fmt.chars().collect();
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                match chars.get(i + 1) {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some(' ') => text.push(' '),
                    Some('\\') => text.push('\\'),
                    Some(c) => {
                        text.push('\\');
                        text.push(*c);
                    }
                    None => text.push('\\'),
                }
                i += 2;
            }
            '%' if chars.get(i + 1) == Some(&'%') => {
                text.push('%');
                i += 2;
            }
            '%' => {
                let (spec, next) = lex_directive(&chars, i);
                match spec {
                    Some(spec) => {
                        if !text.is_empty() {
                            tokens.push(Token::Text(std::mem::take(&mut text)));
                        }
                        tokens.push(Token::Directive(spec));
                    }
                    None => text.extend(&chars[i..next]),
                }
                i = next;
            }
            c => {
                text.push(c);
                i += 1;
            }
        }
    }
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    tokens
}

/// Lex the directive starting at `chars[start] == '%'`.
///
/// Returns `None` for a dangling `%`, and the index after the directive.
fn lex_directive(chars: &[char], start: usize) -> (Option<Spec>, usize) {
    let mut i = start + 1;
    let mut left = false;
    let mut zero = false;
    while let Some(c) = chars.get(i) {
        match c {
            '-' => left = true,
            '0' => zero = true,
            _ => break,
        }
        i += 1;
    }
    let digits = chars[i..].iter().take_while(|c| c.is_ascii_digit()).count();
    let width = if digits == 0 {
        0
    } else {
        match chars[i..i + digits].iter().collect::<String>().parse() {
            Ok(w) => w,
            Err(_) => return (None, i + digits),
        }
    };
    i += digits;

    let mut size = None;
    if let (Some(s @ ('h' | 'l')), Some('d' | 'u' | 'x')) = (chars.get(i), chars.get(i + 1)) {
        size = Some(*s);
        i += 1;
    }
    let conv = match chars.get(i) {
        Some(c) => *c,
        None => return (None, chars.len()),
    };
    i += 1;

    let mut level = None;
    let mut attr = None;
    match conv {
        'I' | 'P' | 'N' | 'B' | 'L' | 'U' | 'G' => {
            if let Some(d @ '0'..='3') = chars.get(i) {
                level = d.to_digit(10).map(|d| d as u8);
                i += 1;
            }
        }
        'O' => {
            if chars.get(i) == Some(&'#') {
                attr = Some(AttrSel::All);
                i += 1;
            } else {
                let n = chars[i..].iter().take_while(|c| c.is_ascii_digit()).count();
                attr = chars[i..i + n]
                    .iter()
                    .collect::<String>()
                    .parse()
                    .ok()
                    .map(AttrSel::Index);
                i += n;
            }
        }
        _ => {}
    }

    let spec = Spec {
        left,
        zero,
        width,
        size,
        conv,
        level,
        attr,
        raw: chars[start..i].iter().collect(),
    };
    (Some(spec), i)
}

/// Output assembled under a byte bound.
struct OutBuf {
    buf: String,
    max: usize,
}

impl OutBuf {
    fn new(max: usize) -> OutBuf {
        OutBuf {
            buf: String::new(),
            max,
        }
    }

    /// Append `s`, truncated to the remaining room. False once full.
    fn push(&mut self, s: &str) -> bool {
        let room = self.max.saturating_sub(self.buf.len());
        if s.len() <= room {
            self.buf.push_str(s);
            return true;
        }
        let mut end = room;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.buf.push_str(&s[..end]);
        false
    }
}

/// Pad `value` to the directive width, never beyond `max` characters.
fn pad(value: &str, spec: &Spec, max: usize) -> String {
    let len = value.chars().count();
    let width = spec.width.min(max);
    if len >= width {
        return value.to_string();
    }
    let fill = width - len;
    if spec.left {
        format!("{value}{}", " ".repeat(fill))
    } else if spec.zero {
        match value.strip_prefix('-') {
            Some(digits) => format!("-{}{digits}", "0".repeat(fill)),
            None => format!("{}{value}", "0".repeat(fill)),
        }
    } else {
        format!("{}{value}", " ".repeat(fill))
    }
}

/// Drive `fmt` through `directive`; `None` from it echoes the directive.
fn format_with(
    fmt: &str,
    opts: &FormatOptions,
    mut directive: impl FnMut(&Spec) -> Option<String>,
) -> String {
    let mut out = OutBuf::new(opts.max_line_len);
    for token in lex(fmt) {
        let fits = match token {
            Token::Text(text) => out.push(&text),
            Token::Directive(spec) => match directive(&spec) {
                Some(value) => out.push(&pad(&value, &spec, opts.max_line_len)),
                None => out.push(&spec.raw),
            },
        };
        if !fits {
            log::debug!("output of '{fmt}' truncated at {} bytes", opts.max_line_len);
            break;
        }
    }
    out.buf
}

/// Dotted netmask for IPv4, prefix length for IPv6.
fn netmask(subnet: &Subnet) -> String {
    match subnet.version() {
        IpVersion::V4 => mask2str(subnet.mask),
        IpVersion::V6 => subnet.mask.to_string(),
    }
}

/// First usable host: the network address, plus one for IPv4 up to /30.
fn first_host(subnet: &Subnet) -> Addr {
    let lo = first_ip(subnet).addr;
    match subnet.version() {
        IpVersion::V4 if subnet.mask < 31 => lo.increase(),
        _ => lo,
    }
}

fn last_host(subnet: &Subnet) -> Addr {
    let hi = last_ip(subnet);
    match subnet.version() {
        IpVersion::V4 if subnet.mask < 31 => hi.decrease(),
        _ => hi,
    }
}

/// Directives shared by the route and BGP formatters.
fn subnet_directive(spec: &Spec, subnet: &Subnet, opts: &FormatOptions) -> Option<String> {
    let level = spec.compression(opts);
    let value = match spec.conv {
        'I' => render_addr(&subnet.addr, level),
        'P' => render_subnet(subnet, level),
        'N' => render_addr(&first_ip(subnet).addr, level),
        'B' => render_addr(&last_ip(subnet), level),
        'L' => render_addr(&first_host(subnet), level),
        'U' => render_addr(&last_host(subnet), level),
        'm' => subnet.mask.to_string(),
        'M' => netmask(subnet),
        _ => return None,
    };
    Some(value)
}

fn subnet_header(conv: char) -> Option<&'static str> {
    let name = match conv {
        'I' => "address",
        'P' => "prefix",
        'N' => "network",
        'B' => "broadcast",
        'L' => "first",
        'U' => "last",
        'm' => "mask",
        'M' => "netmask",
        'G' => "gw",
        _ => return None,
    };
    Some(name)
}

fn gateway(gw: &Option<Addr>, spec: &Spec, opts: &FormatOptions) -> String {
    gw.map(|a| render_addr(&a, spec.compression(opts)))
        .unwrap_or_default()
}

/// Print positional scanner values.
///
/// Directives: `%d %u %x` (with `h`/`l`), `%s`, `%c`, `%I[level]`,
/// `%P[level]`, `%m`, `%M`, with `-`/`0` flags and a width. Each directive
/// takes the next value; a missing or mistyped one prints [`BAD_VALUE`].
///
/// ```
/// use subnet_tool::output::{st_printf, FormatOptions};
/// use subnet_tool::scanf::Sto;
///
/// let out = st_printf("%-5s|%04d", &[Sto::Str("ab".into()), Sto::Int(42)], &FormatOptions::default());
/// assert_eq!(out, "ab   |0042");
/// ```
pub fn st_printf(fmt: &str, values: &[Sto], opts: &FormatOptions) -> String {
    let mut values = values.iter();
    format_with(fmt, opts, |spec| {
        if !"duxscIPmM".contains(spec.conv) {
            return None;
        }
        let value = match values.next() {
            Some(v) => v,
            None => return Some(BAD_VALUE.to_string()),
        };
        let rendered = match spec.conv {
            'd' | 'u' => value.as_int().map(|v| v.to_string()),
            'x' => value.as_int().map(|v| hex(v, spec.size)),
            's' => match value {
                Sto::Str(s) => Some(s.clone()),
                Sto::Char(c) => Some(c.to_string()),
                _ => None,
            },
            'c' => match value {
                Sto::Char(c) => Some(c.to_string()),
                _ => None,
            },
            'I' => match value {
                Sto::Addr(a) => Some(render_addr(a, spec.compression(opts))),
                Sto::Subnet(s) => Some(render_addr(&s.addr, spec.compression(opts))),
                _ => None,
            },
            'P' => value
                .as_subnet()
                .map(|s| render_subnet(&s, spec.compression(opts))),
            'm' => match value {
                Sto::Mask(m) => Some(m.to_string()),
                Sto::Subnet(s) => Some(s.mask.to_string()),
                _ => None,
            },
            'M' => match value {
                Sto::Mask(m) => Some(mask2str(*m)),
                Sto::Subnet(s) => Some(netmask(s)),
                _ => None,
            },
            _ => None,
        };
        Some(rendered.unwrap_or_else(|| BAD_VALUE.to_string()))
    })
}

/// Negative values print as the two's complement of the directive's size.
fn hex(v: i128, size: Option<char>) -> String {
    if v >= 0 {
        return format!("{v:x}");
    }
    match size {
        Some('h') => format!("{:x}", v as u16),
        Some('l') => format!("{:x}", v as u64),
        _ => format!("{:x}", v as u32),
    }
}

/// Print one route, or with `None` the header line for `fmt`.
///
/// `names` is the attribute name table of the route's file.
///
/// ```
/// use subnet_tool::models::Route;
/// use subnet_tool::output::{fprint_route, FormatOptions};
///
/// let names = vec!["comment".to_string()];
/// let route = Route::new("10.1.0.0/16".parse().unwrap(), "eth0", None, vec!["lab".into()]);
/// let opts = FormatOptions::default();
/// assert_eq!(fprint_route("%P;%D;%C", None, &names, &opts), "prefix;device;comment");
/// assert_eq!(fprint_route("%P;%D;%C", Some(&route), &names, &opts), "10.1.0.0/16;eth0;lab");
/// ```
pub fn fprint_route(
    fmt: &str,
    route: Option<&Route>,
    names: &[String],
    opts: &FormatOptions,
) -> String {
    format_with(fmt, opts, |spec| match route {
        None => route_header(spec, names, opts),
        Some(route) => route_value(spec, route, opts),
    })
}

fn route_header(spec: &Spec, names: &[String], opts: &FormatOptions) -> Option<String> {
    let name = match spec.conv {
        'D' => "device".to_string(),
        'C' => "comment".to_string(),
        'O' => match spec.attr? {
            AttrSel::All => names.join(&opts.attr_separator),
            AttrSel::Index(n) => names.get(n).cloned().unwrap_or_default(),
        },
        c => subnet_header(c)?.to_string(),
    };
    Some(name)
}

/// Quote a text field holding the separator or a quote, doubling quotes.
fn quote_field(value: &str, separator: &str) -> String {
    if value.contains('"') || (!separator.is_empty() && value.contains(separator)) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn route_value(spec: &Spec, route: &Route, opts: &FormatOptions) -> Option<String> {
    let sep = opts.attr_separator.as_str();
    let value = match spec.conv {
        'D' => quote_field(&route.device, sep),
        'G' => gateway(&route.gw, spec, opts),
        'C' => quote_field(route.comment(), sep),
        'O' => match spec.attr? {
            AttrSel::All => route.attrs.iter().map(|a| quote_field(a, sep)).join(sep),
            AttrSel::Index(n) => quote_field(route.attrs.get(n).map_or("", String::as_str), sep),
        },
        _ => return subnet_directive(spec, &route.subnet, opts),
    };
    Some(value)
}

/// Print one BGP route, or with `None` the header line for `fmt`.
pub fn fprint_bgp_route(fmt: &str, route: Option<&BgpRoute>, opts: &FormatOptions) -> String {
    format_with(fmt, opts, |spec| match route {
        None => bgp_header(spec.conv).map(str::to_string),
        Some(route) => bgp_value(spec, route, opts),
    })
}

fn bgp_header(conv: char) -> Option<&'static str> {
    let name = match conv {
        'e' => "med",
        'l' => "localpref",
        'w' => "weight",
        'A' => "aspath",
        'o' => "origin",
        'v' => "valid",
        'b' => "best",
        'i' => "type",
        'N' | 'B' | 'L' | 'U' => return None,
        c => subnet_header(c)?,
    };
    Some(name)
}

fn bgp_value(spec: &Spec, route: &BgpRoute, opts: &FormatOptions) -> Option<String> {
    let flag = |set: bool, c: &str| if set { c.to_string() } else { String::new() };
    let value = match spec.conv {
        'G' => gateway(&route.gw, spec, opts),
        'e' => route.med.to_string(),
        'l' => route.local_pref.to_string(),
        'w' => route.weight.to_string(),
        'A' => route.as_path.clone(),
        'o' => route.origin.code().to_string(),
        'v' => flag(route.valid, "*"),
        'b' => flag(route.best, ">"),
        'i' => (if route.internal { "i" } else { "e" }).to_string(),
        'I' | 'P' | 'm' | 'M' => return subnet_directive(spec, &route.subnet, opts),
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::string2addr;
    use crate::models::Origin;

    fn opts() -> FormatOptions {
        FormatOptions::default()
    }

    fn route() -> Route {
        Route::new(
            "10.1.2.0/24".parse().unwrap(),
            "Vlan5",
            Some(string2addr("10.1.2.254").unwrap()),
            vec!["core".to_string(), "site-a".to_string()],
        )
    }

    fn names() -> Vec<String> {
        vec!["comment".to_string(), "site".to_string()]
    }

    #[test]
    fn test_st_printf_numbers() {
        let values = [Sto::Int(-42), Sto::UInt(255), Sto::Short(-1), Sto::Long(7)];
        let out = st_printf("%05d %x %hx %-3ld|", &values, &opts());
        assert_eq!(out, "-0042 ff ffff 7  |");
    }

    #[test]
    fn test_st_printf_addresses() {
        let values = [
            Sto::Addr(string2addr("2001:db8::1").unwrap()),
            Sto::Subnet("2001:db8::/32".parse().unwrap()),
            Sto::Mask(24),
            Sto::Mask(24),
        ];
        let out = st_printf("%I0 %P %m %M", &values, &opts());
        assert_eq!(
            out,
            "2001:0db8:0000:0000:0000:0000:0000:0001 2001:db8::/32 24 255.255.255.0"
        );
    }

    #[test]
    fn test_st_printf_missing_and_mistyped() {
        let out = st_printf("%d %s %d", &[Sto::Str("x".into()), Sto::Str("y".into())], &opts());
        assert_eq!(out, "<?> y <?>");
    }

    #[test]
    fn test_unknown_directives_are_literal() {
        let out = st_printf("100%% %z \\q%", &[], &opts());
        assert_eq!(out, "100% %z \\q%");
        let out = fprint_route("%Z;%P", Some(&route()), &names(), &opts());
        assert_eq!(out, "%Z;10.1.2.0/24");
    }

    #[test]
    fn test_escapes() {
        let out = st_printf("a\\tb\\nc\\ d", &[], &opts());
        assert_eq!(out, "a\tb\nc d");
    }

    #[test]
    fn test_fprint_route_values() {
        let r = route();
        let n = names();
        let o = opts();
        assert_eq!(fprint_route("%P;%D;%G;%O#", Some(&r), &n, &o), "10.1.2.0/24;Vlan5;10.1.2.254;core;site-a");
        assert_eq!(fprint_route("%N %B %L %U", Some(&r), &n, &o), "10.1.2.0 10.1.2.255 10.1.2.1 10.1.2.254");
        assert_eq!(fprint_route("%m %M %C %O1", Some(&r), &n, &o), "24 255.255.255.0 core site-a");
        assert_eq!(fprint_route("[%-12D]", Some(&r), &n, &o), "[Vlan5       ]");
    }

    #[test]
    fn test_fields_with_separator_are_quoted() {
        let mut r = route();
        r.attrs[0] = "v6; lab".to_string();
        r.attrs[1] = "say \"hi\"".to_string();
        let out = fprint_route("%P;%O#", Some(&r), &names(), &opts());
        assert_eq!(out, "10.1.2.0/24;\"v6; lab\";\"say \"\"hi\"\"\"");
        assert_eq!(fprint_route("%C", Some(&r), &names(), &opts()), "\"v6; lab\"");
    }

    #[test]
    fn test_fprint_route_header() {
        let out = fprint_route("%P;%D;%G;%O#", None, &names(), &opts());
        assert_eq!(out, "prefix;device;gw;comment;site");
        let out = fprint_route("%I %m %M %O1", None, &names(), &opts());
        assert_eq!(out, "address mask netmask site");
    }

    #[test]
    fn test_fprint_route_ipv6_levels() {
        let r = Route::new("2001:db8::/64".parse().unwrap(), "", None, vec![String::new()]);
        let n = vec!["comment".to_string()];
        assert_eq!(fprint_route("%P1", Some(&r), &n, &opts()), "2001:db8:0:0:0:0:0:0/64");
        assert_eq!(fprint_route("%B", Some(&r), &n, &opts()), "2001:db8::ffff:ffff:ffff:ffff");
        assert_eq!(fprint_route("%M;%G", Some(&r), &n, &opts()), "64;");
    }

    #[test]
    fn test_truncation_stops_output() {
        let o = FormatOptions {
            max_line_len: 8,
            ..opts()
        };
        let out = fprint_route("%P;%D", Some(&route()), &names(), &o);
        assert_eq!(out, "10.1.2.0");
    }

    #[test]
    fn test_width_beyond_line_bound() {
        let o = FormatOptions {
            max_line_len: 16,
            ..opts()
        };
        let out = st_printf("%10000000d", &[Sto::Int(1)], &o);
        assert_eq!(out, format!("{}1", " ".repeat(15)));

        // a width that does not fit a usize is echoed, then truncated
        let out = st_printf("%18446744073709551616d", &[Sto::Int(1)], &o);
        assert_eq!(out, "%184467440737095");
    }

    #[test]
    fn test_fprint_bgp_route() {
        let mut r = BgpRoute {
            subnet: "10.0.0.0/8".parse().unwrap(),
            gw: Some(string2addr("192.0.2.1").unwrap()),
            med: 10,
            local_pref: 100,
            weight: 0,
            valid: true,
            best: true,
            internal: false,
            origin: Origin::Igp,
            ..BgpRoute::default()
        };
        r.set_as_path("65001 65002");
        let fmt = "%v%b %P %G %e %l %w %A %o %i";
        assert_eq!(
            fprint_bgp_route(fmt, Some(&r), &opts()),
            "*> 10.0.0.0/8 192.0.2.1 10 100 0 65001 65002 i e"
        );
        assert_eq!(
            fprint_bgp_route(fmt, None, &opts()),
            "validbest prefix gw med localpref weight aspath origin type"
        );
    }
}
