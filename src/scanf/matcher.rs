//! Recursive descent matcher for compiled patterns.
//!
//! Quantified atoms are greedy but stop where the rest of the pattern can
//! start (the first such place, or the last false to true transition with
//! `$`). Group alternatives are tried in order and the first one that
//! matches commits; there is no backtracking out of a group.

use super::pattern::{Conversion, IntKind, IntSize, Node, NodeKind, Pattern};
use super::sto::Sto;
use crate::codec::{classfull_get_subnet, get_subnet_or_ip, string2addr, string2mask, MAX_ADDR_LEN};
use crate::error::ScanError;
use crate::models::IpVersion;

/// Longest candidate tried for `%P` (`address/mask`).
const MAX_PREFIX_LEN: usize = MAX_ADDR_LEN + 16;

enum Step {
    Matched(usize),
    Failed,
    /// Capture capacity reached, the scan ends here.
    Full,
}

/// What follows the node being matched, innermost first.
struct Follow<'a> {
    nodes: &'a [Node],
    next: Option<&'a Follow<'a>>,
}

struct Matcher<'i> {
    input: &'i [char],
    out: Vec<Sto>,
    capacity: usize,
    literal_matched: bool,
    completed: bool,
}

impl Pattern {
    /// Match `input`, capturing at most `capacity` values.
    ///
    /// Matching starts at the beginning of the input, then at each
    /// following token start, and returns the captures of the first start
    /// that is not a hard failure. A partial match returns the values
    /// captured before the mismatch; callers judge a line by the number of
    /// captures.
    pub fn scan(&self, input: &str, capacity: usize) -> Result<Vec<Sto>, ScanError> {
        let chars: Vec<char> = input.chars().collect();
        let starts = (0..=chars.len()).filter(|i| *i == 0 || chars[i - 1].is_whitespace());
        for start in starts {
            let mut m = Matcher {
                input: &chars,
                out: Vec::new(),
                capacity,
                literal_matched: false,
                completed: false,
            };
            m.run(&self.nodes, start);
            if m.completed || m.literal_matched || !m.out.is_empty() {
                log::trace!(
                    "'{}' on '{input}' at {start}: {} captures, complete={}",
                    self.source(),
                    m.out.len(),
                    m.completed
                );
                return Ok(m.out);
            }
        }
        log::trace!("'{}' does not match '{input}'", self.source());
        Err(ScanError::NoMatch)
    }
}

impl<'i> Matcher<'i> {
    fn run(&mut self, nodes: &[Node], start: usize) {
        let mut pos = start;
        for (i, node) in nodes.iter().enumerate() {
            let follow = Follow {
                nodes: &nodes[i + 1..],
                next: None,
            };
            match self.node(node, pos, &follow) {
                Step::Matched(p) => {
                    if p > pos && !node.is_conversion() {
                        self.literal_matched = true;
                    }
                    pos = p;
                }
                Step::Failed | Step::Full => return,
            }
        }
        self.completed = true;
    }

    fn sequence(&mut self, nodes: &[Node], mut pos: usize, next: Option<&Follow>) -> Step {
        for (i, node) in nodes.iter().enumerate() {
            let follow = Follow {
                nodes: &nodes[i + 1..],
                next,
            };
            match self.node(node, pos, &follow) {
                Step::Matched(p) => pos = p,
                other => return other,
            }
        }
        Step::Matched(pos)
    }

    fn node(&mut self, node: &Node, pos: usize, follow: &Follow) -> Step {
        if node.is_single() {
            return self.once(&node.kind, pos, follow);
        }
        self.repeat(node, pos, follow)
    }

    fn repeat(&mut self, node: &Node, mut pos: usize, follow: &Follow) -> Step {
        let mut count = 0;
        let mut prev_ok = false;
        // (position, captures) of the last false -> true transition
        let mut last_stop: Option<(usize, usize)> = None;

        loop {
            if count >= node.min {
                let ok = self.can_start(follow, pos);
                if ok && !node.last {
                    return Step::Matched(pos);
                }
                if ok && !prev_ok {
                    last_stop = Some((pos, self.out.len()));
                }
                prev_ok = ok;
            }
            if node.max.is_some_and(|m| count >= m) {
                break;
            }
            let mark = self.out.len();
            match self.once(&node.kind, pos, follow) {
                Step::Matched(p) if p == pos => {
                    // zero width, more rounds would not move
                    count = (count + 1).max(node.min);
                    break;
                }
                Step::Matched(p) => {
                    pos = p;
                    count += 1;
                }
                Step::Full => return Step::Full,
                Step::Failed => {
                    self.out.truncate(mark);
                    break;
                }
            }
        }
        if count < node.min {
            return Step::Failed;
        }
        if node.last {
            if let Some((p, captures)) = last_stop {
                self.out.truncate(captures);
                return Step::Matched(p);
            }
        }
        Step::Matched(pos)
    }

    fn once(&mut self, kind: &NodeKind, pos: usize, follow: &Follow) -> Step {
        match kind {
            NodeKind::Char(c) => match self.input.get(pos) {
                Some(i) if i == c => Step::Matched(pos + 1),
                _ => Step::Failed,
            },
            NodeKind::Any => {
                if pos < self.input.len() {
                    Step::Matched(pos + 1)
                } else {
                    Step::Failed
                }
            }
            NodeKind::Class(class) => match self.input.get(pos) {
                Some(c) if class.matches(*c) => Step::Matched(pos + 1),
                _ => Step::Failed,
            },
            NodeKind::Group(alts) => {
                for alt in alts {
                    let mark = self.out.len();
                    match self.sequence(alt, pos, Some(follow)) {
                        Step::Failed => self.out.truncate(mark),
                        other => return other,
                    }
                }
                Step::Failed
            }
            NodeKind::Conv { conv, width } => {
                if self.out.len() >= self.capacity {
                    return Step::Full;
                }
                match convert(self.input, pos, conv, *width) {
                    Some((sto, p)) => {
                        self.out.push(sto);
                        Step::Matched(p)
                    }
                    None => Step::Failed,
                }
            }
        }
    }

    /// Stop predicate: can the rest of the pattern start at `pos`?
    ///
    /// The end of the pattern never stops a repetition.
    fn can_start(&self, follow: &Follow, pos: usize) -> bool {
        match follow.nodes.split_first() {
            None => match follow.next {
                Some(outer) => self.can_start(outer, pos),
                None => false,
            },
            Some((first, rest)) => {
                if self.probe(&first.kind, pos) {
                    return true;
                }
                first.min == 0
                    && self.can_start(
                        &Follow {
                            nodes: rest,
                            next: follow.next,
                        },
                        pos,
                    )
            }
        }
    }

    /// Does one occurrence of `kind` match at `pos`? Captures are discarded.
    fn probe(&self, kind: &NodeKind, pos: usize) -> bool {
        match kind {
            NodeKind::Char(c) => self.input.get(pos) == Some(c),
            NodeKind::Any => pos < self.input.len(),
            NodeKind::Class(class) => self.input.get(pos).is_some_and(|c| class.matches(*c)),
            NodeKind::Conv { conv, width } => convert(self.input, pos, conv, *width).is_some(),
            NodeKind::Group(alts) => {
                let mut scratch = Matcher {
                    input: self.input,
                    out: Vec::new(),
                    capacity: usize::MAX,
                    literal_matched: false,
                    completed: false,
                };
                alts.iter().any(|alt| {
                    scratch.out.clear();
                    matches!(scratch.sequence(alt, pos, None), Step::Matched(_))
                })
            }
        }
    }
}

/// Run one conversion at `pos`, returning the value and the new position.
fn convert(
    input: &[char],
    pos: usize,
    conv: &Conversion,
    width: Option<usize>,
) -> Option<(Sto, usize)> {
    let end = width.map_or(input.len(), |w| pos.saturating_add(w).min(input.len()));
    let window = input.get(pos..end)?;

    match conv {
        Conversion::Char => window.first().map(|c| (Sto::Char(*c), pos + 1)),
        Conversion::Str => {
            let n = span(window, |c| !c.is_whitespace());
            (n > 0).then(|| (Sto::Str(collect(&window[..n])), pos + n))
        }
        Conversion::NotAddr => {
            let n = span(window, |c| !c.is_whitespace());
            let token = collect(&window[..n]);
            if n == 0 || string2addr(&token).is_ok() {
                return None;
            }
            Some((Sto::Str(token), pos + n))
        }
        Conversion::Word => {
            let n = span(window, |c| c.is_alphabetic());
            (n > 0).then(|| (Sto::Str(collect(&window[..n])), pos + n))
        }
        Conversion::Class(class) => {
            let n = span(window, |c| class.matches(c));
            (n > 0).then(|| (Sto::Str(collect(&window[..n])), pos + n))
        }
        Conversion::Int(kind, size) => convert_int(window, pos, *kind, *size),
        Conversion::Addr => longest(window, MAX_ADDR_LEN, is_addr_char, |s| {
            string2addr(s).ok().map(Sto::Addr)
        })
        .map(|(sto, n)| (sto, pos + n)),
        Conversion::Subnet => longest(
            window,
            MAX_PREFIX_LEN,
            |c| is_addr_char(c) || c == '/',
            |s| get_subnet_or_ip(s).ok().map(|(subnet, _)| Sto::Subnet(subnet)),
        )
        .map(|(sto, n)| (sto, pos + n)),
        Conversion::ClassfulSubnet => longest(
            window,
            MAX_PREFIX_LEN,
            |c| c.is_ascii_digit() || c == '.' || c == '/',
            |s| classfull_get_subnet(s).ok().map(Sto::Subnet),
        )
        .map(|(sto, n)| (sto, pos + n)),
        Conversion::Mask => longest(
            window,
            15,
            |c| c.is_ascii_digit() || c == '.',
            |s| {
                string2mask(s, IpVersion::V4)
                    .or_else(|_| string2mask(s, IpVersion::V6))
                    .ok()
                    .map(Sto::Mask)
            },
        )
        .map(|(sto, n)| (sto, pos + n)),
    }
}

fn span(window: &[char], pred: impl Fn(char) -> bool) -> usize {
    window.iter().take_while(|c| pred(**c)).count()
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

fn is_addr_char(c: char) -> bool {
    c.is_ascii_hexdigit() || c == '.' || c == ':'
}

/// Longest run of `allowed` chars (at most `max`) that `parse` accepts,
/// shrinking from the right until it does.
fn longest(
    window: &[char],
    max: usize,
    allowed: impl Fn(char) -> bool,
    parse: impl Fn(&str) -> Option<Sto>,
) -> Option<(Sto, usize)> {
    let n = span(window, allowed).min(max);
    (1..=n).rev().find_map(|len| parse(&collect(&window[..len])).map(|sto| (sto, len)))
}

fn convert_int(window: &[char], pos: usize, kind: IntKind, size: IntSize) -> Option<(Sto, usize)> {
    let (sign, digits_start) = match (kind, window.first()) {
        (IntKind::Signed, Some('-')) => (-1i128, 1),
        (IntKind::Signed, Some('+')) => (1, 1),
        _ => (1, 0),
    };
    let radix = if kind == IntKind::Hex { 16 } else { 10 };
    let digits = &window[digits_start..];
    let n = span(digits, |c| c.is_digit(radix));
    if n == 0 {
        return None;
    }
    let magnitude = i128::from_str_radix(&collect(&digits[..n]), radix).ok()?;
    let value = sign * magnitude;
    let sto = match (kind, size) {
        (IntKind::Signed, IntSize::Short) => Sto::Short(i16::try_from(value).ok()?),
        (IntKind::Signed, IntSize::Int) => Sto::Int(i32::try_from(value).ok()?),
        (IntKind::Signed, IntSize::Long) => Sto::Long(i64::try_from(value).ok()?),
        (_, IntSize::Short) => Sto::UShort(u16::try_from(value).ok()?),
        (_, IntSize::Int) => Sto::UInt(u32::try_from(value).ok()?),
        (_, IntSize::Long) => Sto::ULong(u64::try_from(value).ok()?),
    };
    Some((sto, pos + digits_start + n))
}
