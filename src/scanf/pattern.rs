//! Format string compiler.
//!
//! A format is compiled once into a tree of [`Node`]s. Groups keep their
//! alternatives as separate node lists so the matcher never has to scan the
//! format text for the next `|`.

use crate::error::ScanError;

/// Largest field width or repetition count a format may give.
pub const MAX_NUMBER: usize = 65_535;

/// `[...]` / `[^...]` character set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharClass {
    negated: bool,
    items: Vec<(char, char)>,
}

impl CharClass {
    pub fn matches(&self, c: char) -> bool {
        let found = self.items.iter().any(|(lo, hi)| *lo <= c && c <= *hi);
        found != self.negated
    }
}

/// Integer size selected by the `h` / `l` modifiers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IntSize {
    Short,
    Int,
    Long,
}

/// Integer flavour selected by `d`, `u` or `x`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IntKind {
    Signed,
    Unsigned,
    Hex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// `%I`
    Addr,
    /// `%P`
    Subnet,
    /// `%Q`
    ClassfulSubnet,
    /// `%M`
    Mask,
    /// `%d %u %x` and their `h`/`l` forms
    Int(IntKind, IntSize),
    /// `%s`
    Str,
    /// `%S`
    NotAddr,
    /// `%W`
    Word,
    /// `%[...]`
    Class(CharClass),
    /// `%c`
    Char,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Char(char),
    Any,
    Class(CharClass),
    Group(Vec<Vec<Node>>),
    Conv {
        conv: Conversion,
        width: Option<usize>,
    },
}

/// An atom with its repetition bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub min: usize,
    pub max: Option<usize>,
    /// `$` suffix: stop at the last place the rest of the pattern can start.
    pub last: bool,
}

impl Node {
    fn once(kind: NodeKind) -> Node {
        Node {
            kind,
            min: 1,
            max: Some(1),
            last: false,
        }
    }

    pub fn is_single(&self) -> bool {
        self.min == 1 && self.max == Some(1) && !self.last
    }

    pub fn is_conversion(&self) -> bool {
        matches!(self.kind, NodeKind::Conv { .. })
    }
}

/// A compiled format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub(crate) nodes: Vec<Node>,
    source: String,
}

impl Pattern {
    /// Compile `fmt`, allowing groups nested at most `max_depth` deep.
    pub fn compile(fmt: &str, max_depth: usize) -> Result<Pattern, ScanError> {
        let mut parser = Parser {
            chars: fmt.chars().collect(),
            pos: 0,
            max_depth,
        };
        let nodes = parser.sequence(0)?;
        if parser.pos < parser.chars.len() {
            return Err(parser.error("unmatched ')'"));
        }
        log::trace!("compiled '{fmt}' into {} nodes", nodes.len());
        Ok(Pattern {
            nodes,
            source: fmt.to_string(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of conversion specifiers, groups included.
    pub fn conversions(&self) -> usize {
        fn count(nodes: &[Node]) -> usize {
            nodes
                .iter()
                .map(|n| match &n.kind {
                    NodeKind::Conv { .. } => 1,
                    NodeKind::Group(alts) => alts.iter().map(|a| count(a)).max().unwrap_or(0),
                    _ => 0,
                })
                .sum()
        }
        count(&self.nodes)
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    max_depth: usize,
}

impl Parser {
    fn error(&self, reason: &str) -> ScanError {
        log::debug!("bad format at {}: {reason}", self.pos);
        ScanError::BadFormat {
            pos: self.pos,
            reason: reason.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Nodes up to the end of input, or up to `|` / `)` inside a group.
    fn sequence(&mut self, depth: usize) -> Result<Vec<Node>, ScanError> {
        let mut nodes = Vec::new();
        while let Some(c) = self.peek() {
            if depth > 0 && (c == '|' || c == ')') {
                break;
            }
            if depth == 0 && c == ')' {
                break;
            }
            let node = self.atom(depth)?;
            let node = if node.is_conversion() {
                if matches!(self.peek(), Some('*' | '+' | '?' | '{')) {
                    return Err(self.error("quantifier after a conversion"));
                }
                node
            } else {
                self.quantifier(node)?
            };
            nodes.push(node);
        }
        Ok(nodes)
    }

    fn atom(&mut self, depth: usize) -> Result<Node, ScanError> {
        let c = self.bump().ok_or_else(|| self.error("unexpected end"))?;
        let kind = match c {
            '\\' => NodeKind::Char(self.escape()?),
            '.' => NodeKind::Any,
            '[' => NodeKind::Class(self.class()?),
            '(' => {
                if depth + 1 > self.max_depth {
                    return Err(self.error("groups nested too deep"));
                }
                NodeKind::Group(self.group(depth + 1)?)
            }
            '%' => return self.conversion(),
            '*' | '+' | '?' | '{' => return Err(self.error("quantifier without an atom")),
            other => NodeKind::Char(other),
        };
        Ok(Node::once(kind))
    }

    fn escape(&mut self) -> Result<char, ScanError> {
        match self.bump() {
            Some('t') => Ok('\t'),
            Some('n') => Ok('\n'),
            Some(c) => Ok(c),
            None => Err(self.error("trailing backslash")),
        }
    }

    /// Called after `(`; consumes the closing `)`.
    fn group(&mut self, depth: usize) -> Result<Vec<Vec<Node>>, ScanError> {
        let mut alts = vec![self.sequence(depth)?];
        loop {
            match self.bump() {
                Some('|') => alts.push(self.sequence(depth)?),
                Some(')') => return Ok(alts),
                _ => return Err(self.error("unmatched '('")),
            }
        }
    }

    /// Called after `[`; consumes the closing `]`.
    fn class(&mut self) -> Result<CharClass, ScanError> {
        let mut negated = false;
        if self.peek() == Some('^') {
            negated = true;
            self.pos += 1;
        }
        let mut items = Vec::new();
        if self.peek() == Some(']') {
            items.push((']', ']'));
            self.pos += 1;
        }
        loop {
            let c = match self.bump() {
                None => return Err(self.error("unmatched '['")),
                Some(']') => break,
                Some('\\') => self.escape()?,
                Some(c) => c,
            };
            let is_range = self.peek() == Some('-')
                && self.chars.get(self.pos + 1).is_some_and(|n| *n != ']');
            if is_range {
                self.pos += 1;
                let hi = match self.bump() {
                    Some('\\') => self.escape()?,
                    Some(h) => h,
                    None => return Err(self.error("unmatched '['")),
                };
                if hi < c {
                    return Err(self.error("reversed range in class"));
                }
                items.push((c, hi));
            } else {
                items.push((c, c));
            }
        }
        Ok(CharClass { negated, items })
    }

    /// Decimal number at the cursor, bounded by [`MAX_NUMBER`].
    fn number(&mut self) -> Result<Option<usize>, ScanError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(None);
        }
        match self.chars[start..self.pos].iter().collect::<String>().parse() {
            Ok(n) if n <= MAX_NUMBER => Ok(Some(n)),
            _ => Err(self.error("number too large")),
        }
    }

    /// Called after `%`.
    fn conversion(&mut self) -> Result<Node, ScanError> {
        if self.peek() == Some('%') {
            self.pos += 1;
            return Ok(Node::once(NodeKind::Char('%')));
        }
        let width = self.number()?;
        if width == Some(0) {
            return Err(self.error("zero field width"));
        }
        let size = match self.peek() {
            Some('h') => {
                self.pos += 1;
                IntSize::Short
            }
            Some('l') => {
                self.pos += 1;
                IntSize::Long
            }
            _ => IntSize::Int,
        };
        let c = self
            .bump()
            .ok_or_else(|| self.error("unterminated conversion"))?;
        let conv = match (c, size) {
            ('d', size) => Conversion::Int(IntKind::Signed, size),
            ('u', size) => Conversion::Int(IntKind::Unsigned, size),
            ('x', size) => Conversion::Int(IntKind::Hex, size),
            (_, IntSize::Short | IntSize::Long) => {
                return Err(self.error("size modifier on a non integer conversion"))
            }
            ('I', _) => Conversion::Addr,
            ('P', _) => Conversion::Subnet,
            ('Q', _) => Conversion::ClassfulSubnet,
            ('M', _) => Conversion::Mask,
            ('s', _) => Conversion::Str,
            ('S', _) => Conversion::NotAddr,
            ('W', _) => Conversion::Word,
            ('c', _) => Conversion::Char,
            ('[', _) => Conversion::Class(self.class()?),
            _ => return Err(self.error("unknown conversion")),
        };
        Ok(Node::once(NodeKind::Conv { conv, width }))
    }

    /// Apply a following `* + ? {m,n}` and optional `$` to `node`.
    fn quantifier(&mut self, mut node: Node) -> Result<Node, ScanError> {
        let (min, max) = match self.peek() {
            Some('*') => (0, None),
            Some('+') => (1, None),
            Some('?') => (0, Some(1)),
            Some('{') => {
                self.pos += 1;
                let min = self
                    .number()?
                    .ok_or_else(|| self.error("missing repetition count"))?;
                let max = if self.peek() == Some(',') {
                    self.pos += 1;
                    self.number()?
                } else {
                    Some(min)
                };
                if self.peek() != Some('}') {
                    return Err(self.error("unterminated '{'"));
                }
                if max.is_some_and(|m| m < min) {
                    return Err(self.error("repetition max below min"));
                }
                (min, max)
            }
            _ => return Ok(node),
        };
        self.pos += 1;
        node.min = min;
        node.max = max;
        if self.peek() == Some('$') {
            self.pos += 1;
            node.last = true;
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(fmt: &str) -> Result<Pattern, ScanError> {
        Pattern::compile(fmt, 4)
    }

    #[test]
    fn test_compile_literals_and_escapes() {
        let p = compile("a\\tb\\ c\\.").unwrap();
        let kinds: Vec<&NodeKind> = p.nodes.iter().map(|n| &n.kind).collect();
        assert_eq!(
            kinds,
            [
                &NodeKind::Char('a'),
                &NodeKind::Char('\t'),
                &NodeKind::Char('b'),
                &NodeKind::Char(' '),
                &NodeKind::Char('c'),
                &NodeKind::Char('.'),
            ]
        );
    }

    #[test]
    fn test_compile_quantifiers() {
        let p = compile("a*b+c?d{2}e{2,}f{1,3}.*$").unwrap();
        let q: Vec<(usize, Option<usize>, bool)> =
            p.nodes.iter().map(|n| (n.min, n.max, n.last)).collect();
        assert_eq!(
            q,
            [
                (0, None, false),
                (1, None, false),
                (0, Some(1), false),
                (2, Some(2), false),
                (2, None, false),
                (1, Some(3), false),
                (0, None, true),
            ]
        );
    }

    #[test]
    fn test_compile_class() {
        let p = compile("[]a-c]").unwrap();
        match &p.nodes[0].kind {
            NodeKind::Class(c) => {
                assert!(c.matches(']'));
                assert!(c.matches('b'));
                assert!(!c.matches('d'));
            }
            other => panic!("unexpected {other:?}"),
        }
        let p = compile("[^, \\n-]").unwrap();
        match &p.nodes[0].kind {
            NodeKind::Class(c) => {
                assert!(!c.matches(','));
                assert!(!c.matches('\n'));
                assert!(!c.matches('-'));
                assert!(c.matches('V'));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_compile_group_and_conversions() {
        let p = compile("(via|nexthop) %I%32[^,]%hd%lx%%").unwrap();
        match &p.nodes[0].kind {
            NodeKind::Group(alts) => assert_eq!(alts.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(p.conversions(), 4);
        assert_eq!(
            p.nodes[3].kind,
            NodeKind::Conv {
                conv: Conversion::Class(CharClass {
                    negated: true,
                    items: vec![(',', ',')]
                }),
                width: Some(32)
            }
        );
        assert_eq!(p.nodes.last().unwrap().kind, NodeKind::Char('%'));
    }

    #[test]
    fn test_compile_errors() {
        for fmt in [
            "(abc", "abc)", "[abc", "*a", "a{2", "a{3,1}", "%q", "%hs", "%d*", "%", "abc\\",
            "[z-a]", "((((((x))))))", "%0s", "x%18446744073709551615s", "%65536s", "a{99999999}",
        ] {
            assert!(
                matches!(compile(fmt), Err(ScanError::BadFormat { .. })),
                "{fmt:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_top_level_pipe_is_literal() {
        let p = compile("a|b").unwrap();
        assert_eq!(p.nodes.len(), 3);
        assert_eq!(p.nodes[1].kind, NodeKind::Char('|'));
    }
}
