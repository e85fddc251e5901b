//! Splitting of delimited lines with double-quoted fields.

use regex::Regex;
use std::sync::OnceLock;

/// Splitter for the default `;` delimiter.
static SEMICOLON: OnceLock<FieldSplitter> = OnceLock::new();

/// Splits a line on a delimiter, keeping quoted fields whole.
///
/// Inside quotes the delimiter is literal and `""` stands for one `"`.
/// Unquoted fields are trimmed.
#[derive(Debug, Clone)]
pub struct FieldSplitter {
    delimiter: char,
    re: Regex,
}

impl FieldSplitter {
    pub fn new(delimiter: char) -> Result<FieldSplitter, regex::Error> {
        let d = regex::escape(&delimiter.to_string());
        let re = Regex::new(&format!(r#"\s*"((?:[^"]|"")*)"|([^{d}]*)"#))?;
        Ok(FieldSplitter { delimiter, re })
    }

    /// The shared splitter for `delimiter`, built once for `;`.
    pub fn for_delimiter(delimiter: char) -> Result<FieldSplitter, regex::Error> {
        if delimiter == ';' {
            if let Some(s) = SEMICOLON.get() {
                return Ok(s.clone());
            }
            let s = FieldSplitter::new(';')?;
            return Ok(SEMICOLON.get_or_init(|| s).clone());
        }
        FieldSplitter::new(delimiter)
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn split(&self, line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut pos = 0;
        while let Some(caps) = self.re.captures_at(line, pos) {
            let field = match (caps.get(1), caps.get(2)) {
                (Some(quoted), _) => quoted.as_str().replace("\"\"", "\""),
                (None, Some(plain)) => plain.as_str().trim().to_string(),
                (None, None) => String::new(),
            };
            fields.push(field);
            pos = caps.get(0).map_or(pos, |m| m.end());
            match line[pos..].find(self.delimiter) {
                Some(i) => pos += i + self.delimiter.len_utf8(),
                None => break,
            }
        }
        fields
    }
}
