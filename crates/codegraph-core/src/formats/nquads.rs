//! # N-Quads Wire Format
//!
//! Text serialization of quads, one statement per line:
//!
//! ```text
//! <subject> <predicate> object [label] .
//! ```
//!
//! - IRIs are written as `<…>`; `\`, `>` and control characters are escaped
//!   as `\uXXXX`
//! - Blank nodes are written as `_:id`
//! - Strings are written as `"…"` with `\\ \" \n \r \t` escapes
//! - Integers, floats, booleans and timestamps are typed literals
//!   (`"…"^^<xsd:…>`); timestamps are RFC 3339 with their original offset
//!
//! The label may be any term, which is how signature timestamps and file
//! paths travel with their statements. `NQuadsReader` accepts exactly what
//! `NQuadsWriter` produces (plus comments and blank lines).

use crate::primitives::{XSD_BOOLEAN, XSD_DATETIME, XSD_DOUBLE, XSD_INTEGER};
use crate::sink::QuadWriter;
use crate::{CodegraphError, Quad, Value};
use chrono::{DateTime, SecondsFormat};
use std::fmt;
use std::io::{BufRead, Write};

// =============================================================================
// TERM ENCODING
// =============================================================================

/// Write a single term in N-Quads syntax.
pub fn write_term<W: fmt::Write>(w: &mut W, value: &Value) -> fmt::Result {
    match value {
        Value::Iri(s) => {
            w.write_char('<')?;
            for c in s.chars() {
                if c == '>' || c == '\\' || c.is_control() {
                    write!(w, "\\u{:04X}", c as u32)?;
                } else {
                    w.write_char(c)?;
                }
            }
            w.write_char('>')
        }
        Value::Blank(s) => write!(w, "_:{}", s),
        Value::String(s) => write_string(w, s),
        Value::Int(v) => write_typed(w, &v.to_string(), XSD_INTEGER),
        Value::Float(v) => write_typed(w, &v.to_string(), XSD_DOUBLE),
        Value::Bool(v) => write_typed(w, if *v { "true" } else { "false" }, XSD_BOOLEAN),
        Value::Time(t) => write_typed(
            w,
            &t.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            XSD_DATETIME,
        ),
    }
}

fn write_string<W: fmt::Write>(w: &mut W, s: &str) -> fmt::Result {
    w.write_char('"')?;
    for c in s.chars() {
        match c {
            '\\' => w.write_str("\\\\")?,
            '"' => w.write_str("\\\"")?,
            '\n' => w.write_str("\\n")?,
            '\r' => w.write_str("\\r")?,
            '\t' => w.write_str("\\t")?,
            c if c.is_control() => write!(w, "\\u{:04X}", c as u32)?,
            c => w.write_char(c)?,
        }
    }
    w.write_char('"')
}

fn write_typed<W: fmt::Write>(w: &mut W, lexical: &str, datatype: &str) -> fmt::Result {
    write_string(w, lexical)?;
    write!(w, "^^<{}>", datatype)
}

// =============================================================================
// WRITER
// =============================================================================

/// Streams quads as N-Quads lines into any `io::Write`.
///
/// Writes one quad at a time and exposes no batch path, so a sink over it
/// reports partial progress when the underlying stream fails.
pub struct NQuadsWriter<W: Write> {
    inner: W,
    count: usize,
}

impl<W: Write> NQuadsWriter<W> {
    /// Wrap an output stream.
    pub fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    /// Number of quads written so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Flush and return the wrapped stream.
    pub fn into_inner(mut self) -> Result<W, CodegraphError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> QuadWriter for NQuadsWriter<W> {
    fn write_quad(&mut self, quad: &Quad) -> Result<(), CodegraphError> {
        quad.validate()?;
        writeln!(self.inner, "{}", quad)?;
        self.count = self.count.saturating_add(1);
        Ok(())
    }
}

// =============================================================================
// READER
// =============================================================================

/// Iterates the quads of an N-Quads stream.
///
/// Blank lines and `#` comments are skipped. The first malformed line
/// yields a `CodegraphError::Format` carrying its 1-based line number.
pub struct NQuadsReader<R: BufRead> {
    lines: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> NQuadsReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for NQuadsReader<R> {
    type Item = Result<Quad, CodegraphError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;
            match parse_line(self.line, &text) {
                Ok(Some(quad)) => return Some(Ok(quad)),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Parse one N-Quads line. Returns `Ok(None)` for blank lines and comments.
pub fn parse_line(line: usize, text: &str) -> Result<Option<Quad>, CodegraphError> {
    let mut cur = Cursor {
        rest: text,
        line,
    };
    cur.skip_ws();
    if cur.rest.is_empty() || cur.rest.starts_with('#') {
        return Ok(None);
    }

    let subject = cur.term()?;
    let predicate = cur.term()?;
    let object = cur.term()?;
    cur.skip_ws();
    let label = if cur.rest.starts_with('.') {
        None
    } else {
        Some(cur.term()?)
    };
    cur.skip_ws();
    cur.expect('.')?;
    cur.skip_ws();
    if !(cur.rest.is_empty() || cur.rest.starts_with('#')) {
        return Err(cur.error("trailing data after '.'"));
    }

    let quad = Quad {
        subject,
        predicate,
        object,
        label,
    };
    quad.validate().map_err(|e| cur.error(&e.to_string()))?;
    Ok(Some(quad))
}

struct Cursor<'a> {
    rest: &'a str,
    line: usize,
}

impl Cursor<'_> {
    fn error(&self, reason: &str) -> CodegraphError {
        CodegraphError::Format {
            line: self.line,
            reason: reason.to_string(),
        }
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start_matches([' ', '\t', '\r']);
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.rest.chars().next()?;
        self.rest = &self.rest[c.len_utf8()..];
        Some(c)
    }

    fn expect(&mut self, want: char) -> Result<(), CodegraphError> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(self.error(&format!("expected '{}', found '{}'", want, c))),
            None => Err(self.error(&format!("expected '{}', found end of line", want))),
        }
    }

    fn term(&mut self) -> Result<Value, CodegraphError> {
        self.skip_ws();
        match self.rest.chars().next() {
            Some('<') => self.iri().map(Value::Iri),
            Some('_') => self.blank(),
            Some('"') => self.literal(),
            Some(c) => Err(self.error(&format!("unexpected '{}'", c))),
            None => Err(self.error("unexpected end of line")),
        }
    }

    fn iri(&mut self) -> Result<String, CodegraphError> {
        self.expect('<')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('>') => return Ok(out),
                Some('\\') => out.push(self.escape()?),
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated IRI")),
            }
        }
    }

    fn blank(&mut self) -> Result<Value, CodegraphError> {
        if !self.rest.starts_with("_:") {
            return Err(self.error("malformed blank node"));
        }
        self.rest = &self.rest[2..];
        let end = self
            .rest
            .find([' ', '\t'])
            .unwrap_or(self.rest.len());
        let id = &self.rest[..end];
        if id.is_empty() {
            return Err(self.error("empty blank node"));
        }
        self.rest = &self.rest[end..];
        Ok(Value::blank(id))
    }

    fn literal(&mut self) -> Result<Value, CodegraphError> {
        self.expect('"')?;
        let mut lexical = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => lexical.push(self.escape()?),
                Some(c) => lexical.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
        if self.rest.starts_with('@') {
            return Err(self.error("language-tagged strings are not supported"));
        }
        if !self.rest.starts_with("^^") {
            return Ok(Value::String(lexical));
        }
        self.rest = &self.rest[2..];
        let datatype = self.iri()?;
        self.typed(&lexical, &datatype)
    }

    fn typed(&self, lexical: &str, datatype: &str) -> Result<Value, CodegraphError> {
        let bad = |what: &str| self.error(&format!("invalid {} literal '{}'", what, lexical));
        match datatype {
            XSD_INTEGER => lexical.parse().map(Value::Int).map_err(|_| bad("integer")),
            XSD_DOUBLE => lexical.parse().map(Value::Float).map_err(|_| bad("double")),
            XSD_BOOLEAN => match lexical {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(bad("boolean")),
            },
            XSD_DATETIME => DateTime::parse_from_rfc3339(lexical)
                .map(Value::Time)
                .map_err(|_| bad("dateTime")),
            other => Err(self.error(&format!("unsupported datatype <{}>", other))),
        }
    }

    fn escape(&mut self) -> Result<char, CodegraphError> {
        match self.bump() {
            Some('t') => Ok('\t'),
            Some('b') => Ok('\u{8}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('f') => Ok('\u{c}'),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some('\\') => Ok('\\'),
            Some('u') => self.hex_escape(4),
            Some('U') => self.hex_escape(8),
            _ => Err(self.error("invalid escape sequence")),
        }
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char, CodegraphError> {
        let hex = self
            .rest
            .get(..digits)
            .ok_or_else(|| self.error("truncated unicode escape"))?;
        let code =
            u32::from_str_radix(hex, 16).map_err(|_| self.error("invalid unicode escape"))?;
        self.rest = &self.rest[digits..];
        char::from_u32(code).ok_or_else(|| self.error("invalid unicode scalar"))
    }
}

// =============================================================================
// TESTS
// =============================================================================
