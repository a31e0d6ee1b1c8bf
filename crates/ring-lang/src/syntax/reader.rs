//! Character cursor over the full source buffer.
//!
//! Three positions are kept precomputed (current, +1, +2) so the lexer can
//! resolve compound operators and comment openers without backtracking.

use std::io::{self, Read};

use crate::syntax::ast::Span;

/// Returned for every read past the end of input.
pub const EOF_CHAR: char = '\0';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position {
    offset: usize,
    ch: char,
    line: usize,
    column: usize,
}

pub struct Reader {
    source: String,
    pos: Option<Position>,
    next1: Option<Position>,
    next2: Option<Position>,
    /// Location just past the last consumed character; reported once input is exhausted.
    end: Span,
}

impl Reader {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let first = source.chars().next().map(|ch| Position { offset: 0, ch, line: 1, column: 1 });
        let mut reader = Self { source, pos: first, next1: None, next2: None, end: Span::new(1, 1) };
        reader.next1 = reader.following(reader.pos);
        reader.next2 = reader.following(reader.next1);
        reader
    }

    /// Reads the whole input once, up front.
    pub fn from_reader(mut input: impl Read) -> io::Result<Self> {
        let mut source = String::new();
        input.read_to_string(&mut source)?;
        Ok(Self::new(source))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn current(&self) -> char {
        self.pos.map_or(EOF_CHAR, |p| p.ch)
    }

    /// Looks ahead one or two characters past the current one.
    pub fn peek(&self, n: usize) -> char {
        let pos = match n {
            0 => self.pos,
            1 => self.next1,
            2 => self.next2,
            _ => None,
        };
        pos.map_or(EOF_CHAR, |p| p.ch)
    }

    pub fn is_eof(&self) -> bool {
        self.pos.is_none()
    }

    /// Location of the current character, or just past the input at EOF.
    pub fn span(&self) -> Span {
        self.pos.map_or(self.end, |p| Span::new(p.line, p.column))
    }

    /// Byte offset of the current character.
    pub fn offset(&self) -> usize {
        self.pos.map_or(self.source.len(), |p| p.offset)
    }

    /// Consumes and returns the current character.
    pub fn advance(&mut self) -> char {
        let Some(current) = self.pos else { return EOF_CHAR };
        self.end = if current.ch == '\n' {
            Span::new(current.line + 1, 1)
        } else {
            Span::new(current.line, current.column + 1)
        };
        self.pos = self.next1;
        self.next1 = self.next2;
        self.next2 = self.following(self.next2);
        current.ch
    }

    pub fn advance_if(&mut self, ch: char) -> bool {
        if !self.is_eof() && self.current() == ch {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skips whitespace, `// line` and `/* block */` comments, returning the next significant char.
    pub fn skip_whitespace_and_comments(&mut self) -> char {
        loop {
            match (self.current(), self.peek(1)) {
                (' ' | '\t' | '\r' | '\n', _) if !self.is_eof() => { self.advance(); }
                ('/', '/') => {
                    while !self.is_eof() && self.current() != '\n' { self.advance(); }
                }
                ('/', '*') => {
                    self.advance();
                    self.advance();
                    while !self.is_eof() && !(self.current() == '*' && self.peek(1) == '/') {
                        self.advance();
                    }
                    // unterminated comments simply run to the end of input
                    self.advance();
                    self.advance();
                }
                (ch, _) => return ch,
            }
        }
    }

    fn following(&self, pos: Option<Position>) -> Option<Position> {
        let pos = pos?;
        let offset = pos.offset + pos.ch.len_utf8();
        let ch = self.source[offset..].chars().next()?;
        let (line, column) = if pos.ch == '\n' { (pos.line + 1, 1) } else { (pos.line, pos.column + 1) };
        Some(Position { offset, ch, line, column })
    }
}

pub fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

pub fn is_ident_continue(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
