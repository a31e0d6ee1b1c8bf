use crate::error::{Diagnostics, ErrorCode};
use crate::intern::StringInterner;
use crate::syntax::ast::Span;
use crate::syntax::reader::{is_ident_continue, is_ident_start, Reader};
use crate::syntax::token::{reserved_word, Token, TokenKind};

/// Pull-based tokenizer. Literal and identifier text is interned as it is scanned.
pub struct Lexer<'a> {
    reader: Reader,
    strings: &'a mut StringInterner,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Lexer<'a> {
    pub fn new(reader: Reader, strings: &'a mut StringInterner, diagnostics: &'a mut Diagnostics) -> Self {
        Self { reader, strings, diagnostics }
    }

    pub fn strings(&self) -> &StringInterner {
        &*self.strings
    }

    pub fn diagnostics(&mut self) -> &mut Diagnostics {
        &mut *self.diagnostics
    }

    pub fn next_token(&mut self) -> Token {
        self.next_spanned().0
    }

    /// Next token plus the location of its first character.
    pub fn next_spanned(&mut self) -> (Token, Span) {
        let ch = self.reader.skip_whitespace_and_comments();
        let span = self.reader.span();
        if self.reader.is_eof() {
            return (Token::new(TokenKind::Eof), span);
        }

        let token = if is_ident_start(ch) {
            self.read_word()
        } else if ch.is_ascii_digit() {
            self.read_number()
        } else if ch == '"' {
            self.read_string(span)
        } else {
            self.read_operator(span)
        };
        (token, span)
    }

    /// Drains the remaining input, stopping after the first `Eof`.
    pub fn tokenize(mut self) -> Vec<(Token, Span)> {
        let mut tokens = Vec::new();
        loop {
            let (token, span) = self.next_spanned();
            tokens.push((token, span));
            if token.is_eof() { break; }
        }
        tokens
    }

    // ─── Scanners ────────────────────────────────────────────────────────────

    fn read_word(&mut self) -> Token {
        let start = self.reader.offset();
        while is_ident_continue(self.reader.current()) { self.reader.advance(); }
        let word = &self.reader.source()[start..self.reader.offset()];
        match reserved_word(word) {
            Some(kind) if kind.is_literal() => Token::with_text(kind, self.strings.intern(word)),
            Some(kind) => Token::new(kind),
            None => Token::with_text(TokenKind::Ident, self.strings.intern(word)),
        }
    }

    fn read_number(&mut self) -> Token {
        let start = self.reader.offset();
        while self.reader.current().is_ascii_digit() { self.reader.advance(); }
        let text = &self.reader.source()[start..self.reader.offset()];
        Token::with_text(TokenKind::Numeric, self.strings.intern(text))
    }

    fn read_string(&mut self, span: Span) -> Token {
        self.reader.advance(); // opening quote
        let start = self.reader.offset();
        while !self.reader.is_eof() && self.reader.current() != '"' { self.reader.advance(); }
        if self.reader.is_eof() {
            self.diagnostics.report(ErrorCode::L002, span, "unterminated string literal");
            return Token::new(TokenKind::Invalid);
        }
        let text = &self.reader.source()[start..self.reader.offset()];
        let id = self.strings.intern(text);
        self.reader.advance(); // closing quote
        Token::with_text(TokenKind::Str, id)
    }

    fn read_operator(&mut self, span: Span) -> Token {
        use TokenKind::*;

        let r = &mut self.reader;
        let kind = match r.advance() {
            '=' => if r.advance_if('=') { EqEq } else { Assign },
            '!' => if r.advance_if('=') { BangEq } else { Bang },
            '<' => {
                if r.advance_if('=') { LtEq }
                else if r.advance_if('-') { LArrow }
                else if r.advance_if('<') { if r.advance_if('=') { AssignShl } else { Shl } }
                else { Lt }
            }
            '>' => {
                if r.advance_if('=') { GtEq }
                else if r.advance_if('>') { if r.advance_if('=') { AssignShr } else { Shr } }
                else { Gt }
            }
            '+' => if r.advance_if('=') { AssignAdd } else { Plus },
            '-' => {
                if r.advance_if('=') { AssignSub }
                else if r.advance_if('>') { Arrow }
                else { Minus }
            }
            '*' => {
                if r.advance_if('=') { AssignMul }
                else if r.advance_if('*') { StarStar }
                else { Star }
            }
            '/' => if r.advance_if('=') { AssignDiv } else { Slash },
            '%' => if r.advance_if('=') { AssignMod } else { Percent },
            '&' => {
                if r.advance_if('&') { AmpAmp }
                else if r.advance_if('=') { AssignAnd }
                else { Amp }
            }
            '|' => {
                if r.advance_if('|') { PipePipe }
                else if r.advance_if('=') { AssignOr }
                else { Pipe }
            }
            '^' => if r.advance_if('=') { AssignXor } else { Caret },
            '~' => Tilde,
            ';' => Semicolon,
            ',' => Comma,
            '?' => Question,
            ':' => Colon,
            '.' => Dot,
            '[' => LBracket,
            ']' => RBracket,
            '{' => LBrace,
            '}' => RBrace,
            '(' => LParen,
            ')' => RParen,
            other => {
                self.diagnostics.report(ErrorCode::L001, span, format!("unexpected character `{other}`"));
                Invalid
            }
        };
        Token::new(kind)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
