use crate::intern::{StrId, StringInterner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Invalid,

    // Assignment operators
    Assign,       // =
    AssignAdd,    // +=
    AssignSub,    // -=
    AssignMul,    // *=
    AssignDiv,    // /=
    AssignMod,    // %=
    AssignShl,    // <<=
    AssignShr,    // >>=
    AssignOr,     // |=
    AssignXor,    // ^=
    AssignAnd,    // &=

    // Binary operators
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Percent,      // %
    StarStar,     // **
    Shl,          // <<
    Shr,          // >>
    Pipe,         // |
    Caret,        // ^
    Amp,          // &
    EqEq,         // ==
    BangEq,       // !=
    Lt,           // <
    LtEq,         // <=
    GtEq,         // >=
    Gt,           // >

    // Logical operators
    PipePipe,     // ||
    AmpAmp,       // &&

    // Unary-only operators
    Bang,         // !
    Tilde,        // ~

    // Punctuation
    Semicolon,    // ;
    Comma,        // ,
    Question,     // ?
    Colon,        // :
    Dot,          // .
    LBracket,     // [
    RBracket,     // ]
    LBrace,       // {
    RBrace,       // }
    LParen,       // (
    RParen,       // )
    LArrow,       // <-
    Arrow,        // ->

    // Literals
    False,
    True,
    Numeric,
    Str,

    Ident,

    // Keywords
    As,
    Else,
    Extern,
    Fn,
    If,
    Let,
    Mut,
    Pub,
    Then,
    This,
    Use,
    TBool,
    TInt,
    TNil,

    Eof,
}

impl TokenKind {
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::False | Self::True | Self::Numeric | Self::Str)
    }

    /// Fixed spelling of the kind, `None` for kinds whose text lives in the interner.
    pub fn as_str(&self) -> Option<&'static str> {
        Some(match self {
            Self::Assign    => "=",
            Self::AssignAdd => "+=",
            Self::AssignSub => "-=",
            Self::AssignMul => "*=",
            Self::AssignDiv => "/=",
            Self::AssignMod => "%=",
            Self::AssignShl => "<<=",
            Self::AssignShr => ">>=",
            Self::AssignOr  => "|=",
            Self::AssignXor => "^=",
            Self::AssignAnd => "&=",
            Self::Plus      => "+",
            Self::Minus     => "-",
            Self::Star      => "*",
            Self::Slash     => "/",
            Self::Percent   => "%",
            Self::StarStar  => "**",
            Self::Shl       => "<<",
            Self::Shr       => ">>",
            Self::Pipe      => "|",
            Self::Caret     => "^",
            Self::Amp       => "&",
            Self::EqEq      => "==",
            Self::BangEq    => "!=",
            Self::Lt        => "<",
            Self::LtEq      => "<=",
            Self::GtEq      => ">=",
            Self::Gt        => ">",
            Self::PipePipe  => "||",
            Self::AmpAmp    => "&&",
            Self::Bang      => "!",
            Self::Tilde     => "~",
            Self::Semicolon => ";",
            Self::Comma     => ",",
            Self::Question  => "?",
            Self::Colon     => ":",
            Self::Dot       => ".",
            Self::LBracket  => "[",
            Self::RBracket  => "]",
            Self::LBrace    => "{",
            Self::RBrace    => "}",
            Self::LParen    => "(",
            Self::RParen    => ")",
            Self::LArrow    => "<-",
            Self::Arrow     => "->",
            Self::False     => "false",
            Self::True      => "true",
            Self::As        => "as",
            Self::Else      => "else",
            Self::Extern    => "extern",
            Self::Fn        => "fn",
            Self::If        => "if",
            Self::Let       => "let",
            Self::Mut       => "mut",
            Self::Pub       => "pub",
            Self::Then      => "then",
            Self::This      => "this",
            Self::Use       => "use",
            Self::TBool     => "bool",
            Self::TInt      => "int",
            Self::TNil      => "nil",
            Self::Invalid | Self::Numeric | Self::Str | Self::Ident | Self::Eof => return None,
        })
    }

    /// Human-readable name used in parser diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Invalid => "invalid token",
            Self::Numeric => "numeric literal",
            Self::Str     => "string literal",
            Self::Ident   => "identifier",
            Self::Eof     => "end of file",
            other         => other.as_str().unwrap_or("token"),
        }
    }
}

/// Maps a scanned word to its boolean-literal or keyword kind. `None` means identifier.
pub fn reserved_word(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "true"   => TokenKind::True,
        "false"  => TokenKind::False,
        "as"     => TokenKind::As,
        "else"   => TokenKind::Else,
        "extern" => TokenKind::Extern,
        "fn"     => TokenKind::Fn,
        "if"     => TokenKind::If,
        "let"    => TokenKind::Let,
        "mut"    => TokenKind::Mut,
        "pub"    => TokenKind::Pub,
        "then"   => TokenKind::Then,
        "this"   => TokenKind::This,
        "use"    => TokenKind::Use,
        "bool"   => TokenKind::TBool,
        "int"    => TokenKind::TInt,
        "nil"    => TokenKind::TNil,
        _        => return None,
    };
    Some(kind)
}

// ─────────────────────────────────────────────────────────────────────────────

/// A token tag plus the interned text for literals and identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub text: Option<StrId>,
}

impl Token {
    pub fn new(kind: TokenKind) -> Self {
        Self { kind, text: None }
    }

    pub fn with_text(kind: TokenKind, text: StrId) -> Self {
        Self { kind, text: Some(text) }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Renders the token back to source text.
    pub fn stringify(&self, interner: &StringInterner) -> String {
        match (self.kind, self.text) {
            (TokenKind::Str, Some(text))   => format!("\"{}\"", interner.resolve(text)),
            (_, Some(text))                => interner.resolve(text).to_owned(),
            (TokenKind::Eof, None)         => "EOF".to_owned(),
            (TokenKind::Invalid, None)     => "INVALID".to_owned(),
            (kind, None)                   => kind.as_str().unwrap_or_default().to_owned(),
        }
    }
}
