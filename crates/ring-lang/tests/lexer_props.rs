use proptest::prelude::*;
use ring_lang::error::Diagnostics;
use ring_lang::intern::StringInterner;
use ring_lang::syntax::lexer::Lexer;
use ring_lang::syntax::reader::Reader;
use ring_lang::syntax::token::{TokenKind, reserved_word};

const PUNCTUATION: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "<<=", ">>=", "|=", "^=", "&=",
    "+", "-", "*", "/", "%", "**", "<<", ">>", "|", "^", "&",
    "==", "!=", "<", "<=", ">=", ">", "||", "&&", "!", "~",
    ";", ",", "?", ":", ".", "[", "]", "{", "}", "(", ")", "<-", "->",
];

const KEYWORDS: &[&str] = &[
    "false", "true", "as", "else", "extern", "fn", "if", "let", "mut", "pub",
    "then", "this", "use", "bool", "int", "nil",
];

/// One token in its canonical spelling.
fn canonical_token() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(PUNCTUATION).prop_map(str::to_owned),
        prop::sample::select(KEYWORDS).prop_map(str::to_owned),
        "[a-z_][a-z0-9_]{0,8}".prop_filter("reserved", |w| reserved_word(w).is_none()),
        "[1-9][0-9]{0,5}",
        "\"[a-z ]{0,8}\"",
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn canonical_tokens_round_trip(words in prop::collection::vec(canonical_token(), 0..24)) {
        let source = words.join(" ");
        let mut strings = StringInterner::new();
        let mut diagnostics = Diagnostics::new();
        let tokens = Lexer::new(Reader::new(source.as_str()), &mut strings, &mut diagnostics).tokenize();

        prop_assert!(diagnostics.is_empty(), "diagnostics for {source:?}");
        prop_assert_eq!(tokens.len(), words.len() + 1);
        for ((token, _), word) in tokens.iter().zip(&words) {
            prop_assert_eq!(&token.stringify(&strings), word);
        }
        prop_assert!(tokens[words.len()].0.is_eof());
    }

    #[test]
    fn never_panics_and_terminates(s in ".*") {
        let mut strings = StringInterner::new();
        let mut diagnostics = Diagnostics::new();
        let mut lexer = Lexer::new(Reader::new(s.as_str()), &mut strings, &mut diagnostics);

        let max_steps = s.chars().count() + 2;
        let mut last = (1usize, 1usize);
        let mut steps = 0usize;
        loop {
            let (token, span) = lexer.next_spanned();
            let at = (span.line, span.column);
            prop_assert!(at >= last, "span moved backwards: {at:?} < {last:?} input={s:?}");
            last = at;

            if token.is_eof() { break; }
            steps += 1;
            prop_assert!(steps <= max_steps, "too many tokens (possible hang) input={s:?}");
        }

        // end of input is sticky
        for _ in 0..3 {
            prop_assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        }
    }

    #[test]
    fn reader_visits_every_char(s in "(?s).*") {
        let mut reader = Reader::new(s.as_str());
        let mut seen = String::new();
        while !reader.is_eof() {
            seen.push(reader.advance());
        }
        prop_assert_eq!(seen, s);
    }
}
