//! Driver tests: configuration, stage reporting and input handling.

use std::io::{self, Cursor, Read};

use ring_lang::syntax::ast::{ExprKind, NodeKind};
use ring_lang::{compile, compile_reader, compile_with, CompileError, Config, ErrorCode, Stage};

fn parse_failure(src: &str) -> CompileError {
    match compile(src) {
        Err(e @ CompileError::Stage { stage: Stage::Parse, .. }) => e,
        Err(e) => panic!("expected a parse failure, got {e}"),
        Ok(_) => panic!("expected a parse failure for {src:?}"),
    }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[test]
fn sample_program_compiles_cleanly() {
    let compiled = compile("let main: fn() -> int = fn() { 1 + 2 };").unwrap();
    assert!(compiled.diagnostics().is_empty());

    let main = compiled.entry_point().expect("entry point");
    let NodeKind::Let(decl) = &compiled.ast().get(main).kind else { panic!("entry point is not a let") };
    assert_eq!(compiled.session.name(decl.name.name), "main");
    assert!(matches!(compiled.ast().expr(decl.value).map(|e| &e.kind), Some(ExprKind::Fn { .. })));

    // nil, int and bool are always present; the sample adds `fn() -> int`
    assert_eq!(compiled.types().len(), 4);
    assert_eq!(compiled.scopes().len(), 2);
    assert_eq!(compiled.symbols().len(), 1);
}

#[test]
fn no_main_means_no_entry_point() {
    let compiled = compile("let start = fn() {};").unwrap();
    assert_eq!(compiled.entry_point(), None);
}

#[test]
fn entry_point_name_is_configurable() {
    let config = Config::default().with_entry_point("start");
    let compiled = compile_with("let main = fn() {}; let start = fn() {};", &config).unwrap();
    let start = compiled.ast().children(compiled.root)[1];
    assert_eq!(compiled.entry_point(), Some(start));
}

#[test]
fn entry_point_must_be_a_function_literal() {
    let compiled = compile("let main = 1;").unwrap();
    assert_eq!(compiled.entry_point(), None);
}

// ─── Stages ──────────────────────────────────────────────────────────────────

#[test]
fn lexer_errors_fail_parsing() {
    let err = parse_failure("let x = 1 @ 2;");
    assert!(err.has_code(ErrorCode::L001));

    let err = parse_failure("let s = \"open");
    assert!(err.has_code(ErrorCode::L002));
}

#[test]
fn parser_errors_fail_parsing() {
    assert!(parse_failure("let x = ;").has_code(ErrorCode::P001));
    assert!(parse_failure("let x = 1").has_code(ErrorCode::P002));
    assert!(parse_failure("let s = \"text\";").has_code(ErrorCode::P003));
}

#[test]
fn deep_nesting_fails_parsing() {
    let src = format!("let x = {}1{};", "(".repeat(1_000), ")".repeat(1_000));
    assert!(parse_failure(&src).has_code(ErrorCode::P004));
}

#[test]
fn long_operator_chain_compiles() {
    let src = format!("let x = 1{};", " + 1".repeat(20_000));
    let compiled = compile(&src).unwrap();
    let decl = compiled.ast().let_decl(compiled.ast().children(compiled.root)[0]).unwrap();
    assert_eq!(compiled.session.type_name(decl.ty.unwrap()), "int");
}

#[test]
fn parser_recovers_and_reports_every_item() {
    let err = parse_failure("let a = ; let b = 1; let c = );");
    assert_eq!(err.diagnostics().iter().filter(|d| d.code == ErrorCode::P001).count(), 2);
}

#[test]
fn annotated_string_literal_is_accepted() {
    // there is no string type, so any annotation is taken at its word
    compile("let s = \"text\": []int;").unwrap();
}

#[test]
fn stage_error_display() {
    let err = compile("let x: bool = 1;").unwrap_err();
    assert_eq!(err.to_string(), "type checking failed with 1 diagnostic(s)");
    let diag = &err.diagnostics()[0];
    assert_eq!(diag.span.line, 1);
    assert!(diag.to_string().starts_with("[S002] error at 1:"));
}

// ─── Configuration ───────────────────────────────────────────────────────────

#[test]
fn print_ast_does_not_change_the_result() {
    let src = "let main: fn() -> int = fn() { 1 + 2 };";
    let plain = compile(src).unwrap();
    let printed = compile_with(src, &Config::default().with_print_ast(true)).unwrap();
    assert_eq!(plain.ast().len(), printed.ast().len());
    assert_eq!(plain.entry_point(), printed.entry_point());
}

// ─── Input ───────────────────────────────────────────────────────────────────

#[test]
fn compiles_from_a_reader() {
    let input = Cursor::new(b"let main = fn() -> int { 7 };".to_vec());
    let compiled = compile_reader(input, &Config::default()).unwrap();
    assert!(compiled.entry_point().is_some());
}

#[test]
fn invalid_utf8_is_an_io_error() {
    let input = Cursor::new(vec![b'l', b'e', b't', 0xff, 0xfe]);
    let err = compile_reader(input, &Config::default()).unwrap_err();
    assert!(matches!(err, CompileError::Io(_)));
    assert!(err.diagnostics().is_empty());
}

struct Broken;

impl Read for Broken {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("disk on fire"))
    }
}

#[test]
fn read_failure_is_reported() {
    let err = compile_reader(Broken, &Config::default()).unwrap_err();
    assert!(err.to_string().contains("disk on fire"));
}
