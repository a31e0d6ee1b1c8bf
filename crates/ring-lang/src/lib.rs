/// Declares a dense `u32` handle into one of the session tables.
macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            pub fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub mod intern;
pub mod error;
pub mod config;
pub mod syntax;
pub mod types;
pub mod analysis;
pub mod session;

pub use config::Config;
pub use error::{CompileError, Diagnostic, Diagnostics, ErrorCode, Severity, Stage};
pub use session::Session;
pub use syntax::ast::{NodeId, Span};
pub use syntax::token::{Token, TokenKind};
pub use types::{Type, TypeId};

use std::io::Read;

use analysis::scopes::ScopeTable;
use analysis::symbols::SymbolTable;
use syntax::ast::AstArena;
use syntax::parser::Parser;
use syntax::printer;
use syntax::reader::Reader;
use types::TypeInterner;

// ─── Public API types ─────────────────────────────────────────────────────────

/// A parsed and fully resolved module. Produced by [`compile`].
#[derive(Debug)]
pub struct Compilation {
    pub session: Session,
    pub root: NodeId,
}

impl Compilation {
    /// The module-level `let` bound to the configured entry-point name.
    pub fn entry_point(&self) -> Option<NodeId> {
        self.session.entry_point
    }

    pub fn ast(&self) -> &AstArena {
        &self.session.ast
    }

    pub fn types(&self) -> &TypeInterner {
        &self.session.types
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.session.symbols
    }

    pub fn scopes(&self) -> &ScopeTable {
        &self.session.scopes
    }

    /// Notes and warnings left over from a successful compilation.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.session.diagnostics
    }
}

// ─── Public API ───────────────────────────────────────────────────────────────

/// Parse and resolve source text with the default [`Config`].
pub fn compile(source: &str) -> Result<Compilation, CompileError> {
    compile_with(source, &Config::default())
}

pub fn compile_with(source: &str, config: &Config) -> Result<Compilation, CompileError> {
    run(Reader::new(source), config)
}

/// Like [`compile_with`], reading the whole source from `input` first.
pub fn compile_reader(input: impl Read, config: &Config) -> Result<Compilation, CompileError> {
    run(Reader::from_reader(input)?, config)
}

#[tracing::instrument(level = "debug", skip_all)]
fn run(reader: Reader, config: &Config) -> Result<Compilation, CompileError> {
    let mut session = Session::new(config.clone());

    let root = Parser::new(&mut session, reader).parse_program();
    if session.diagnostics.has_errors() {
        return Err(CompileError::from_stage(Stage::Parse, &session.diagnostics));
    }
    if session.config.print_ast {
        tracing::info!("parsed AST:\n{}", printer::dump(&session, root));
    }

    analysis::resolve(&mut session, root)?;
    if session.config.print_ast {
        tracing::info!("resolved AST:\n{}", printer::dump(&session, root));
    }

    tracing::debug!(
        nodes = session.ast.len(),
        types = session.types.len(),
        symbols = session.symbols.len(),
        scopes = session.scopes.len(),
        "compiled"
    );
    Ok(Compilation { session, root })
}
