pub mod token;
pub mod reader;
pub mod lexer;
pub mod ast;
pub mod visit;
pub mod parser;
pub mod printer;
