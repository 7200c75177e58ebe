//! The Assembler module is in charge of taking NP assembly source and
//! producing a validated `ast::Program` for the code generator.
//!
//! It does this with a single forward-scanning tokenizer and a
//! line-oriented recursive descent parser.
use std::path::Path;

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use self::error::{AsmError, LexError, ParseError, Reason};
pub use self::lexer::{Lexer, UnrecognizedPolicy};
pub use self::parser::Parser;

/// Lexes and parses an in-memory source unit.
pub fn parse_source(text: &str, policy: UnrecognizedPolicy) -> Result<ast::Program, AsmError> {
    let tokens = Lexer::with_policy(policy).scan(text)?;
    Ok(Parser::new(tokens).run()?)
}

/// Lexes and parses the file at `path`.
pub fn parse_file<P: AsRef<Path>>(path: P, policy: UnrecognizedPolicy) -> Result<ast::Program, AsmError> {
    let tokens = Lexer::with_policy(policy).scan_file(path)?;
    Ok(Parser::new(tokens).run()?)
}
