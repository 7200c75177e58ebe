//! Error types for the lexer and parser.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::ast::Arity;

#[derive(Debug, Error)]
pub enum LexError {
    #[error("unable to open source file `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{file}:{line}: unrecognized character `{}`", .ch.escape_default())]
    Unrecognized { file: String, line: usize, ch: char },
}

/// Why one attempt at parsing part of a line failed.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum Reason {
    #[error("unknown mnemonic ({0})")]
    UnknownMnemonic(String),
    #[error("word size given for an instruction that doesn't take one ({mnemonic} | {word_size})")]
    WordSizeNotPermitted { mnemonic: String, word_size: String },
    #[error("unable to parse {} instruction ({mnemonic})", arity_name(.arity))]
    MalformedInstruction { mnemonic: String, arity: Arity },
    #[error("expected {expected}, found {found}")]
    Expected { expected: &'static str, found: String },
}

fn arity_name(arity: &Arity) -> &'static str {
    match arity {
        Arity::Zero => "no-argument",
        Arity::One  => "one-argument",
        Arity::Two  => "two-argument",
    }
}

/// The first line of a source unit that could not be parsed.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("unable to parse line {file}:{line}{}", render_reasons(.reasons))]
pub struct ParseError {
    pub file: String,
    pub line: usize,
    pub reasons: Vec<Reason>,
}

fn render_reasons(reasons: &[Reason]) -> String {
    reasons.iter().map(|r| format!("\n  {}", r)).collect()
}

#[derive(Debug, Error)]
pub enum AsmError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError {
            file: "prog.asm".to_string(),
            line: 4,
            reasons: vec![
                Reason::WordSizeNotPermitted { mnemonic: "jump".into(), word_size: "word".into() },
                Reason::Expected { expected: "end of line", found: "<MNEMONIC:mnemonic=JUMP>".into() },
            ],
        };
        assert_eq!(
            err.to_string(),
            "unable to parse line prog.asm:4\n  \
             word size given for an instruction that doesn't take one (jump | word)\n  \
             expected end of line, found <MNEMONIC:mnemonic=JUMP>"
        );
    }

    #[test]
    fn test_reason_display() {
        let r = Reason::MalformedInstruction { mnemonic: "move".into(), arity: Arity::Two };
        assert_eq!(r.to_string(), "unable to parse two-argument instruction (move)");
        assert_eq!(Reason::UnknownMnemonic("zap".into()).to_string(), "unknown mnemonic (zap)");
    }

    #[test]
    fn test_lex_error_display() {
        let err = LexError::Unrecognized { file: "a.asm".into(), line: 2, ch: '@' };
        assert_eq!(err.to_string(), "a.asm:2: unrecognized character `@`");
    }
}
