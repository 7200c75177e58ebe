//! This lexer tokenizes NP assembly.
//!
//! Scanning is a single forward pass. At every offset the lexer skips
//! non-newline whitespace, then tries each recognizer in `RECOGNIZERS`
//! in order and takes the first that matches. Several patterns overlap
//! (`0` is a prefix of `0x..` and `0b..`, a label starts with an
//! identifier), so that order matters.
use std::fs;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use super::ast::{self, RegisterName};
use super::error::LexError;
use super::token::{Token, TokenKind};

/// File name given to tokens scanned from an in-memory string.
pub const STRING_SOURCE: &str = "<string>";

/// What to do when no recognizer matches at the current offset.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum UnrecognizedPolicy {
    /// Drop the character with a warning and carry on.
    Skip,
    /// Stop with `LexError::Unrecognized`.
    Fail,
}

impl Default for UnrecognizedPolicy {
    fn default() -> Self {
        UnrecognizedPolicy::Skip
    }
}

/// A recognizer returns the token found at the start of its input and
/// the number of characters it consumed, or `None` without side effects.
pub type Recognized = Option<(TokenKind, usize)>;
type Recognizer = fn(&str) -> Recognized;

const RECOGNIZERS: &[Recognizer] = &[
    newline,
    colon,
    comment,
    semicolon,
    mnemonic,
    word_size,
    comma,
    register,
    left_bracket,
    right_bracket,
    index_sigil,
    label,
    identifier,
    // Octal must come after binary and hex: `0` prefixes both.
    decimal_literal,
    binary_literal,
    hex_literal,
    octal_literal,
    char_literal,
];

const CHAR_PIECES: &[Recognizer] = &[
    simple_char,
    escaped_hex_char,
    escaped_octal_char,
    escaped_control_char,
];

const WORD_SIZES: &[&str] = &["word", "byte"];

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^;([^\n]*)").unwrap());
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z_][0-9a-zA-Z_]*").unwrap());
static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([+-]?)([1-9][0-9]*)").unwrap());
static BINARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([+-]?)0[bB]([01]+)").unwrap());
static HEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([+-]?)0[xX]([0-9a-fA-F]+)").unwrap());
static OCTAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([+-]?)(0[0-7]*)").unwrap());

/// Tokenizes source text. A `Lexer` only holds configuration; every
/// call scans with fresh cursor and line state, so one instance may be
/// shared between threads.
#[derive(Copy, Clone, Debug, Default)]
pub struct Lexer {
    policy: UnrecognizedPolicy,
}

impl Lexer {
    pub fn new() -> Self {
        Lexer::default()
    }

    pub fn with_policy(policy: UnrecognizedPolicy) -> Self {
        Lexer { policy }
    }

    pub fn policy(&self) -> UnrecognizedPolicy {
        self.policy
    }

    /// Scans an in-memory string. Under `UnrecognizedPolicy::Skip` this
    /// never fails.
    pub fn scan(&self, text: &str) -> Result<Vec<Token>, LexError> {
        self.scan_named(text, STRING_SOURCE)
    }

    /// Scans an in-memory string, attributing tokens to `file`.
    pub fn scan_named(&self, text: &str, file: &str) -> Result<Vec<Token>, LexError> {
        Scanner::new(text, Arc::from(file), self.policy).run()
    }

    /// Reads the whole file, then scans it.
    pub fn scan_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Token>, LexError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.scan_named(&text, &path.display().to_string())
    }
}

/// Cursor state for one scan.
struct Scanner<'a> {
    text: &'a str,
    offset: usize,
    line: usize,
    file: Arc<str>,
    policy: UnrecognizedPolicy,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, file: Arc<str>, policy: UnrecognizedPolicy) -> Self {
        Scanner { text, offset: 0, line: 1, file, policy, tokens: Vec::with_capacity(text.len() / 4) }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let text = self.text;
        while self.offset < text.len() {
            let rest = &text[self.offset..];

            let blank = skip_whitespace(rest);
            if blank > 0 {
                self.offset += blank;
                continue;
            }

            match recognize(rest) {
                Some((kind, consumed)) => {
                    trace!("{}:{}: {} ({} char(s))", self.file, self.line, kind, consumed);
                    let ends_line = kind == TokenKind::Newline;
                    self.tokens.push(Token::new(kind, Arc::clone(&self.file), self.line));
                    self.offset += consumed;
                    if ends_line {
                        self.line += 1;
                    }
                }
                None => self.unrecognized(rest)?,
            }
        }

        debug!("scanned {} token(s) over {} line(s) from `{}`", self.tokens.len(), self.line, self.file);
        Ok(self.tokens)
    }

    fn unrecognized(&mut self, rest: &str) -> Result<(), LexError> {
        let ch = match rest.chars().next() {
            Some(ch) => ch,
            None => return Ok(()),
        };

        match self.policy {
            UnrecognizedPolicy::Skip => {
                warn!("{}:{}: skipping unrecognized character `{}`", self.file, self.line, ch.escape_default());
                self.offset += ch.len_utf8();
                Ok(())
            }
            UnrecognizedPolicy::Fail => Err(LexError::Unrecognized {
                file: self.file.to_string(),
                line: self.line,
                ch,
            }),
        }
    }
}

fn recognize(src: &str) -> Recognized {
    RECOGNIZERS.iter().find_map(|r| r(src))
}

fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\x0B' | b'\x07' | b'\x08' | b'\x0C' | b'\r')
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Number of leading non-newline whitespace characters.
fn skip_whitespace(src: &str) -> usize {
    src.bytes().take_while(|b| is_blank(*b)).count()
}

/// True if nothing identifier-like follows the first `n` characters.
fn ends_word(src: &str, n: usize) -> bool {
    src.as_bytes().get(n).map_or(true, |b| !is_ident_byte(*b))
}

fn punctuation(src: &str, c: char, kind: TokenKind) -> Recognized {
    if src.starts_with(c) {
        Some((kind, 1))
    } else {
        None
    }
}

fn newline(src: &str) -> Recognized {
    punctuation(src, '\n', TokenKind::Newline)
}

fn colon(src: &str) -> Recognized {
    punctuation(src, ':', TokenKind::Colon)
}

fn semicolon(src: &str) -> Recognized {
    punctuation(src, ';', TokenKind::Semicolon)
}

fn comma(src: &str) -> Recognized {
    punctuation(src, ',', TokenKind::Comma)
}

fn left_bracket(src: &str) -> Recognized {
    punctuation(src, '[', TokenKind::LeftBracket)
}

fn right_bracket(src: &str) -> Recognized {
    punctuation(src, ']', TokenKind::RightBracket)
}

/// `;` through to (not including) the end of the line.
fn comment(src: &str) -> Recognized {
    let caps = COMMENT.captures(src)?;
    let text = caps.get(1)?.as_str();
    Some((TokenKind::Comment(text.to_string()), text.len() + 1))
}

/// Longest case-insensitive opcode name, e.g. `CMPGTS` rather than
/// `CMPGT`. The name must not run on into an identifier, so
/// `int_handler` is left for the label and identifier rules.
fn mnemonic(src: &str) -> Recognized {
    ast::prefixes_of(ast::all_mnemonics(), src)
        .into_iter()
        .find(|name| ends_word(src, name.len()))
        .map(|name| (TokenKind::Mnemonic(src[..name.len()].to_string()), name.len()))
}

fn word_size(src: &str) -> Recognized {
    ast::prefixes_of(WORD_SIZES.iter().copied(), src)
        .into_iter()
        .find(|name| ends_word(src, name.len()))
        .map(|name| (TokenKind::WordSize(src[..name.len()].to_string()), name.len()))
}

/// `$` followed by a register name and up to two `l`/`h` selector letters.
fn register(src: &str) -> Recognized {
    let body = src.strip_prefix('$')?;
    let name = *RegisterName::prefixes(body).first()?;
    let selector = body[name.len()..]
        .bytes()
        .take(2)
        .take_while(|b| matches!(*b, b'l' | b'L' | b'h' | b'H'))
        .count();
    let width = name.len() + selector;
    Some((TokenKind::Register(body[..width].to_string()), width + 1))
}

/// `X+`, `X-`, `Y+` or `Y-`.
fn index_sigil(src: &str) -> Recognized {
    let kind = match src.as_bytes() {
        [b'x', b'+', ..] | [b'X', b'+', ..] => TokenKind::XPlus,
        [b'x', b'-', ..] | [b'X', b'-', ..] => TokenKind::XMinus,
        [b'y', b'+', ..] | [b'Y', b'+', ..] => TokenKind::YPlus,
        [b'y', b'-', ..] | [b'Y', b'-', ..] => TokenKind::YMinus,
        _ => return None,
    };
    Some((kind, 2))
}

/// An identifier, optional whitespace, then a colon. Consumes through
/// the colon.
fn label(src: &str) -> Recognized {
    let (name, mut idx) = match identifier(src)? {
        (TokenKind::Identifier(name), n) => (name, n),
        _ => return None,
    };
    idx += skip_whitespace(&src[idx..]);
    colon(&src[idx..])?;
    Some((TokenKind::Label { label: name, length: idx + 1 }, idx + 1))
}

fn identifier(src: &str) -> Recognized {
    let m = IDENTIFIER.find(src)?;
    Some((TokenKind::Identifier(m.as_str().to_string()), m.end()))
}

/// Accumulates an unsigned magnitude, wrapping on overflow.
fn magnitude(digits: &str, radix: u32) -> i64 {
    digits.chars().fold(0i64, |acc, c| {
        acc.wrapping_mul(i64::from(radix))
            .wrapping_add(i64::from(c.to_digit(radix).unwrap_or(0)))
    })
}

fn signed(sign: &str, value: i64) -> i64 {
    if sign == "-" {
        value.wrapping_neg()
    } else {
        value
    }
}

/// Matches `re` and yields (sign, digits, consumed).
fn literal_parts<'s>(re: &Regex, src: &'s str) -> Option<(&'s str, &'s str, usize)> {
    let caps = re.captures(src)?;
    let whole = caps.get(0)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str(), whole.end()))
}

fn decimal_literal(src: &str) -> Recognized {
    let (sign, digits, length) = literal_parts(&DECIMAL, src)?;
    let value = match format!("{}{}", sign, digits).parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            warn!("decimal literal `{}{}` does not fit in 64 bits, wrapping", sign, digits);
            signed(sign, magnitude(digits, 10))
        }
    };
    Some((TokenKind::DecimalLiteral { value, length }, length))
}

fn binary_literal(src: &str) -> Recognized {
    let (sign, digits, length) = literal_parts(&BINARY, src)?;
    let value = signed(sign, magnitude(digits, 2));
    Some((TokenKind::BinaryLiteral { value, length }, length))
}

fn hex_literal(src: &str) -> Recognized {
    let (sign, digits, length) = literal_parts(&HEX, src)?;
    let value = signed(sign, magnitude(digits, 16));
    Some((TokenKind::HexLiteral { value, length }, length))
}

fn octal_literal(src: &str) -> Recognized {
    let (sign, digits, length) = literal_parts(&OCTAL, src)?;
    let value = if digits == "0" { 0 } else { signed(sign, magnitude(digits, 8)) };
    Some((TokenKind::OctalLiteral { value, length }, length))
}

fn digit(src: &str, radix: u32, kind: fn(String) -> TokenKind) -> Recognized {
    let c = src.chars().next()?;
    if c.is_digit(radix) {
        Some((kind(c.to_string()), 1))
    } else {
        None
    }
}

/// Single-digit recognizers; the escape recognizers are built from these.
pub fn binary_digit(src: &str) -> Recognized {
    digit(src, 2, TokenKind::BinaryDigit)
}

pub fn octal_digit(src: &str) -> Recognized {
    digit(src, 8, TokenKind::OctalDigit)
}

pub fn decimal_digit(src: &str) -> Recognized {
    digit(src, 10, TokenKind::DecimalDigit)
}

pub fn hex_digit(src: &str) -> Recognized {
    digit(src, 16, TokenKind::HexDigit)
}

/// A printable ASCII character other than `'` and `\`.
fn simple_char(src: &str) -> Recognized {
    let b = *src.as_bytes().first()?;
    if (0x20..0x7F).contains(&b) && b != b'\'' && b != b'\\' {
        Some((TokenKind::SimpleChar((b as char).to_string()), 1))
    } else {
        None
    }
}

fn escaped_control_char(src: &str) -> Recognized {
    match src.as_bytes() {
        [b'\\', c, ..] if b"abfnrtv'0\\".contains(c) => {
            Some((TokenKind::EscapedControlChar(src[..2].to_string()), 2))
        }
        _ => None,
    }
}

/// `\ddd`
fn escaped_octal_char(src: &str) -> Recognized {
    let digits = src.strip_prefix('\\')?;
    for i in 0..3 {
        octal_digit(digits.get(i..)?)?;
    }
    Some((TokenKind::EscapedOctalChar(src[..4].to_string()), 4))
}

/// `\xHH`
fn escaped_hex_char(src: &str) -> Recognized {
    let digits = src.strip_prefix("\\x")?;
    for i in 0..2 {
        hex_digit(digits.get(i..)?)?;
    }
    Some((TokenKind::EscapedHexChar(src[..4].to_string()), 4))
}

fn control_value(c: u8) -> Option<u8> {
    Some(match c {
        b'a'  => 0x07,
        b'b'  => 0x08,
        b'f'  => 0x0C,
        b'n'  => b'\n',
        b'r'  => b'\r',
        b't'  => b'\t',
        b'v'  => 0x0B,
        b'\'' => b'\'',
        b'0'  => 0,
        b'\\' => b'\\',
        _ => return None,
    })
}

/// The byte a character-literal body stands for. Octal escapes above
/// `\377` are truncated to eight bits.
fn char_value(piece: &TokenKind) -> Option<u8> {
    match piece {
        TokenKind::SimpleChar(s)         => s.bytes().next(),
        TokenKind::EscapedControlChar(s) => control_value(*s.as_bytes().get(1)?),
        TokenKind::EscapedOctalChar(s)   => u32::from_str_radix(&s[1..], 8).ok().map(|v| v as u8),
        TokenKind::EscapedHexChar(s)     => u8::from_str_radix(&s[2..], 16).ok(),
        _ => None,
    }
}

/// `'a'`, `'\n'`, `'\101'` or `'\x41'`.
fn char_literal(src: &str) -> Recognized {
    let body = src.strip_prefix('\'')?;
    let (piece, width) = CHAR_PIECES.iter().find_map(|r| r(body))?;
    if !body[width..].starts_with('\'') {
        return None;
    }
    let ch = char_value(&piece)?;
    let length = width + 2;
    Some((TokenKind::CharLiteral { ch, length }, length))
}
