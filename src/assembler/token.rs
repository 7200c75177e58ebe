//! Tokens produced by the lexer.
//!
//! Every token knows which file and line it came from. Tokens whose
//! width varies with the source (labels, literals) also remember how
//! many characters they consumed.
use std::fmt;
use std::sync::Arc;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TokenKind {
    Newline,
    Colon,
    Semicolon,
    Comment(String),
    Mnemonic(String),
    WordSize(String),
    Comma,
    /// Register name as written, without the leading `$`.
    Register(String),
    LeftBracket,
    RightBracket,
    XPlus,
    XMinus,
    YPlus,
    YMinus,

    BinaryDigit(String),
    OctalDigit(String),
    DecimalDigit(String),
    HexDigit(String),

    SimpleChar(String),
    EscapedControlChar(String),
    EscapedOctalChar(String),
    EscapedHexChar(String),

    Identifier(String),
    Label { label: String, length: usize },

    BinaryLiteral { value: i64, length: usize },
    OctalLiteral { value: i64, length: usize },
    DecimalLiteral { value: i64, length: usize },
    HexLiteral { value: i64, length: usize },
    CharLiteral { ch: u8, length: usize },
}

impl TokenKind {
    /// The upper-case tag used by the debug rendering.
    pub fn name(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Newline                   => "NEWLINE",
            Colon                     => "COLON",
            Semicolon                 => "SEMICOLON",
            Comment(_)                => "COMMENT",
            Mnemonic(_)               => "MNEMONIC",
            WordSize(_)               => "WORD_SIZE",
            Comma                     => "COMMA",
            Register(_)               => "REGISTER",
            LeftBracket               => "LEFT_BRACKET",
            RightBracket              => "RIGHT_BRACKET",
            XPlus                     => "XPLUS",
            XMinus                    => "XMINUS",
            YPlus                     => "YPLUS",
            YMinus                    => "YMINUS",
            BinaryDigit(_)            => "BINARY_DIGIT",
            OctalDigit(_)             => "OCTAL_DIGIT",
            DecimalDigit(_)           => "DECIMAL_DIGIT",
            HexDigit(_)               => "HEX_DIGIT",
            SimpleChar(_)             => "SIMPLE_CHAR",
            EscapedControlChar(_)     => "ESCAPED_CONTROL_CHAR",
            EscapedOctalChar(_)       => "ESCAPED_OCTAL_CHAR",
            EscapedHexChar(_)         => "ESCAPED_HEX_CHAR",
            Identifier(_)             => "IDENTIFIER",
            Label { .. }              => "LABEL",
            BinaryLiteral { .. }      => "BINARY_LITERAL",
            OctalLiteral { .. }       => "OCTAL_LITERAL",
            DecimalLiteral { .. }     => "DECIMAL_LITERAL",
            HexLiteral { .. }         => "HEX_LITERAL",
            CharLiteral { .. }        => "CHAR_LITERAL",
        }
    }

    /// Number of source characters the token occupies, where the
    /// token records it.
    pub fn length(&self) -> Option<usize> {
        use TokenKind::*;
        match self {
            Label { length, .. } |
            BinaryLiteral { length, .. } |
            OctalLiteral { length, .. } |
            DecimalLiteral { length, .. } |
            HexLiteral { length, .. } |
            CharLiteral { length, .. } => Some(*length),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenKind::*;
        let name = self.name();
        match self {
            Comment(s)            => write!(f, "<{}:comment={}>", name, s),
            Mnemonic(s)           => write!(f, "<{}:mnemonic={}>", name, s),
            WordSize(s)           => write!(f, "<{}:word_size={}>", name, s),
            Register(s)           => write!(f, "<{}:reg={}>", name, s),
            Identifier(s)         => write!(f, "<{}:ident={}>", name, s),

            BinaryDigit(s) |
            OctalDigit(s) |
            DecimalDigit(s) |
            HexDigit(s)           => write!(f, "<{}:digit={}>", name, s),

            SimpleChar(s) |
            EscapedControlChar(s) |
            EscapedOctalChar(s) |
            EscapedHexChar(s)     => write!(f, "<{}:ch={}>", name, s),

            Label { label, length } => write!(f, "<{}:label={}#{}>", name, label, length),

            BinaryLiteral { value, length } |
            OctalLiteral { value, length } |
            DecimalLiteral { value, length } |
            HexLiteral { value, length } => write!(f, "<{}:value={}#{}>", name, value, length),

            CharLiteral { ch, length } => write!(f, "<{}:ch={}#{}>", name, *ch as char, length),

            _ => write!(f, "<{}>", name),
        }
    }
}

/// A token together with where it was found.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    /// Shared between every token of one scan.
    pub file: Arc<str>,
    /// 1-based.
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, file: Arc<str>, line: usize) -> Self {
        Token { kind, file, line }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.kind.fmt(f)
    }
}

/// Concatenates the rendering of every token, in order, with no separator.
pub fn to_debug_string(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.to_string()).collect()
}
