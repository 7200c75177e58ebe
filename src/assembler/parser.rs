//! The Parser module takes a token stream (Vec<Token>) from the lexer
//! and converts it into a `Program`.
//!
//! Parsing is line oriented recursive descent:
//!
//! ```text
//! Line          := Label? Instruction? Comment? (NEWLINE | end of input)
//! Instruction   := Mnemonic WordSize? Arguments(arity(Mnemonic))
//! Argument      := Register | Immediate | Identifier | IndexedMemory
//! IndexedMemory := '[' (X+|X-|Y+|Y-) (Register | Immediate)? ']'
//! ```
//!
//! Every probe takes the cursor to start from and returns either the
//! node with the cursor just past it, or `None` having consumed nothing.
//! The first line that cannot be parsed stops the whole parse.
use super::ast::*;
use super::error::{ParseError, Reason};
use super::token::{Token, TokenKind};

type Parsed<T> = Option<(T, usize)>;

pub struct Parser {
    tokens: Vec<Token>,
    /// Failures recorded while parsing the current line only.
    reasons: Vec<Reason>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, reasons: Vec::new() }
    }

    /// Run the parser, consuming itself and returning the program.
    pub fn run(mut self) -> Result<Program, ParseError> {
        let mut lines = Vec::new();
        let mut cpos = 0;

        while cpos < self.tokens.len() {
            self.reasons.clear();
            match self.line(cpos) {
                Some((line, next)) => {
                    trace!("line {}: {}", line.number, line);
                    lines.push(line);
                    cpos = next;
                }
                None => return Err(self.failure(cpos)),
            }
        }

        debug!("parsed {} line(s)", lines.len());
        Ok(Program { lines })
    }

    fn failure(&mut self, cpos: usize) -> ParseError {
        let (file, line) = match self.tokens.get(cpos) {
            Some(tok) => (tok.file.to_string(), tok.line),
            None => (String::new(), 0),
        };
        ParseError { file, line, reasons: std::mem::take(&mut self.reasons) }
    }

    #[inline]
    fn peek(&self, cpos: usize) -> Option<&TokenKind> {
        self.tokens.get(cpos).map(|t| &t.kind)
    }

    fn describe(&self, cpos: usize) -> String {
        match self.tokens.get(cpos) {
            Some(tok) => tok.to_string(),
            None => "end of input".to_string(),
        }
    }

    fn expected(&mut self, expected: &'static str, cpos: usize) {
        let found = self.describe(cpos);
        self.reasons.push(Reason::Expected { expected, found });
    }

    fn line(&mut self, mut cpos: usize) -> Parsed<Line> {
        let number = self.tokens.get(cpos).map_or(0, |t| t.line);
        let mut line = Line { number, ..Line::default() };

        if let Some((label, next)) = self.label(cpos) {
            line.label = Some(label);
            cpos = next;
        }

        if let Some((instruction, next)) = self.instruction(cpos) {
            line.instruction = Some(instruction);
            cpos = next;
        }

        if let Some((comment, next)) = self.comment(cpos) {
            line.comment = Some(comment);
            cpos = next;
        }

        match self.peek(cpos) {
            None => Some((line, cpos)),
            Some(TokenKind::Newline) => Some((line, cpos + 1)),
            Some(_) => {
                self.expected("end of line", cpos);
                None
            }
        }
    }

    fn label(&self, cpos: usize) -> Parsed<Label> {
        match self.peek(cpos) {
            Some(TokenKind::Label { label, .. }) => Some((Label { name: label.clone() }, cpos + 1)),
            _ => None,
        }
    }

    fn comment(&self, cpos: usize) -> Parsed<Comment> {
        match self.peek(cpos) {
            Some(TokenKind::Comment(text)) => Some((Comment { text: text.clone() }, cpos + 1)),
            _ => None,
        }
    }

    fn instruction(&mut self, cpos: usize) -> Parsed<Instruction> {
        let (mnemonic, mut cpos) = self.mnemonic(cpos)?;

        let word_size = match self.word_size(cpos) {
            Some((size, next)) => {
                if !mnemonic.accepts_word_size() {
                    self.reasons.push(Reason::WordSizeNotPermitted {
                        mnemonic: mnemonic.to_string(),
                        word_size: size.to_string(),
                    });
                    return None;
                }
                cpos = next;
                Some(size)
            }
            // Everything may omit a word size.
            None => None,
        };

        let arity = match mnemonic.arity() {
            Some(arity) => arity,
            None => {
                self.reasons.push(Reason::UnknownMnemonic(mnemonic.to_string()));
                return None;
            }
        };

        match self.operands(arity, cpos) {
            Some((operands, next)) => Some((Instruction { mnemonic, word_size, operands }, next)),
            None => {
                self.reasons.push(Reason::MalformedInstruction { mnemonic: mnemonic.to_string(), arity });
                None
            }
        }
    }

    fn mnemonic(&self, cpos: usize) -> Parsed<Mnemonic> {
        match self.peek(cpos) {
            Some(TokenKind::Mnemonic(name)) => Some((Mnemonic::new(name), cpos + 1)),
            _ => None,
        }
    }

    fn word_size(&self, cpos: usize) -> Parsed<WordSize> {
        match self.peek(cpos) {
            Some(TokenKind::WordSize(text)) => text.parse().ok().map(|size| (size, cpos + 1)),
            _ => None,
        }
    }

    fn operands(&mut self, arity: Arity, cpos: usize) -> Parsed<Operands> {
        match arity {
            Arity::Zero => Some((Operands::None, cpos)),
            Arity::One => {
                let (arg, cpos) = self.argument(cpos)?;
                Some((Operands::One(arg), cpos))
            }
            Arity::Two => {
                let (first, cpos) = self.argument(cpos)?;
                if self.peek(cpos) != Some(&TokenKind::Comma) {
                    self.expected("`,`", cpos);
                    return None;
                }
                let (second, cpos) = self.argument(cpos + 1)?;
                Some((Operands::Two(first, second), cpos))
            }
        }
    }

    fn argument(&mut self, cpos: usize) -> Parsed<Argument> {
        let found = self.register(cpos).map(|(r, n)| (Argument::Register(r), n))
            .or_else(|| self.immediate(cpos).map(|(i, n)| (Argument::Immediate(i), n)))
            .or_else(|| self.identifier(cpos).map(|(s, n)| (Argument::Identifier(s), n)))
            .or_else(|| self.indexed(cpos).map(|(m, n)| (Argument::Indexed(m), n)));

        if found.is_none() {
            self.expected("an argument", cpos);
        }
        found
    }

    fn register(&mut self, cpos: usize) -> Parsed<Register> {
        let text = match self.peek(cpos) {
            Some(TokenKind::Register(text)) => text.clone(),
            _ => return None,
        };
        match text.parse::<Register>() {
            Ok(reg) => Some((reg, cpos + 1)),
            Err(_) => {
                self.expected("a register", cpos);
                None
            }
        }
    }

    fn immediate(&self, cpos: usize) -> Parsed<Immediate> {
        let (value, radix) = match self.peek(cpos)? {
            TokenKind::BinaryLiteral { value, .. }  => (*value, Radix::Binary),
            TokenKind::OctalLiteral { value, .. }   => (*value, Radix::Octal),
            TokenKind::DecimalLiteral { value, .. } => (*value, Radix::Decimal),
            TokenKind::HexLiteral { value, .. }     => (*value, Radix::Hex),
            TokenKind::CharLiteral { ch, .. }       => (i64::from(*ch), Radix::Char),
            _ => return None,
        };
        Some((Immediate { value, radix }, cpos + 1))
    }

    fn identifier(&self, cpos: usize) -> Parsed<String> {
        match self.peek(cpos) {
            Some(TokenKind::Identifier(name)) => Some((name.clone(), cpos + 1)),
            _ => None,
        }
    }

    fn indexed(&mut self, cpos: usize) -> Parsed<IndexedMemory> {
        if self.peek(cpos) != Some(&TokenKind::LeftBracket) {
            return None;
        }

        let (index, direction) = match self.peek(cpos + 1) {
            Some(TokenKind::XPlus)  => (IndexRegister::X, Direction::Plus),
            Some(TokenKind::XMinus) => (IndexRegister::X, Direction::Minus),
            Some(TokenKind::YPlus)  => (IndexRegister::Y, Direction::Plus),
            Some(TokenKind::YMinus) => (IndexRegister::Y, Direction::Minus),
            _ => {
                self.expected("an index (X+, X-, Y+ or Y-)", cpos + 1);
                return None;
            }
        };
        let mut cpos = cpos + 2;

        let displacement = if let Some((reg, next)) = self.register(cpos) {
            cpos = next;
            Some(Displacement::Register(reg))
        } else if let Some((imm, next)) = self.immediate(cpos) {
            cpos = next;
            Some(Displacement::Immediate(imm))
        } else {
            None
        };

        if self.peek(cpos) != Some(&TokenKind::RightBracket) {
            self.expected("`]`", cpos);
            return None;
        }
        Some((IndexedMemory { index, direction, displacement }, cpos + 1))
    }
}

/// Parses a whole token sequence.
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParseError> {
    Parser::new(tokens).run()
}
