//! This AST describes a parsed NP assembly source unit.
//!
//! A program is a sequence of lines. Each line may carry a label, an
//! instruction and a trailing comment, in that order. Instruction
//! addresses are implied by line order, so the order of `Program::lines`
//! is significant.
//!
//! Example source file:
//!
//! ```nasm
//!             MOVE byte $All,            0xfe ; Set All to 254
//!             MOVE word  $Bl,  [X+0xfedcba98] ; Bl <= mem[X + 0xfedcba98]
//!             MOVE      $ACC,               0
//! loop_begin: CMPGE     $ACC,             100
//!             JUMPC     loop_end              ; Identifiers are resolved later
//!             INC       $ACC
//!             JUMP      loop_begin
//! loop_end:   HALT
//! ```
//!
//! Mnemonics, word sizes, register names and index sigils are
//! case-insensitive. Registers may carry a one or two letter sub-byte
//! selector (`$Al`, `$Ahl`).

use std::fmt;
use std::str::FromStr;

/// Instructions that take no operands.
pub const NO_ARG_OPS: &[&str] = &[
    "nop", "pop", "ret", "iret", "iqe", "iqd", "ion", "ioff", "halt",
];

/// Instructions that take a single operand.
pub const ONE_ARG_OPS: &[&str] = &[
    "inc", "dec", "cmpz", "cmpnz", "stack", "push",
    "jump", "call", "jumpc", "callc", "int", "irset",
    "hwnum", "hwqry", "hwint",
];

/// Instructions that take two operands.
pub const TWO_ARG_OPS: &[&str] = &[
    "move", "swap", "add", "sub", "mul", "muls", "div", "divs",
    "mod", "mods", "and", "bor", "xor", "shr", "shra", "shl",
    "cmpeq", "cmpne", "cmpgt", "cmplt", "cmpge", "cmple",
    "cmpgts", "cmplts", "cmpges", "cmples", "iset", "hwin",
    "hwout",
];

/// Instructions that must not be given a word size.
pub const SIZELESS_OPS: &[&str] = &[
    "nop", "jump", "call", "ret", "jumpc", "callc",
    "iret", "iqe", "iqd", "ion", "ioff", "hwqry", "halt",
];

/// Every mnemonic the instruction set knows about.
pub fn all_mnemonics() -> impl Iterator<Item = &'static str> {
    NO_ARG_OPS.iter().chain(ONE_ARG_OPS).chain(TWO_ARG_OPS).copied()
}

/// Returns every name that is a case-insensitive prefix of `text`,
/// longest first.
pub(crate) fn prefixes_of<I>(names: I, text: &str) -> Vec<&'static str>
where
    I: IntoIterator<Item = &'static str>,
{
    let bytes = text.as_bytes();
    let mut found: Vec<&'static str> = names
        .into_iter()
        .filter(|name| {
            bytes.len() >= name.len() && bytes[..name.len()].eq_ignore_ascii_case(name.as_bytes())
        })
        .collect();
    found.sort_by(|a, b| b.len().cmp(&a.len()));
    found
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Arity {
    Zero,
    One,
    Two,
}

impl Arity {
    pub fn count(self) -> usize {
        match self {
            Arity::Zero => 0,
            Arity::One  => 1,
            Arity::Two  => 2,
        }
    }
}

/// An opcode name, normalized to lower case.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Mnemonic(String);

impl Mnemonic {
    pub fn new(name: &str) -> Self {
        Mnemonic(name.to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The operand count, or `None` for an unknown opcode.
    pub fn arity(&self) -> Option<Arity> {
        let name = self.as_str();
        if NO_ARG_OPS.contains(&name) {
            Some(Arity::Zero)
        } else if ONE_ARG_OPS.contains(&name) {
            Some(Arity::One)
        } else if TWO_ARG_OPS.contains(&name) {
            Some(Arity::Two)
        } else {
            None
        }
    }

    pub fn accepts_word_size(&self) -> bool {
        !SIZELESS_OPS.contains(&self.as_str())
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum WordSize {
    Word,
    Byte,
}

impl FromStr for WordSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("word") {
            Ok(WordSize::Word)
        } else if s.eq_ignore_ascii_case("byte") {
            Ok(WordSize::Byte)
        } else {
            Err(format!("`{}` is not a word size", s))
        }
    }
}

impl fmt::Display for WordSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WordSize::Word => f.write_str("word"),
            WordSize::Byte => f.write_str("byte"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum RegisterName {
    ACC,
    COMP,
    EXC,
    INTQ,
    INT,
    ION,
    STL,
    SP,
    PC,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    X,
    Y,
}

impl RegisterName {
    pub const ALL: [RegisterName; 19] = {
        use RegisterName::*;
        [ACC, COMP, EXC, INTQ, INT, ION, STL, SP, PC, A, B, C, D, E, F, G, H, X, Y]
    };

    pub fn as_str(self) -> &'static str {
        use RegisterName::*;
        match self {
            ACC  => "ACC",
            COMP => "COMP",
            EXC  => "EXC",
            INTQ => "INTQ",
            INT  => "INT",
            ION  => "ION",
            STL  => "STL",
            SP   => "SP",
            PC   => "PC",
            A    => "A",
            B    => "B",
            C    => "C",
            D    => "D",
            E    => "E",
            F    => "F",
            G    => "G",
            H    => "H",
            X    => "X",
            Y    => "Y",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        RegisterName::ALL.iter().copied().find(|r| r.as_str().eq_ignore_ascii_case(name))
    }

    /// Register names that prefix `text`, longest first.
    pub(crate) fn prefixes(text: &str) -> Vec<&'static str> {
        prefixes_of(RegisterName::ALL.iter().map(|r| r.as_str()), text)
    }
}

impl fmt::Display for RegisterName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Half {
    Low,
    High,
}

impl Half {
    fn from_letter(c: char) -> Option<Self> {
        match c {
            'l' | 'L' => Some(Half::Low),
            'h' | 'H' => Some(Half::High),
            _ => None,
        }
    }

    fn letter(self) -> char {
        match self {
            Half::Low  => 'l',
            Half::High => 'h',
        }
    }
}

/// Which part of a register an operand addresses.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Selector {
    Whole,
    /// `$Al`: one half of the register.
    Half(Half),
    /// `$Ahl`: the first letter picks the half, the second a byte within it.
    Quarter(Half, Half),
}

impl Selector {
    /// Parses zero, one or two `l`/`h` letters.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (None, _, _) => Some(Selector::Whole),
            (Some(a), None, _) => Half::from_letter(a).map(Selector::Half),
            (Some(a), Some(b), None) => Some(Selector::Quarter(Half::from_letter(a)?, Half::from_letter(b)?)),
            _ => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Selector::Whole => Ok(()),
            Selector::Half(h) => write!(f, "{}", h.letter()),
            Selector::Quarter(w, b) => write!(f, "{}{}", w.letter(), b.letter()),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Register {
    pub name: RegisterName,
    pub selector: Selector,
}

impl FromStr for Register {
    type Err = String;

    /// Parses a register as it appears after the `$` sigil, e.g. `ACC`
    /// or `Bhl`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for prefix in RegisterName::prefixes(s) {
            let selector = match Selector::parse(&s[prefix.len()..]) {
                Some(selector) => selector,
                None => continue,
            };
            if let Some(name) = RegisterName::from_name(prefix) {
                return Ok(Register { name, selector });
            }
        }
        Err(format!("`{}` is not a register", s))
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "${}{}", self.name, self.selector)
    }
}

/// The notation an immediate was written in. Only used for diagnostics
/// and for rendering.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Radix {
    Binary,
    Octal,
    Decimal,
    Hex,
    Char,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Immediate {
    pub value: i64,
    pub radix: Radix,
}

impl fmt::Display for Immediate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = if self.value < 0 { "-" } else { "" };
        let magnitude = self.value.unsigned_abs();
        match self.radix {
            Radix::Binary  => write!(f, "{}0b{:b}", sign, magnitude),
            Radix::Octal   => write!(f, "{}0{:o}", sign, magnitude),
            Radix::Decimal => write!(f, "{}", self.value),
            Radix::Hex     => write!(f, "{}0x{:X}", sign, magnitude),
            Radix::Char    => {
                let c = self.value as u8;
                if (0x20..0x7F).contains(&c) && c != b'\'' && c != b'\\' {
                    write!(f, "'{}'", c as char)
                } else {
                    write!(f, "'\\x{:02X}'", c)
                }
            }
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum IndexRegister {
    X,
    Y,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Direction {
    Plus,
    Minus,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Displacement {
    Register(Register),
    Immediate(Immediate),
}

impl fmt::Display for Displacement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Displacement::Register(r) => r.fmt(f),
            Displacement::Immediate(i) => i.fmt(f),
        }
    }
}

/// `[X+$A]`, `[Y-0x10]`, `[X+]`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct IndexedMemory {
    pub index: IndexRegister,
    pub direction: Direction,
    pub displacement: Option<Displacement>,
}

impl fmt::Display for IndexedMemory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let index = match self.index {
            IndexRegister::X => 'X',
            IndexRegister::Y => 'Y',
        };
        let direction = match self.direction {
            Direction::Plus  => '+',
            Direction::Minus => '-',
        };
        write!(f, "[{}{}", index, direction)?;
        if let Some(d) = &self.displacement {
            write!(f, "{}", d)?;
        }
        f.write_str("]")
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Argument {
    Register(Register),
    Immediate(Immediate),
    /// A jump or call target, bound to an address by the code generator.
    Identifier(String),
    Indexed(IndexedMemory),
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Argument::Register(r)   => r.fmt(f),
            Argument::Immediate(i)  => i.fmt(f),
            Argument::Identifier(s) => f.write_str(s),
            Argument::Indexed(m)    => m.fmt(f),
        }
    }
}

/// Operands of an instruction. The variant always agrees with the
/// mnemonic's arity.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Operands {
    None,
    One(Argument),
    Two(Argument, Argument),
}

impl Operands {
    pub fn arity(&self) -> Arity {
        match self {
            Operands::None      => Arity::Zero,
            Operands::One(_)    => Arity::One,
            Operands::Two(_, _) => Arity::Two,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    /// Absent means the width is left to the code generator.
    pub word_size: Option<WordSize>,
    pub operands: Operands,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic)?;
        if let Some(size) = self.word_size {
            write!(f, " {}", size)?;
        }
        match &self.operands {
            Operands::None      => Ok(()),
            Operands::One(a)    => write!(f, " {}", a),
            Operands::Two(a, b) => write!(f, " {}, {}", a, b),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Label {
    pub name: String,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:", self.name)
    }
}

/// Everything after the `;`, verbatim.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Comment {
    pub text: String,
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, ";{}", self.text)
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Line {
    /// 1-based source line.
    pub number: usize,
    pub label: Option<Label>,
    pub instruction: Option<Instruction>,
    pub comment: Option<Comment>,
}

impl Line {
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.instruction.is_none() && self.comment.is_none()
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parts: Vec<String> = vec![
            self.label.as_ref().map(|l| l.to_string()),
            self.instruction.as_ref().map(|i| i.to_string()),
            self.comment.as_ref().map(|c| c.to_string()),
        ]
        .into_iter()
        .flatten()
        .collect();
        f.write_str(&parts.join(" "))
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Program {
    pub lines: Vec<Line>,
}

impl Program {
    /// Lines that carry an instruction, in address order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.lines.iter().filter_map(|l| l.instruction.as_ref())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, line) in self.lines.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_sets_are_disjoint() {
        for name in all_mnemonics() {
            let hits = [NO_ARG_OPS, ONE_ARG_OPS, TWO_ARG_OPS]
                .iter()
                .filter(|set| set.contains(&name))
                .count();
            assert_eq!(hits, 1, "{} appears in {} arity sets", name, hits);
        }
        assert_eq!(all_mnemonics().count(), 53);
    }

    #[test]
    fn test_mnemonic() {
        assert_eq!(Mnemonic::new("HALT").as_str(), "halt");
        assert_eq!(Mnemonic::new("HALT").arity(), Some(Arity::Zero));
        assert_eq!(Mnemonic::new("Jump").arity(), Some(Arity::One));
        assert_eq!(Mnemonic::new("cmpGTS").arity(), Some(Arity::Two));
        assert_eq!(Mnemonic::new("frobnicate").arity(), None);

        assert!(!Mnemonic::new("JUMP").accepts_word_size());
        assert!(!Mnemonic::new("hwqry").accepts_word_size());
        assert!(Mnemonic::new("MOVE").accepts_word_size());
        assert!(Mnemonic::new("pop").accepts_word_size());
    }

    #[test]
    fn test_word_size() {
        assert_eq!("WORD".parse::<WordSize>(), Ok(WordSize::Word));
        assert_eq!("byte".parse::<WordSize>(), Ok(WordSize::Byte));
        assert!("dword".parse::<WordSize>().is_err());
    }

    #[test]
    fn test_prefixes_longest_first() {
        assert_eq!(prefixes_of(all_mnemonics(), "CMPGTS"), vec!["cmpgts", "cmpgt"]);
        assert_eq!(prefixes_of(all_mnemonics(), "shra"), vec!["shra", "shr"]);
        assert!(prefixes_of(all_mnemonics(), "loop").is_empty());
        assert_eq!(RegisterName::prefixes("INTQ"), vec!["INTQ", "INT"]);
    }

    #[test]
    fn test_selector() {
        assert_eq!(Selector::parse(""), Some(Selector::Whole));
        assert_eq!(Selector::parse("l"), Some(Selector::Half(Half::Low)));
        assert_eq!(Selector::parse("hl"), Some(Selector::Quarter(Half::High, Half::Low)));
        assert_eq!(Selector::parse("HH"), Some(Selector::Quarter(Half::High, Half::High)));
        assert_eq!(Selector::parse("x"), None);
        assert_eq!(Selector::parse("lll"), None);
    }

    #[test]
    fn test_register_from_str() {
        assert_eq!(
            "ACC".parse::<Register>(),
            Ok(Register { name: RegisterName::ACC, selector: Selector::Whole })
        );
        assert_eq!(
            "INTQ".parse::<Register>(),
            Ok(Register { name: RegisterName::INTQ, selector: Selector::Whole })
        );
        assert_eq!(
            "All".parse::<Register>(),
            Ok(Register { name: RegisterName::A, selector: Selector::Quarter(Half::Low, Half::Low) })
        );
        assert_eq!(
            "Bl".parse::<Register>(),
            Ok(Register { name: RegisterName::B, selector: Selector::Half(Half::Low) })
        );
        assert_eq!(
            "acch".parse::<Register>(),
            Ok(Register { name: RegisterName::ACC, selector: Selector::Half(Half::High) })
        );
        assert!("Q".parse::<Register>().is_err());
        assert!("Ahhh".parse::<Register>().is_err());
    }

    #[test]
    fn test_display() {
        let reg = Register { name: RegisterName::A, selector: Selector::Quarter(Half::High, Half::Low) };
        assert_eq!(reg.to_string(), "$Ahl");

        assert_eq!(Immediate { value: 254, radix: Radix::Hex }.to_string(), "0xFE");
        assert_eq!(Immediate { value: -5, radix: Radix::Binary }.to_string(), "-0b101");
        assert_eq!(Immediate { value: 8, radix: Radix::Octal }.to_string(), "010");
        assert_eq!(Immediate { value: -12, radix: Radix::Decimal }.to_string(), "-12");
        assert_eq!(Immediate { value: 65, radix: Radix::Char }.to_string(), "'A'");
        assert_eq!(Immediate { value: 10, radix: Radix::Char }.to_string(), "'\\x0A'");

        let mem = IndexedMemory {
            index: IndexRegister::Y,
            direction: Direction::Minus,
            displacement: Some(Displacement::Immediate(Immediate { value: 123, radix: Radix::Decimal })),
        };
        assert_eq!(mem.to_string(), "[Y-123]");

        let line = Line {
            number: 1,
            label: Some(Label { name: "start".into() }),
            instruction: Some(Instruction {
                mnemonic: Mnemonic::new("MOVE"),
                word_size: Some(WordSize::Byte),
                operands: Operands::Two(Argument::Register(reg), Argument::Indexed(mem)),
            }),
            comment: Some(Comment { text: " load".into() }),
        };
        assert_eq!(line.to_string(), "start: move byte $Ahl, [Y-123] ; load");
        assert!(!line.is_empty());
        assert!(Line::default().is_empty());
    }
}
