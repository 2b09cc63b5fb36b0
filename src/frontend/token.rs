use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a user function. Only the digits `1`-`9` name functions.
///
/// Decoding goes through `TryFrom<u8>`, so an encoded program cannot smuggle
/// in an id the parser would never produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FunctionId(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("function id {0} is out of range 1-9")]
pub struct InvalidFunctionId(pub u8);

impl FunctionId {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 9;

    /// Returns `None` unless `id` is in `1..=9`.
    pub fn new(id: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&id).then_some(FunctionId(id))
    }

    /// Maps a source digit to its id; `'0'` is the reset opcode, not a function.
    pub fn from_digit(ch: char) -> Option<Self> {
        let digit = ch.to_digit(10)?;
        Self::new(digit as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for FunctionId {
    type Error = InvalidFunctionId;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        FunctionId::new(id).ok_or(InvalidFunctionId(id))
    }
}

impl From<FunctionId> for u8 {
    fn from(id: FunctionId) -> u8 {
        id.0
    }
}

impl std::fmt::Display for FunctionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    // Cursor
    Right, // >
    Left, // <
    ReturnToStart, // $

    // Cell arithmetic
    Increase, // ^
    Decrease, // v
    Reset, // 0
    Random, // %

    // Registers
    Write, // W
    Read, // R
    ReturnValue, // @
    Swap, // S
    Flush, // L

    // I/O
    PrintNumber, // ,
    PrintChar, // .
    Pause, // P
    Newline, // N
    Sleep, // Z
    Recycle, // C

    // Structure
    Comment, // /
    LoopOpen, // ?
    Positive, // +
    Negative, // -
    Equals, // =
    NotEquals, // !
    FunctionDeclare, // F
    FunctionEnd, // E
    FunctionCall(FunctionId), // 1-9
}

impl Opcode {
    /// Maps one source character to its opcode. Every other character is
    /// ignored by the lexer.
    pub fn from_char(ch: char) -> Option<Opcode> {
        let opcode = match ch {
            '>' => Opcode::Right,
            '<' => Opcode::Left,
            '$' => Opcode::ReturnToStart,
            '^' => Opcode::Increase,
            'v' => Opcode::Decrease,
            '0' => Opcode::Reset,
            '%' => Opcode::Random,
            'W' => Opcode::Write,
            'R' => Opcode::Read,
            '@' => Opcode::ReturnValue,
            'S' => Opcode::Swap,
            'L' => Opcode::Flush,
            ',' => Opcode::PrintNumber,
            '.' => Opcode::PrintChar,
            'P' => Opcode::Pause,
            'N' => Opcode::Newline,
            'Z' => Opcode::Sleep,
            'C' => Opcode::Recycle,
            '/' => Opcode::Comment,
            '?' => Opcode::LoopOpen,
            '+' => Opcode::Positive,
            '-' => Opcode::Negative,
            '=' => Opcode::Equals,
            '!' => Opcode::NotEquals,
            'F' => Opcode::FunctionDeclare,
            'E' => Opcode::FunctionEnd,
            '1'..='9' => Opcode::FunctionCall(FunctionId::from_digit(ch)?),
            _ => return None,
        };
        Some(opcode)
    }

    /// The canonical source character for this opcode.
    pub fn as_char(&self) -> char {
        match self {
            Opcode::Right => '>',
            Opcode::Left => '<',
            Opcode::ReturnToStart => '$',
            Opcode::Increase => '^',
            Opcode::Decrease => 'v',
            Opcode::Reset => '0',
            Opcode::Random => '%',
            Opcode::Write => 'W',
            Opcode::Read => 'R',
            Opcode::ReturnValue => '@',
            Opcode::Swap => 'S',
            Opcode::Flush => 'L',
            Opcode::PrintNumber => ',',
            Opcode::PrintChar => '.',
            Opcode::Pause => 'P',
            Opcode::Newline => 'N',
            Opcode::Sleep => 'Z',
            Opcode::Recycle => 'C',
            Opcode::Comment => '/',
            Opcode::LoopOpen => '?',
            Opcode::Positive => '+',
            Opcode::Negative => '-',
            Opcode::Equals => '=',
            Opcode::NotEquals => '!',
            Opcode::FunctionDeclare => 'F',
            Opcode::FunctionEnd => 'E',
            Opcode::FunctionCall(id) => char::from(b'0' + id.get()),
        }
    }

    /// Returns true for the four tokens that close a loop.
    pub fn is_exit_condition(&self) -> bool {
        matches!(
            self,
            Opcode::Positive | Opcode::Negative | Opcode::Equals | Opcode::NotEquals
        )
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// An opcode tagged with the 1-based line and column it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub line: usize,
    pub col: usize,
    pub opcode: Opcode,
}
