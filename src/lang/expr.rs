use crate::frontend::token::{FunctionId, Opcode};
use serde::{Deserialize, Serialize};

/// The predicate that stops a loop. It is checked against the current cell
/// before every iteration, including the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitCondition {
    /// `+`: stop once the cell is greater than zero.
    Positive,
    /// `-`: stop once the cell is less than zero.
    Negative,
    /// `=`: stop once the cell is zero.
    Equals,
    /// `!`: stop once the cell is non-zero.
    NotEquals,
}

impl ExitCondition {
    pub fn from_opcode(opcode: Opcode) -> Option<Self> {
        match opcode {
            Opcode::Positive => Some(ExitCondition::Positive),
            Opcode::Negative => Some(ExitCondition::Negative),
            Opcode::Equals => Some(ExitCondition::Equals),
            Opcode::NotEquals => Some(ExitCondition::NotEquals),
            _ => None,
        }
    }

    pub fn is_met(self, cell: i64) -> bool {
        match self {
            ExitCondition::Positive => cell > 0,
            ExitCondition::Negative => cell < 0,
            ExitCondition::Equals => cell == 0,
            ExitCondition::NotEquals => cell != 0,
        }
    }
}

/// An ordered sequence of expressions, evaluated in full every time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block(Vec<Expr>);

impl Block {
    pub fn new() -> Self {
        Block(Vec::new())
    }

    pub fn push(&mut self, expr: Expr) {
        self.0.push(expr);
    }

    pub fn exprs(&self) -> &[Expr] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Expr>> for Block {
    fn from(exprs: Vec<Expr>) -> Self {
        Block(exprs)
    }
}

/// Abstract syntax tree node.
///
/// Primitive variants act on the current frame of the call stack; `Block`,
/// `Loop` and `FunctionDecl` own their children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    // ───────────────────────────── Cursor ─────────────────────────────
    /// Move the cursor by a signed offset. Moving below zero is fatal.
    MovePointer(i64),
    /// Put the cursor back on cell 0.
    ReturnToStart,

    // ───────────────────────────── Cells ──────────────────────────────
    /// Add a signed amount to the current cell.
    IncrementCell(i64),
    Reset,
    /// Store a uniform random value in `[0, 100)`.
    Random,

    // ─────────────────────────── Registers ────────────────────────────
    /// memory := cell
    Write,
    /// cell := memory
    Read,
    /// cell := return register
    FunctionReadResult,
    /// Exchange the current cell and the memory register.
    Swap,
    /// Reset the whole frame to a single zero cell.
    Flush,

    // ───────────────────────────── I/O ────────────────────────────────
    PrintNumber,
    PrintChar,
    /// Block until a line of input arrives, then discard it.
    Pause,
    Newline,
    /// Sleep for `cell * 100` milliseconds.
    Sleep,
    /// Reserved opcode `C`. It has no behaviour and evaluates to nothing.
    Recycle,

    // ─────────────────────────── Structure ────────────────────────────
    FunctionCall(FunctionId),
    Block(Block),
    Loop {
        condition: ExitCondition,
        body: Block,
    },
    FunctionDecl {
        id: FunctionId,
        body: Block,
    },
    /// A structural token that appeared where it has no meaning.
    Nop,
}

impl Expr {
    /// Converts a single opcode into its expression.
    ///
    /// Structural opcodes (loop brackets, function declaration and end, the
    /// comment delimiter) only mean something to the parser and become `Nop`
    /// when converted directly.
    pub fn from_opcode(opcode: Opcode) -> Expr {
        match opcode {
            Opcode::Right => Expr::MovePointer(1),
            Opcode::Left => Expr::MovePointer(-1),
            Opcode::ReturnToStart => Expr::ReturnToStart,
            Opcode::Increase => Expr::IncrementCell(1),
            Opcode::Decrease => Expr::IncrementCell(-1),
            Opcode::Reset => Expr::Reset,
            Opcode::Random => Expr::Random,
            Opcode::Write => Expr::Write,
            Opcode::Read => Expr::Read,
            Opcode::ReturnValue => Expr::FunctionReadResult,
            Opcode::Swap => Expr::Swap,
            Opcode::Flush => Expr::Flush,
            Opcode::PrintNumber => Expr::PrintNumber,
            Opcode::PrintChar => Expr::PrintChar,
            Opcode::Pause => Expr::Pause,
            Opcode::Newline => Expr::Newline,
            Opcode::Sleep => Expr::Sleep,
            Opcode::Recycle => Expr::Recycle,
            Opcode::FunctionCall(id) => Expr::FunctionCall(id),
            Opcode::Comment
            | Opcode::LoopOpen
            | Opcode::Positive
            | Opcode::Negative
            | Opcode::Equals
            | Opcode::NotEquals
            | Opcode::FunctionDeclare
            | Opcode::FunctionEnd => Expr::Nop,
        }
    }

    /// The nested block of a container node.
    pub fn body(&self) -> Option<&Block> {
        match self {
            Expr::Block(block) => Some(block),
            Expr::Loop { body, .. } | Expr::FunctionDecl { body, .. } => Some(body),
            _ => None,
        }
    }
}
