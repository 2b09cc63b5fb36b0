use crate::frontend::token::{Opcode, Token};
use std::io::{self, Write};

/// Prints one line per token: position, category and opcode.
pub struct TokenDumper {
    pub color: bool,
    pub show_debug_repr: bool, // if false, prints the source character instead
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_debug_repr: true,
        }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const GRN: &'static str = "\x1b[32m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.show_debug_repr = false;
        self
    }

    pub fn dump<W: Write>(&self, out: &mut W, tokens: &[Token]) -> io::Result<()> {
        for token in tokens {
            self.print_one(out, token)?;
        }
        Ok(())
    }

    fn print_one<W: Write>(&self, out: &mut W, t: &Token) -> io::Result<()> {
        let kind = self.kind(&t.opcode);
        let colr = if self.color { self.color(&t.opcode) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        if self.show_debug_repr {
            writeln!(
                out,
                "[{:02}:{:02}] {}{:<8} {:?}{}",
                t.line, t.col, colr, kind, t.opcode, reset
            )
        } else {
            writeln!(
                out,
                "[{:02}:{:02}] {}{:<8} {}{}",
                t.line, t.col, colr, kind, t.opcode, reset
            )
        }
    }

    fn kind(&self, opcode: &Opcode) -> &'static str {
        use Opcode as O;

        match opcode {
            O::Right | O::Left | O::ReturnToStart => "CURSOR",
            O::Increase | O::Decrease | O::Reset | O::Random => "CELL",
            O::Write | O::Read | O::ReturnValue | O::Swap | O::Flush => "REGISTER",
            O::PrintNumber | O::PrintChar | O::Pause | O::Newline | O::Sleep | O::Recycle => "IO",
            O::LoopOpen | O::Positive | O::Negative | O::Equals | O::NotEquals => "LOOP",
            O::FunctionDeclare | O::FunctionEnd | O::FunctionCall(_) => "FUNCTION",
            O::Comment => "COMMENT",
        }
    }

    fn color(&self, opcode: &Opcode) -> &'static str {
        match self.kind(opcode) {
            "COMMENT" => Self::DIM,
            "IO" => Self::GRN,
            "LOOP" => Self::MAG,
            "FUNCTION" => Self::YEL,
            "REGISTER" => Self::CYN,
            _ => Self::RESET,
        }
    }
}
