//! # tapir
//!
//! Interpreter for a small tape language. Single-character opcodes move a
//! cursor over a growable tape of integer cells, with loops closed by an exit
//! condition and up to nine numbered functions that each run on a fresh tape.
//!
//! ```text
//! source --Lexer--> tokens --Parser--> Program --VM--> output
//! ```

pub mod frontend;
pub mod lang;
pub mod runtime;

pub use frontend::parser_error::{ParseErrorKind, ParserError};
pub use frontend::token::{FunctionId, Opcode, Token};
pub use lang::expr::{Block, ExitCondition, Expr};
pub use lang::program::{DecodeError, Program};
pub use runtime::context::Context;
pub use runtime::frame::Frame;
pub use runtime::host::{BufferedHost, Host, StdHost};
pub use runtime::runtime_error::{Diagnostic, RuntimeError, RuntimeErrorKind};
pub use runtime::vm::{VM, VMConfig};

/// Tokenizes and parses `source`.
pub fn parse_source(source: &str) -> Result<Program, ParserError> {
    let tokens = frontend::lexer::tokenize(source);
    frontend::parser::parse(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> (String, Vec<Diagnostic>) {
        let program = parse_source(source).unwrap();
        let mut vm = VM::with_host(BufferedHost::new());
        vm.run(&program).unwrap();
        let diagnostics = vm.take_diagnostics();
        (vm.into_host().output, diagnostics)
    }

    #[test]
    fn test_end_to_end_with_comments_and_layout() {
        let source = "/ print 2 then count down /\n\
                      ^^ ,N\n\
                      ? v , = / stops at zero /\n";
        let (output, diagnostics) = run(source);
        assert_eq!(output, "2\n10");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_parse_errors_surface_before_running() {
        let err = parse_source("^^\n?v").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedLoop);
        assert_eq!((err.line, err.col), (2, 1));
    }

    #[test]
    fn test_encoded_program_runs_the_same() {
        let program = parse_source("F1^^E^1@,").unwrap();
        let decoded = Program::from_bytes(&program.to_bytes().unwrap()).unwrap();

        let mut vm = VM::with_host(BufferedHost::new());
        vm.run(&decoded).unwrap();
        assert_eq!(vm.host().output, "3");
    }

    #[test]
    fn test_soft_faults_are_returned() {
        let (output, diagnostics) = run("F1^EF1E 3 1@,");
        assert_eq!(output, "1");
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::DuplicateFunction(FunctionId::new(1).unwrap()),
                Diagnostic::UndefinedFunction(FunctionId::new(3).unwrap()),
            ]
        );
    }
}
