use crate::frontend::token::FunctionId;
use thiserror::Error;

/// A fault that aborts the whole run.
#[derive(Debug, Error)]
pub enum RuntimeErrorKind {
    #[error("cursor moved to negative position {0}")]
    NegativeCursor(i64),
    #[error("attempted to pop the root frame")]
    RootFrameUnderflow,
    #[error("cell value {0} is not a valid character")]
    InvalidCodePoint(i64),
    #[error("cannot sleep for a negative duration ({0})")]
    NegativeSleep(i64),
    #[error("cell value overflowed")]
    CellOverflow,
    #[error("cursor moved past the largest tape position")]
    CursorOverflow,
    #[error("call depth limit exceeded ({0}) - possible infinite recursion")]
    CallDepthExceeded(usize),
    #[error("execution step limit exceeded ({0})")]
    StepLimitExceeded(usize),
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

/// A fatal runtime fault plus the functions it unwound through, innermost
/// first.
#[derive(Debug)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub call_stack: Vec<FunctionId>,
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "runtime error: {}", self.kind)?;

        if !self.call_stack.is_empty() {
            write!(f, "\n  call stack:")?;

            // Runs of the same id (deep recursion) are folded into one line.
            let mut frames = self.call_stack.iter().rev().peekable();
            let mut i = 0;
            while let Some(id) = frames.next() {
                let mut repeats = 1;
                while frames.next_if_eq(&id).is_some() {
                    repeats += 1;
                }
                write!(f, "\n    {}: function {}", i, id)?;
                if repeats > 1 {
                    write!(f, " (x{})", repeats)?;
                }
                i += repeats;
            }
        }
        Ok(())
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind) -> Self {
        RuntimeError {
            kind,
            call_stack: Vec::new(),
        }
    }

    pub fn with_context(mut self, id: FunctionId) -> Self {
        self.call_stack.push(id);
        self
    }
}

impl From<RuntimeErrorKind> for RuntimeError {
    fn from(kind: RuntimeErrorKind) -> Self {
        RuntimeError::new(kind)
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        RuntimeError::new(RuntimeErrorKind::Io(err))
    }
}

/// A fault that is reported but does not stop execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("function {0} is already declared; keeping the first declaration")]
    DuplicateFunction(FunctionId),
    #[error("function {0} is not declared")]
    UndefinedFunction(FunctionId),
}
