use crate::frontend::token::FunctionId;
use crate::lang::expr::Block;
use crate::runtime::frame::Frame;
use crate::runtime::runtime_error::{Diagnostic, RuntimeError, RuntimeErrorKind};
use std::collections::HashMap;
use tracing::trace;

/// Mutable machine state for one run: the call stack and the function table.
///
/// The call stack always holds at least the root frame. Function bodies are
/// borrowed from the program being run.
#[derive(Debug)]
pub struct Context<'p> {
    frames: Vec<Frame>,
    functions: HashMap<FunctionId, &'p Block>,
}

impl Default for Context<'_> {
    fn default() -> Self {
        Context::new()
    }
}

impl<'p> Context<'p> {
    pub fn new() -> Self {
        Context {
            frames: vec![Frame::new(0)],
            functions: HashMap::new(),
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn current_frame(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    pub fn current_frame_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Registers `body` under `id`. The first registration wins.
    pub fn register(&mut self, id: FunctionId, body: &'p Block) -> Result<(), Diagnostic> {
        if self.functions.contains_key(&id) {
            return Err(Diagnostic::DuplicateFunction(id));
        }
        self.functions.insert(id, body);
        Ok(())
    }

    pub fn function(&self, id: FunctionId) -> Option<&'p Block> {
        self.functions.get(&id).copied()
    }

    /// Pushes a frame seeded with the caller's current cell.
    pub fn push_frame(&mut self) {
        let value = self.current_frame_mut().cell();
        self.frames.push(Frame::new(value));
        trace!(depth = self.frames.len(), value, "push frame");
    }

    /// Pops the current frame and hands its current cell to the caller's
    /// return register.
    pub fn pop_frame(&mut self) -> Result<(), RuntimeError> {
        if self.frames.len() <= 1 {
            return Err(RuntimeErrorKind::RootFrameUnderflow.into());
        }
        let value = self.current_frame_mut().cell();
        self.frames.pop();
        self.current_frame_mut().set_return_register(value);
        trace!(depth = self.frames.len(), value, "pop frame");
        Ok(())
    }
}
