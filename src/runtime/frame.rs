use crate::runtime::runtime_error::{RuntimeError, RuntimeErrorKind};

/// One tape with its cursor and two registers.
///
/// The tape grows rightward with zero cells whenever the cursor is read or
/// written past its end, so `tape.len() > current` holds after every cell
/// access. The cursor can never go below zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    tape: Vec<i64>,
    current: usize,
    memory: i64,
    return_register: i64,
}

impl Default for Frame {
    fn default() -> Self {
        Frame::new(0)
    }
}

impl Frame {
    /// A frame whose single cell holds `value`.
    pub fn new(value: i64) -> Self {
        Frame {
            tape: vec![value],
            current: 0,
            memory: 0,
            return_register: 0,
        }
    }

    pub fn tape(&self) -> &[i64] {
        &self.tape
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn memory(&self) -> i64 {
        self.memory
    }

    pub fn return_register(&self) -> i64 {
        self.return_register
    }

    pub(crate) fn set_return_register(&mut self, value: i64) {
        self.return_register = value;
    }

    fn ensure_current(&mut self) {
        if self.tape.len() <= self.current {
            self.tape.resize(self.current + 1, 0);
        }
    }

    pub fn cell(&mut self) -> i64 {
        self.ensure_current();
        self.tape[self.current]
    }

    pub fn set_cell(&mut self, value: i64) {
        self.ensure_current();
        self.tape[self.current] = value;
    }

    pub fn move_pointer(&mut self, delta: i64) -> Result<(), RuntimeError> {
        let target = (self.current as i64)
            .checked_add(delta)
            .ok_or(RuntimeErrorKind::CursorOverflow)?;
        if target < 0 {
            return Err(RuntimeErrorKind::NegativeCursor(target).into());
        }
        self.current = target as usize;
        Ok(())
    }

    pub fn increment_cell(&mut self, delta: i64) -> Result<(), RuntimeError> {
        let value = self
            .cell()
            .checked_add(delta)
            .ok_or(RuntimeErrorKind::CellOverflow)?;
        self.set_cell(value);
        Ok(())
    }

    pub fn write(&mut self) {
        self.memory = self.cell();
    }

    pub fn read(&mut self) {
        let value = self.memory;
        self.set_cell(value);
    }

    pub fn read_return(&mut self) {
        let value = self.return_register;
        self.set_cell(value);
    }

    pub fn swap(&mut self) {
        let cell = self.cell();
        self.set_cell(self.memory);
        self.memory = cell;
    }

    pub fn flush(&mut self) {
        *self = Frame::new(0);
    }

    pub fn return_to_start(&mut self) {
        self.current = 0;
    }
}
