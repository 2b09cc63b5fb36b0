//! Execution engine: frames, the call stack, the host boundary and the
//! tree-walking VM.

pub mod context;
pub mod frame;
pub mod host;
pub mod runtime_error;
pub mod vm;
