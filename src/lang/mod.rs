//! # Abstract Syntax Tree
//!
//! The tree produced by the parser and walked by the VM. Nodes are plain data:
//! evaluation lives in `runtime::vm`.

pub mod expr;
pub mod program;
