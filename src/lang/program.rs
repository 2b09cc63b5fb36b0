use super::expr::Expr;
use crate::frontend::parser::MAX_LOOP_NESTING;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Postcard(#[from] postcard::Error),
    #[error("program nests {0} levels deep, more than the parser allows")]
    TooDeep(usize),
}

/// A parsed program: the top-level expressions in source order.
///
/// Function declarations are ordinary expressions here; they register their
/// body when the VM reaches them, not before.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub expressions: Vec<Expr>,
}

impl Program {
    pub fn new(expressions: Vec<Expr>) -> Self {
        Program { expressions }
    }

    /// Encodes the tree with postcard so it can be run later without the
    /// source text.
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    /// Decodes a program written by `to_bytes`. Trees nested deeper than the
    /// parser would accept are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let program: Program = postcard::from_bytes(bytes)?;
        let depth = program.depth();
        if depth > MAX_LOOP_NESTING {
            return Err(DecodeError::TooDeep(depth));
        }
        Ok(program)
    }

    /// Deepest level of nested blocks, loops and declarations; 0 for a flat
    /// program.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending: Vec<(&[Expr], usize)> = vec![(self.expressions.as_slice(), 0)];

        while let Some((exprs, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            for body in exprs.iter().filter_map(Expr::body) {
                pending.push((body.exprs(), depth + 1));
            }
        }
        deepest
    }
}
