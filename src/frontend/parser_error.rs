use thiserror::Error;

/// The structural problem that stopped parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("function declared without an identifier")]
    MissingFunctionId,
    #[error("function declared with invalid identifier '{0}', expected a digit 1-9")]
    InvalidFunctionId(char),
    #[error("function declarations are not allowed within a function")]
    NestedFunction,
    #[error("input ended before the end of the function")]
    UnterminatedFunction,
    #[error("input ended before the end of the loop")]
    UnterminatedLoop,
    #[error("loops nested deeper than {0} levels")]
    NestingTooDeep(usize),
    #[error("loop condition '{0}' without a matching loop")]
    UnmatchedCondition(char),
    #[error("function end without a matching declaration")]
    UnmatchedFunctionEnd,
}

/// A parsing error with source location.
///
/// `line` and `col` are 1-based and point at the offending token. Errors caused
/// by running out of input point at the token that opened the unfinished
/// construct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{col}: {kind}")]
pub struct ParserError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub col: usize,
}
