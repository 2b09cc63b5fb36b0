//! Source text to syntax tree: tokenizer, structural parser and the token
//! dumper used by the command line.

pub mod lexer;
pub mod parser;
pub mod parser_error;
pub mod token;
pub mod token_dumper;
