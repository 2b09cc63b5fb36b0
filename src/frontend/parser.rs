use crate::frontend::parser_error::{ParseErrorKind, ParserError};
use crate::frontend::token::{Opcode, Token};
use crate::lang::expr::{Block, ExitCondition, Expr};
use crate::lang::program::Program;
use tracing::warn;

/// Single-pass structural parser.
///
/// Loops and function declarations are the only nested constructs and they
/// are resolved independently:
/// - `F<id> ... E` declares a function. Declarations are only recognised at
///   top level; inside a function body loop tokens have no meaning and become
///   `Expr::Nop`.
/// - `? ... <cond>` is a loop closed by one of `+ - = !`. Loops nest through an
///   explicit stack of open bodies; inside a loop body the function tokens
///   become `Expr::Nop`. At most `MAX_LOOP_NESTING` loops may be open at
///   once.
///
/// The first structural error aborts the parse.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    max_nesting: usize,
}

/// Default limit on how many loops may be open at once.
pub const MAX_LOOP_NESTING: usize = 128;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_max_nesting(tokens, MAX_LOOP_NESTING)
    }

    /// A parser that rejects programs with more than `max_nesting` loops open
    /// at once. The VM walks loops recursively, so this bounds its stack use.
    pub fn with_max_nesting(tokens: Vec<Token>, max_nesting: usize) -> Self {
        Parser {
            tokens,
            pos: 0,
            max_nesting,
        }
    }

    /// Consumes and returns the next token.
    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(kind: ParseErrorKind, at: &Token) -> ParserError {
        ParserError {
            kind,
            line: at.line,
            col: at.col,
        }
    }

    pub fn parse(&mut self) -> Result<Program, ParserError> {
        let mut expressions = Vec::new();

        while let Some(token) = self.advance() {
            match token.opcode {
                Opcode::FunctionDeclare => expressions.push(self.parse_function(token)?),
                Opcode::LoopOpen => expressions.push(self.parse_loop(token)?),
                Opcode::FunctionEnd => {
                    return Err(Self::error(ParseErrorKind::UnmatchedFunctionEnd, &token));
                }
                opcode if opcode.is_exit_condition() => {
                    return Err(Self::error(
                        ParseErrorKind::UnmatchedCondition(opcode.as_char()),
                        &token,
                    ));
                }
                opcode => expressions.push(Expr::from_opcode(opcode)),
            }
        }

        Ok(Program::new(expressions))
    }

    /// Parses `F<id> body E`; `declare` is the already consumed `F`.
    fn parse_function(&mut self, declare: Token) -> Result<Expr, ParserError> {
        let id = match self.advance() {
            Some(Token {
                opcode: Opcode::FunctionCall(id),
                ..
            }) => id,
            Some(other) => {
                return Err(Self::error(
                    ParseErrorKind::InvalidFunctionId(other.opcode.as_char()),
                    &other,
                ));
            }
            None => return Err(Self::error(ParseErrorKind::MissingFunctionId, &declare)),
        };

        let mut body = Block::new();

        while let Some(token) = self.advance() {
            match token.opcode {
                Opcode::FunctionEnd => return Ok(Expr::FunctionDecl { id, body }),
                Opcode::FunctionDeclare => {
                    return Err(Self::error(ParseErrorKind::NestedFunction, &token));
                }
                opcode => {
                    if opcode == Opcode::LoopOpen || opcode.is_exit_condition() {
                        warn!(
                            line = token.line,
                            col = token.col,
                            "loop token '{}' inside function {} has no effect",
                            opcode,
                            id
                        );
                    }
                    body.push(Expr::from_opcode(opcode));
                }
            }
        }

        Err(Self::error(ParseErrorKind::UnterminatedFunction, &declare))
    }

    /// Parses a loop and every loop nested in it; `open` is the consumed `?`.
    ///
    /// `body` is the innermost open loop, `outer` holds the enclosing ones.
    fn parse_loop(&mut self, mut open: Token) -> Result<Expr, ParserError> {
        let mut body = Block::new();
        let mut outer: Vec<(Token, Block)> = Vec::new();

        while let Some(token) = self.advance() {
            if token.opcode == Opcode::LoopOpen {
                if outer.len() + 1 >= self.max_nesting {
                    return Err(Self::error(
                        ParseErrorKind::NestingTooDeep(self.max_nesting),
                        &token,
                    ));
                }
                outer.push((open, std::mem::take(&mut body)));
                open = token;
                continue;
            }

            if let Some(condition) = ExitCondition::from_opcode(token.opcode) {
                let node = Expr::Loop {
                    condition,
                    body: std::mem::take(&mut body),
                };
                match outer.pop() {
                    Some((enclosing, block)) => {
                        open = enclosing;
                        body = block;
                        body.push(node);
                    }
                    None => return Ok(node),
                }
                continue;
            }

            if matches!(token.opcode, Opcode::FunctionDeclare | Opcode::FunctionEnd) {
                warn!(
                    line = token.line,
                    col = token.col,
                    "function token '{}' inside a loop has no effect",
                    token.opcode
                );
            }

            body.push(Expr::from_opcode(token.opcode));
        }

        Err(Self::error(ParseErrorKind::UnterminatedLoop, &open))
    }
}

/// Shorthand for `Parser::new(tokens).parse()`.
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParserError> {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::tokenize;
    use crate::frontend::token::FunctionId;
    use pretty_assertions::assert_eq;

    fn parse_src(source: &str) -> Program {
        parse(tokenize(source)).unwrap()
    }

    fn parse_err(source: &str) -> ParserError {
        parse(tokenize(source)).unwrap_err()
    }

    fn id(n: u8) -> FunctionId {
        FunctionId::new(n).unwrap()
    }

    #[test]
    fn test_flat_program() {
        let program = parse_src("^^>v,");
        assert_eq!(
            program.expressions,
            vec![
                Expr::IncrementCell(1),
                Expr::IncrementCell(1),
                Expr::MovePointer(1),
                Expr::IncrementCell(-1),
                Expr::PrintNumber,
            ]
        );
    }

    #[test]
    fn test_empty_source() {
        assert!(parse_src("").expressions.is_empty());
        assert!(parse_src("/ only a comment /").expressions.is_empty());
    }

    #[test]
    fn test_simple_loop() {
        let program = parse_src("^^^?v,=N");
        assert_eq!(
            program.expressions,
            vec![
                Expr::IncrementCell(1),
                Expr::IncrementCell(1),
                Expr::IncrementCell(1),
                Expr::Loop {
                    condition: ExitCondition::Equals,
                    body: Block::from(vec![Expr::IncrementCell(-1), Expr::PrintNumber]),
                },
                Expr::Newline,
            ]
        );
    }

    #[test]
    fn test_each_exit_condition() {
        for (source, condition) in [
            ("?+", ExitCondition::Positive),
            ("?-", ExitCondition::Negative),
            ("?=", ExitCondition::Equals),
            ("?!", ExitCondition::NotEquals),
        ] {
            assert_eq!(
                parse_src(source).expressions,
                vec![Expr::Loop {
                    condition,
                    body: Block::new(),
                }]
            );
        }
    }

    #[test]
    fn test_nested_loops() {
        let program = parse_src("?^?v=>!,");
        assert_eq!(
            program.expressions,
            vec![
                Expr::Loop {
                    condition: ExitCondition::NotEquals,
                    body: Block::from(vec![
                        Expr::IncrementCell(1),
                        Expr::Loop {
                            condition: ExitCondition::Equals,
                            body: Block::from(vec![Expr::IncrementCell(-1)]),
                        },
                        Expr::MovePointer(1),
                    ]),
                },
                Expr::PrintNumber,
            ]
        );
    }

    #[test]
    fn test_sibling_loops_at_top_level() {
        let program = parse_src("?^+?v-");
        assert_eq!(program.expressions.len(), 2);
        assert!(matches!(
            program.expressions[1],
            Expr::Loop {
                condition: ExitCondition::Negative,
                ..
            }
        ));
    }

    #[test]
    fn test_function_declaration() {
        let program = parse_src("F1^^E1,");
        assert_eq!(
            program.expressions,
            vec![
                Expr::FunctionDecl {
                    id: id(1),
                    body: Block::from(vec![Expr::IncrementCell(1), Expr::IncrementCell(1)]),
                },
                Expr::FunctionCall(id(1)),
                Expr::PrintNumber,
            ]
        );
    }

    #[test]
    fn test_function_body_may_call_functions() {
        let program = parse_src("F2^3E");
        assert_eq!(
            program.expressions,
            vec![Expr::FunctionDecl {
                id: id(2),
                body: Block::from(vec![Expr::IncrementCell(1), Expr::FunctionCall(id(3))]),
            }]
        );
    }

    #[test]
    fn test_loop_tokens_inside_function_are_nops() {
        let program = parse_src("F1?^=E");
        assert_eq!(
            program.expressions,
            vec![Expr::FunctionDecl {
                id: id(1),
                body: Block::from(vec![Expr::Nop, Expr::IncrementCell(1), Expr::Nop]),
            }]
        );
    }

    #[test]
    fn test_function_tokens_inside_loop_are_nops() {
        let program = parse_src("?F1E=");
        assert_eq!(
            program.expressions,
            vec![Expr::Loop {
                condition: ExitCondition::Equals,
                body: Block::from(vec![Expr::Nop, Expr::FunctionCall(id(1)), Expr::Nop]),
            }]
        );
    }

    #[test]
    fn test_condition_without_loop() {
        let err = parse_err("?+E?-E");
        assert_eq!(err.kind, ParseErrorKind::UnmatchedFunctionEnd);

        let err = parse_err("^+");
        assert_eq!(err.kind, ParseErrorKind::UnmatchedCondition('+'));
        assert_eq!((err.line, err.col), (1, 2));

        let err = parse_err("?^=!");
        assert_eq!(err.kind, ParseErrorKind::UnmatchedCondition('!'));
        assert_eq!((err.line, err.col), (1, 4));
    }

    #[test]
    fn test_end_without_declaration() {
        let err = parse_err("^\n  E");
        assert_eq!(err.kind, ParseErrorKind::UnmatchedFunctionEnd);
        assert_eq!((err.line, err.col), (2, 3));
    }

    #[test]
    fn test_missing_function_id() {
        let err = parse_err("^F");
        assert_eq!(err.kind, ParseErrorKind::MissingFunctionId);
        assert_eq!((err.line, err.col), (1, 2));
    }

    #[test]
    fn test_invalid_function_id() {
        let err = parse_err("F^E");
        assert_eq!(err.kind, ParseErrorKind::InvalidFunctionId('^'));
        assert_eq!((err.line, err.col), (1, 2));
    }

    #[test]
    fn test_nested_function() {
        let err = parse_err("F1^F2E");
        assert_eq!(err.kind, ParseErrorKind::NestedFunction);
        assert_eq!((err.line, err.col), (1, 4));
    }

    #[test]
    fn test_unterminated_function_points_at_declaration() {
        let err = parse_err("^^\nF3^^");
        assert_eq!(err.kind, ParseErrorKind::UnterminatedFunction);
        assert_eq!((err.line, err.col), (2, 1));
    }

    #[test]
    fn test_unterminated_loop_points_at_innermost_open() {
        let err = parse_err("?^?v=\n ?,");
        assert_eq!(err.kind, ParseErrorKind::UnterminatedLoop);
        assert_eq!((err.line, err.col), (2, 2));

        let err = parse_err("^?");
        assert_eq!(err.kind, ParseErrorKind::UnterminatedLoop);
        assert_eq!((err.line, err.col), (1, 2));
    }

    #[test]
    fn test_nesting_at_the_limit_parses() {
        let source = format!("{}{}", "?".repeat(4), "=".repeat(4));
        let program = Parser::with_max_nesting(tokenize(&source), 4)
            .parse()
            .unwrap();
        assert_eq!(program.expressions.len(), 1);
    }

    #[test]
    fn test_nesting_past_the_limit_is_rejected() {
        let source = format!("{}{}", "?".repeat(5), "=".repeat(5));
        let err = Parser::with_max_nesting(tokenize(&source), 4)
            .parse()
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NestingTooDeep(4));
        assert_eq!((err.line, err.col), (1, 5));
    }

    #[test]
    fn test_very_deep_nesting_fails_without_building_a_tree() {
        let depth = 200_000;
        let source = format!("^{}v{}", "?".repeat(depth), "=".repeat(depth));
        let err = parse_err(&source);
        assert_eq!(err.kind, ParseErrorKind::NestingTooDeep(MAX_LOOP_NESTING));
        assert_eq!((err.line, err.col), (1, MAX_LOOP_NESTING + 2));
    }

    #[test]
    fn test_sequential_loops_do_not_count_as_nesting() {
        let source = "?^=".repeat(MAX_LOOP_NESTING * 2);
        assert_eq!(parse_src(&source).expressions.len(), MAX_LOOP_NESTING * 2);
    }

    #[test]
    fn test_first_error_wins() {
        let err = parse_err("E ?");
        assert_eq!(err.kind, ParseErrorKind::UnmatchedFunctionEnd);
    }

    #[test]
    fn test_error_display() {
        let err = parse_err("\n\n  =");
        assert_eq!(
            err.to_string(),
            "3:3: loop condition '=' without a matching loop"
        );
    }
}
