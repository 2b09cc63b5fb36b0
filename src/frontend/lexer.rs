use crate::frontend::token::{Opcode, Token};

/// Converts source text into opcode tokens.
///
/// Tokenizing never fails: characters without an opcode are skipped. Text
/// between two `/` on the same line is a comment and produces no tokens; a
/// newline always closes an open comment.
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    in_comment: bool,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            in_comment: false,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current();
        if ch == Some('\n') {
            self.line += 1;
            self.col = 1;
            self.in_comment = false;
        } else {
            self.col += 1;
        }
        self.pos += 1;
        ch
    }

    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.current() {
            let (line, col) = (self.line, self.col);
            self.advance();

            let Some(opcode) = Opcode::from_char(ch) else {
                continue;
            };

            if opcode == Opcode::Comment {
                self.in_comment = !self.in_comment;
                continue;
            }

            if !self.in_comment {
                tokens.push(Token { line, col, opcode });
            }
        }

        tokens
    }
}

/// Shorthand for `Lexer::new(source).tokenize()`.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::token::FunctionId;

    fn opcodes(source: &str) -> Vec<Opcode> {
        tokenize(source).into_iter().map(|t| t.opcode).collect()
    }

    fn call(id: u8) -> Opcode {
        Opcode::FunctionCall(FunctionId::new(id).unwrap())
    }

    #[test]
    fn test_simple_program() {
        assert_eq!(
            opcodes("^^>v,"),
            vec![
                Opcode::Increase,
                Opcode::Increase,
                Opcode::Right,
                Opcode::Decrease,
                Opcode::PrintNumber
            ]
        );
    }

    #[test]
    fn test_empty_and_unknown_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("hello world\n\t #").is_empty());
    }

    #[test]
    fn test_digits_are_calls_and_zero_is_reset() {
        assert_eq!(
            opcodes("0159"),
            vec![Opcode::Reset, call(1), call(5), call(9)]
        );
    }

    #[test]
    fn test_function_tokens() {
        assert_eq!(
            opcodes("F3^E3"),
            vec![
                Opcode::FunctionDeclare,
                call(3),
                Opcode::Increase,
                Opcode::FunctionEnd,
                call(3)
            ]
        );
    }

    #[test]
    fn test_comment_is_skipped() {
        assert_eq!(
            opcodes("^/ this is ^^^ ignored /v"),
            vec![Opcode::Increase, Opcode::Decrease]
        );
    }

    #[test]
    fn test_newline_closes_comment() {
        assert_eq!(
            opcodes("^/ open ^^\n^/ and again\nv"),
            vec![Opcode::Increase, Opcode::Increase, Opcode::Decrease]
        );
    }

    #[test]
    fn test_comment_in_the_middle_of_a_line_reopens() {
        assert_eq!(
            opcodes("/a/^/b/v/c"),
            vec![Opcode::Increase, Opcode::Decrease]
        );
    }

    #[test]
    fn test_spans_are_one_based() {
        let tokens = tokenize("^ v\n  ,\n.");
        let spans: Vec<(usize, usize)> = tokens.iter().map(|t| (t.line, t.col)).collect();
        assert_eq!(spans, vec![(1, 1), (1, 3), (2, 3), (3, 1)]);
    }

    #[test]
    fn test_spans_skip_comment_text() {
        let tokens = tokenize("/xx/>");
        assert_eq!(tokens.len(), 1);
        assert_eq!((tokens[0].line, tokens[0].col), (1, 5));
    }

    #[test]
    fn test_multibyte_chars_count_as_one_column() {
        let tokens = tokenize("é^");
        assert_eq!((tokens[0].line, tokens[0].col), (1, 2));
    }
}
