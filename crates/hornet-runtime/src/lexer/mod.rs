//! Lexical analysis (tokenization)
//!
//! The lexer converts program and query text into a stream of tokens with
//! character spans. It stops at the first invalid character.

mod literals;

use crate::diagnostic::Diagnostic;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Characters that glue together into symbolic atoms such as `=<` or `:-`
const SYMBOL_CHARS: &[char] = &['+', '-', '*', '/', '\\', '<', '>', '=', ':', '.'];

/// Lexer state for tokenizing source text
pub struct Lexer {
    /// Original source text
    source: String,
    /// Characters of the source
    chars: Vec<char>,
    /// Current position in chars
    current: usize,
    /// Start position of current token
    start_pos: usize,
}

impl Lexer {
    /// Create a new lexer for the given source text
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let chars: Vec<char> = source.chars().collect();
        Self {
            source,
            chars,
            current: 0,
            start_pos: 0,
        }
    }

    /// Tokenize the whole source; the last token is always `Eof`
    pub fn tokenize(&mut self) -> Result<Vec<Token>, Diagnostic> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    /// Scan the next token
    fn next_token(&mut self) -> Result<Token, Diagnostic> {
        self.skip_whitespace_and_comments()?;
        self.start_pos = self.current;

        if self.is_at_end() {
            return Ok(self.make_token(TokenKind::Eof, ""));
        }

        let c = self.advance();
        let token = match c {
            '(' => self.make_token(TokenKind::LeftParen, "("),
            ')' => self.make_token(TokenKind::RightParen, ")"),
            '[' => self.make_token(TokenKind::LeftBracket, "["),
            ']' => self.make_token(TokenKind::RightBracket, "]"),
            ',' => self.make_token(TokenKind::Comma, ","),
            '|' => self.make_token(TokenKind::Bar, "|"),
            '!' => self.make_token(TokenKind::Atom, "!"),
            ';' => self.make_token(TokenKind::Atom, ";"),
            '\'' => self.quoted('\'', TokenKind::QuotedAtom)?,
            '"' => self.quoted('"', TokenKind::String)?,
            '.' if self.at_clause_end() => self.make_token(TokenKind::End, "."),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.name(c),
            c if SYMBOL_CHARS.contains(&c) => self.symbol_run(),
            _ => return Err(self.error_at(self.start_pos, "Invalid token")),
        };
        Ok(token)
    }

    /// A `.` ends a clause when followed by layout, a comment, or end of input
    fn at_clause_end(&self) -> bool {
        match self.chars.get(self.current) {
            None => true,
            Some(c) => c.is_whitespace() || *c == '%',
        }
    }

    /// Skip whitespace, `%` line comments and `/* */` block comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), Diagnostic> {
        while !self.is_at_end() {
            match self.peek() {
                c if c.is_whitespace() => {
                    self.advance();
                }
                '%' => {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                }
                '/' if self.peek_next() == Some('*') => {
                    let open = self.current;
                    self.advance();
                    self.advance();
                    loop {
                        if self.is_at_end() {
                            return Err(self.error_at(open, "Unterminated block comment"));
                        }
                        if self.peek() == '*' && self.peek_next() == Some('/') {
                            self.advance();
                            self.advance();
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn symbol_run(&mut self) -> Token {
        while !self.is_at_end() && SYMBOL_CHARS.contains(&self.peek()) {
            self.advance();
        }
        let lexeme: String = self.chars[self.start_pos..self.current].iter().collect();
        self.make_token(TokenKind::Atom, &lexeme)
    }

    pub(super) fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        c
    }

    pub(super) fn peek(&self) -> char {
        self.chars.get(self.current).copied().unwrap_or('\0')
    }

    pub(super) fn peek_next(&self) -> Option<char> {
        self.chars.get(self.current + 1).copied()
    }

    pub(super) fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    pub(super) fn make_token(&self, kind: TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme, Span::new(self.start_pos, self.current))
    }

    pub(super) fn error_at(&self, offset: usize, message: &str) -> Diagnostic {
        Diagnostic::at(&self.source, offset, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn lexemes(source: &str) -> Vec<String> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.lexeme)
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("  % only a comment\n"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_fact() {
        assert_eq!(
            kinds("parent(tom, Bob)."),
            vec![
                TokenKind::Atom,
                TokenKind::LeftParen,
                TokenKind::Atom,
                TokenKind::Comma,
                TokenKind::Variable,
                TokenKind::RightParen,
                TokenKind::End,
                TokenKind::Eof,
            ]
        );
    }

    #[rstest]
    #[case("a :- b.", vec![":-"])]
    #[case("X =< Y.", vec!["=<"])]
    #[case("X =\\= Y.", vec!["=\\="])]
    #[case("X // 2.", vec!["//"])]
    fn test_symbol_runs(#[case] source: &str, #[case] expected: Vec<&str>) {
        let symbols: Vec<String> = Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .filter(|t| t.kind == TokenKind::Atom && !t.lexeme.chars().all(char::is_alphanumeric))
            .map(|t| t.lexeme)
            .collect();
        assert_eq!(symbols, expected);
    }

    #[test]
    fn test_end_requires_layout() {
        // `.` glued to another symbol is part of an atom, not a clause end
        assert_eq!(lexemes("X = '.'."), vec!["X", "=", ".", ".", ""]);
        assert_eq!(
            kinds("a.b."),
            vec![
                TokenKind::Atom,
                TokenKind::Atom,
                TokenKind::Atom,
                TokenKind::End,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_block_comment() {
        assert_eq!(lexemes("a /* skip\nme */ b"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = Lexer::new("a. /* never").tokenize().unwrap_err();
        assert_eq!(err.message, "Unterminated block comment");
        assert_eq!(err.location.unwrap().offset, 3);
    }

    #[test]
    fn test_invalid_token_location() {
        let err = Lexer::new("ok.\nfoo(@).").tokenize().unwrap_err();
        assert_eq!(err.message, "Invalid token");
        let location = err.location.unwrap();
        assert_eq!((location.offset, location.line, location.column), (8, 2, 5));
    }

    #[test]
    fn test_spans_are_character_offsets() {
        let tokens = Lexer::new("ab(Cd)").tokenize().unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 2));
        assert_eq!(tokens[2].span, Span::new(3, 5));
        assert!(tokens[0].span.touches(tokens[1].span));
    }
}
