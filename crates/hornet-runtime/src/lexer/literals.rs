//! Literal scanning for the lexer

use crate::diagnostic::Diagnostic;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

impl Lexer {
    /// Scan quoted text up to the matching `quote`
    ///
    /// A doubled quote stands for the quote character itself.
    pub(super) fn quoted(&mut self, quote: char, kind: TokenKind) -> Result<Token, Diagnostic> {
        let mut value = String::new();
        loop {
            if self.is_at_end() {
                let message = match kind {
                    TokenKind::String => "Unterminated string",
                    _ => "Unterminated quoted atom",
                };
                return Err(self.error_at(self.start_pos, message));
            }
            let c = self.advance();
            if c == quote {
                if self.peek() == quote && !self.is_at_end() {
                    self.advance();
                    value.push(quote);
                    continue;
                }
                break;
            }
            if c == '\\' {
                if self.is_at_end() {
                    continue;
                }
                let escaped = match self.advance() {
                    'n' => '\n',
                    't' => '\t',
                    '\\' => '\\',
                    '\'' => '\'',
                    '"' => '"',
                    other => {
                        return Err(self.error_at(
                            self.current - 2,
                            &format!("Invalid escape sequence '\\{}'", other),
                        ))
                    }
                };
                value.push(escaped);
                continue;
            }
            value.push(c);
        }
        Ok(self.make_token(kind, &value))
    }

    /// Scan an integer or float literal
    pub(super) fn number(&mut self) -> Token {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let mut kind = TokenKind::Integer;
        if self.peek() == '.' && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            kind = TokenKind::Float;
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }

            // Exponent only counts after a fraction, so `2e` stays `2` then `e`
            if matches!(self.peek(), 'e' | 'E') {
                let mark = self.current;
                self.advance();
                if matches!(self.peek(), '+' | '-') {
                    self.advance();
                }
                if self.peek().is_ascii_digit() {
                    while self.peek().is_ascii_digit() {
                        self.advance();
                    }
                } else {
                    self.current = mark;
                }
            }
        }

        let lexeme: String = self.chars[self.start_pos..self.current].iter().collect();
        self.make_token(kind, &lexeme)
    }

    /// Scan an atom or variable name starting with `first`
    pub(super) fn name(&mut self, first: char) -> Token {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }
        let lexeme: String = self.chars[self.start_pos..self.current].iter().collect();
        let kind = if first == '_' || first.is_uppercase() {
            TokenKind::Variable
        } else {
            TokenKind::Atom
        };
        self.make_token(kind, &lexeme)
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::Lexer;
    use crate::token::TokenKind;
    use rstest::rstest;

    fn first(source: &str) -> (TokenKind, String) {
        let tokens = Lexer::new(source).tokenize().unwrap();
        (tokens[0].kind, tokens[0].lexeme.clone())
    }

    #[rstest]
    #[case("42", TokenKind::Integer, "42")]
    #[case("3.14", TokenKind::Float, "3.14")]
    #[case("1.5e3", TokenKind::Float, "1.5e3")]
    #[case("2.0E-2", TokenKind::Float, "2.0E-2")]
    #[case("foo_Bar1", TokenKind::Atom, "foo_Bar1")]
    #[case("Foo", TokenKind::Variable, "Foo")]
    #[case("_", TokenKind::Variable, "_")]
    #[case("_tmp", TokenKind::Variable, "_tmp")]
    #[case("'hello world'", TokenKind::QuotedAtom, "hello world")]
    #[case("'it''s'", TokenKind::QuotedAtom, "it's")]
    #[case("\"text\\n\"", TokenKind::String, "text\n")]
    fn test_literals(#[case] source: &str, #[case] kind: TokenKind, #[case] lexeme: &str) {
        assert_eq!(first(source), (kind, lexeme.to_string()));
    }

    #[test]
    fn test_integer_before_clause_end() {
        let tokens = Lexer::new("x(3).").tokenize().unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Integer);
        assert_eq!(tokens[2].lexeme, "3");
        assert_eq!(tokens[4].kind, TokenKind::End);
    }

    #[test]
    fn test_unterminated_quoted_atom() {
        let err = Lexer::new("x('abc").tokenize().unwrap_err();
        assert_eq!(err.message, "Unterminated quoted atom");
        assert_eq!(err.location.unwrap().offset, 2);
    }

    #[test]
    fn test_invalid_escape() {
        let err = Lexer::new("'a\\q'").tokenize().unwrap_err();
        assert!(err.message.starts_with("Invalid escape sequence"));
    }
}
