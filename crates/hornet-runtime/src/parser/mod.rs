//! Parsing (tokens to AST)
//!
//! The parser converts the token stream of a program or a query into clauses
//! and goals. Terms are parsed with operator precedence (see `term.rs`);
//! clause structure is recursive descent. Parsing stops at the first error.

mod term;

use crate::ast::{Clause, Program, Query, Term};
use crate::diagnostic::Diagnostic;
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Highest operator priority; a whole clause is parsed at this level
pub(crate) const MAX_PRIORITY: u16 = 1200;
/// Priority of arguments and list elements, just below `,`
pub(crate) const ARG_PRIORITY: u16 = 999;

/// Parser state for building clauses from tokens
pub struct Parser {
    pub(super) source: String,
    pub(super) tokens: Vec<Token>,
    pub(super) current: usize,
}

impl Parser {
    /// Tokenize `source` and prepare to parse it
    pub fn new(source: &str) -> Result<Self, Diagnostic> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self {
            source: source.to_string(),
            tokens,
            current: 0,
        })
    }

    /// Parse a sequence of clauses
    pub fn parse_program(&mut self) -> Result<Program, Diagnostic> {
        let mut clauses = Vec::new();
        while !self.check(TokenKind::Eof) {
            clauses.push(self.parse_clause()?);
        }
        Ok(Program { clauses })
    }

    /// Parse a single query terminated by `.`
    pub fn parse_query(&mut self) -> Result<Query, Diagnostic> {
        let start = self.peek().span;
        if self.check(TokenKind::Eof) {
            return Err(self.unexpected_eof());
        }
        let term = self.parse_term(MAX_PRIORITY)?;
        let end = self.consume_end()?;
        if !self.check(TokenKind::Eof) {
            return Err(self.unexpected_token());
        }
        Ok(Query {
            goals: term.into_conjuncts(),
            span: start.merge(end),
        })
    }

    fn parse_clause(&mut self) -> Result<Clause, Diagnostic> {
        let start = self.peek().span;
        if self.peek().kind == TokenKind::Atom && self.peek().lexeme == ":-" {
            return Err(Diagnostic::at(
                &self.source,
                start.start,
                "Directives are not supported",
            ));
        }
        let term = self.parse_term(MAX_PRIORITY)?;
        let end = self.consume_end()?;
        let span = start.merge(end);

        let (head, body) = match term {
            Term::Compound { functor, mut args } if functor == ":-" && args.len() == 2 => {
                let body = args.pop().unwrap_or(Term::atom("true"));
                let head = args.pop().unwrap_or(Term::atom("true"));
                (head, body.into_conjuncts())
            }
            head => (head, Vec::new()),
        };

        if !matches!(head, Term::Atom(_) | Term::Compound { .. }) {
            return Err(Diagnostic::at(
                &self.source,
                start.start,
                format!("Invalid clause head `{}`", head),
            ));
        }

        Ok(Clause { head, body, span })
    }

    /// Consume the clause-terminating `.`
    fn consume_end(&mut self) -> Result<Span, Diagnostic> {
        match self.peek().kind {
            TokenKind::End => Ok(self.advance().span),
            TokenKind::Eof => Err(self.unexpected_eof()),
            _ => Err(self.unexpected_token()),
        }
    }

    // === Helpers ===

    pub(super) fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(super) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.current += 1;
        }
        token
    }

    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(super) fn consume(&mut self, kind: TokenKind) -> Result<Token, Diagnostic> {
        if self.check(kind) {
            Ok(self.advance())
        } else if self.check(TokenKind::Eof) {
            Err(self.unexpected_eof())
        } else {
            Err(self.unexpected_token())
        }
    }

    /// Error for the token under the cursor
    pub(super) fn unexpected_token(&self) -> Diagnostic {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            return self.unexpected_eof();
        }
        let text = match token.kind {
            TokenKind::QuotedAtom => format!("'{}'", token.lexeme),
            TokenKind::String => format!("\"{}\"", token.lexeme),
            _ => token.lexeme.clone(),
        };
        Diagnostic::at(
            &self.source,
            token.span.start,
            format!("Unexpected token `{}`", text),
        )
    }

    /// Error for running out of input, reported at the end of the last token
    pub(super) fn unexpected_eof(&self) -> Diagnostic {
        let offset = self
            .tokens
            .iter()
            .rev()
            .find(|t| t.kind != TokenKind::Eof)
            .map(|t| t.span.end)
            .unwrap_or(0);
        Diagnostic::at(
            &self.source,
            offset,
            "Unexpected end of file, did you forget a '.'?",
        )
    }
}

/// Parse program text into clauses
pub fn parse_program(source: &str) -> Result<Program, Diagnostic> {
    Parser::new(source)?.parse_program()
}

/// Parse query text into goals
pub fn parse_query(source: &str) -> Result<Query, Diagnostic> {
    Parser::new(source)?.parse_query()
}
