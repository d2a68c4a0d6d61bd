//! Term parsing (operator precedence)

use crate::ast::{Term, NIL};
use crate::diagnostic::Diagnostic;
use crate::parser::{Parser, ARG_PRIORITY, MAX_PRIORITY};
use crate::token::{Token, TokenKind};

/// Priority of prefix `-`
const NEGATION_PRIORITY: u16 = 200;

/// Operator associativity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Assoc {
    /// Neither side may hold an operator of equal priority
    Xfx,
    /// Right-associative
    Xfy,
    /// Left-associative
    Yfx,
}

/// Infix operator table
pub(super) fn infix_operator(name: &str) -> Option<(u16, Assoc)> {
    let entry = match name {
        ":-" => (1200, Assoc::Xfx),
        "," => (1000, Assoc::Xfy),
        "=" | "\\=" | "is" | "<" | ">" | "=<" | ">=" | "=:=" | "=\\=" => (700, Assoc::Xfx),
        "+" | "-" => (500, Assoc::Yfx),
        "*" | "/" | "//" | "mod" => (400, Assoc::Yfx),
        _ => return None,
    };
    Some(entry)
}

impl Parser {
    /// Parse a term whose principal operator has priority at most `max`
    pub(super) fn parse_term(&mut self, max: u16) -> Result<Term, Diagnostic> {
        let (mut left, mut left_priority) = self.parse_primary(max)?;

        while let Some((name, priority, assoc)) = self.peek_infix() {
            let (left_max, right_max) = match assoc {
                Assoc::Xfx => (priority - 1, priority - 1),
                Assoc::Xfy => (priority - 1, priority),
                Assoc::Yfx => (priority, priority - 1),
            };
            if priority > max || left_priority > left_max {
                break;
            }
            self.advance();
            let right = self.parse_term(right_max)?;
            left = Term::compound(name, vec![left, right]);
            left_priority = priority;
        }

        Ok(left)
    }

    fn peek_infix(&self) -> Option<(String, u16, Assoc)> {
        let token = self.peek();
        let name = match token.kind {
            TokenKind::Comma => ",",
            TokenKind::Atom => token.lexeme.as_str(),
            _ => return None,
        };
        infix_operator(name).map(|(priority, assoc)| (name.to_string(), priority, assoc))
    }

    /// Parse an operand, returning it with its own priority
    fn parse_primary(&mut self, max: u16) -> Result<(Term, u16), Diagnostic> {
        if !self.peek().starts_term() {
            return Err(self.unexpected_token());
        }

        let token = self.advance();
        let term = match token.kind {
            TokenKind::Integer => self.integer(&token)?,
            TokenKind::Float => self.float(&token.lexeme, &token)?,
            TokenKind::Variable => Term::Variable(token.lexeme),
            TokenKind::String => Term::Atom(token.lexeme),
            TokenKind::QuotedAtom => self.name_or_compound(token)?,
            TokenKind::Atom => return self.atom_operand(token, max),
            TokenKind::LeftParen => {
                let inner = self.parse_term(MAX_PRIORITY)?;
                self.consume(TokenKind::RightParen)?;
                inner
            }
            TokenKind::LeftBracket => self.list()?,
            _ => return Err(self.unexpected_token()),
        };
        Ok((term, 0))
    }

    /// An unquoted atom in operand position: call, negative literal, prefix minus or plain atom
    fn atom_operand(&mut self, token: Token, max: u16) -> Result<(Term, u16), Diagnostic> {
        let next = self.peek().clone();
        if next.kind == TokenKind::LeftParen && token.span.touches(next.span) {
            return Ok((self.name_or_compound(token)?, 0));
        }

        if token.lexeme == "-" {
            if token.span.touches(next.span) && matches!(next.kind, TokenKind::Integer | TokenKind::Float) {
                self.advance();
                let literal = format!("-{}", next.lexeme);
                let term = match next.kind {
                    TokenKind::Integer => self.integer(&Token::new(next.kind, literal, next.span))?,
                    _ => self.float(&literal, &next)?,
                };
                return Ok((term, 0));
            }
            if next.starts_term() && NEGATION_PRIORITY <= max {
                let operand = self.parse_term(NEGATION_PRIORITY)?;
                return Ok((Term::compound("-", vec![operand]), NEGATION_PRIORITY));
            }
        }

        Ok((Term::Atom(token.lexeme), 0))
    }

    /// `name` or `name(arg, ...)` when an opening parenthesis touches the name
    fn name_or_compound(&mut self, token: Token) -> Result<Term, Diagnostic> {
        let touching = self.check(TokenKind::LeftParen) && token.span.touches(self.peek().span);
        if !touching {
            return Ok(Term::Atom(token.lexeme));
        }
        self.advance();
        let mut args = vec![self.parse_term(ARG_PRIORITY)?];
        while self.check(TokenKind::Comma) {
            self.advance();
            args.push(self.parse_term(ARG_PRIORITY)?);
        }
        self.consume(TokenKind::RightParen)?;
        Ok(Term::compound(token.lexeme, args))
    }

    /// List after its opening `[`
    fn list(&mut self) -> Result<Term, Diagnostic> {
        if self.check(TokenKind::RightBracket) {
            self.advance();
            return Ok(Term::atom(NIL));
        }

        let mut items = vec![self.parse_term(ARG_PRIORITY)?];
        while self.check(TokenKind::Comma) {
            self.advance();
            items.push(self.parse_term(ARG_PRIORITY)?);
        }
        let tail = if self.check(TokenKind::Bar) {
            self.advance();
            self.parse_term(ARG_PRIORITY)?
        } else {
            Term::atom(NIL)
        };
        self.consume(TokenKind::RightBracket)?;
        Ok(Term::list(items, tail))
    }

    /// Integer literal; values beyond `i64` degrade to floats
    fn integer(&self, token: &Token) -> Result<Term, Diagnostic> {
        match token.lexeme.parse::<i64>() {
            Ok(n) => Ok(Term::Integer(n)),
            Err(_) => self.float(&token.lexeme, token),
        }
    }

    fn float(&self, text: &str, token: &Token) -> Result<Term, Diagnostic> {
        text.parse::<f64>().map(Term::Float).map_err(|_| {
            Diagnostic::at(
                &self.source,
                token.span.start,
                format!("Invalid number `{}`", text),
            )
        })
    }
}
