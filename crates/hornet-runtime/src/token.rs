//! Token types for lexical analysis

use crate::span::Span;

/// Token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// Source text of the token (unquoted for quoted atoms and strings)
    pub lexeme: String,
    /// Source location
    pub span: Span,
}

impl Token {
    /// Create a new token
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    /// True when this token may begin a term
    pub fn starts_term(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Atom
                | TokenKind::QuotedAtom
                | TokenKind::Variable
                | TokenKind::Integer
                | TokenKind::Float
                | TokenKind::String
                | TokenKind::LeftParen
                | TokenKind::LeftBracket
        )
    }
}

/// Classification of token types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Names
    /// Lowercase identifier, symbol run, or solo character (`!`, `;`)
    Atom,
    /// `'quoted atom'`; never treated as an operator
    QuotedAtom,
    /// Uppercase or underscore identifier
    Variable,

    // Literals
    /// Integer literal (42)
    Integer,
    /// Float literal (3.14, 1.0e3)
    Float,
    /// `"double quoted"` text, read as an atom
    String,

    // Punctuation
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `,`
    Comma,
    /// `|`
    Bar,
    /// Clause-terminating `.`
    End,

    // Special
    /// End of file
    Eof,
}

impl TokenKind {
    /// Human-readable token name for diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Atom | TokenKind::QuotedAtom => "atom",
            TokenKind::Variable => "variable",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Bar => "|",
            TokenKind::End => ".",
            TokenKind::Eof => "end of file",
        }
    }
}
