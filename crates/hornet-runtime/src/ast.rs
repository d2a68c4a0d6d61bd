//! Abstract syntax tree for programs and queries

use crate::span::Span;
use std::fmt;

/// Name of the empty list atom
pub const NIL: &str = "[]";
/// Functor of list cells
pub const DOT: &str = ".";

/// A parsed term
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Atom(String),
    Integer(i64),
    Float(f64),
    /// Named variable; `_` is anonymous and distinct at every occurrence
    Variable(String),
    Compound {
        functor: String,
        args: Vec<Term>,
    },
}

impl Term {
    pub fn atom(name: impl Into<String>) -> Self {
        Term::Atom(name.into())
    }

    pub fn compound(functor: impl Into<String>, args: Vec<Term>) -> Self {
        Term::Compound {
            functor: functor.into(),
            args,
        }
    }

    /// Build a list from `items` ending in `tail`
    pub fn list(items: Vec<Term>, tail: Term) -> Self {
        items
            .into_iter()
            .rev()
            .fold(tail, |acc, item| Term::compound(DOT, vec![item, acc]))
    }

    /// Name and arity, for atoms and compounds
    pub fn indicator(&self) -> Option<(&str, usize)> {
        match self {
            Term::Atom(name) => Some((name, 0)),
            Term::Compound { functor, args } => Some((functor, args.len())),
            _ => None,
        }
    }

    /// Split a `,`-conjunction into its goals
    pub fn into_conjuncts(self) -> Vec<Term> {
        let mut goals = Vec::new();
        let mut rest = self;
        loop {
            match rest {
                Term::Compound { functor, mut args } if functor == "," && args.len() == 2 => {
                    let right = args.pop().unwrap_or(Term::atom("true"));
                    let left = args.pop().unwrap_or(Term::atom("true"));
                    goals.extend(left.into_conjuncts());
                    rest = right;
                }
                goal => {
                    goals.push(goal);
                    return goals;
                }
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(name) | Term::Variable(name) => write!(f, "{}", name),
            Term::Integer(n) => write!(f, "{}", n),
            Term::Float(x) => write!(f, "{:?}", x),
            Term::Compound { functor, args } => {
                write!(f, "{}(", functor)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// `head :- body.`; facts have an empty body
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub head: Term,
    pub body: Vec<Term>,
    pub span: Span,
}

/// Sequence of clauses in source order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub clauses: Vec<Clause>,
}

/// A query: goals to prove left to right
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub goals: Vec<Term>,
    pub span: Span,
}
