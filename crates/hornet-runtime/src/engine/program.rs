//! Clause database and term templates
//!
//! Parsed clauses are compiled into [`Code`] templates whose variables are
//! numbered per clause. Each call instantiates a fresh copy on the heap.

use super::heap::{Atom, Machine};
use super::symbols::{Sym, Symbols};
use crate::ast::{self, Term};
use std::collections::HashMap;

/// Predicate key: functor and arity
pub(crate) type Key = (Sym, usize);

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Code {
    Atom(Atom),
    Var(usize),
    Compound(Sym, Vec<Code>),
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledClause {
    pub(crate) head: Code,
    pub(crate) body: Vec<Code>,
    pub(crate) var_count: usize,
}

/// Clauses grouped by predicate, in source order
#[derive(Debug, Default)]
pub(crate) struct Database {
    groups: HashMap<Key, Vec<CompiledClause>>,
}

impl Database {
    pub(crate) fn compile(program: &ast::Program, symbols: &mut Symbols) -> Self {
        let mut groups: HashMap<Key, Vec<CompiledClause>> = HashMap::new();
        for clause in &program.clauses {
            let mut compiler = Compiler::new(symbols);
            let head = compiler.term(&clause.head);
            let body = clause.body.iter().map(|goal| compiler.term(goal)).collect();
            let key = match &head {
                Code::Compound(functor, args) => (*functor, args.len()),
                Code::Atom(Atom::Symbol(name)) => (*name, 0),
                // Parser only admits atom and compound heads
                _ => continue,
            };
            groups.entry(key).or_default().push(CompiledClause {
                head,
                body,
                var_count: compiler.count(),
            });
        }
        Self { groups }
    }

    pub(crate) fn clauses(&self, key: Key) -> Option<&[CompiledClause]> {
        self.groups.get(&key).map(Vec::as_slice)
    }

    pub(crate) fn predicate_count(&self) -> usize {
        self.groups.len()
    }
}

/// A compiled query with its reportable variables
#[derive(Debug, Clone)]
pub(crate) struct CompiledQuery {
    pub(crate) goals: Vec<Code>,
    pub(crate) var_count: usize,
    /// Named variables in first-occurrence order; `_`-prefixed names are omitted
    pub(crate) reported: Vec<(String, usize)>,
}

impl CompiledQuery {
    pub(crate) fn compile(query: &ast::Query, symbols: &mut Symbols) -> Self {
        let mut compiler = Compiler::new(symbols);
        let goals = query.goals.iter().map(|goal| compiler.term(goal)).collect();
        let reported = compiler
            .named
            .iter()
            .filter(|(name, _)| !name.starts_with('_'))
            .cloned()
            .collect();
        Self {
            goals,
            var_count: compiler.count(),
            reported,
        }
    }
}

struct Compiler<'s> {
    symbols: &'s mut Symbols,
    named: Vec<(String, usize)>,
    lookup: HashMap<String, usize>,
    count: usize,
}

impl<'s> Compiler<'s> {
    fn new(symbols: &'s mut Symbols) -> Self {
        Self {
            symbols,
            named: Vec::new(),
            lookup: HashMap::new(),
            count: 0,
        }
    }

    fn count(&self) -> usize {
        self.count
    }

    fn fresh(&mut self) -> usize {
        self.count += 1;
        self.count - 1
    }

    fn term(&mut self, term: &Term) -> Code {
        match term {
            Term::Atom(name) => Code::Atom(Atom::Symbol(self.symbols.intern(name))),
            Term::Integer(n) => Code::Atom(Atom::Integer(*n)),
            Term::Float(x) => Code::Atom(Atom::Float(*x)),
            Term::Variable(name) if name == "_" => Code::Var(self.fresh()),
            Term::Variable(name) => {
                if let Some(&slot) = self.lookup.get(name) {
                    return Code::Var(slot);
                }
                let slot = self.fresh();
                self.lookup.insert(name.clone(), slot);
                self.named.push((name.clone(), slot));
                Code::Var(slot)
            }
            Term::Compound { functor, args } => {
                let functor = self.symbols.intern(functor);
                Code::Compound(functor, args.iter().map(|arg| self.term(arg)).collect())
            }
        }
    }
}

impl Machine {
    /// Build a fresh heap copy of `code`; `slots` maps template variables to cells
    pub(crate) fn instantiate(&mut self, code: &Code, slots: &mut [Option<usize>]) -> usize {
        match code {
            Code::Atom(atom) => self.new_atom(*atom),
            Code::Var(slot) => match slots[*slot] {
                Some(cell) => cell,
                None => {
                    let cell = self.new_var();
                    slots[*slot] = Some(cell);
                    cell
                }
            },
            Code::Compound(functor, args) => {
                let args = args.iter().map(|arg| self.instantiate(arg, slots)).collect();
                self.new_compound(*functor, args)
            }
        }
    }
}
