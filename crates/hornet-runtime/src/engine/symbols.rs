//! Atom name interning

use std::collections::HashMap;

/// Interned atom or functor name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Sym(u32);

/// Names the engine refers to directly, interned in this order by every table
const PREDEFINED: &[&str] = &[
    "[]", ".", "!", "true", "fail", "false", "=", "\\=", "is", "<", ">", "=<", ">=", "=:=",
    "=\\=", "+", "-", "*", "/", "//", "mod", "integer", "float", "number", "atom", "var",
    "nonvar", "compound", "statistics", "memory", "allocated",
];

pub(crate) const NIL: Sym = Sym(0);
pub(crate) const DOT: Sym = Sym(1);
pub(crate) const CUT: Sym = Sym(2);
pub(crate) const TRUE: Sym = Sym(3);
pub(crate) const FAIL: Sym = Sym(4);
pub(crate) const FALSE: Sym = Sym(5);
pub(crate) const UNIFY: Sym = Sym(6);
pub(crate) const NOT_UNIFY: Sym = Sym(7);
pub(crate) const IS: Sym = Sym(8);
pub(crate) const LT: Sym = Sym(9);
pub(crate) const GT: Sym = Sym(10);
pub(crate) const LE: Sym = Sym(11);
pub(crate) const GE: Sym = Sym(12);
pub(crate) const NUM_EQ: Sym = Sym(13);
pub(crate) const NUM_NE: Sym = Sym(14);
pub(crate) const PLUS: Sym = Sym(15);
pub(crate) const MINUS: Sym = Sym(16);
pub(crate) const TIMES: Sym = Sym(17);
pub(crate) const DIVIDE: Sym = Sym(18);
pub(crate) const INT_DIVIDE: Sym = Sym(19);
pub(crate) const MOD: Sym = Sym(20);
pub(crate) const INTEGER: Sym = Sym(21);
pub(crate) const FLOAT: Sym = Sym(22);
pub(crate) const NUMBER: Sym = Sym(23);
pub(crate) const ATOM: Sym = Sym(24);
pub(crate) const VAR: Sym = Sym(25);
pub(crate) const NONVAR: Sym = Sym(26);
pub(crate) const COMPOUND: Sym = Sym(27);
pub(crate) const STATISTICS: Sym = Sym(28);
pub(crate) const MEMORY: Sym = Sym(29);
pub(crate) const ALLOCATED: Sym = Sym(30);

/// Bidirectional name table
#[derive(Debug, Clone)]
pub(crate) struct Symbols {
    names: Vec<String>,
    index: HashMap<String, Sym>,
}

impl Symbols {
    pub(crate) fn new() -> Self {
        let mut symbols = Self {
            names: Vec::with_capacity(PREDEFINED.len()),
            index: HashMap::with_capacity(PREDEFINED.len()),
        };
        for name in PREDEFINED {
            symbols.intern(name);
        }
        symbols
    }

    pub(crate) fn intern(&mut self, name: &str) -> Sym {
        if let Some(&sym) = self.index.get(name) {
            return sym;
        }
        let sym = Sym(self.names.len() as u32);
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), sym);
        sym
    }

    pub(crate) fn name(&self, sym: Sym) -> &str {
        &self.names[sym.0 as usize]
    }
}

impl Default for Symbols {
    fn default() -> Self {
        Self::new()
    }
}
