//! Term storage, binding and unification
//!
//! Terms live in a single growable arena of [`Cell`]s addressed by index.
//! An unbound variable is a `Ref` pointing at itself; binding overwrites it
//! with a `Ref` to another cell and records the variable on the trail.
//! Compound arguments are always allocated before their parent, so every
//! argument index is lower than the index of the compound holding it.

use super::symbols::{Sym, Symbols};
use serde::{Deserialize, Serialize};

/// Opaque reference to a term in a solver's heap
///
/// A handle is only meaningful for the solver that produced it, and only
/// until that solver backtracks past or collects the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TermHandle(pub(crate) usize);

impl TermHandle {
    /// Arena index of the referenced cell
    pub fn index(self) -> usize {
        self.0
    }
}

/// Constant stored in a cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Atom {
    Symbol(Sym),
    Integer(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Atom(Atom),
    /// Variable; unbound when it refers to its own index
    Ref(usize),
    Compound { functor: Sym, args: Box<[usize]> },
}

/// Heap, trail and symbol table of one solver
#[derive(Debug, Clone, Default)]
pub(crate) struct Machine {
    pub(crate) cells: Vec<Cell>,
    pub(crate) trail: Vec<usize>,
    pub(crate) symbols: Symbols,
}

impl Machine {
    pub(crate) fn new(symbols: Symbols) -> Self {
        Self {
            cells: Vec::new(),
            trail: Vec::new(),
            symbols,
        }
    }

    pub(crate) fn push(&mut self, cell: Cell) -> usize {
        self.cells.push(cell);
        self.cells.len() - 1
    }

    pub(crate) fn new_var(&mut self) -> usize {
        let index = self.cells.len();
        self.push(Cell::Ref(index))
    }

    pub(crate) fn new_atom(&mut self, atom: Atom) -> usize {
        self.push(Cell::Atom(atom))
    }

    pub(crate) fn new_compound(&mut self, functor: Sym, args: Vec<usize>) -> usize {
        self.push(Cell::Compound {
            functor,
            args: args.into_boxed_slice(),
        })
    }

    /// Follow variable bindings to the representative cell
    pub(crate) fn deref(&self, mut index: usize) -> usize {
        loop {
            match self.cells[index] {
                Cell::Ref(target) if target != index => index = target,
                _ => return index,
            }
        }
    }

    pub(crate) fn is_unbound(&self, index: usize) -> bool {
        matches!(self.cells[index], Cell::Ref(target) if target == index)
    }

    /// Bind unbound `var` to `value` and trail it
    pub(crate) fn bind(&mut self, var: usize, value: usize) {
        self.cells[var] = Cell::Ref(value);
        self.trail.push(var);
    }

    /// Reset bindings made since `trail_mark`
    pub(crate) fn undo_trail(&mut self, trail_mark: usize) {
        while self.trail.len() > trail_mark {
            if let Some(var) = self.trail.pop() {
                if var < self.cells.len() {
                    self.cells[var] = Cell::Ref(var);
                }
            }
        }
    }

    /// Reset bindings and discard cells allocated since the marks
    pub(crate) fn undo(&mut self, heap_mark: usize, trail_mark: usize) {
        self.undo_trail(trail_mark);
        self.cells.truncate(heap_mark);
    }

    /// Structural unification; on failure every binding it made is undone
    pub(crate) fn unify(&mut self, a: usize, b: usize) -> bool {
        let trail_mark = self.trail.len();
        let mut pending = vec![(a, b)];

        while let Some((a, b)) = pending.pop() {
            let a = self.deref(a);
            let b = self.deref(b);
            if a == b {
                continue;
            }
            match (self.is_unbound(a), self.is_unbound(b)) {
                // Younger variable points at the older one
                (true, true) if a > b => self.bind(a, b),
                (true, true) => self.bind(b, a),
                (true, false) => self.bind(a, b),
                (false, true) => self.bind(b, a),
                (false, false) => {
                    if !self.match_structure(a, b, &mut pending) {
                        self.undo_trail(trail_mark);
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Compare two non-variable cells, queueing argument pairs of matching compounds
    fn match_structure(&self, a: usize, b: usize, pending: &mut Vec<(usize, usize)>) -> bool {
        match (&self.cells[a], &self.cells[b]) {
            (Cell::Atom(x), Cell::Atom(y)) => atoms_equal(*x, *y),
            (
                Cell::Compound { functor: f, args: xs },
                Cell::Compound { functor: g, args: ys },
            ) => {
                if f == g && xs.len() == ys.len() {
                    pending.extend(xs.iter().copied().zip(ys.iter().copied()));
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// True when `a` and `b` unify; leaves no bindings behind
    pub(crate) fn unifiable(&mut self, a: usize, b: usize) -> bool {
        let heap_mark = self.cells.len();
        let trail_mark = self.trail.len();
        let result = self.unify(a, b);
        self.undo(heap_mark, trail_mark);
        result
    }

    pub(crate) fn name(&self, sym: Sym) -> &str {
        self.symbols.name(sym)
    }
}

/// Integers and floats never unify with each other, even when numerically equal
fn atoms_equal(x: Atom, y: Atom) -> bool {
    match (x, y) {
        (Atom::Symbol(a), Atom::Symbol(b)) => a == b,
        (Atom::Integer(a), Atom::Integer(b)) => a == b,
        (Atom::Float(a), Atom::Float(b)) => a == b,
        _ => false,
    }
}
