//! Term Bridge
//!
//! Converts between solver terms and host values. The bridge owns the legality
//! rules of each direction:
//!
//! - [`TermBridge::allocate`] copies any [`HostValue`] into the solver heap.
//! - [`TermBridge::read`] copies a heap term out. Unbound variables come back as
//!   [`HostValue::Variable`] carrying a [`VarRef`], the only way host code can
//!   name a solver variable.
//! - [`TermBridge::unify`] runs the solver's own unification, trailed so that
//!   backtracking undoes it.
//!
//! # Examples
//!
//! ```
//! use hornet_runtime::bridge::{self, HostValue};
//! use hornet_runtime::Solver;
//!
//! let mut solver = Solver::new("", "true.").unwrap();
//! let mut bridge = solver.bridge();
//! let value = bridge::list(vec![HostValue::from(1.0), HostValue::from("two")]);
//! let handle = bridge.allocate(&value);
//! assert_eq!(bridge.read(handle), value);
//! ```

mod conversion;

pub use conversion::{ConversionError, FromHost, ToHost};

use crate::engine::heap::{Atom, Cell, Machine};
use crate::engine::symbols::Sym;
use crate::engine::TermHandle;
use std::collections::HashSet;
use std::fmt;

/// Capability naming an unbound solver variable
///
/// Only the bridge creates these, so holding one proves the value came from
/// the solver. Host code cannot forge a `VarRef` to unify arbitrary cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarRef(TermHandle);

impl VarRef {
    /// Heap handle of the variable
    pub fn handle(&self) -> TermHandle {
        self.0
    }
}

/// A value on the host side of the bridge
///
/// `Clone`, `PartialEq` and `Drop` walk the value with an explicit stack, so
/// lists of any length are safe to copy, compare and discard.
#[derive(Debug)]
pub enum HostValue {
    Number(f64),
    String(String),
    Compound {
        functor: String,
        args: Vec<HostValue>,
    },
    /// A solver variable that was unbound when read
    Variable(VarRef),
}

impl HostValue {
    /// Short type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Number(_) => "number",
            HostValue::String(_) => "string",
            HostValue::Compound { .. } => "compound",
            HostValue::Variable(_) => "variable",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            HostValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<VarRef> {
        match self {
            HostValue::Variable(var) => Some(*var),
            _ => None,
        }
    }

    /// Items of a proper list, `None` for anything else
    pub fn as_list(&self) -> Option<Vec<&HostValue>> {
        let mut items = Vec::new();
        let mut cursor = self;
        loop {
            match cursor {
                HostValue::String(s) if s == crate::ast::NIL => return Some(items),
                HostValue::Compound { functor, args } if functor == crate::ast::DOT && args.len() == 2 => {
                    items.push(&args[0]);
                    cursor = &args[1];
                }
                _ => return None,
            }
        }
    }
}

impl Clone for HostValue {
    fn clone(&self) -> Self {
        enum Task<'v> {
            Visit(&'v HostValue),
            Build { functor: &'v str, arity: usize },
        }

        let mut tasks = vec![Task::Visit(self)];
        let mut built: Vec<HostValue> = Vec::new();
        while let Some(task) = tasks.pop() {
            match task {
                Task::Visit(HostValue::Number(n)) => built.push(HostValue::Number(*n)),
                Task::Visit(HostValue::String(s)) => built.push(HostValue::String(s.clone())),
                Task::Visit(HostValue::Variable(var)) => built.push(HostValue::Variable(*var)),
                Task::Visit(HostValue::Compound { functor, args }) => {
                    tasks.push(Task::Build {
                        functor: functor.as_str(),
                        arity: args.len(),
                    });
                    tasks.extend(args.iter().rev().map(Task::Visit));
                }
                Task::Build { functor, arity } => {
                    let args = built.split_off(built.len() - arity);
                    built.push(compound(functor, args));
                }
            }
        }
        built
            .pop()
            .unwrap_or_else(|| HostValue::String(crate::ast::NIL.to_string()))
    }
}

impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            match pair {
                (HostValue::Number(a), HostValue::Number(b)) if a == b => {}
                (HostValue::String(a), HostValue::String(b)) if a == b => {}
                (HostValue::Variable(a), HostValue::Variable(b)) if a == b => {}
                (
                    HostValue::Compound { functor: f, args: xs },
                    HostValue::Compound { functor: g, args: ys },
                ) if f == g && xs.len() == ys.len() => pending.extend(xs.iter().zip(ys.iter())),
                _ => return false,
            }
        }
        true
    }
}

impl Drop for HostValue {
    // Unnest iteratively; long lists would overflow the stack otherwise
    fn drop(&mut self) {
        let HostValue::Compound { args, .. } = self else {
            return;
        };
        let mut pending = std::mem::take(args);
        while let Some(mut value) = pending.pop() {
            if let HostValue::Compound { args, .. } = &mut value {
                pending.append(args);
            }
        }
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        HostValue::Number(n)
    }
}

impl From<i64> for HostValue {
    fn from(n: i64) -> Self {
        HostValue::Number(n as f64)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::String(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::String(s)
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Number(n) => write!(f, "{}", n),
            HostValue::String(s) => write!(f, "{}", s),
            HostValue::Variable(var) => write!(f, "_{}", var.handle().index()),
            HostValue::Compound { functor, args } => {
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

/// Compound value constructor
pub fn compound(functor: impl Into<String>, args: Vec<HostValue>) -> HostValue {
    HostValue::Compound {
        functor: functor.into(),
        args,
    }
}

/// Proper list of `items`, built from the right and ending in `[]`
pub fn list(items: Vec<HostValue>) -> HostValue {
    list_with_tail(items, HostValue::String(crate::ast::NIL.to_string()))
}

/// Partial list of `items` ending in `tail`
pub fn list_with_tail(items: Vec<HostValue>, tail: HostValue) -> HostValue {
    items
        .into_iter()
        .rev()
        .fold(tail, |rest, item| compound(crate::ast::DOT, vec![item, rest]))
}

/// Access to one solver heap
///
/// Handles passed in must come from the same solver; a foreign handle panics
/// on out-of-range access like any slice index.
pub struct TermBridge<'m> {
    machine: &'m mut Machine,
}

impl<'m> TermBridge<'m> {
    pub(crate) fn new(machine: &'m mut Machine) -> Self {
        Self { machine }
    }

    /// Deep-copy `value` into the heap
    ///
    /// Arguments are built before their compound, rightmost first. Allocating a
    /// `Variable` returns the variable's own handle rather than a copy.
    pub fn allocate(&mut self, value: &HostValue) -> TermHandle {
        TermHandle(self.allocate_cell(value))
    }

    fn allocate_cell(&mut self, value: &HostValue) -> usize {
        enum Task<'v> {
            Visit(&'v HostValue),
            Build { functor: &'v str, arity: usize },
        }

        let mut tasks = vec![Task::Visit(value)];
        let mut built: Vec<usize> = Vec::new();
        while let Some(task) = tasks.pop() {
            match task {
                Task::Visit(HostValue::Number(n)) => built.push(self.machine.new_atom(number_atom(*n))),
                Task::Visit(HostValue::String(s)) => {
                    let sym = self.machine.symbols.intern(s);
                    built.push(self.machine.new_atom(Atom::Symbol(sym)));
                }
                Task::Visit(HostValue::Variable(var)) => built.push(var.handle().index()),
                Task::Visit(HostValue::Compound { functor, args }) => {
                    tasks.push(Task::Build {
                        functor: functor.as_str(),
                        arity: args.len(),
                    });
                    // popped last to first, so the rightmost argument is built first
                    tasks.extend(args.iter().map(Task::Visit));
                }
                Task::Build { functor, arity } => {
                    let mut cells = built.split_off(built.len() - arity);
                    cells.reverse();
                    let functor = self.machine.symbols.intern(functor);
                    built.push(self.machine.new_compound(functor, cells));
                }
            }
        }
        built.pop().unwrap_or_default()
    }

    /// Unify two terms, recording bindings for backtracking
    ///
    /// Returns `false` on mismatch and leaves no partial bindings behind.
    pub fn unify(&mut self, a: TermHandle, b: TermHandle) -> bool {
        self.machine.unify(a.index(), b.index())
    }

    /// Copy a term out of the heap
    ///
    /// A variable bound into a term that contains it reads back as that
    /// variable, so cyclic terms stay finite on the host side.
    pub fn read(&self, handle: TermHandle) -> HostValue {
        enum Task {
            Visit(usize),
            Finish { target: usize, functor: Sym, arity: usize },
        }

        // Compound cells whose arguments are still being read
        let mut open: HashSet<usize> = HashSet::new();
        let mut tasks = vec![Task::Visit(handle.index())];
        let mut values: Vec<HostValue> = Vec::new();
        while let Some(task) = tasks.pop() {
            match task {
                Task::Visit(index) => {
                    let target = self.machine.deref(index);
                    let value = match &self.machine.cells[target] {
                        Cell::Ref(_) => HostValue::Variable(VarRef(TermHandle(target))),
                        Cell::Atom(Atom::Symbol(sym)) => {
                            HostValue::String(self.machine.name(*sym).to_string())
                        }
                        Cell::Atom(Atom::Integer(n)) => HostValue::Number(*n as f64),
                        Cell::Atom(Atom::Float(x)) => HostValue::Number(*x),
                        Cell::Compound { .. } if open.contains(&target) => {
                            HostValue::Variable(VarRef(TermHandle(index)))
                        }
                        Cell::Compound { functor, args } => {
                            open.insert(target);
                            tasks.push(Task::Finish {
                                target,
                                functor: *functor,
                                arity: args.len(),
                            });
                            tasks.extend(args.iter().rev().map(|arg| Task::Visit(*arg)));
                            continue;
                        }
                    };
                    values.push(value);
                }
                Task::Finish {
                    target,
                    functor,
                    arity,
                } => {
                    open.remove(&target);
                    let args = values.split_off(values.len() - arity);
                    values.push(HostValue::Compound {
                        functor: self.machine.name(functor).to_string(),
                        args,
                    });
                }
            }
        }
        values
            .pop()
            .unwrap_or_else(|| HostValue::String(crate::ast::NIL.to_string()))
    }

    /// Allocate a fresh unbound variable
    pub fn fresh_variable(&mut self) -> TermHandle {
        TermHandle(self.machine.new_var())
    }

    /// True while `var` is still unbound
    ///
    /// A variable aliased to another unbound variable counts as unbound.
    pub fn is_unbound(&self, var: VarRef) -> bool {
        let target = self.machine.deref(var.handle().index());
        self.machine.is_unbound(target)
    }

    /// Render a term the way solutions are rendered
    pub fn render(&self, handle: TermHandle) -> String {
        self.machine.render(handle.index())
    }
}

/// Integral numbers within `i64` become integer atoms, everything else floats
fn number_atom(n: f64) -> Atom {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Atom::Integer(n as i64)
    } else {
        Atom::Float(n)
    }
}
