//! Built-in predicates
//!
//! Builtins are resolved before foreign procedures and program clauses, so a
//! program cannot redefine them.

use super::arith::Number;
use super::heap::{Atom, Cell, Machine};
use super::symbols::{self, Sym};
use crate::error::SolveError;
use std::cmp::Ordering;

/// Run the builtin `functor/args.len()`, or `None` when there is no such builtin
pub(crate) fn call(
    machine: &mut Machine,
    functor: Sym,
    args: &[usize],
) -> Option<Result<bool, SolveError>> {
    let result = match (functor, args) {
        (symbols::TRUE, []) => Ok(true),
        (symbols::FAIL | symbols::FALSE, []) => Ok(false),
        (symbols::UNIFY, [a, b]) => Ok(machine.unify(*a, *b)),
        (symbols::NOT_UNIFY, [a, b]) => Ok(!machine.unifiable(*a, *b)),
        (symbols::IS, [target, expr]) => is(machine, *target, *expr),
        (symbols::LT, [a, b]) => compare(machine, *a, *b, |o| o == Ordering::Less),
        (symbols::GT, [a, b]) => compare(machine, *a, *b, |o| o == Ordering::Greater),
        (symbols::LE, [a, b]) => compare(machine, *a, *b, |o| o != Ordering::Greater),
        (symbols::GE, [a, b]) => compare(machine, *a, *b, |o| o != Ordering::Less),
        (symbols::NUM_EQ, [a, b]) => compare(machine, *a, *b, |o| o == Ordering::Equal),
        (symbols::NUM_NE, [a, b]) => compare(machine, *a, *b, |o| o != Ordering::Equal),
        (symbols::INTEGER, [a]) => Ok(type_check(machine, *a, |c| {
            matches!(c, Cell::Atom(Atom::Integer(_)))
        })),
        (symbols::FLOAT, [a]) => Ok(type_check(machine, *a, |c| {
            matches!(c, Cell::Atom(Atom::Float(_)))
        })),
        (symbols::NUMBER, [a]) => Ok(type_check(machine, *a, |c| {
            matches!(c, Cell::Atom(Atom::Integer(_) | Atom::Float(_)))
        })),
        (symbols::ATOM, [a]) => Ok(type_check(machine, *a, |c| {
            matches!(c, Cell::Atom(Atom::Symbol(_)))
        })),
        (symbols::COMPOUND, [a]) => Ok(type_check(machine, *a, |c| {
            matches!(c, Cell::Compound { .. })
        })),
        (symbols::VAR, [a]) => Ok(type_check(machine, *a, |c| matches!(c, Cell::Ref(_)))),
        (symbols::NONVAR, [a]) => Ok(type_check(machine, *a, |c| !matches!(c, Cell::Ref(_)))),
        (symbols::STATISTICS, [key, value]) => statistics(machine, *key, *value),
        _ => return None,
    };
    Some(result)
}

fn is(machine: &mut Machine, target: usize, expr: usize) -> Result<bool, SolveError> {
    let value = machine.eval(expr)?;
    let cell = machine.new_atom(value.into_atom());
    Ok(machine.unify(target, cell))
}

fn compare(
    machine: &Machine,
    a: usize,
    b: usize,
    accept: impl Fn(Ordering) -> bool,
) -> Result<bool, SolveError> {
    let left = machine.eval(a)?;
    let right = machine.eval(b)?;
    // NaN compares false under every operator
    Ok(left.compare(right).is_some_and(accept))
}

fn type_check(machine: &Machine, term: usize, accept: impl Fn(&Cell) -> bool) -> bool {
    accept(&machine.cells[machine.deref(term)])
}

/// `statistics(memory, N)` reports live heap cells, `statistics(allocated, N)` reserved cells
fn statistics(machine: &mut Machine, key: usize, value: usize) -> Result<bool, SolveError> {
    let key = machine.deref(key);
    let reading = match machine.cells[key] {
        Cell::Atom(Atom::Symbol(symbols::MEMORY)) => machine.cells.len(),
        Cell::Atom(Atom::Symbol(symbols::ALLOCATED)) => machine.cells.capacity(),
        Cell::Ref(_) => {
            return Err(SolveError::InsufficientlyInstantiated {
                term: machine.render(key),
            })
        }
        _ => return Ok(false),
    };
    let cell = machine.new_atom(Number::Int(reading as i64).into_atom());
    Ok(machine.unify(value, cell))
}
