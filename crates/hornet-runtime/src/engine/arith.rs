//! Arithmetic evaluation for `is/2` and numeric comparison

use super::heap::{Atom, Cell, Machine};
use super::symbols;
use crate::error::SolveError;
use std::cmp::Ordering;

/// Evaluated number
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(x) => x,
        }
    }

    pub(crate) fn into_atom(self) -> Atom {
        match self {
            Number::Int(n) => Atom::Integer(n),
            Number::Float(x) => Atom::Float(x),
        }
    }

    /// Numeric comparison across integers and floats
    pub(crate) fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl Machine {
    /// Evaluate an arithmetic expression
    pub(crate) fn eval(&self, term: usize) -> Result<Number, SolveError> {
        let term = self.deref(term);
        match &self.cells[term] {
            Cell::Atom(Atom::Integer(n)) => Ok(Number::Int(*n)),
            Cell::Atom(Atom::Float(x)) => Ok(Number::Float(*x)),
            Cell::Atom(Atom::Symbol(_)) => Err(SolveError::NotANumber {
                term: self.render(term),
            }),
            Cell::Ref(_) => Err(SolveError::InsufficientlyInstantiated {
                term: self.render(term),
            }),
            Cell::Compound { functor, args } => match args.len() {
                1 if *functor == symbols::MINUS => match self.eval(args[0])? {
                    Number::Int(n) => Ok(n
                        .checked_neg()
                        .map_or(Number::Float(-(n as f64)), Number::Int)),
                    Number::Float(x) => Ok(Number::Float(-x)),
                },
                1 if *functor == symbols::PLUS => self.eval(args[0]),
                2 => {
                    let left = self.eval(args[0])?;
                    let right = self.eval(args[1])?;
                    self.apply(*functor, left, right, term)
                }
                _ => Err(SolveError::UnsupportedOperation {
                    term: self.render(term),
                }),
            },
        }
    }

    fn apply(
        &self,
        op: symbols::Sym,
        left: Number,
        right: Number,
        term: usize,
    ) -> Result<Number, SolveError> {
        use Number::{Float, Int};

        let unsupported = || SolveError::UnsupportedOperation {
            term: self.render(term),
        };
        let division_by_zero = || SolveError::DivisionByZero {
            term: self.render(term),
        };

        let result = match (op, left, right) {
            (symbols::PLUS, Int(a), Int(b)) => a.checked_add(b).map_or(Float(a as f64 + b as f64), Int),
            (symbols::MINUS, Int(a), Int(b)) => a.checked_sub(b).map_or(Float(a as f64 - b as f64), Int),
            (symbols::TIMES, Int(a), Int(b)) => a.checked_mul(b).map_or(Float(a as f64 * b as f64), Int),
            (symbols::PLUS, a, b) => Float(a.as_f64() + b.as_f64()),
            (symbols::MINUS, a, b) => Float(a.as_f64() - b.as_f64()),
            (symbols::TIMES, a, b) => Float(a.as_f64() * b.as_f64()),
            (symbols::DIVIDE, _, Int(0)) => return Err(division_by_zero()),
            (symbols::DIVIDE, _, Float(b)) if b == 0.0 => return Err(division_by_zero()),
            (symbols::DIVIDE, Int(a), Int(b)) if a.checked_rem(b) == Some(0) => {
                a.checked_div(b).map_or(Float(a as f64 / b as f64), Int)
            }
            (symbols::DIVIDE, a, b) => Float(a.as_f64() / b.as_f64()),
            (symbols::INT_DIVIDE | symbols::MOD, Int(_), Int(0)) => return Err(division_by_zero()),
            (symbols::INT_DIVIDE, Int(a), Int(b)) => a.checked_div(b).map(Int).ok_or_else(unsupported)?,
            // Result takes the sign of the divisor
            (symbols::MOD, Int(a), Int(b)) => a
                .checked_rem(b)
                .map(|r| if r != 0 && (r < 0) != (b < 0) { r + b } else { r })
                .map(Int)
                .ok_or_else(unsupported)?,
            _ => return Err(unsupported()),
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::symbols::Symbols;
    use crate::parser::parse_query;
    use crate::engine::program::CompiledQuery;
    use rstest::rstest;

    /// Evaluate the right-hand side of `X is <expr>.`
    fn eval(expr: &str) -> Result<Number, SolveError> {
        let mut symbols = Symbols::new();
        let query = parse_query(&format!("X is {}.", expr)).unwrap();
        let compiled = CompiledQuery::compile(&query, &mut symbols);
        let mut machine = Machine::new(symbols);
        let mut slots = vec![None; compiled.var_count];
        let goal = machine.instantiate(&compiled.goals[0], &mut slots);
        let rhs = match &machine.cells[goal] {
            Cell::Compound { args, .. } => args[1],
            other => panic!("unexpected goal {:?}", other),
        };
        machine.eval(rhs)
    }

    #[rstest]
    #[case("1 + 2", Number::Int(3))]
    #[case("3 + 2 * 5.1", Number::Float(13.2))]
    #[case("7 / 2", Number::Float(3.5))]
    #[case("8 / 2", Number::Int(4))]
    #[case("7 // 2", Number::Int(3))]
    #[case("-7 // 2", Number::Int(-3))]
    #[case("7 mod 3", Number::Int(1))]
    #[case("-7 mod 3", Number::Int(2))]
    #[case("7 mod -3", Number::Int(-2))]
    #[case("- (2 - 5)", Number::Int(3))]
    #[case("9223372036854775807 + 1", Number::Float(9223372036854775808.0))]
    fn test_eval(#[case] expr: &str, #[case] expected: Number) {
        assert_eq!(eval(expr).unwrap(), expected);
    }

    #[rstest]
    #[case("1 / 0")]
    #[case("1 // 0")]
    #[case("1 mod 0")]
    #[case("1.0 / 0.0")]
    fn test_division_by_zero(#[case] expr: &str) {
        assert!(matches!(eval(expr), Err(SolveError::DivisionByZero { .. })));
    }

    #[test]
    fn test_errors_name_offending_term() {
        assert_eq!(
            eval("foo + 1").unwrap_err(),
            SolveError::NotANumber { term: "foo".into() }
        );
        assert!(matches!(
            eval("Y + 1"),
            Err(SolveError::InsufficientlyInstantiated { .. })
        ));
        assert_eq!(
            eval("2.5 // 2").unwrap_err(),
            SolveError::UnsupportedOperation { term: "//(2.5,2)".into() }
        );
    }

    #[test]
    fn test_compare_mixed() {
        assert_eq!(Number::Int(1).compare(Number::Float(1.0)), Some(Ordering::Equal));
        assert_eq!(Number::Int(2).compare(Number::Float(1.5)), Some(Ordering::Greater));
    }
}
