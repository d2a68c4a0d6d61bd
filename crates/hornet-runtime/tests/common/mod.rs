//! Shared test helpers

#![allow(dead_code)]

use hornet_runtime::foreign::ForeignRegistry;
use hornet_runtime::{Solution, SolveError, Solver, SolverOptions};

pub use pretty_assertions::{assert_eq, assert_ne};

/// Every answer of `query`, rendered as `X = 1, Y = 2`
pub fn answers(program: &str, query: &str) -> Vec<String> {
    answers_with(program, query, &ForeignRegistry::new())
}

/// Every answer of `query` with foreign procedures from `registry`
pub fn answers_with(program: &str, query: &str, registry: &ForeignRegistry) -> Vec<String> {
    try_answers(program, query, SolverOptions::default(), registry)
        .unwrap_or_else(|e| panic!("solve of {:?} failed: {}", query, e))
}

pub fn try_answers(
    program: &str,
    query: &str,
    options: SolverOptions,
    registry: &ForeignRegistry,
) -> Result<Vec<String>, SolveError> {
    let mut solver = Solver::with_options(program, query, options, registry)
        .unwrap_or_else(|e| panic!("load failed: {}", e));
    Ok(solver.all()?.iter().map(Solution::to_string).collect())
}

/// Binding of `var` in the first answer
pub fn first_binding(program: &str, query: &str, var: &str) -> Option<String> {
    let mut solver = Solver::new(program, query).expect("load failed");
    let solution = solver.next().expect("solve failed")?;
    solution.get(var).map(str::to_string)
}
