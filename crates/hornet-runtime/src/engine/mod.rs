//! Resolution engine
//!
//! Depth-first SLD resolution with chronological backtracking over a heap
//! arena. Pending goals form a persistent linked list so a choice point can
//! capture the continuation by reference. Backtracking restores the heap by
//! truncation and resets trailed bindings.
//!
//! Goal resolution order: builtins, then foreign procedures, then program
//! clauses. A goal with no matching predicate fails.

mod arith;
mod builtins;
mod gc;
pub(crate) mod heap;
mod program;
mod render;
pub(crate) mod symbols;
mod solution;

pub use heap::TermHandle;
pub use solution::Solution;

use crate::diagnostic::LoadError;
use crate::error::SolveError;
use crate::foreign::{self, ForeignProcedure, ForeignRegistry, HostIo};
use crate::parser;
use heap::{Atom, Cell, Machine};
use program::{CompiledQuery, Database, Key};
use std::collections::HashMap;
use std::sync::Arc;
use symbols::{Sym, Symbols};
use tracing::debug;

/// Heap size (in cells) above which the collector may run
pub const DEFAULT_GC_THRESHOLD: usize = 65_536;

/// Solver construction options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverOptions {
    /// Collect garbage when the heap grows past the threshold
    pub gc: bool,
    /// Initial collection threshold in heap cells
    pub gc_threshold: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            gc: false,
            gc_threshold: DEFAULT_GC_THRESHOLD,
        }
    }
}

impl SolverOptions {
    pub fn with_gc(mut self, gc: bool) -> Self {
        self.gc = gc;
        self
    }
}

/// A pending goal and the choice-point height its cuts return to
#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) goal: usize,
    pub(crate) cut_barrier: usize,
    pub(crate) next: Continuation,
}

pub(crate) type Continuation = Option<Arc<Frame>>;

impl Drop for Frame {
    // Unlink iteratively; long continuations would overflow the stack otherwise
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(frame) = next {
            match Arc::try_unwrap(frame) {
                Ok(mut frame) => next = frame.next.take(),
                Err(_) => break,
            }
        }
    }
}

/// Untried clauses of a call, with the state to restore before trying them
#[derive(Debug)]
struct ChoicePoint {
    goal: usize,
    key: Key,
    next_clause: usize,
    continuation: Continuation,
    heap_mark: usize,
    trail_mark: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    /// No answer produced yet
    Fresh,
    /// Last call returned an answer; the next one backtracks first
    Answered,
    Exhausted,
}

/// One query against one program
pub struct Solver {
    machine: Machine,
    database: Arc<Database>,
    foreign: HashMap<Key, Arc<ForeignProcedure>>,
    io: Arc<dyn HostIo>,
    continuation: Continuation,
    choice_points: Vec<ChoicePoint>,
    query_vars: Vec<(String, usize)>,
    gc_threshold: Option<usize>,
    state: RunState,
}

impl Solver {
    /// Load `program` and prepare `query`, without garbage collection
    pub fn new(program: &str, query: &str) -> Result<Self, LoadError> {
        Self::with_options(program, query, SolverOptions::default(), &ForeignRegistry::new())
    }

    /// Load `program` and prepare `query`, collecting garbage as the heap grows
    pub fn new_with_gc(program: &str, query: &str) -> Result<Self, LoadError> {
        Self::with_options(
            program,
            query,
            SolverOptions::default().with_gc(true),
            &ForeignRegistry::new(),
        )
    }

    /// Load `program` and prepare `query` with foreign procedures available
    pub fn with_options(
        program: &str,
        query: &str,
        options: SolverOptions,
        registry: &ForeignRegistry,
    ) -> Result<Self, LoadError> {
        let program = parser::parse_program(program)?;
        let query = parser::parse_query(query)?;

        let mut symbols = Symbols::new();
        let database = Database::compile(&program, &mut symbols);
        let compiled = CompiledQuery::compile(&query, &mut symbols);
        let foreign = registry
            .procedures()
            .map(|procedure| {
                let key = (symbols.intern(procedure.name()), procedure.arity());
                (key, Arc::clone(procedure))
            })
            .collect();

        let mut machine = Machine::new(symbols);
        let mut slots = vec![None; compiled.var_count];
        let goals: Vec<usize> = compiled
            .goals
            .iter()
            .map(|goal| machine.instantiate(goal, &mut slots))
            .collect();
        let query_vars = compiled
            .reported
            .iter()
            .filter_map(|(name, slot)| slots[*slot].map(|cell| (name.clone(), cell)))
            .collect();

        debug!(
            clauses = program.clauses.len(),
            predicates = database.predicate_count(),
            goals = goals.len(),
            gc = options.gc,
            "solver loaded"
        );

        Ok(Self {
            machine,
            database: Arc::new(database),
            foreign,
            io: registry.io(),
            continuation: chain(&goals, 0, None),
            choice_points: Vec::new(),
            query_vars,
            gc_threshold: options.gc.then_some(options.gc_threshold),
            state: RunState::Fresh,
        })
    }

    /// Next answer, `None` once the query is exhausted
    ///
    /// An error also exhausts the query.
    pub fn next(&mut self) -> Result<Option<Solution>, SolveError> {
        let state = self.state;
        match state {
            RunState::Exhausted => return Ok(None),
            RunState::Answered if !self.backtrack() => {
                self.state = RunState::Exhausted;
                return Ok(None);
            }
            _ => {}
        }

        match self.run() {
            Ok(Some(solution)) => {
                self.state = RunState::Answered;
                Ok(Some(solution))
            }
            Ok(None) => {
                self.state = RunState::Exhausted;
                Ok(None)
            }
            Err(error) => {
                self.state = RunState::Exhausted;
                Err(error)
            }
        }
    }

    /// All remaining answers
    pub fn all(&mut self) -> Result<Vec<Solution>, SolveError> {
        let mut solutions = Vec::new();
        while let Some(solution) = self.next()? {
            solutions.push(solution);
        }
        Ok(solutions)
    }

    /// True once `next` can only return `None`
    pub fn is_exhausted(&self) -> bool {
        self.state == RunState::Exhausted
    }

    /// Number of live heap cells
    pub fn heap_size(&self) -> usize {
        self.machine.cells.len()
    }

    /// Bridge to this solver's heap
    pub fn bridge(&mut self) -> crate::bridge::TermBridge<'_> {
        crate::bridge::TermBridge::new(&mut self.machine)
    }

    fn run(&mut self) -> Result<Option<Solution>, SolveError> {
        loop {
            self.maybe_collect();
            let Some(frame) = self.continuation.clone() else {
                return Ok(Some(self.solution()));
            };
            self.continuation = frame.next.clone();
            if !self.call(frame.goal, frame.cut_barrier)? && !self.backtrack() {
                return Ok(None);
            }
        }
    }

    fn call(&mut self, goal: usize, cut_barrier: usize) -> Result<bool, SolveError> {
        let goal = self.machine.deref(goal);
        let (functor, args): (Sym, Vec<usize>) = match &self.machine.cells[goal] {
            Cell::Atom(Atom::Symbol(name)) => (*name, Vec::new()),
            Cell::Compound { functor, args } => (*functor, args.to_vec()),
            Cell::Ref(_) => {
                return Err(SolveError::InsufficientlyInstantiated {
                    term: self.machine.render(goal),
                })
            }
            Cell::Atom(_) => {
                return Err(SolveError::NotCallable {
                    term: self.machine.render(goal),
                })
            }
        };

        if functor == symbols::CUT && args.is_empty() {
            self.choice_points.truncate(cut_barrier);
            return Ok(true);
        }
        if let Some(result) = builtins::call(&mut self.machine, functor, &args) {
            return result;
        }
        if let Some(procedure) = self.foreign.get(&(functor, args.len())).cloned() {
            return foreign::invoke(&procedure, &mut self.machine, self.io.as_ref(), &args);
        }
        Ok(self.resolve(goal, (functor, args.len()), 0))
    }

    /// Try clauses of `key` from index `start`; on success the body becomes the continuation
    fn resolve(&mut self, goal: usize, key: Key, start: usize) -> bool {
        let database = Arc::clone(&self.database);
        let Some(clauses) = database.clauses(key) else {
            return false;
        };

        for (index, clause) in clauses.iter().enumerate().skip(start) {
            let heap_mark = self.machine.cells.len();
            let trail_mark = self.machine.trail.len();
            let mut slots = vec![None; clause.var_count];
            let head = self.machine.instantiate(&clause.head, &mut slots);
            if !self.machine.unify(goal, head) {
                self.machine.undo(heap_mark, trail_mark);
                continue;
            }

            let barrier = self.choice_points.len();
            if index + 1 < clauses.len() {
                self.choice_points.push(ChoicePoint {
                    goal,
                    key,
                    next_clause: index + 1,
                    continuation: self.continuation.clone(),
                    heap_mark,
                    trail_mark,
                });
            }
            let body: Vec<usize> = clause
                .body
                .iter()
                .map(|code| self.machine.instantiate(code, &mut slots))
                .collect();
            self.continuation = chain(&body, barrier, self.continuation.take());
            return true;
        }
        false
    }

    /// Resume from the newest choice point with an applicable clause
    fn backtrack(&mut self) -> bool {
        while let Some(choice) = self.choice_points.pop() {
            self.machine.undo(choice.heap_mark, choice.trail_mark);
            self.continuation = choice.continuation;
            if self.resolve(choice.goal, choice.key, choice.next_clause) {
                return true;
            }
        }
        false
    }

    fn solution(&self) -> Solution {
        Solution::new(self.machine.render_bindings(&self.query_vars))
    }

    fn maybe_collect(&mut self) {
        let Some(threshold) = self.gc_threshold else {
            return;
        };
        if !self.choice_points.is_empty() || self.machine.cells.len() <= threshold {
            return;
        }
        let before = self.machine.cells.len();
        let live = gc::collect(
            &mut self.machine,
            &mut self.continuation,
            &mut self.query_vars,
        );
        let next_threshold = threshold.max(live.saturating_mul(2));
        debug!(before, live, next_threshold, "heap collected");
        self.gc_threshold = Some(next_threshold);
    }
}

impl Iterator for Solver {
    type Item = Result<Solution, SolveError>;

    fn next(&mut self) -> Option<Self::Item> {
        Solver::next(self).transpose()
    }
}

/// Prepend `goals` to `next`, all sharing one cut barrier
fn chain(goals: &[usize], cut_barrier: usize, next: Continuation) -> Continuation {
    goals.iter().rev().fold(next, |next, &goal| {
        Some(Arc::new(Frame {
            goal,
            cut_barrier,
            next,
        }))
    })
}
