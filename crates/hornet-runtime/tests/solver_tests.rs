//! Integration tests for the resolution engine

mod common;

use common::{answers, assert_eq, first_binding, try_answers};
use hornet_runtime::foreign::ForeignRegistry;
use hornet_runtime::{SolveError, Solver, SolverOptions};
use rstest::rstest;

const APPEND: &str = "
    append([], L, L).
    append([H|T], L, [H|R]) :- append(T, L, R).
";

const NREV: &str = "
    append([], L, L).
    append([H|T], L, [H|R]) :- append(T, L, R).
    nrev([], []).
    nrev([H|T], R) :- nrev(T, RT), append(RT, [H], R).
    range(N, N, [N]) :- !.
    range(I, N, [I|T]) :- I < N, J is I + 1, range(J, N, T).
";

const COUNT: &str = "
    count(0).
    count(N) :- N > 0, M is N - 1, count(M).
";

const FRESH: &str = "
    fresh(0, []).
    fresh(N, [_|T]) :- N > 0, M is N - 1, fresh(M, T).
";

const NUMS: &str = "
    nums(0, []).
    nums(N, [N|T]) :- N > 0, M is N - 1, nums(M, T).
";

fn gc_options(threshold: usize) -> SolverOptions {
    SolverOptions {
        gc: true,
        gc_threshold: threshold,
    }
}

#[test]
fn test_facts_in_clause_order() {
    assert_eq!(
        answers("fact(1). fact(2).", "fact(X)."),
        vec!["X = 1", "X = 2"]
    );
}

#[test]
fn test_append_enumerates_splits() {
    assert_eq!(
        answers(APPEND, "append(X, Y, [1,2])."),
        vec!["X = [], Y = [1,2]", "X = [1], Y = [2]", "X = [1,2], Y = []"]
    );
}

#[test]
fn test_partial_list_answer() {
    let program = "front(X, [1,2|X]).";
    let answer = first_binding(program, "front(T, L).", "L").unwrap();
    assert!(answer.starts_with("[1,2|_"), "{}", answer);
}

#[test]
fn test_naive_reverse() {
    assert_eq!(
        answers(NREV, "range(1, 6, L), nrev(L, R)."),
        vec!["L = [1,2,3,4,5,6], R = [6,5,4,3,2,1]"]
    );
}

#[rstest]
#[case("X is 1 + 2.", "X = 3")]
#[case("X is 7 / 2.", "X = 3.5")]
#[case("X is 8 / 2.", "X = 4")]
#[case("X is 2.0 * 3.", "X = 6.0")]
#[case("X is -3 + 1.", "X = -2")]
#[case("X is 17 mod 5.", "X = 2")]
#[case("X is 17 // 5.", "X = 3")]
#[case("X is (1 + 2) * 3 - 4.", "X = 5")]
#[case("X is 2 - 3 - 4.", "X = -5")]
fn test_arithmetic(#[case] query: &str, #[case] expected: &str) {
    assert_eq!(answers("", query), vec![expected]);
}

#[rstest]
#[case("1 < 2.", true)]
#[case("2 < 1.", false)]
#[case("1 =:= 1.0.", true)]
#[case("1 =\\= 2.", true)]
#[case("3 >= 3.", true)]
#[case("3 =< 2.", false)]
#[case("1 + 1 > 1.", true)]
#[case("integer(3).", true)]
#[case("integer(3.0).", false)]
#[case("float(3.0).", true)]
#[case("number(3).", true)]
#[case("atom(foo).", true)]
#[case("atom([]).", true)]
#[case("atom(\"text\").", true)]
#[case("atom(3).", false)]
#[case("compound(f(x)).", true)]
#[case("compound([a]).", true)]
#[case("var(X).", true)]
#[case("X = 1, var(X).", false)]
#[case("nonvar(a).", true)]
#[case("a \\= b.", true)]
#[case("f(X) \\= f(1).", false)]
#[case("1 = 1.0.", false)]
fn test_builtin_truth(#[case] query: &str, #[case] holds: bool) {
    assert_eq!(!answers("", query).is_empty(), holds, "{}", query);
}

#[rstest]
#[case("X is foo + 1.", SolveError::NotANumber { term: "foo".into() })]
#[case("X is 1 // 0.", SolveError::DivisionByZero { term: "//(1,0)".into() })]
#[case("a < 1.", SolveError::NotANumber { term: "a".into() })]
#[case("X is bar(1).", SolveError::UnsupportedOperation { term: "bar(1)".into() })]
#[case("3.", SolveError::NotCallable { term: "3".into() })]
fn test_builtin_errors(#[case] query: &str, #[case] expected: SolveError) {
    let result = try_answers("", query, SolverOptions::default(), &ForeignRegistry::new());
    assert_eq!(result, Err(expected));
}

#[test]
fn test_unbound_in_arithmetic() {
    let result = try_answers("", "X is Y + 1.", SolverOptions::default(), &ForeignRegistry::new());
    assert!(matches!(
        result,
        Err(SolveError::InsufficientlyInstantiated { .. })
    ));
}

#[test]
fn test_cut_commits_to_clause() {
    let program = "
        max(X, Y, X) :- X >= Y, !.
        max(_, Y, Y).
    ";
    assert_eq!(answers(program, "max(3, 1, M)."), vec!["M = 3"]);
    assert_eq!(answers(program, "max(1, 3, M)."), vec!["M = 3"]);
}

#[test]
fn test_cut_in_query_prunes_everything() {
    let program = "n(1). n(2). n(3).";
    assert_eq!(answers(program, "n(X), !."), vec!["X = 1"]);
    assert_eq!(answers(program, "n(X), !, X > 1."), Vec::<String>::new());
}

#[test]
fn test_quoted_atoms_and_strings_render_plain() {
    assert_eq!(answers("", "X = 'Hello World'."), vec!["X = Hello World"]);
    assert_eq!(answers("", "X = \"text\"."), vec!["X = text"]);
}

#[test]
fn test_cyclic_binding_renders_variable_name() {
    assert_eq!(answers("", "X = f(X)."), vec!["X = f(X)"]);
}

#[test]
fn test_shared_unbound_variables_render_alike() {
    let mut solver = Solver::new("", "X = Y.").unwrap();
    let solution = solver.next().unwrap().unwrap();
    let (x, y) = (solution.get("X").unwrap(), solution.get("Y").unwrap());
    assert!(x.starts_with('_'));
    assert_eq!(x, y);
}

#[test]
fn test_unbound_variables_numbered_in_answer_order() {
    assert_eq!(
        answers(FRESH, "fresh(3, L), X = f(Y)."),
        vec!["L = [_0,_1,_2], X = f(_3), Y = _3"]
    );
    assert_eq!(answers("", "X = g(A, B, A)."), vec!["X = g(_0,_1,_0), A = _0, B = _1"]);
}

#[test]
fn test_long_list_answer_renders() {
    let mut solver = Solver::new(NUMS, "nums(100000, L).").unwrap();
    let solution = solver.next().unwrap().unwrap();
    let list = solution.get("L").unwrap();
    assert!(list.starts_with("[100000,99999,99998,"));
    assert!(list.ends_with(",2,1]"));
    assert_eq!(list.matches(',').count(), 99_999);
}

#[test]
fn test_anonymous_variables_are_not_reported() {
    assert_eq!(answers("p(1, 2).", "p(_, X)."), vec!["X = 2"]);
    assert_eq!(answers("p(1, 2).", "p(_A, _)."), vec!["true"]);
}

#[test]
fn test_long_deterministic_recursion() {
    assert_eq!(answers(COUNT, "count(100000)."), vec!["true"]);
}

#[rstest]
#[case(APPEND, "append(X, Y, [a,b,c,d]).")]
#[case(NREV, "range(1, 30, L), nrev(L, R).")]
#[case(COUNT, "count(5000).")]
#[case("p(X) :- X = f(Y, Y), Y = g(a).", "p(Z).")]
#[case(FRESH, "fresh(50, L), X = f(Y).")]
fn test_gc_does_not_change_answers(#[case] program: &str, #[case] query: &str) {
    let registry = ForeignRegistry::new();
    let plain = try_answers(program, query, SolverOptions::default(), &registry).unwrap();
    let collected = try_answers(program, query, gc_options(16), &registry).unwrap();
    assert_eq!(plain, collected);
}

#[test]
fn test_gc_bounds_heap_growth() {
    let query = "count(50000), statistics(memory, M).";
    let registry = ForeignRegistry::new();

    let mut plain = Solver::with_options(COUNT, query, SolverOptions::default(), &registry).unwrap();
    let mut collected = Solver::with_options(COUNT, query, gc_options(1024), &registry).unwrap();

    let memory = |solver: &mut Solver| -> i64 {
        let solution = solver.next().unwrap().unwrap();
        solution.get("M").unwrap().parse().unwrap()
    };
    let without_gc = memory(&mut plain);
    let with_gc = memory(&mut collected);
    assert!(without_gc > 100_000, "heap without gc: {}", without_gc);
    assert!(with_gc < 4096, "heap with gc: {}", with_gc);
}

#[test]
fn test_new_with_gc_matches_new() {
    let plain: Vec<String> = Solver::new(APPEND, "append(X, [c], [a,b,c]).")
        .unwrap()
        .map(|s| s.unwrap().to_string())
        .collect();
    let collected: Vec<String> = Solver::new_with_gc(APPEND, "append(X, [c], [a,b,c]).")
        .unwrap()
        .map(|s| s.unwrap().to_string())
        .collect();
    assert_eq!(plain, vec!["X = [a,b]"]);
    assert_eq!(plain, collected);
}
