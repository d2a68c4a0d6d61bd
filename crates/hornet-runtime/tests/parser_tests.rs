//! Integration tests for load errors
//!
//! Offsets are 0-based character offsets; lines and columns are 1-based.

mod common;

use common::assert_eq;
use hornet_runtime::{Diagnostic, Location, Solver};
use rstest::rstest;

fn load_error(program: &str, query: &str) -> Diagnostic {
    match Solver::new(program, query) {
        Ok(_) => panic!("expected a load error for {:?}", program),
        Err(e) => e,
    }
}

fn located(message: &str, offset: usize, line: usize, column: usize) -> Diagnostic {
    Diagnostic {
        message: message.to_string(),
        location: Some(Location {
            offset,
            line,
            column,
        }),
    }
}

#[test]
fn test_invalid_token() {
    let program = r#"
        a(X) :- b(X).
        b(X) :- @ c(X).
    "#;
    assert_eq!(
        load_error(program, "a(3)."),
        located("Invalid token", 39, 3, 17)
    );
}

#[test]
fn test_unexpected_token() {
    let program = r#"
        a(X) :- b(X).
        b(X) :- hello c(X).
    "#;
    assert_eq!(
        load_error(program, "a(3)."),
        located("Unexpected token `c`", 45, 3, 23)
    );
}

#[test]
fn test_unexpected_eof_points_past_last_token() {
    let program = r#"
        a(X) :- b(X).
        b(3)
    "#;
    assert_eq!(
        load_error(program, "a(3)."),
        located("Unexpected end of file, did you forget a '.'?", 35, 3, 13)
    );
}

#[rstest]
#[case("p(X)", "Unexpected end of file, did you forget a '.'?")]
#[case("p(X) q.", "Unexpected token `q`")]
#[case("", "Unexpected end of file, did you forget a '.'?")]
fn test_query_errors(#[case] query: &str, #[case] message: &str) {
    assert_eq!(load_error("p(1).", query).message, message);
}

#[rstest]
#[case(":- initialization(main).", "Directives are not supported")]
#[case("3 :- true.", "Invalid clause head `3`")]
#[case("p('open).", "Unterminated quoted atom")]
#[case("p. /* never closed", "Unterminated block comment")]
#[case("p([1, 2).", "Unexpected token `)`")]
fn test_program_errors(#[case] program: &str, #[case] message: &str) {
    assert_eq!(load_error(program, "p.").message, message);
}

#[test]
fn test_comments_and_layout_are_ignored() {
    let program = "
        % a line comment
        p(1). /* a block
                 comment */ p(2).
    ";
    let mut solver = Solver::new(program, "p(X).").unwrap();
    assert_eq!(solver.all().unwrap().len(), 2);
}

#[test]
fn test_human_rendering_of_load_error() {
    let program = "p(1).\nq :- @.";
    let rendered = load_error(program, "q.").to_human_string(program);
    assert_eq!(
        rendered,
        "error: Invalid token\n  --> 2:6\n  |\n2 | q :- @.\n  |      ^"
    );
}
