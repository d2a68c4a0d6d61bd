//! Heap compaction
//!
//! Runs only when no choice point exists, so nothing can backtrack into the
//! discarded cells and the trail carries no information. Live cells are
//! marked from the pending goals and the query variables, then slid down in
//! their original order, which keeps arguments below their parents.

use super::heap::{Cell, Machine};
use super::{Continuation, Frame};
use std::sync::Arc;

/// Compact the heap and return the number of live cells
pub(super) fn collect(
    machine: &mut Machine,
    continuation: &mut Continuation,
    query_vars: &mut [(String, usize)],
) -> usize {
    let frames = pending_frames(continuation);
    let marked = mark(
        machine,
        frames
            .iter()
            .map(|(goal, _)| *goal)
            .chain(query_vars.iter().map(|(_, cell)| *cell)),
    );

    let mut forward = vec![usize::MAX; marked.len()];
    let mut live = 0;
    for (index, keep) in marked.iter().enumerate() {
        if *keep {
            forward[index] = live;
            live += 1;
        }
    }

    let old = std::mem::take(&mut machine.cells);
    machine.cells = old
        .into_iter()
        .zip(marked)
        .filter(|(_, keep)| *keep)
        .map(|(cell, _)| match cell {
            Cell::Ref(target) => Cell::Ref(forward[target]),
            Cell::Compound { functor, args } => Cell::Compound {
                functor,
                args: args.iter().map(|arg| forward[*arg]).collect(),
            },
            atom => atom,
        })
        .collect();
    machine.trail.clear();

    for (_, cell) in query_vars.iter_mut() {
        *cell = forward[*cell];
    }
    *continuation = frames.iter().rev().fold(None, |next, &(goal, cut_barrier)| {
        Some(Arc::new(Frame {
            goal: forward[goal],
            cut_barrier,
            next,
        }))
    });

    live
}

/// Goals and cut barriers of the continuation, front first
fn pending_frames(continuation: &Continuation) -> Vec<(usize, usize)> {
    let mut frames = Vec::new();
    let mut cursor = continuation.as_ref();
    while let Some(frame) = cursor {
        frames.push((frame.goal, frame.cut_barrier));
        cursor = frame.next.as_ref();
    }
    frames
}

fn mark(machine: &Machine, roots: impl Iterator<Item = usize>) -> Vec<bool> {
    let mut marked = vec![false; machine.cells.len()];
    let mut stack: Vec<usize> = roots.collect();
    while let Some(index) = stack.pop() {
        if marked[index] {
            continue;
        }
        marked[index] = true;
        match &machine.cells[index] {
            Cell::Ref(target) if *target != index => stack.push(*target),
            Cell::Compound { args, .. } => stack.extend(args.iter().copied()),
            _ => {}
        }
    }
    marked
}
