//! Term rendering

use super::heap::{Atom, Cell, Machine};
use super::symbols;
use std::collections::{HashMap, HashSet};

/// Format a float so integral values keep a trailing `.0`
pub(crate) fn format_float(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{:.1}", x)
    } else {
        format!("{}", x)
    }
}

impl Machine {
    /// Render a term; a cycle back into a term being rendered prints `...`
    pub(crate) fn render(&self, term: usize) -> String {
        self.render_named(term, "...")
    }

    /// Render the binding of a query variable; a cycle back into the term prints `name`
    pub(crate) fn render_named(&self, term: usize, name: &str) -> String {
        Renderer::new(self).render(term, name)
    }

    /// Render the bindings of one answer
    ///
    /// Unbound variables are numbered `_0`, `_1`, ... in order of first
    /// occurrence across all bindings, so names do not depend on heap layout.
    pub(crate) fn render_bindings(&self, vars: &[(String, usize)]) -> Vec<(String, String)> {
        let mut renderer = Renderer::new(self);
        vars.iter()
            .map(|(name, cell)| (name.clone(), renderer.render(*cell, name)))
            .collect()
    }
}

struct Renderer<'m> {
    machine: &'m Machine,
    /// Printed for a cycle back into a term being written
    cycle_name: String,
    /// Compound cells currently being written
    open: HashSet<usize>,
    /// Display number of each unbound variable seen so far
    unbound: HashMap<usize, usize>,
    out: String,
}

impl<'m> Renderer<'m> {
    fn new(machine: &'m Machine) -> Self {
        Self {
            machine,
            cycle_name: String::new(),
            open: HashSet::new(),
            unbound: HashMap::new(),
            out: String::new(),
        }
    }

    fn render(&mut self, term: usize, name: &str) -> String {
        self.cycle_name = name.to_string();
        self.write(term);
        std::mem::take(&mut self.out)
    }

    fn write(&mut self, term: usize) {
        let term = self.machine.deref(term);
        match &self.machine.cells[term] {
            Cell::Ref(_) => {
                let next = self.unbound.len();
                let number = *self.unbound.entry(term).or_insert(next);
                self.out.push_str(&format!("_{}", number));
            }
            Cell::Atom(atom) => self.write_atom(*atom),
            Cell::Compound { functor, args } => {
                if !self.open.insert(term) {
                    self.out.push_str(&self.cycle_name);
                    return;
                }
                if *functor == symbols::DOT && args.len() == 2 {
                    self.write_list(args[0], args[1]);
                } else {
                    self.out.push_str(self.machine.name(*functor));
                    self.out.push('(');
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            self.out.push(',');
                        }
                        self.write(*arg);
                    }
                    self.out.push(')');
                }
                self.open.remove(&term);
            }
        }
    }

    fn write_atom(&mut self, atom: Atom) {
        match atom {
            Atom::Symbol(sym) => self.out.push_str(self.machine.name(sym)),
            Atom::Integer(n) => self.out.push_str(&n.to_string()),
            Atom::Float(x) => self.out.push_str(&format_float(x)),
        }
    }

    fn write_list(&mut self, head: usize, tail: usize) {
        let mut spine = Vec::new();
        self.out.push('[');
        self.write(head);
        let mut tail = self.machine.deref(tail);
        loop {
            match &self.machine.cells[tail] {
                Cell::Atom(Atom::Symbol(symbols::NIL)) => break,
                Cell::Compound { functor, args }
                    if *functor == symbols::DOT && args.len() == 2 && !self.open.contains(&tail) =>
                {
                    self.open.insert(tail);
                    spine.push(tail);
                    self.out.push(',');
                    self.write(args[0]);
                    tail = self.machine.deref(args[1]);
                }
                _ => {
                    self.out.push('|');
                    self.write(tail);
                    break;
                }
            }
        }
        self.out.push(']');
        for cell in spine {
            self.open.remove(&cell);
        }
    }
}
