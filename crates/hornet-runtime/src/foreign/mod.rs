//! Foreign Call Gateway
//!
//! Lets solver programs call procedures written in Rust. A procedure is
//! registered under a name with ordered parameter names, and runs whenever a
//! goal with that name and arity is reached and no builtin claims it.
//!
//! The procedure sees a [`ForeignCall`] frame and nothing else. Its return
//! value steers the solver:
//!
//! - `Ok(true)`: the goal succeeds
//! - `Ok(false)`: the goal fails and the solver backtracks
//! - `Err(_)`: the whole solve aborts with a [`SolveError`]
//!
//! # Examples
//!
//! ```
//! use hornet_runtime::foreign::ForeignRegistry;
//! use hornet_runtime::{Solver, SolverOptions};
//!
//! let mut registry = ForeignRegistry::new();
//! registry.register("double", &["N", "Out"], |call| {
//!     let n: f64 = call.get("N")?;
//!     let out = call.arg("Out").cloned().unwrap_or_else(|| 0.0.into());
//!     Ok(call.unify(&out, (n * 2.0).into())?)
//! });
//!
//! let mut solver =
//!     Solver::with_options("", "double(21, X).", SolverOptions::default(), &registry).unwrap();
//! let solution = solver.next().unwrap().unwrap();
//! assert_eq!(solution.get("X"), Some("42"));
//! ```

mod io;
mod prelude;

pub use io::{DeniedIo, HostIo, HttpIo, IoError};
pub use prelude::prelude;

use crate::bridge::{ConversionError, FromHost, HostValue, TermBridge};
use crate::engine::heap::Machine;
use crate::engine::TermHandle;
use crate::error::SolveError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tracing::{trace, warn};

/// Illegal use of the capabilities a procedure was handed
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CapabilityError {
    /// Unification target is not a solver variable
    #[error("Unification target must be a variable, found {found}")]
    NotAVariable { found: String },

    /// Unification target was bound before the unification
    #[error("Unification target `{variable}` is already bound")]
    AlreadyBound { variable: String },

    /// The restricted `unify` only accepts numbers and strings
    #[error("Cannot unify a {found} value; only numbers and strings are allowed")]
    UnsupportedValue { found: String },
}

/// Errors a foreign procedure may return
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForeignError {
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error("{0}")]
    Host(String),
}

impl ForeignError {
    /// Host error carrying `message`
    pub fn host(message: impl Into<String>) -> Self {
        ForeignError::Host(message.into())
    }
}

impl From<ConversionError> for ForeignError {
    fn from(err: ConversionError) -> Self {
        ForeignError::Host(err.to_string())
    }
}

impl From<IoError> for ForeignError {
    fn from(err: IoError) -> Self {
        ForeignError::Host(err.to_string())
    }
}

type ForeignFn = Box<dyn Fn(&mut ForeignCall<'_>) -> Result<bool, ForeignError> + Send + Sync>;

/// A registered host procedure
pub struct ForeignProcedure {
    name: String,
    params: Vec<String>,
    body: ForeignFn,
}

impl ForeignProcedure {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

impl fmt::Debug for ForeignProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignProcedure")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Procedures available to solver programs, plus the host I/O they share
///
/// Cloning is cheap; procedures are reference counted so a registry can be
/// moved into a worker thread.
#[derive(Clone)]
pub struct ForeignRegistry {
    procedures: HashMap<(String, usize), Arc<ForeignProcedure>>,
    io: Arc<dyn HostIo>,
}

impl ForeignRegistry {
    /// Empty registry whose procedures are denied host I/O
    pub fn new() -> Self {
        Self::with_io(Arc::new(DeniedIo))
    }

    /// Empty registry using `io` for host I/O
    pub fn with_io(io: Arc<dyn HostIo>) -> Self {
        Self {
            procedures: HashMap::new(),
            io,
        }
    }

    /// Register `name/params.len()`, replacing any procedure with the same key
    pub fn register<F>(&mut self, name: impl Into<String>, params: &[&str], body: F) -> &mut Self
    where
        F: Fn(&mut ForeignCall<'_>) -> Result<bool, ForeignError> + Send + Sync + 'static,
    {
        let procedure = ForeignProcedure {
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
            body: Box::new(body),
        };
        let key = (procedure.name.clone(), procedure.arity());
        if self.procedures.contains_key(&key) {
            warn!(name = %key.0, arity = key.1, "replacing foreign procedure");
        }
        self.procedures.insert(key, Arc::new(procedure));
        self
    }

    pub fn get(&self, name: &str, arity: usize) -> Option<&Arc<ForeignProcedure>> {
        self.procedures.get(&(name.to_string(), arity))
    }

    pub fn procedures(&self) -> impl Iterator<Item = &Arc<ForeignProcedure>> {
        self.procedures.values()
    }

    pub fn io(&self) -> Arc<dyn HostIo> {
        Arc::clone(&self.io)
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }
}

impl Default for ForeignRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ForeignRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self
            .procedures
            .keys()
            .map(|(name, arity)| format!("{}/{}", name, arity))
            .collect();
        keys.sort();
        f.debug_struct("ForeignRegistry")
            .field("procedures", &keys)
            .finish_non_exhaustive()
    }
}

/// Context of one foreign procedure invocation
///
/// Borrowed from the solver for the duration of the call. Handles obtained
/// here are only valid until the procedure returns.
pub struct ForeignCall<'a> {
    procedure: &'a ForeignProcedure,
    args: Vec<HostValue>,
    bridge: TermBridge<'a>,
    io: &'a dyn HostIo,
}

impl<'a> ForeignCall<'a> {
    /// Name of the running procedure
    pub fn name(&self) -> &str {
        &self.procedure.name
    }

    /// Declared parameter names, in argument order
    pub fn params(&self) -> &[String] {
        &self.procedure.params
    }

    /// Argument bound to the parameter `name`
    pub fn arg(&self, name: &str) -> Option<&HostValue> {
        self.procedure
            .params
            .iter()
            .position(|param| param == name)
            .map(|index| &self.args[index])
    }

    /// All arguments, in parameter order
    pub fn args(&self) -> &[HostValue] {
        &self.args
    }

    /// Argument `name` converted to `T`
    pub fn get<T: FromHost>(&self, name: &str) -> Result<T, ForeignError> {
        let value = self
            .arg(name)
            .ok_or_else(|| ForeignError::host(format!("No parameter named `{}`", name)))?;
        Ok(T::from_host(value)?)
    }

    /// Bind the unbound variable `target` to a number or string
    ///
    /// Returns `Ok(false)` when the values do not unify.
    pub fn unify(&mut self, target: &HostValue, value: HostValue) -> Result<bool, CapabilityError> {
        if !matches!(value, HostValue::Number(_) | HostValue::String(_)) {
            return Err(CapabilityError::UnsupportedValue {
                found: value.type_name().to_string(),
            });
        }
        self.unify_term(target, value)
    }

    /// Bind the unbound variable `target` to any value, compounds and lists included
    pub fn unify_term(&mut self, target: &HostValue, value: HostValue) -> Result<bool, CapabilityError> {
        let var = target.as_var().ok_or_else(|| CapabilityError::NotAVariable {
            found: target.type_name().to_string(),
        })?;
        if !self.bridge.is_unbound(var) {
            return Err(CapabilityError::AlreadyBound {
                variable: self.bridge.render(var.handle()),
            });
        }
        let source = self.bridge.allocate(&value);
        Ok(self.bridge.unify(var.handle(), source))
    }

    /// Copy `value` into the solver heap
    pub fn allocate(&mut self, value: &HostValue) -> TermHandle {
        self.bridge.allocate(value)
    }

    /// Read a term from the solver heap
    pub fn read(&self, handle: TermHandle) -> HostValue {
        self.bridge.read(handle)
    }

    /// Host environment access
    pub fn io(&self) -> &dyn HostIo {
        self.io
    }
}

/// Run `procedure` on the goal arguments `args`
pub(crate) fn invoke(
    procedure: &ForeignProcedure,
    machine: &mut Machine,
    io: &dyn HostIo,
    args: &[usize],
) -> Result<bool, SolveError> {
    let bridge = TermBridge::new(machine);
    let values = args.iter().map(|arg| bridge.read(TermHandle(*arg))).collect();
    let mut call = ForeignCall {
        procedure,
        args: values,
        bridge,
        io,
    };

    trace!(name = %procedure.name, arity = procedure.arity(), "foreign call");
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| (procedure.body)(&mut call)));
    let name = procedure.name.clone();
    let result = match outcome {
        Ok(Ok(succeeded)) => Ok(succeeded),
        Ok(Err(ForeignError::Capability(error))) => {
            Err(SolveError::CapabilityViolation { name, error })
        }
        Ok(Err(ForeignError::Host(message))) => Err(SolveError::HostProcedure { name, message }),
        Err(payload) => Err(SolveError::HostProcedure {
            name,
            message: panic_message(payload.as_ref()),
        }),
    };
    trace!(name = %procedure.name, ok = result.is_ok(), "foreign return");
    result
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "procedure panicked".to_string()
    }
}
