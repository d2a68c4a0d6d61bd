//! Standard foreign procedures
//!
//! | procedure                     | behaviour                                   |
//! |-------------------------------|---------------------------------------------|
//! | `fetch(Url, Body)`            | GET `Url` through the host I/O, bind `Body` |
//! | `fetch(Url, Method, Body)`    | same, with an explicit HTTP method          |
//! | `atom_length(Atom, Length)`   | character count of an atom                  |
//! | `host_time(Millis)`           | milliseconds since the Unix epoch           |

use super::{ForeignCall, ForeignError, ForeignRegistry, HostIo};
use crate::bridge::HostValue;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Registry holding the standard procedures, using `io` for host I/O
pub fn prelude(io: Arc<dyn HostIo>) -> ForeignRegistry {
    let mut registry = ForeignRegistry::with_io(io);
    registry
        .register("fetch", &["Url", "Body"], |call| fetch(call, "GET"))
        .register("fetch", &["Url", "Method", "Body"], |call| {
            let method: String = call.get("Method")?;
            fetch(call, &method)
        })
        .register("atom_length", &["Atom", "Length"], atom_length)
        .register("host_time", &["Millis"], host_time);
    registry
}

fn fetch(call: &mut ForeignCall<'_>, method: &str) -> Result<bool, ForeignError> {
    let url: String = call.get("Url")?;
    let body = call.io().fetch(&url, method)?;
    bind(call, "Body", body.into())
}

fn atom_length(call: &mut ForeignCall<'_>) -> Result<bool, ForeignError> {
    let atom: String = call.get("Atom")?;
    let length = atom.chars().count() as i64;
    match call.arg("Length").cloned() {
        Some(HostValue::Variable(_)) => bind(call, "Length", length.into()),
        Some(value) => Ok(value.as_number() == Some(length as f64)),
        None => Ok(false),
    }
}

fn host_time(call: &mut ForeignCall<'_>) -> Result<bool, ForeignError> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| ForeignError::host(e.to_string()))?
        .as_millis() as i64;
    bind(call, "Millis", millis.into())
}

/// Unify parameter `name` with `value`
fn bind(
    call: &mut ForeignCall<'_>,
    name: &str,
    value: HostValue,
) -> Result<bool, ForeignError> {
    let target = call
        .arg(name)
        .cloned()
        .ok_or_else(|| ForeignError::host(format!("No parameter named `{}`", name)))?;
    Ok(call.unify(&target, value)?)
}
