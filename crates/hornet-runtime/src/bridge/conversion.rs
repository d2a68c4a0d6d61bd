//! Conversion between Rust types and [`HostValue`]
//!
//! - [`ToHost`] turns a Rust value into a `HostValue` ready for allocation.
//! - [`FromHost`] reads a Rust value out of a bridged `HostValue`.
//!
//! Booleans travel as the atoms `true` and `false`; vectors as proper lists.
//!
//! # Examples
//!
//! ```
//! use hornet_runtime::bridge::{FromHost, ToHost};
//!
//! let value = vec![1.0, 2.0].to_host();
//! let back: Vec<f64> = FromHost::from_host(&value).unwrap();
//! assert_eq!(back, vec![1.0, 2.0]);
//! ```

use super::{list, HostValue};
use thiserror::Error;

/// Failure to read a Rust value out of a host value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("List element type mismatch at index {index}: expected {expected}, found {found}")]
    ListElement {
        index: usize,
        expected: String,
        found: String,
    },
}

impl ConversionError {
    fn mismatch(expected: &str, value: &HostValue) -> Self {
        ConversionError::TypeMismatch {
            expected: expected.to_string(),
            found: value.type_name().to_string(),
        }
    }
}

/// Read a Rust value out of a [`HostValue`]
pub trait FromHost: Sized {
    /// # Errors
    ///
    /// Returns `ConversionError` if the value has the wrong shape.
    fn from_host(value: &HostValue) -> Result<Self, ConversionError>;
}

/// Turn a Rust value into a [`HostValue`]
pub trait ToHost {
    fn to_host(self) -> HostValue;
}

impl FromHost for HostValue {
    fn from_host(value: &HostValue) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

impl ToHost for HostValue {
    fn to_host(self) -> HostValue {
        self
    }
}

impl FromHost for f64 {
    fn from_host(value: &HostValue) -> Result<Self, ConversionError> {
        value
            .as_number()
            .ok_or_else(|| ConversionError::mismatch("number", value))
    }
}

impl ToHost for f64 {
    fn to_host(self) -> HostValue {
        HostValue::Number(self)
    }
}

impl FromHost for i64 {
    fn from_host(value: &HostValue) -> Result<Self, ConversionError> {
        match value.as_number() {
            Some(n) if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 => {
                Ok(n as i64)
            }
            Some(_) => Err(ConversionError::TypeMismatch {
                expected: "integer".to_string(),
                found: "float".to_string(),
            }),
            None => Err(ConversionError::mismatch("integer", value)),
        }
    }
}

impl ToHost for i64 {
    fn to_host(self) -> HostValue {
        HostValue::from(self)
    }
}

impl FromHost for String {
    fn from_host(value: &HostValue) -> Result<Self, ConversionError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ConversionError::mismatch("string", value))
    }
}

impl ToHost for String {
    fn to_host(self) -> HostValue {
        HostValue::String(self)
    }
}

impl ToHost for &str {
    fn to_host(self) -> HostValue {
        HostValue::String(self.to_string())
    }
}

impl FromHost for bool {
    fn from_host(value: &HostValue) -> Result<Self, ConversionError> {
        match value.as_str() {
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            _ => Err(ConversionError::mismatch("bool", value)),
        }
    }
}

impl ToHost for bool {
    fn to_host(self) -> HostValue {
        HostValue::String(if self { "true" } else { "false" }.to_string())
    }
}

impl<T: FromHost> FromHost for Vec<T> {
    fn from_host(value: &HostValue) -> Result<Self, ConversionError> {
        let items = value
            .as_list()
            .ok_or_else(|| ConversionError::mismatch("list", value))?;
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                T::from_host(item).map_err(|err| match err {
                    ConversionError::TypeMismatch { expected, found } => {
                        ConversionError::ListElement {
                            index,
                            expected,
                            found,
                        }
                    }
                    nested => nested,
                })
            })
            .collect()
    }
}

impl<T: ToHost> ToHost for Vec<T> {
    fn to_host(self) -> HostValue {
        list(self.into_iter().map(ToHost::to_host).collect())
    }
}
